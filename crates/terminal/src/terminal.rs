//! Shell sessions.
//!
//! PTY-backed processes, their buffered output, and the bounded registry
//! that decides which one is active. No rendering lives here.

mod pty_handler;
mod registry;
mod session;
mod transcript;

pub use pty_handler::{PtyHandler, PtySpawner};
pub use registry::{ChangeListener, RegistryError, RegistryEvent, SessionRegistry};
pub use session::{
    empty_client_slot, ClientSlot, LaunchSpec, ProcessSpawner, Session, SessionClient, SessionId,
    SessionProcess,
};
pub use transcript::Transcript;
