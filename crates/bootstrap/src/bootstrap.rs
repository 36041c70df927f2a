//! Bootstrap userland for MobileCLI.
//!
//! Lays out the private prefix, installs the archive into it, and builds the
//! environment shells run with.

mod assets;
mod download;
mod environment;
mod error;
mod extract;
mod installer;
mod layout;
mod manifest;
mod permissions;

pub use assets::{API_COMMANDS, MEMORY_FILES};
pub use environment::{build_environment, user_name};
pub use error::{FailureKind, InstallError};
pub use installer::{InstallProgress, Installer, ProgressReceiver, ProgressSender};
pub use layout::Layout;
pub use manifest::{create_symlinks, parse_manifest, SymlinkEntry};
