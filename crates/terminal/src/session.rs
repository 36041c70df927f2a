//! Session types shared by the registry and the PTY layer.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::transcript::Transcript;

/// Stable identity of a session, independent of its position in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Everything needed to start (or restart) a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub shell: PathBuf,
    pub cwd: PathBuf,
    pub args: Vec<String>,
    /// `KEY=value` entries; the child sees only these.
    pub env: Vec<String>,
}

/// Receives session events. At most one client is bound at a time.
pub trait SessionClient: Send + Sync {
    fn on_text_changed(&self, session: SessionId);
    fn on_session_finished(&self, session: SessionId);
}

/// Indirection to the currently bound client, shared with every reader
/// thread. `None` while no UI is attached; output keeps buffering.
pub type ClientSlot = Arc<RwLock<Option<Arc<dyn SessionClient>>>>;

pub fn empty_client_slot() -> ClientSlot {
    Arc::new(RwLock::new(None))
}

/// A running child process behind a session.
pub trait SessionProcess: Send {
    fn write(&mut self, data: &[u8]) -> Result<()>;
    /// Drain output received since the last call.
    fn read_output(&self) -> Vec<Vec<u8>>;
    fn has_exited(&self) -> bool;
    fn resize(&self, rows: u16, cols: u16) -> Result<()>;
    fn process_id(&self) -> Option<u32>;
    /// Terminate the process. Idempotent.
    fn kill(&mut self);
}

/// Starts processes for new sessions.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessSpawner: Send + Sync {
    fn spawn(
        &self,
        spec: &LaunchSpec,
        session: SessionId,
        client: ClientSlot,
    ) -> Result<Box<dyn SessionProcess>>;
}

/// One running shell plus its buffered output.
pub struct Session {
    id: SessionId,
    spec: LaunchSpec,
    process: Box<dyn SessionProcess>,
    transcript: Transcript,
}

impl Session {
    pub(crate) fn new(id: SessionId, spec: LaunchSpec, process: Box<dyn SessionProcess>) -> Self {
        Self {
            id,
            spec,
            process,
            transcript: Transcript::default(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn spec(&self) -> &LaunchSpec {
        &self.spec
    }

    pub fn process_id(&self) -> Option<u32> {
        self.process.process_id()
    }

    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        self.process.write(data)
    }

    /// Move pending process output into the transcript and return it.
    pub fn pump(&mut self) -> Vec<u8> {
        let mut fresh = Vec::new();
        for chunk in self.process.read_output() {
            self.transcript.push(&chunk);
            fresh.extend_from_slice(&chunk);
        }
        fresh
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn has_exited(&self) -> bool {
        self.process.has_exited()
    }

    pub fn resize(&self, rows: u16, cols: u16) -> Result<()> {
        self.process.resize(rows, cols)
    }

    pub(crate) fn finish(&mut self) {
        self.process.kill();
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("shell", &self.spec.shell)
            .field("pid", &self.process.process_id())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory process for registry tests.

    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc;

    #[derive(Clone)]
    pub struct FakeHandle {
        pub exited: Arc<AtomicBool>,
        pub killed: Arc<AtomicBool>,
        pub written: Arc<parking_lot::Mutex<Vec<u8>>>,
        pub output: mpsc::Sender<Vec<u8>>,
    }

    pub struct FakeProcess {
        handle: FakeHandle,
        output: mpsc::Receiver<Vec<u8>>,
    }

    impl FakeProcess {
        pub fn new() -> (Self, FakeHandle) {
            let (tx, rx) = mpsc::channel();
            let handle = FakeHandle {
                exited: Arc::new(AtomicBool::new(false)),
                killed: Arc::new(AtomicBool::new(false)),
                written: Arc::new(parking_lot::Mutex::new(Vec::new())),
                output: tx,
            };
            (
                Self {
                    handle: handle.clone(),
                    output: rx,
                },
                handle,
            )
        }
    }

    impl SessionProcess for FakeProcess {
        fn write(&mut self, data: &[u8]) -> Result<()> {
            self.handle.written.lock().extend_from_slice(data);
            Ok(())
        }

        fn read_output(&self) -> Vec<Vec<u8>> {
            self.output.try_iter().collect()
        }

        fn has_exited(&self) -> bool {
            self.handle.exited.load(Ordering::SeqCst)
        }

        fn resize(&self, _rows: u16, _cols: u16) -> Result<()> {
            Ok(())
        }

        fn process_id(&self) -> Option<u32> {
            Some(4242)
        }

        fn kill(&mut self) {
            self.handle.killed.store(true, Ordering::SeqCst);
            self.handle.exited.store(true, Ordering::SeqCst);
        }
    }

    /// Spawner that hands out fake processes and remembers their handles.
    #[derive(Default)]
    pub struct FakeSpawner {
        pub handles: parking_lot::Mutex<Vec<FakeHandle>>,
        pub specs: parking_lot::Mutex<Vec<LaunchSpec>>,
    }

    impl ProcessSpawner for FakeSpawner {
        fn spawn(
            &self,
            spec: &LaunchSpec,
            _session: SessionId,
            _client: ClientSlot,
        ) -> Result<Box<dyn SessionProcess>> {
            let (process, handle) = FakeProcess::new();
            self.handles.lock().push(handle);
            self.specs.lock().push(spec.clone());
            Ok(Box::new(process))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeProcess;
    use super::*;

    fn spec() -> LaunchSpec {
        LaunchSpec {
            shell: PathBuf::from("/f/usr/bin/bash"),
            cwd: PathBuf::from("/f/home"),
            args: vec!["-l".to_string()],
            env: vec!["HOME=/f/home".to_string()],
        }
    }

    #[test]
    fn pump_moves_output_into_transcript() {
        let (process, handle) = FakeProcess::new();
        let mut session = Session::new(SessionId::new(), spec(), Box::new(process));
        handle.output.send(b"hello\nwor".to_vec()).unwrap();
        handle.output.send(b"ld\n".to_vec()).unwrap();

        assert_eq!(session.pump(), b"hello\nworld\n".to_vec());
        assert_eq!(session.transcript().lines().count(), 2);
        assert!(session.pump().is_empty());
    }

    #[test]
    fn finish_kills_process() {
        let (process, handle) = FakeProcess::new();
        let mut session = Session::new(SessionId::new(), spec(), Box::new(process));
        session.finish();
        assert!(session.has_exited());
        assert!(handle.killed.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }
}
