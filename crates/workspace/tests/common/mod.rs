//! Shared helpers for workspace integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use bootstrap::Layout;
use keeper::{Keeper, KeeperStatus, LoggingWakeLock, SharedKeeper, StatusNotifier};
use mobilecli_workspace::Workspace;
use parking_lot::Mutex;
use settings::{Config, PreferenceStore};
use tempfile::TempDir;
use terminal::{ClientSlot, LaunchSpec, ProcessSpawner, SessionId, SessionProcess};

// ============================================================================
// Fake sessions
// ============================================================================

mod fake {
    use super::*;

    /// Bytes written to one fake process.
    pub type Input = Arc<Mutex<Vec<u8>>>;

    pub struct RecordingProcess {
        pub input: Input,
    }

    impl SessionProcess for RecordingProcess {
        fn write(&mut self, data: &[u8]) -> anyhow::Result<()> {
            self.input.lock().extend_from_slice(data);
            Ok(())
        }

        fn read_output(&self) -> Vec<Vec<u8>> {
            Vec::new()
        }

        fn has_exited(&self) -> bool {
            false
        }

        fn resize(&self, _rows: u16, _cols: u16) -> anyhow::Result<()> {
            Ok(())
        }

        fn process_id(&self) -> Option<u32> {
            None
        }

        fn kill(&mut self) {}
    }

    /// Spawner that remembers the input buffer and launch spec of every process.
    #[derive(Clone, Default)]
    pub struct RecordingSpawner {
        pub inputs: Arc<Mutex<Vec<Input>>>,
        pub specs: Arc<Mutex<Vec<LaunchSpec>>>,
    }

    impl ProcessSpawner for RecordingSpawner {
        fn spawn(
            &self,
            spec: &LaunchSpec,
            _session: SessionId,
            _client: ClientSlot,
        ) -> anyhow::Result<Box<dyn SessionProcess>> {
            let input = Input::default();
            self.inputs.lock().push(input.clone());
            self.specs.lock().push(spec.clone());
            Ok(Box::new(RecordingProcess { input }))
        }
    }
}

pub use fake::RecordingSpawner;

struct QuietNotifier;

impl StatusNotifier for QuietNotifier {
    fn publish(&self, _status: KeeperStatus) {}
    fn clear(&self) {}
}

// ============================================================================
// Test environment
// ============================================================================

pub struct TestEnv {
    pub temp_dir: TempDir,
    pub spawner: RecordingSpawner,
    pub keeper: SharedKeeper,
    pub config: Config,
}

impl TestEnv {
    pub fn new() -> Self {
        let spawner = RecordingSpawner::default();
        let keeper = Keeper::new(
            Arc::new(spawner.clone()),
            Box::new(LoggingWakeLock),
            Box::new(QuietNotifier),
        )
        .into_shared();
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let layout = Layout::new(temp_dir.path());
        layout
            .ensure_app_directories()
            .expect("Failed to create app directories");
        Self {
            temp_dir,
            spawner,
            keeper,
            config: Config::default(),
        }
    }

    pub fn layout(&self) -> Layout {
        Layout::new(self.temp_dir.path())
    }

    pub fn store(&self) -> PreferenceStore {
        PreferenceStore::new(self.temp_dir.path().join("preferences.toml"))
    }

    /// Seed the preference file before the workspace loads it.
    pub fn write_preferences(&self, toml: &str) {
        std::fs::write(self.store().path(), toml).expect("Failed to write preferences");
    }

    pub fn workspace(&self) -> Workspace {
        Workspace::new(
            self.keeper.clone(),
            self.layout(),
            self.config.clone(),
            self.store(),
        )
    }

    /// Everything written to the `index`th spawned session.
    pub fn input(&self, index: usize) -> String {
        let inputs = self.spawner.inputs.lock();
        let bytes = inputs.get(index).map(|input| input.lock().clone()).unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn session_count(&self) -> usize {
        self.keeper.lock().registry().len()
    }
}
