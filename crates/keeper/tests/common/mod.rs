//! Shared helpers for keeper integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use keeper::{Keeper, KeeperStatus, LoggingWakeLock, StatusNotifier};
use parking_lot::Mutex;
use terminal::{LaunchSpec, PtySpawner, SessionClient, SessionId};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client that records every callback.
#[derive(Default)]
pub struct RecordingClient {
    pub changed: Mutex<Vec<SessionId>>,
    pub finished: Mutex<Vec<SessionId>>,
}

impl SessionClient for RecordingClient {
    fn on_text_changed(&self, session: SessionId) {
        self.changed.lock().push(session);
    }

    fn on_session_finished(&self, session: SessionId) {
        self.finished.lock().push(session);
    }
}

/// Notifier that keeps the published history.
#[derive(Clone, Default)]
pub struct HistoryNotifier {
    pub published: Arc<Mutex<Vec<KeeperStatus>>>,
}

impl StatusNotifier for HistoryNotifier {
    fn publish(&self, status: KeeperStatus) {
        self.published.lock().push(status);
    }

    fn clear(&self) {}
}

pub fn pty_keeper() -> (Keeper, HistoryNotifier) {
    let notifier = HistoryNotifier::default();
    let keeper = Keeper::new(
        Arc::new(PtySpawner::default()),
        Box::new(LoggingWakeLock),
        Box::new(notifier.clone()),
    );
    (keeper, notifier)
}

/// `/bin/sh` reading commands from the terminal.
pub fn sh_spec() -> LaunchSpec {
    LaunchSpec {
        shell: PathBuf::from("/bin/sh"),
        cwd: std::env::temp_dir(),
        args: Vec::new(),
        env: vec![
            "PATH=/usr/bin:/bin".to_string(),
            "PS1=$ ".to_string(),
            "TERM=xterm-256color".to_string(),
        ],
    }
}

/// Poll `done` until it holds or the timeout passes.
pub fn wait_until(mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + DEFAULT_TIMEOUT;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    false
}
