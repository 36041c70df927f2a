//! Foreground session keeper.
//!
//! Owns the session registry so shells outlive any particular UI client,
//! holds the wake lock, and publishes a status line after every change.
//! Shared as [`SharedKeeper`]; the UI binds itself as the session client
//! while attached and unbinds when it goes away.

mod status;
mod wake_lock;

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use terminal::{
    empty_client_slot, LaunchSpec, ProcessSpawner, RegistryError, RegistryEvent, SessionClient,
    SessionId, SessionRegistry,
};

pub use status::{KeeperStatus, StatusNotifier, TitleNotifier};
pub use wake_lock::{LoggingWakeLock, WakeLock, WakeLockBackend};

pub type SharedKeeper = Arc<Mutex<Keeper>>;

/// Commands the keeper accepts from outside the UI (status surface buttons,
/// the shell's `:` commands).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeeperAction {
    Stop,
    AcquireWakeLock,
    ReleaseWakeLock,
}

pub struct Keeper {
    registry: SessionRegistry,
    wake_lock: WakeLock,
    notifier: Box<dyn StatusNotifier>,
    bound: bool,
    stopped: bool,
}

impl Keeper {
    pub fn new(
        spawner: Arc<dyn ProcessSpawner>,
        wake_lock: Box<dyn WakeLockBackend>,
        notifier: Box<dyn StatusNotifier>,
    ) -> Self {
        tracing::info!("Session keeper started");
        Self {
            registry: SessionRegistry::new(spawner, empty_client_slot()),
            wake_lock: WakeLock::new(wake_lock),
            notifier,
            bound: false,
            stopped: false,
        }
    }

    pub fn into_shared(self) -> SharedKeeper {
        Arc::new(Mutex::new(self))
    }

    /// Attach a UI client. Existing sessions report to it from now on.
    pub fn bind(&mut self, client: Arc<dyn SessionClient>) {
        *self.registry.client_slot().write() = Some(client);
        self.bound = true;
        tracing::info!("Keeper bound ({} sessions)", self.registry.len());
    }

    /// Detach the UI client. Sessions keep running and buffering output.
    pub fn unbind(&mut self) {
        *self.registry.client_slot().write() = None;
        self.bound = false;
        tracing::info!("Keeper unbound");
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Mutable registry access for session I/O. Use the keeper's own methods
    /// for changes that affect the session count.
    pub fn registry_mut(&mut self) -> &mut SessionRegistry {
        &mut self.registry
    }

    /// Report session list changes (created, removed, switched, replaced).
    pub fn set_registry_listener(&mut self, listener: impl FnMut(RegistryEvent) + Send + 'static) {
        self.registry.set_listener(listener);
    }

    pub fn clear_registry_listener(&mut self) {
        self.registry.clear_listener();
    }

    pub fn create_session(&mut self, spec: LaunchSpec) -> Result<SessionId, RegistryError> {
        let result = self.registry.create(spec);
        if result.is_ok() {
            self.stopped = false;
            self.publish();
        }
        result
    }

    pub fn remove_session(&mut self, id: SessionId) -> bool {
        let removed = self.registry.remove(id);
        if removed {
            self.publish();
        }
        removed
    }

    pub fn remove_active_session(&mut self) -> bool {
        let removed = self.registry.remove_active();
        if removed {
            self.publish();
        }
        removed
    }

    pub fn switch_session(&mut self, index: usize) -> bool {
        self.registry.switch(index)
    }

    /// Housekeeping: drop exited sessions and expired wake locks.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    pub fn tick_at(&mut self, now: Instant) {
        let reaped = self.registry.reap_exited();
        let expired = self.wake_lock.expire_at(now);
        if !reaped.is_empty() || expired {
            self.publish();
        }
    }

    pub fn acquire_wake_lock(&mut self) {
        if self.wake_lock.acquire() {
            self.publish();
        }
    }

    pub fn release_wake_lock(&mut self) {
        if self.wake_lock.release() {
            self.publish();
        }
    }

    /// Flip the wake lock. Returns whether it is now held.
    pub fn toggle_wake_lock(&mut self) -> bool {
        if self.wake_lock.is_held() {
            self.release_wake_lock();
        } else {
            self.acquire_wake_lock();
        }
        self.wake_lock.is_held()
    }

    pub fn is_wake_lock_held(&self) -> bool {
        self.wake_lock.is_held()
    }

    pub fn handle(&mut self, action: KeeperAction) {
        tracing::debug!("Keeper action: {:?}", action);
        match action {
            KeeperAction::Stop => self.stop(),
            KeeperAction::AcquireWakeLock => self.acquire_wake_lock(),
            KeeperAction::ReleaseWakeLock => self.release_wake_lock(),
        }
    }

    pub fn status(&self) -> KeeperStatus {
        KeeperStatus {
            sessions: self.registry.len(),
            wake_lock: self.wake_lock.is_held(),
        }
    }

    fn publish(&self) {
        let status = self.status();
        tracing::debug!("Keeper status: {}", status);
        self.notifier.publish(status);
    }

    /// Finish all sessions, release the wake lock, and withdraw the status.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.registry.finish_all();
        self.wake_lock.release();
        self.notifier.clear();
        self.stopped = true;
        tracing::info!("Session keeper stopped");
    }
}

impl Drop for Keeper {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::status::MockStatusNotifier;
    use super::*;
    use mockall::predicate::eq;
    use mockall::Sequence;

    /// Spawner whose processes never produce output or exit.
    struct IdleSpawner;

    struct IdleProcess;

    impl terminal::SessionProcess for IdleProcess {
        fn write(&mut self, _data: &[u8]) -> anyhow::Result<()> {
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

    impl ProcessSpawner for IdleSpawner {
        fn spawn(
            &self,
            _spec: &LaunchSpec,
            _session: SessionId,
            _client: terminal::ClientSlot,
        ) -> anyhow::Result<Box<dyn terminal::SessionProcess>> {
            Ok(Box::new(IdleProcess))
        }
    }

    fn spec() -> LaunchSpec {
        LaunchSpec {
            shell: "/f/usr/bin/bash".into(),
            cwd: "/f/home".into(),
            args: vec!["-l".to_string()],
            env: Vec::new(),
        }
    }

    fn keeper(notifier: MockStatusNotifier) -> Keeper {
        Keeper::new(
            Arc::new(IdleSpawner),
            Box::new(LoggingWakeLock),
            Box::new(notifier),
        )
    }

    #[test]
    fn publishes_after_each_change() {
        let mut notifier = MockStatusNotifier::new();
        let mut seq = Sequence::new();
        for (sessions, wake_lock) in [(1, false), (2, false), (2, true), (1, true)] {
            notifier
                .expect_publish()
                .with(eq(KeeperStatus {
                    sessions,
                    wake_lock,
                }))
                .times(1)
                .in_sequence(&mut seq)
                .return_const(());
        }
        notifier.expect_clear().return_const(());

        let mut keeper = keeper(notifier);
        keeper.create_session(spec()).unwrap();
        let second = keeper.create_session(spec()).unwrap();
        keeper.acquire_wake_lock();
        keeper.acquire_wake_lock();
        keeper.remove_session(second);
    }

    #[test]
    fn stop_finishes_sessions_and_releases_lock() {
        let mut notifier = MockStatusNotifier::new();
        notifier.expect_publish().return_const(());
        notifier.expect_clear().times(1).return_const(());

        let mut keeper = keeper(notifier);
        keeper.create_session(spec()).unwrap();
        keeper.handle(KeeperAction::AcquireWakeLock);
        keeper.handle(KeeperAction::Stop);

        assert!(keeper.registry().is_empty());
        assert!(!keeper.is_wake_lock_held());
        assert!(keeper.is_stopped());
        // Drop does not clear a second time
    }

    #[test]
    fn bind_and_unbind_swap_the_client_slot() {
        struct NullClient;
        impl SessionClient for NullClient {
            fn on_text_changed(&self, _session: SessionId) {}
            fn on_session_finished(&self, _session: SessionId) {}
        }

        let mut notifier = MockStatusNotifier::new();
        notifier.expect_publish().return_const(());
        notifier.expect_clear().return_const(());
        let mut keeper = keeper(notifier);

        keeper.create_session(spec()).unwrap();
        keeper.bind(Arc::new(NullClient));
        assert!(keeper.is_bound());
        assert!(keeper.registry().client_slot().read().is_some());

        keeper.unbind();
        assert!(!keeper.is_bound());
        assert!(keeper.registry().client_slot().read().is_none());
        assert_eq!(keeper.registry().len(), 1);
    }

    #[test]
    fn toggle_reports_new_state() {
        let mut notifier = MockStatusNotifier::new();
        notifier.expect_publish().times(2).return_const(());
        notifier.expect_clear().return_const(());
        let mut keeper = keeper(notifier);

        assert!(keeper.toggle_wake_lock());
        assert!(!keeper.toggle_wake_lock());
    }

    #[test]
    fn tick_expires_wake_lock() {
        let mut notifier = MockStatusNotifier::new();
        notifier
            .expect_publish()
            .with(eq(KeeperStatus {
                sessions: 0,
                wake_lock: true,
            }))
            .times(1)
            .return_const(());
        notifier
            .expect_publish()
            .with(eq(KeeperStatus {
                sessions: 0,
                wake_lock: false,
            }))
            .times(1)
            .return_const(());
        notifier.expect_clear().return_const(());
        let mut keeper = keeper(notifier);

        keeper.acquire_wake_lock();
        keeper.tick_at(Instant::now() + settings::constants::wake_lock::MAX_HOLD);
        assert!(!keeper.is_wake_lock_held());
    }
}
