//! Bounded, ordered list of live sessions.
//!
//! The registry decides which session is active and what happens when
//! sessions come and go; it never renders anything. Every mutation is
//! reported to an optional change listener so tabs and the drawer can
//! re-render.

use std::sync::Arc;

use settings::constants::sessions::MAX_SESSIONS;

use crate::session::{ClientSlot, LaunchSpec, ProcessSpawner, Session, SessionId};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("maximum {max} sessions reached")]
    AtCapacity { max: usize },

    #[error("failed to start shell: {0:#}")]
    Spawn(anyhow::Error),
}

/// What changed, for listeners that care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryEvent {
    Created { index: usize },
    Removed { index: usize },
    Switched { index: usize },
    /// The last session went away and a fresh one replaced it.
    Recreated,
    Cleared,
}

pub type ChangeListener = Box<dyn FnMut(RegistryEvent) + Send>;

pub struct SessionRegistry {
    sessions: Vec<Session>,
    active: usize,
    spawner: Arc<dyn ProcessSpawner>,
    client: ClientSlot,
    last_spec: Option<LaunchSpec>,
    listener: Option<ChangeListener>,
}

impl SessionRegistry {
    pub fn new(spawner: Arc<dyn ProcessSpawner>, client: ClientSlot) -> Self {
        Self {
            sessions: Vec::new(),
            active: 0,
            spawner,
            client,
            last_spec: None,
            listener: None,
        }
    }

    pub fn set_listener(&mut self, listener: impl FnMut(RegistryEvent) + Send + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    fn notify(&mut self, event: RegistryEvent) {
        tracing::debug!("Registry change: {:?} ({} sessions)", event, self.sessions.len());
        if let Some(listener) = self.listener.as_mut() {
            listener(event);
        }
    }

    /// The slot new sessions report to.
    pub fn client_slot(&self) -> &ClientSlot {
        &self.client
    }

    /// Start a session and make it active.
    ///
    /// At capacity the request is rejected before anything is spawned.
    pub fn create(&mut self, spec: LaunchSpec) -> Result<SessionId, RegistryError> {
        if self.sessions.len() >= MAX_SESSIONS {
            tracing::warn!("Maximum {} sessions reached", MAX_SESSIONS);
            return Err(RegistryError::AtCapacity { max: MAX_SESSIONS });
        }

        let id = self.spawn_session(spec)?;
        let index = self.sessions.len() - 1;
        self.notify(RegistryEvent::Created { index });
        tracing::info!("Session created, count: {}", self.sessions.len());
        Ok(id)
    }

    fn spawn_session(&mut self, spec: LaunchSpec) -> Result<SessionId, RegistryError> {
        let id = SessionId::new();
        let process = self
            .spawner
            .spawn(&spec, id, self.client.clone())
            .map_err(RegistryError::Spawn)?;
        self.sessions.push(Session::new(id, spec.clone(), process));
        self.active = self.sessions.len() - 1;
        self.last_spec = Some(spec);
        Ok(id)
    }

    /// Finish and remove a session. Returns false if the id is unknown.
    ///
    /// Removing the last session starts a fresh one from the last launch spec.
    pub fn remove(&mut self, id: SessionId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };

        let mut session = self.sessions.remove(index);
        session.finish();
        tracing::info!("Session removed, count: {}", self.sessions.len());

        if self.sessions.is_empty() {
            self.active = 0;
            self.recreate();
            return true;
        }

        if index < self.active || (index == self.active && self.active > 0) {
            self.active -= 1;
        }
        if self.active >= self.sessions.len() {
            util::debug_panic!(
                "active index {} out of range for {} sessions",
                self.active,
                self.sessions.len()
            );
            self.active = self.sessions.len() - 1;
        }
        self.notify(RegistryEvent::Removed { index });
        true
    }

    pub fn remove_active(&mut self) -> bool {
        match self.active_session() {
            Some(session) => {
                let id = session.id();
                self.remove(id)
            }
            None => false,
        }
    }

    fn recreate(&mut self) {
        let Some(spec) = self.last_spec.clone() else {
            self.notify(RegistryEvent::Cleared);
            return;
        };
        match self.spawn_session(spec) {
            Ok(id) => {
                tracing::info!("Last session closed, started {}", id);
                self.notify(RegistryEvent::Recreated);
            }
            Err(e) => {
                tracing::error!("Failed to replace last session: {}", e);
                self.notify(RegistryEvent::Cleared);
            }
        }
    }

    /// Make `index` active. Out of range is a no-op.
    pub fn switch(&mut self, index: usize) -> bool {
        if index >= self.sessions.len() {
            return false;
        }
        self.active = index;
        self.notify(RegistryEvent::Switched { index });
        true
    }

    pub fn next(&mut self) -> bool {
        if self.sessions.is_empty() {
            return false;
        }
        self.switch((self.active + 1) % self.sessions.len())
    }

    pub fn prev(&mut self) -> bool {
        if self.sessions.is_empty() {
            return false;
        }
        let index = if self.active == 0 {
            self.sessions.len() - 1
        } else {
            self.active - 1
        };
        self.switch(index)
    }

    /// Drop sessions whose process has exited, with the same active-index
    /// and recreate rules as [`Self::remove`].
    pub fn reap_exited(&mut self) -> Vec<SessionId> {
        let exited: Vec<SessionId> = self
            .sessions
            .iter()
            .filter(|session| session.has_exited())
            .map(Session::id)
            .collect();
        for id in &exited {
            tracing::info!("Session {} finished", id);
            self.remove(*id);
        }
        exited
    }

    /// Finish every session without starting a replacement.
    pub fn finish_all(&mut self) {
        if self.sessions.is_empty() {
            return;
        }
        for session in &mut self.sessions {
            session.finish();
        }
        let count = self.sessions.len();
        self.sessions.clear();
        self.active = 0;
        tracing::info!("Finished {} sessions", count);
        self.notify(RegistryEvent::Cleared);
    }

    pub fn index_of(&self, id: SessionId) -> Option<usize> {
        self.sessions.iter().position(|session| session.id() == id)
    }

    pub fn active_index(&self) -> Option<usize> {
        (!self.sessions.is_empty()).then_some(self.active)
    }

    pub fn active_session(&self) -> Option<&Session> {
        self.sessions.get(self.active)
    }

    pub fn active_session_mut(&mut self) -> Option<&mut Session> {
        self.sessions.get_mut(self.active)
    }

    pub fn get(&self, index: usize) -> Option<&Session> {
        self.sessions.get(index)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|session| session.id() == id)
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn sessions_mut(&mut self) -> &mut [Session] {
        &mut self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.sessions.len() >= MAX_SESSIONS
    }

    /// Tab and drawer labels, `Session 1` onwards.
    pub fn titles(&self) -> Vec<String> {
        (1..=self.sessions.len())
            .map(|number| format!("Session {}", number))
            .collect()
    }
}

impl Drop for SessionRegistry {
    fn drop(&mut self) {
        for session in &mut self.sessions {
            session.finish();
        }
    }
}
