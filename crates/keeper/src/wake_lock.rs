//! Time-bounded wake lock.
//!
//! Each acquisition lasts at most [`MAX_HOLD`]; the platform drops it after
//! that and nothing renews it. Acquire while held and release while not held
//! are no-ops.

use std::time::{Duration, Instant};

use anyhow::Result;
use settings::constants::wake_lock::{MAX_HOLD, TAG};

/// Platform primitive that keeps the CPU awake.
#[cfg_attr(test, mockall::automock)]
pub trait WakeLockBackend: Send {
    fn acquire(&self, tag: &str, timeout: Duration) -> Result<()>;
    fn release(&self) -> Result<()>;
}

/// Backend for hosts without a sleep-inhibit primitive; only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingWakeLock;

impl WakeLockBackend for LoggingWakeLock {
    fn acquire(&self, tag: &str, timeout: Duration) -> Result<()> {
        tracing::debug!("{} held for up to {:?}", tag, timeout);
        Ok(())
    }

    fn release(&self) -> Result<()> {
        tracing::debug!("{} released", TAG);
        Ok(())
    }
}

pub struct WakeLock {
    backend: Box<dyn WakeLockBackend>,
    acquired_at: Option<Instant>,
}

impl WakeLock {
    pub fn new(backend: Box<dyn WakeLockBackend>) -> Self {
        Self {
            backend,
            acquired_at: None,
        }
    }

    pub fn acquire(&mut self) -> bool {
        self.acquire_at(Instant::now())
    }

    /// Returns true if the lock was newly acquired.
    pub fn acquire_at(&mut self, now: Instant) -> bool {
        if self.is_held_at(now) {
            tracing::debug!("Wake lock already acquired");
            return false;
        }
        match self.backend.acquire(TAG, MAX_HOLD) {
            Ok(()) => {
                self.acquired_at = Some(now);
                tracing::info!("Wake lock acquired");
                true
            }
            Err(e) => {
                tracing::error!("Failed to acquire wake lock: {:#}", e);
                false
            }
        }
    }

    /// Returns true if a held lock was released.
    pub fn release(&mut self) -> bool {
        if self.acquired_at.is_none() {
            return false;
        }
        if let Err(e) = self.backend.release() {
            tracing::error!("Failed to release wake lock: {:#}", e);
        }
        self.acquired_at = None;
        tracing::info!("Wake lock released");
        true
    }

    pub fn is_held(&self) -> bool {
        self.is_held_at(Instant::now())
    }

    pub fn is_held_at(&self, now: Instant) -> bool {
        self.remaining_at(now).is_some()
    }

    /// Time left before the ceiling, if held.
    pub fn remaining_at(&self, now: Instant) -> Option<Duration> {
        let acquired_at = self.acquired_at?;
        MAX_HOLD
            .checked_sub(now.saturating_duration_since(acquired_at))
            .filter(|left| !left.is_zero())
    }

    /// Forget an acquisition that ran past the ceiling. Returns true if one did.
    pub fn expire_at(&mut self, now: Instant) -> bool {
        if self.acquired_at.is_some() && !self.is_held_at(now) {
            tracing::info!("Wake lock expired after {:?}", MAX_HOLD);
            self.acquired_at = None;
            return true;
        }
        false
    }
}
