//! Status notification published by the keeper.

use std::fmt;

use util::plural;

/// What the keeper reports after each change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeeperStatus {
    pub sessions: usize,
    pub wake_lock: bool,
}

impl fmt::Display for KeeperStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} active", plural(self.sessions, "session"))?;
        if self.wake_lock {
            f.write_str(" (wake lock)")?;
        }
        Ok(())
    }
}

/// Where status updates go.
#[cfg_attr(test, mockall::automock)]
pub trait StatusNotifier: Send {
    fn publish(&self, status: KeeperStatus);
    fn clear(&self);
}

/// Publishes to the hosting terminal's title bar.
#[derive(Debug, Default, Clone, Copy)]
pub struct TitleNotifier;

impl StatusNotifier for TitleNotifier {
    fn publish(&self, status: KeeperStatus) {
        let app_name = release_channel::ReleaseChannel::global().app_name();
        platform::send_notification(app_name, &status.to_string());
    }

    fn clear(&self) {
        platform::clear_notification();
    }
}
