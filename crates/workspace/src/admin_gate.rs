//! Hidden admin toggle on the version label.

use std::time::Instant;

use settings::constants::admin::{HINT_THRESHOLD, TAP_COUNT, TAP_TIMEOUT};
use sha2::{Digest, Sha256};

/// What a tap on the version label led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// Still counting, nothing to show yet.
    Counting,
    /// Show "N taps remaining".
    Hint(u32),
    /// Ask for the admin password.
    PromptPassword,
    /// Admin mode was on; turn it off.
    Disable,
}

#[derive(Debug, Default)]
pub struct AdminGate {
    taps: u32,
    last_tap: Option<Instant>,
}

impl AdminGate {
    pub fn tap(&mut self, admin_enabled: bool) -> TapOutcome {
        self.tap_at(Instant::now(), admin_enabled)
    }

    /// Count a tap. A gap longer than the timeout starts a new count.
    pub fn tap_at(&mut self, now: Instant, admin_enabled: bool) -> TapOutcome {
        let expired = self
            .last_tap
            .is_some_and(|last| now.saturating_duration_since(last) > TAP_TIMEOUT);
        if expired {
            self.taps = 0;
        }
        self.taps += 1;
        self.last_tap = Some(now);

        if self.taps >= TAP_COUNT {
            self.taps = 0;
            self.last_tap = None;
            return if admin_enabled {
                TapOutcome::Disable
            } else {
                TapOutcome::PromptPassword
            };
        }

        let remaining = TAP_COUNT - self.taps;
        if remaining <= HINT_THRESHOLD {
            TapOutcome::Hint(remaining)
        } else {
            TapOutcome::Counting
        }
    }
}

/// Hex SHA-256 of `password`.
pub fn password_digest(password: &str) -> String {
    Sha256::digest(password.as_bytes())
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

/// Compare a password against the configured hex digest.
pub fn verify_password(password: &str, expected_hex: &str) -> bool {
    password_digest(password).eq_ignore_ascii_case(expected_hex.trim())
}
