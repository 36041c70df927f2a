//! Platform-specific integrations.
//!
//! Process identity for the shell environment, the status surface the
//! session keeper publishes to, and hidden input for password prompts. On a
//! desktop terminal the "notification" is the window title of the hosting
//! terminal emulator.

use std::io::{IsTerminal, Write};

use nix::sys::termios::{self, LocalFlags, SetArg, Termios};

/// Identity of the running app process, used to derive synthetic user names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessIdentity {
    pub uid: u32,
    pub pid: u32,
}

impl ProcessIdentity {
    /// Identity of the current process.
    pub fn current() -> Self {
        Self {
            uid: nix::unistd::getuid().as_raw(),
            pid: std::process::id(),
        }
    }
}

/// Publish a one-line status (title + body) to the hosting terminal's title bar.
///
/// No-op when stderr is not a terminal.
pub fn send_notification(title: &str, body: &str) {
    let mut stderr = std::io::stderr();
    if !stderr.is_terminal() {
        tracing::debug!("Status (no tty): {} - {}", title, body);
        return;
    }
    let sequence = title_sequence(&format!("{} - {}", title, body));
    if let Err(e) = stderr.write_all(sequence.as_bytes()).and_then(|_| stderr.flush()) {
        tracing::debug!("Failed to publish status: {}", e);
    }
}

/// Clear the status published by [`send_notification`].
pub fn clear_notification() {
    let mut stderr = std::io::stderr();
    if stderr.is_terminal() {
        let _ = stderr.write_all(title_sequence("").as_bytes());
    }
}

/// OSC 0 "set window title", with control characters stripped.
fn title_sequence(text: &str) -> String {
    let clean: String = text.chars().filter(|c| !c.is_control()).collect();
    format!("\x1b]0;{}\x07", clean)
}

/// Turns off stdin echo while alive and restores the previous settings on drop.
///
/// A no-op when stdin is not a terminal.
pub struct EchoGuard {
    original: Option<Termios>,
}

impl EchoGuard {
    pub fn new() -> nix::Result<Self> {
        let stdin = std::io::stdin();
        if !stdin.is_terminal() {
            return Ok(Self { original: None });
        }

        let original = termios::tcgetattr(&stdin)?;
        let mut hidden = original.clone();
        hidden.local_flags.remove(LocalFlags::ECHO);
        termios::tcsetattr(&stdin, SetArg::TCSANOW, &hidden)?;
        Ok(Self {
            original: Some(original),
        })
    }
}

impl Drop for EchoGuard {
    fn drop(&mut self) {
        if let Some(original) = self.original.take() {
            if let Err(e) = termios::tcsetattr(std::io::stdin(), SetArg::TCSANOW, &original) {
                tracing::warn!("Failed to restore terminal echo: {}", e);
            }
        }
    }
}
