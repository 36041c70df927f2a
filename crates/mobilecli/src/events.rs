//! Everything the interaction thread reacts to arrives on one channel:
//! typed lines from the stdin reader, session callbacks from PTY readers,
//! and session list changes from the registry.

use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use anyhow::{Context, Result};
use terminal::{RegistryEvent, SessionClient, SessionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    TextChanged(SessionId),
    SessionFinished(SessionId),
    SessionsChanged(RegistryEvent),
    Line(String),
    InputClosed,
}

/// Session client bound to the keeper while the shell is attached.
pub struct ChannelClient {
    tx: Sender<UiEvent>,
}

impl ChannelClient {
    pub fn new(tx: Sender<UiEvent>) -> Self {
        Self { tx }
    }
}

impl SessionClient for ChannelClient {
    fn on_text_changed(&self, session: SessionId) {
        let _ = self.tx.send(UiEvent::TextChanged(session));
    }

    fn on_session_finished(&self, session: SessionId) {
        let _ = self.tx.send(UiEvent::SessionFinished(session));
    }
}

/// Registry listener that forwards session list changes to the shell.
pub fn forward_registry(tx: Sender<UiEvent>) -> impl FnMut(RegistryEvent) + Send + 'static {
    move |event| {
        let _ = tx.send(UiEvent::SessionsChanged(event));
    }
}

/// Open the event channel and start the stdin reader feeding it.
pub fn start() -> Result<(Sender<UiEvent>, Receiver<UiEvent>)> {
    let (tx, rx) = mpsc::channel();
    let input_tx = tx.clone();
    thread::Builder::new()
        .name("stdin".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if input_tx.send(UiEvent::Line(line)).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        tracing::debug!("stdin read ended: {}", e);
                        break;
                    }
                }
            }
            let _ = input_tx.send(UiEvent::InputClosed);
        })
        .context("Failed to start stdin reader")?;
    Ok((tx, rx))
}

/// Block until the user types a line. `None` once input is closed.
pub fn next_line(rx: &Receiver<UiEvent>) -> Option<String> {
    loop {
        match rx.recv() {
            Ok(UiEvent::Line(line)) => return Some(line),
            Ok(UiEvent::InputClosed) | Err(_) => return None,
            // Sessions are not attached yet; their output stays buffered
            Ok(_) => continue,
        }
    }
}
