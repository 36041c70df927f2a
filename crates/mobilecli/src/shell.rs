//! The interactive shell loop.
//!
//! Binds to the keeper for as long as it runs, echoes the active session's
//! output, and routes typed lines through the workspace.

use std::io::Write;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use mobilecli_workspace::{Response, Workspace};
use platform::EchoGuard;
use terminal::RegistryEvent;
use tracing::{debug, info};
use util::ResultExt;

use crate::events::{forward_registry, ChannelClient, UiEvent};

/// Housekeeping interval (reaping exited shells, wake lock expiry).
const TICK: Duration = Duration::from_millis(250);

/// Rows of transcript shown when switching sessions.
const REDRAW_ROWS: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct Shell<W: Write> {
    out: W,
    echo_guard: Option<EchoGuard>,
    redraw_pending: bool,
}

pub fn run(workspace: &mut Workspace, tx: Sender<UiEvent>, rx: &Receiver<UiEvent>) -> Result<()> {
    {
        let mut keeper = workspace.keeper().lock();
        keeper.bind(Arc::new(ChannelClient::new(tx.clone())));
        keeper.set_registry_listener(forward_registry(tx));
    }
    info!("Shell attached");

    let mut shell = Shell {
        out: std::io::stdout(),
        echo_guard: None,
        redraw_pending: false,
    };
    writeln!(shell.out, "Type :help for commands.")?;
    redraw(&mut shell.out, workspace)?;

    'events: loop {
        let first = match rx.recv_timeout(TICK) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => break,
        };
        // Drain what is already queued so a burst of changes redraws once
        let queued = std::iter::from_fn(|| rx.try_recv().ok());
        for event in first.into_iter().chain(queued) {
            if shell.handle(workspace, event)? == Flow::Quit {
                break 'events;
            }
        }

        workspace.keeper().lock().tick();
        if std::mem::take(&mut shell.redraw_pending) {
            redraw(&mut shell.out, workspace)?;
        }
    }

    drop(shell);
    {
        let mut keeper = workspace.keeper().lock();
        keeper.clear_registry_listener();
        keeper.unbind();
    }
    info!("Shell detached");
    Ok(())
}

impl<W: Write> Shell<W> {
    fn handle(&mut self, workspace: &mut Workspace, event: UiEvent) -> Result<Flow> {
        match event {
            UiEvent::TextChanged(id) => {
                if let Some(output) = workspace.pump(id) {
                    self.out.write_all(&output)?;
                    self.out.flush()?;
                }
            }
            UiEvent::SessionFinished(id) => debug!("Session {} finished", id),
            UiEvent::SessionsChanged(change) => {
                if let Some(text) = notice(change) {
                    writeln!(self.out, "\r\n[{}]", text)?;
                }
                self.redraw_pending = true;
            }
            UiEvent::Line(line) => {
                let response = workspace.handle_line(&line);
                if !workspace.is_awaiting_password() {
                    self.echo_guard = None;
                }
                match response {
                    Response::Quit => return Ok(Flow::Quit),
                    Response::PasswordRequired => {
                        self.echo_guard = EchoGuard::new().warn_on_err("Failed to hide input");
                        write!(self.out, "Admin password: ")?;
                        self.out.flush()?;
                    }
                    // Registry changes behind it redraw too; draw once
                    Response::Redraw => self.redraw_pending = true,
                    other => render(&mut self.out, other)?,
                }
            }
            UiEvent::InputClosed => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }
}

/// One-line notice for changes the user did not ask for.
fn notice(change: RegistryEvent) -> Option<&'static str> {
    match change {
        RegistryEvent::Recreated => Some("Last session ended, started a new one"),
        RegistryEvent::Cleared => Some("All sessions finished"),
        RegistryEvent::Created { .. }
        | RegistryEvent::Removed { .. }
        | RegistryEvent::Switched { .. } => None,
    }
}

fn render(out: &mut impl Write, response: Response) -> Result<()> {
    match response {
        Response::Nothing | Response::Quit | Response::PasswordRequired | Response::Redraw => {}
        Response::Message(text) => writeln!(out, "\r\n[{}]", text)?,
        Response::Lines(lines) => {
            writeln!(out)?;
            for line in lines {
                writeln!(out, "{}", line)?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

/// Tabs line, then the active session's recent transcript.
fn redraw(out: &mut impl Write, workspace: &Workspace) -> Result<()> {
    writeln!(out, "\r\n== {} ==", workspace.tabs_line())?;
    let screen = workspace.screen(REDRAW_ROWS);
    let last = screen.len().saturating_sub(1);
    for (index, line) in screen.iter().enumerate() {
        // The final line may be an unterminated prompt
        if index == last {
            write!(out, "{}", line)?;
        } else {
            writeln!(out, "{}", line)?;
        }
    }
    out.flush()?;
    Ok(())
}
