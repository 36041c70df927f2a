//! PTY process management.

use anyhow::{Context, Result};
use portable_pty::{native_pty_system, Child, CommandBuilder, PtyPair, PtySize};
use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use settings::constants::sessions::{DEFAULT_COLS, DEFAULT_ROWS};

use crate::session::{ClientSlot, LaunchSpec, ProcessSpawner, SessionId, SessionProcess};

/// One shell running on a pseudo-terminal.
///
/// A reader thread forwards output over a channel and pokes whichever client
/// is bound at the time. Dropping the handler kills and reaps the child.
pub struct PtyHandler {
    pair: PtyPair,
    writer: Box<dyn Write + Send>,
    output_rx: Receiver<Vec<u8>>,
    exited: Arc<AtomicBool>,
    child: Box<dyn Child + Send + Sync>,
    _reader_thread: thread::JoinHandle<()>,
}

impl PtyHandler {
    /// Spawn `spec.shell` with exactly `spec.env` as its environment.
    pub fn spawn(
        spec: &LaunchSpec,
        rows: u16,
        cols: u16,
        session: SessionId,
        client: ClientSlot,
    ) -> Result<Self> {
        let pty_system = native_pty_system();

        let pair = pty_system
            .openpty(PtySize {
                rows,
                cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .context("Failed to open PTY")?;

        let mut cmd = CommandBuilder::new(&spec.shell);
        cmd.args(&spec.args);
        cmd.cwd(&spec.cwd);
        cmd.env_clear();
        for entry in &spec.env {
            match entry.split_once('=') {
                Some((key, value)) => cmd.env(key, value),
                None => tracing::debug!("Skipping malformed env entry {:?}", entry),
            }
        }

        let child = pair
            .slave
            .spawn_command(cmd)
            .with_context(|| format!("Failed to spawn {}", spec.shell.display()))?;

        let writer = pair
            .master
            .take_writer()
            .context("Failed to get PTY writer")?;

        let mut reader = pair
            .master
            .try_clone_reader()
            .context("Failed to get PTY reader")?;

        let (output_tx, output_rx): (Sender<Vec<u8>>, Receiver<Vec<u8>>) = mpsc::channel();

        let exited = Arc::new(AtomicBool::new(false));
        let exited_clone = exited.clone();

        let reader_thread = thread::Builder::new()
            .name(format!("pty-{}", session))
            .spawn(move || {
                let mut buf = [0u8; 4096];
                loop {
                    match reader.read(&mut buf) {
                        Ok(0) => break,
                        Ok(n) => {
                            if output_tx.send(buf[..n].to_vec()).is_err() {
                                break;
                            }
                            // Clone out so the lock is not held across the callback
                            let bound = client.read().clone();
                            if let Some(bound) = bound {
                                bound.on_text_changed(session);
                            }
                        }
                        Err(e) => {
                            tracing::debug!("PTY read for {} ended: {}", session, e);
                            break;
                        }
                    }
                }
                exited_clone.store(true, Ordering::SeqCst);
                let bound = client.read().clone();
                if let Some(bound) = bound {
                    bound.on_session_finished(session);
                }
            })
            .context("Failed to start PTY reader thread")?;

        tracing::info!(
            "Spawned {} for session {} (pid {:?})",
            spec.shell.display(),
            session,
            child.process_id()
        );

        Ok(Self {
            pair,
            writer,
            output_rx,
            exited,
            child,
            _reader_thread: reader_thread,
        })
    }
}

impl SessionProcess for PtyHandler {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        self.writer.flush()?;
        Ok(())
    }

    fn read_output(&self) -> Vec<Vec<u8>> {
        let mut output = Vec::new();
        while let Ok(data) = self.output_rx.try_recv() {
            output.push(data);
        }
        output
    }

    fn has_exited(&self) -> bool {
        self.exited.load(Ordering::SeqCst)
    }

    fn resize(&self, rows: u16, cols: u16) -> Result<()> {
        self.pair
            .master
            .resize(PtySize {
                rows,
                cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .context("Failed to resize PTY")?;
        Ok(())
    }

    fn process_id(&self) -> Option<u32> {
        self.child.process_id()
    }

    fn kill(&mut self) {
        if let Err(e) = self.child.kill() {
            // ESRCH is expected when the shell already exited
            tracing::debug!("Kill child process: {}", e);
        }
    }
}

impl Drop for PtyHandler {
    fn drop(&mut self) {
        self.exited.store(true, Ordering::SeqCst);
        self.kill();

        // Reap to avoid a zombie
        if let Err(e) = self.child.wait() {
            tracing::debug!("Wait for child process: {}", e);
        }

        tracing::debug!("PTY handler dropped, child process cleaned up");
    }
}

/// Spawns real PTY-backed shells.
#[derive(Debug, Clone, Copy)]
pub struct PtySpawner {
    rows: u16,
    cols: u16,
}

impl PtySpawner {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }
}

impl Default for PtySpawner {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS, DEFAULT_COLS)
    }
}

impl ProcessSpawner for PtySpawner {
    fn spawn(
        &self,
        spec: &LaunchSpec,
        session: SessionId,
        client: ClientSlot,
    ) -> Result<Box<dyn SessionProcess>> {
        let handler = PtyHandler::spawn(spec, self.rows, self.cols, session, client)?;
        Ok(Box::new(handler))
    }
}
