//! MobileCLI - a terminal with a bundled Linux userland
//!
//! Main entry point for the application.

mod app_context;
mod events;
mod setup;
mod shell;

use std::io::Write;
use std::path::PathBuf;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use app_context::AppContext;
use mobilecli_workspace::Workspace;
use settings::PreferenceStore;
use tracing::{error, info};

/// Check if debug mode is enabled via environment variable.
fn is_debug_mode() -> bool {
    std::env::var("MOBILECLI_DEBUG").is_ok()
}

/// Initialize the logging system.
fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default_filter = if is_debug_mode() {
        "mobilecli=trace,mobilecli_workspace=trace,bootstrap=trace,keeper=trace,terminal=trace,info"
    } else {
        "mobilecli=info,warn"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // Logs go to stderr; stdout belongs to the shell
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true),
        )
        .with(filter)
        .init();

    if is_debug_mode() {
        info!(
            "MobileCLI v{} starting up (DEBUG MODE ENABLED)",
            env!("CARGO_PKG_VERSION")
        );
        info!("Set RUST_LOG for custom log levels, e.g. RUST_LOG=bootstrap=trace");
    } else {
        info!("MobileCLI v{} starting up", env!("CARGO_PKG_VERSION"));
    }
}

/// Append panics to the crash log, then run the default hook.
fn install_panic_hook(crash_log: PathBuf) {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        let backtrace = std::backtrace::Backtrace::force_capture();
        let entry = format!(
            "=== crash at {} (v{}) ===\n{}\n{}\n\n",
            timestamp,
            env!("CARGO_PKG_VERSION"),
            panic_info,
            backtrace
        );
        let written = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&crash_log)
            .and_then(|mut file| file.write_all(entry.as_bytes()));
        if let Err(e) = written {
            eprintln!("Failed to write crash log {:?}: {}", crash_log, e);
        }
        default_hook(panic_info);
    }));
}

fn run(cx: &AppContext) -> Result<()> {
    let (tx, rx) = events::start()?;

    if !setup::ensure_installed(cx, &rx)? {
        info!("Setup abandoned");
        return Ok(());
    }

    let mut workspace = Workspace::new(
        cx.keeper().clone(),
        cx.layout().clone(),
        cx.config().clone(),
        PreferenceStore::open_default(),
    );
    if !setup::choose_assistant(&mut workspace, &rx)? {
        return Ok(());
    }
    workspace
        .ensure_session()
        .context("Failed to start the first session")?;

    shell::run(&mut workspace, tx, &rx)
}

fn main() {
    let started = Instant::now();
    init_logging();

    let cx = match AppContext::init() {
        Ok(cx) => cx,
        Err(e) => {
            error!("Failed to initialize: {:#}", e);
            std::process::exit(1);
        }
    };
    install_panic_hook(mobilecli_paths::crash_log());
    info!("Application initialized in {:?}", started.elapsed());

    let result = run(&cx);
    cx.shutdown();

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
