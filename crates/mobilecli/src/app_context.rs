//! Application context: configuration, layout, the tokio runtime, and the
//! session keeper, constructed once in `main` and passed down explicitly.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use bootstrap::Layout;
use keeper::{Keeper, LoggingWakeLock, SharedKeeper, TitleNotifier};
use settings::Config;
use terminal::PtySpawner;
use tokio::runtime::Runtime;
use tracing::{debug, info};

/// How long shutdown waits for in-flight tokio tasks.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

pub struct AppContext {
    runtime: Runtime,
    config: Config,
    layout: Layout,
    keeper: SharedKeeper,
}

impl AppContext {
    /// Load config, create the app directories, and start the runtime and keeper.
    pub fn init() -> Result<Self> {
        if let Some(path) = settings::ensure_config_file() {
            debug!("Config file: {:?}", path);
        }
        let config = settings::load_config();
        if let Some(files_dir) = &config.files_dir {
            if !mobilecli_paths::set_files_dir(files_dir.clone()) {
                tracing::warn!("files-dir set after first use, ignoring {:?}", files_dir);
            }
        }

        let layout = Layout::new(mobilecli_paths::files_dir());
        layout.ensure_app_directories().with_context(|| {
            format!(
                "Failed to create app directories under {:?}",
                layout.files_dir()
            )
        })?;
        debug!("Files dir: {:?}", layout.files_dir());

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("mobilecli-tokio")
            .enable_all()
            .build()
            .context("Failed to initialize Tokio runtime")?;

        let keeper = Keeper::new(
            Arc::new(PtySpawner::default()),
            Box::new(LoggingWakeLock),
            Box::new(TitleNotifier),
        )
        .into_shared();

        Ok(Self {
            runtime,
            config,
            layout,
            keeper,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn keeper(&self) -> &SharedKeeper {
        &self.keeper
    }

    pub fn handle(&self) -> &tokio::runtime::Handle {
        self.runtime.handle()
    }

    /// Run a future to completion from the interaction thread.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Stop every session and the runtime.
    pub fn shutdown(self) {
        self.keeper.lock().stop();
        self.runtime.shutdown_timeout(SHUTDOWN_GRACE);
        info!("Shutdown complete");
    }
}
