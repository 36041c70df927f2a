//! The install pipeline.
//!
//! Steps run strictly in order and report `(percent, status)` over an
//! unbounded channel. The version marker is written last, so an interrupted
//! install is simply redone from the start on the next launch.

use std::path::PathBuf;

use settings::constants::bootstrap;
use tokio::sync::mpsc;

use crate::assets::AssetWriter;
use crate::download::Downloader;
use crate::error::InstallError;
use crate::manifest::create_symlinks;
use crate::{extract, permissions, Layout};

/// One progress step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallProgress {
    pub percent: u8,
    pub status: String,
}

pub type ProgressSender = mpsc::UnboundedSender<InstallProgress>;
pub type ProgressReceiver = mpsc::UnboundedReceiver<InstallProgress>;

/// Send a progress event. A dropped listener is not an install failure.
pub(crate) fn report(progress: &ProgressSender, percent: u8, status: impl Into<String>) {
    let status = status.into();
    tracing::debug!("Install progress {}%: {}", percent, status);
    let _ = progress.send(InstallProgress { percent, status });
}

/// Installs the bootstrap userland into a [`Layout`].
#[derive(Debug, Clone)]
pub struct Installer {
    layout: Layout,
    url: String,
    assets_dir: Option<PathBuf>,
    version: String,
}

impl Installer {
    pub fn new(layout: Layout, url: impl Into<String>) -> Self {
        Self {
            layout,
            url: url.into(),
            assets_dir: None,
            version: bootstrap::VERSION.to_string(),
        }
    }

    /// Installer for the configured URL and assets directory.
    pub fn from_config(layout: Layout, config: &settings::Config) -> Self {
        Self::new(layout, config.bootstrap_url.clone()).with_assets_dir(config.assets_dir.clone())
    }

    pub fn with_assets_dir(mut self, assets_dir: Option<PathBuf>) -> Self {
        self.assets_dir = assets_dir;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// True when the marker exists and its trimmed content is our version.
    pub fn is_installed(&self) -> bool {
        std::fs::read_to_string(self.layout.version_marker())
            .map(|content| content.trim() == self.version)
            .unwrap_or(false)
    }

    /// Run the pipeline. Returns immediately, touching nothing, when already
    /// installed.
    pub async fn install(&self, progress: ProgressSender) -> Result<(), InstallError> {
        if self.is_installed() {
            tracing::info!("Bootstrap {} already installed", self.version);
            return Ok(());
        }

        tracing::info!("Installing bootstrap {} from {}", self.version, self.url);
        let result = self.run(&progress).await;
        match &result {
            Ok(()) => tracing::info!("Bootstrap installation complete"),
            Err(e) => tracing::error!("Bootstrap installation failed: {}", e),
        }
        result
    }

    /// Start the pipeline on `handle`, returning the progress stream and the
    /// task's outcome.
    pub fn spawn(
        self,
        handle: &tokio::runtime::Handle,
    ) -> (
        ProgressReceiver,
        tokio::task::JoinHandle<Result<(), InstallError>>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = handle.spawn(async move { self.install(tx).await });
        (rx, task)
    }

    async fn run(&self, progress: &ProgressSender) -> Result<(), InstallError> {
        report(progress, 0, "Preparing directories...");
        let layout = self.layout.clone();
        tokio::task::spawn_blocking(move || {
            layout
                .prepare()
                .map_err(InstallError::io("create", layout.files_dir()))
        })
        .await??;

        report(progress, 5, "Downloading bootstrap...");
        let archive = self.layout.archive_path();
        Downloader::new()?
            .fetch(&self.url, &archive, progress)
            .await?;

        let this = self.clone();
        let progress = progress.clone();
        tokio::task::spawn_blocking(move || this.finish(&archive, &progress)).await?
    }

    /// Everything after the download; blocking filesystem work.
    fn finish(
        &self,
        archive: &std::path::Path,
        progress: &ProgressSender,
    ) -> Result<(), InstallError> {
        let layout = &self.layout;

        report(progress, 50, "Extracting bootstrap...");
        let symlinks = extract::extract_archive(archive, &layout.prefix())?;

        report(progress, 60, "Creating symlinks...");
        let created = create_symlinks(&layout.prefix(), &symlinks);
        tracing::info!("Created {} of {} symlinks", created, symlinks.len());

        report(progress, 88, "Setting permissions...");
        permissions::set_permissions(layout);

        let assets = AssetWriter::new(layout, self.assets_dir.as_deref(), &self.version);

        report(progress, 90, "Installing activity manager...");
        assets.install_activity_manager()?;

        report(progress, 92, "Installing API scripts...");
        assets.install_api_scripts()?;
        assets.install_helper_scripts()?;

        report(progress, 94, "Configuring npm...");
        assets.write_npmrc()?;

        report(progress, 95, "Configuring git...");
        assets.write_gitconfig()?;

        report(progress, 96, "Initializing assistant memory...");
        assets.init_memory()?;

        report(progress, 97, "Writing shell configuration...");
        assets.write_bashrc()?;
        assets.write_assistant_guide()?;

        report(progress, 98, "Finalizing...");
        let marker = layout.version_marker();
        std::fs::write(&marker, &self.version).map_err(InstallError::io("write", &marker))?;
        if let Err(e) = std::fs::remove_file(archive) {
            tracing::warn!("Failed to delete {}: {}", archive.display(), e);
        }

        report(progress, 100, "Complete!");
        Ok(())
    }
}
