//! Installer failures.
//!
//! Only failures that abort the pipeline live here. Per-item permission and
//! symlink problems are logged and skipped.

use std::io;
use std::path::PathBuf;

/// Broad class of an aborted install, for the message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Download,
    Extraction,
    Filesystem,
}

#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error("download failed: {0}")]
    Download(#[from] reqwest::Error),

    #[error("download failed: server returned {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("malformed bootstrap archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("archive entry escapes the prefix: {0}")]
    UnsafeEntry(String),

    #[error("failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("installer task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl InstallError {
    /// Wrap an I/O error with what was being done and to which path.
    pub(crate) fn io(
        action: &'static str,
        path: impl Into<PathBuf>,
    ) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io {
            action,
            path,
            source,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Download(_) | Self::HttpStatus { .. } => FailureKind::Download,
            Self::Archive(_) | Self::UnsafeEntry(_) => FailureKind::Extraction,
            Self::Io { .. } | Self::Task(_) => FailureKind::Filesystem,
        }
    }
}
