//! Release channel detection for MobileCLI.
//!
//! The channel decides a couple of first-run defaults (developer options) and
//! how the app labels itself in the drawer. Read from
//! `MOBILECLI_RELEASE_CHANNEL` at runtime; debug builds default to Dev and
//! release builds to Stable.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

const CHANNEL_VAR: &str = "MOBILECLI_RELEASE_CHANNEL";

static RELEASE_CHANNEL: LazyLock<ReleaseChannel> = LazyLock::new(ReleaseChannel::from_env);

/// Build release channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseChannel {
    /// Local development builds.
    Dev,
    /// Nightly automated builds.
    Nightly,
    /// Pre-release builds for testing.
    Preview,
    /// Public stable releases.
    Stable,
}

impl Default for ReleaseChannel {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Dev
        } else {
            Self::Stable
        }
    }
}

impl FromStr for ReleaseChannel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "dev" => Ok(Self::Dev),
            "nightly" => Ok(Self::Nightly),
            "preview" => Ok(Self::Preview),
            "stable" => Ok(Self::Stable),
            other => Err(format!("unknown release channel '{}'", other)),
        }
    }
}

impl fmt::Display for ReleaseChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Dev => "dev",
            Self::Nightly => "nightly",
            Self::Preview => "preview",
            Self::Stable => "stable",
        };
        f.write_str(name)
    }
}

impl ReleaseChannel {
    /// Channel named by `MOBILECLI_RELEASE_CHANNEL`, or the build default.
    fn from_env() -> Self {
        match std::env::var(CHANNEL_VAR) {
            Ok(value) => value.parse().unwrap_or_else(|_| {
                tracing::warn!("Unknown release channel '{}', defaulting", value);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Get the active release channel.
    pub fn global() -> Self {
        *RELEASE_CHANNEL
    }

    /// Developer options start enabled on dev and nightly builds.
    pub fn developer_mode_default(self) -> bool {
        matches!(self, Self::Dev | Self::Nightly)
    }

    /// Version label shown at the bottom of the drawer ("v0.1.0", "v0.1.0-dev").
    pub fn version_label(self, version: &str) -> String {
        match self {
            Self::Stable => format!("v{}", version),
            other => format!("v{}-{}", version, other),
        }
    }

    /// App display name varies by channel.
    pub fn app_name(self) -> &'static str {
        match self {
            Self::Dev => "MobileCLI Dev",
            Self::Nightly => "MobileCLI Nightly",
            Self::Preview => "MobileCLI Preview",
            Self::Stable => "MobileCLI",
        }
    }
}
