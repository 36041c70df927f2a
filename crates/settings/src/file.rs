//! TOML config file support.
//!
//! Config location: `~/.config/mobilecli/config.toml`

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::constants;

/// Shell command alias: `:alias` in the shell maps to an action name.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct CommandAlias {
    /// What the user types after the colon (e.g., "n", "k").
    pub alias: String,
    /// Action name (e.g., "new-session", "kill-session").
    pub action: String,
}

/// User-facing config parsed from TOML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Where the bootstrap archive is downloaded from.
    pub bootstrap_url: String,
    /// Override for the private storage root (holds `usr/` and `home/`).
    pub files_dir: Option<PathBuf>,
    /// Directory with optional bundled assets (`scripts/`, `termux-am/am.apk`).
    pub assets_dir: Option<PathBuf>,
    /// Arguments passed to the login shell.
    pub login_args: Vec<String>,
    /// SHA-256 (hex) of the admin password. Admin mode is unavailable without it.
    pub admin_password_hash: Option<String>,
    /// Custom command aliases for the shell.
    #[serde(default)]
    pub aliases: Vec<CommandAlias>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bootstrap_url: constants::bootstrap::DEFAULT_URL.to_string(),
            files_dir: None,
            assets_dir: None,
            login_args: vec!["-l".to_string()],
            admin_password_hash: None,
            aliases: Vec::new(),
        }
    }
}

impl Config {
    /// Drop values that fail validation, falling back to defaults for them.
    fn sanitized(mut self) -> Self {
        let max = constants::settings::MAX_STRING_LENGTH;
        if self.bootstrap_url.is_empty() || self.bootstrap_url.len() > max {
            tracing::warn!("Ignoring invalid bootstrap-url, using default");
            self.bootstrap_url = constants::bootstrap::DEFAULT_URL.to_string();
        }
        if let Some(hash) = &self.admin_password_hash {
            let valid = hash.len() == 64 && hash.chars().all(|c| c.is_ascii_hexdigit());
            if !valid {
                tracing::warn!("admin-password-hash is not a SHA-256 hex digest, ignoring");
                self.admin_password_hash = None;
            }
        }
        self
    }

    /// Resolve a `:alias` typed in the shell to its action name.
    pub fn resolve_alias(&self, alias: &str) -> Option<&str> {
        self.aliases
            .iter()
            .rev()
            .find(|entry| entry.alias == alias)
            .map(|entry| entry.action.as_str())
    }
}

/// Default config file content with comments (generated on first launch).
const DEFAULT_CONFIG: &str = r#"# MobileCLI Configuration

# Bootstrap archive (zip with SYMLINKS.txt manifest)
bootstrap-url = "URL_PLACEHOLDER"

# Private storage root holding usr/ and home/ (defaults to the data dir)
# files-dir = "/data/mobilecli/files"

# Bundled assets: scripts/<termux-command> and termux-am/am.apk
# assets-dir = "/opt/mobilecli/assets"

# Arguments for the login shell
login-args = ["-l"]

# SHA-256 hex digest of the admin password (enables the admin gate)
# admin-password-hash = "..."

# Command aliases for the shell (type ":<alias>")
# [[aliases]]
# alias = "n"
# action = "new-session"
#
# [[aliases]]
# alias = "k"
# action = "kill-session"
"#;

/// Ensure the config file exists, creating a default if missing.
/// Returns the path to the config file.
pub fn ensure_config_file() -> Option<PathBuf> {
    let path = mobilecli_paths::config_file();
    if !path.exists() {
        let parent = path.parent()?;
        std::fs::create_dir_all(parent).ok()?;

        let content = DEFAULT_CONFIG.replace("URL_PLACEHOLDER", constants::bootstrap::DEFAULT_URL);
        std::fs::write(&path, content).ok()?;
        tracing::info!("Created default config at {:?}", path);
    }
    Some(path)
}

/// Load and parse the config file. Returns default on any error.
pub fn load_config() -> Config {
    load_config_from(&mobilecli_paths::config_file())
}

/// Load and parse a config file at `path`. Returns default on any error.
pub fn load_config_from(path: &Path) -> Config {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to read config: {}", e);
            }
            return Config::default();
        }
    };

    // Size guard
    if content.len() > constants::settings::MAX_FILE_SIZE as usize {
        tracing::warn!(
            "Config file too large ({} bytes), using defaults",
            content.len()
        );
        return Config::default();
    }

    match toml::from_str::<Config>(&content) {
        Ok(cfg) => cfg.sanitized(),
        Err(e) => {
            tracing::warn!("Failed to parse config.toml: {}", e);
            Config::default()
        }
    }
}
