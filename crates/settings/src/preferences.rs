//! Persisted preference set.
//!
//! A flat set of toggles and values that survive restarts. Only the UI shell
//! mutates it. Stored as `preferences.toml` next to the config file; saves go
//! through `toml_edit` so hand-added comments survive.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::constants;

/// Assistant CLI the user picked on first run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Assistant {
    Claude,
    Gemini,
    Codex,
    /// Plain terminal, nothing to install.
    None,
}

impl Assistant {
    pub const ALL: [Assistant; 4] = [Self::Claude, Self::Gemini, Self::Codex, Self::None];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Gemini => "gemini",
            Self::Codex => "codex",
            Self::None => "none",
        }
    }
}

impl fmt::Display for Assistant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Assistant {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == value.trim().to_lowercase())
            .ok_or_else(|| format!("unknown assistant '{}'", value))
    }
}

/// The persisted preference set.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Preferences {
    pub developer_mode: bool,
    pub admin_mode: bool,
    pub wake_lock: bool,
    pub power_mode: bool,
    pub text_size: u16,
    pub selected_assistant: Option<Assistant>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            developer_mode: release_channel::ReleaseChannel::global().developer_mode_default(),
            admin_mode: false,
            wake_lock: false,
            power_mode: false,
            text_size: constants::text_size::DEFAULT,
            selected_assistant: None,
        }
    }
}

impl Preferences {
    fn clamped(mut self) -> Self {
        self.text_size = self
            .text_size
            .clamp(constants::text_size::MIN, constants::text_size::MAX);
        self
    }
}

/// Loads and saves [`Preferences`] at a fixed path.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the default location (`config_dir()/preferences.toml`).
    pub fn open_default() -> Self {
        Self::new(mobilecli_paths::preferences_file())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load preferences. Missing or unreadable files yield defaults.
    pub fn load(&self) -> Preferences {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to read preferences: {}", e);
                }
                return Preferences::default();
            }
        };

        if content.len() > constants::settings::MAX_FILE_SIZE as usize {
            tracing::warn!(
                "Preferences file too large ({} bytes), using defaults",
                content.len()
            );
            return Preferences::default();
        }

        match toml::from_str::<Preferences>(&content) {
            Ok(prefs) => prefs.clamped(),
            Err(e) => {
                tracing::warn!("Failed to parse preferences: {}", e);
                Preferences::default()
            }
        }
    }

    /// Write preferences, keeping unrelated keys and comments in place.
    pub fn save(&self, prefs: &Preferences) -> std::io::Result<()> {
        let content = std::fs::read_to_string(&self.path).unwrap_or_default();
        let mut doc = content
            .parse::<toml_edit::DocumentMut>()
            .unwrap_or_else(|e| {
                tracing::warn!("Rewriting unparseable preferences file: {}", e);
                toml_edit::DocumentMut::new()
            });

        doc["developer-mode"] = toml_edit::value(prefs.developer_mode);
        doc["admin-mode"] = toml_edit::value(prefs.admin_mode);
        doc["wake-lock"] = toml_edit::value(prefs.wake_lock);
        doc["power-mode"] = toml_edit::value(prefs.power_mode);
        doc["text-size"] = toml_edit::value(i64::from(prefs.text_size));
        match prefs.selected_assistant {
            Some(assistant) => doc["selected-assistant"] = toml_edit::value(assistant.as_str()),
            None => {
                doc.remove("selected-assistant");
            }
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, doc.to_string())
    }
}
