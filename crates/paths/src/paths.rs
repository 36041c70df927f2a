//! Where MobileCLI keeps things on disk.
//!
//! Two roots: the config dir (`config.toml`, `preferences.toml`) and the
//! files dir, the private storage that holds the userland (`usr/`, `home/`)
//! and the crash log. Both resolve once and stay fixed for the process.
//! `files-dir` in config.toml pins the files dir through [`set_files_dir`],
//! which only takes effect before first use.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const APP_DIR: &str = "mobilecli";

static CONFIG_DIR: OnceLock<PathBuf> = OnceLock::new();
static FILES_DIR: OnceLock<PathBuf> = OnceLock::new();

/// `<base>/mobilecli`, falling back to the working directory when the
/// platform has no such base.
fn under(base: Option<PathBuf>) -> PathBuf {
    base.unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR)
}

/// ~/.config/mobilecli (or platform equivalent)
pub fn config_dir() -> &'static Path {
    CONFIG_DIR.get_or_init(|| under(dirs::config_dir()))
}

/// ~/.local/share/mobilecli/files (or platform equivalent)
pub fn files_dir() -> &'static Path {
    FILES_DIR.get_or_init(|| under(dirs::data_dir()).join("files"))
}

/// Pin the files dir. Returns false if it was already resolved.
pub fn set_files_dir(path: PathBuf) -> bool {
    FILES_DIR.set(path).is_ok()
}

pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

pub fn preferences_file() -> PathBuf {
    config_dir().join("preferences.toml")
}

/// Appended to by the panic hook.
pub fn crash_log() -> PathBuf {
    files_dir().join("crash.log")
}
