//! Directory layout of the private userland.
//!
//! Everything lives under one files directory:
//! `usr/` is the prefix standing in for `/usr`, `home/` is `$HOME`.

use std::io;
use std::path::{Path, PathBuf};

use settings::constants::bootstrap;

/// Default `termux.properties`, written on first start only.
const DEFAULT_TERMUX_PROPERTIES: &str = r#"# MobileCLI Terminal Properties

### Keyboard Settings ###

# Extra keys configuration (JSON format)
# extra-keys = [['ESC','/','-','HOME','UP','END','PGUP'],['TAB','CTRL','ALT','LEFT','DOWN','RIGHT','PGDN']]

# Back key behavior: "back" (default) or "escape"
# back-key = back

### Terminal Settings ###

# Terminal transcript rows (scrollback buffer)
# terminal-transcript-rows = 2000

# Cursor style: "block", "underline", or "bar"
# terminal-cursor-style = block

### Bell Settings ###

# Bell character behavior: "vibrate", "beep", "ignore"
# bell-character = vibrate

### URL/External App Settings ###

# Allow external apps to open URLs and files (needed for OAuth logins)
allow-external-apps = true
"#;

/// Paths of one installation, rooted at a files directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    files_dir: PathBuf,
}

impl Layout {
    pub fn new(files_dir: impl Into<PathBuf>) -> Self {
        Self {
            files_dir: files_dir.into(),
        }
    }

    pub fn files_dir(&self) -> &Path {
        &self.files_dir
    }

    /// `usr/`, the prefix.
    pub fn prefix(&self) -> PathBuf {
        self.files_dir.join("usr")
    }

    pub fn home(&self) -> PathBuf {
        self.files_dir.join("home")
    }

    pub fn bin(&self) -> PathBuf {
        self.prefix().join("bin")
    }

    pub fn lib(&self) -> PathBuf {
        self.prefix().join("lib")
    }

    pub fn etc(&self) -> PathBuf {
        self.prefix().join("etc")
    }

    pub fn tmp(&self) -> PathBuf {
        self.prefix().join("tmp")
    }

    pub fn bash_path(&self) -> PathBuf {
        self.bin().join("bash")
    }

    /// `home/.termux`
    pub fn termux_dir(&self) -> PathBuf {
        self.home().join(".termux")
    }

    /// `home/.mobilecli/memory`
    pub fn memory_dir(&self) -> PathBuf {
        self.home().join(".mobilecli").join("memory")
    }

    /// Installation record compared against the expected version.
    pub fn version_marker(&self) -> PathBuf {
        self.prefix().join(bootstrap::VERSION_MARKER)
    }

    /// Where the archive is downloaded before extraction.
    pub fn archive_path(&self) -> PathBuf {
        self.files_dir.join(bootstrap::ARCHIVE_FILE)
    }

    /// Directories the installer creates before downloading.
    pub fn install_dirs(&self) -> Vec<PathBuf> {
        let prefix = self.prefix();
        let home = self.home();
        vec![
            prefix.clone(),
            self.bin(),
            self.lib(),
            self.etc(),
            self.tmp(),
            home.clone(),
            self.termux_dir(),
            home.join(".mobilecli"),
            self.memory_dir(),
            prefix.join("var").join("log"),
            prefix.join("share"),
            prefix.join("include"),
        ]
    }

    /// Create the installer's directory tree.
    pub fn prepare(&self) -> io::Result<()> {
        for dir in self.install_dirs() {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(())
    }

    /// App-start directory setup: prefix, home, `.termux/boot`, and a default
    /// `termux.properties` when none exists yet.
    pub fn ensure_app_directories(&self) -> io::Result<()> {
        std::fs::create_dir_all(self.prefix())?;
        std::fs::create_dir_all(self.termux_dir().join("boot"))?;

        let properties = self.termux_dir().join("termux.properties");
        if !properties.exists() {
            std::fs::write(&properties, DEFAULT_TERMUX_PROPERTIES)?;
            tracing::info!("Created default termux.properties");
        }
        Ok(())
    }
}
