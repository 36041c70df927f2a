//! Centralized configuration constants for MobileCLI.
//!
//! Compile-time limits and defaults, organized by component.

/// Session registry limits.
pub mod sessions {
    /// Maximum number of concurrent shell sessions.
    pub const MAX_SESSIONS: usize = 10;
    /// Scrollback rows requested from the terminal layer per session.
    pub const TRANSCRIPT_ROWS: usize = 2000;
    /// Initial PTY size before the first resize.
    pub const DEFAULT_ROWS: u16 = 24;
    /// Initial PTY size before the first resize.
    pub const DEFAULT_COLS: u16 = 80;
}

/// Terminal text size (in the same units the original UI used).
pub mod text_size {
    pub const DEFAULT: u16 = 28;
    pub const MIN: u16 = 14;
    pub const MAX: u16 = 56;
    /// Choices offered by the text size picker.
    pub const PRESETS: [(&str, u16); 5] = [
        ("Small", 14),
        ("Medium", 20),
        ("Default", 28),
        ("Large", 36),
        ("X-Large", 48),
    ];
}

/// Wake lock configuration.
pub mod wake_lock {
    use std::time::Duration;

    /// Hard ceiling per acquisition. Not renewed automatically.
    pub const MAX_HOLD: Duration = Duration::from_secs(10 * 60);
    /// Tag reported to the platform backend.
    pub const TAG: &str = "MobileCLI::TerminalWakeLock";
}

/// Bootstrap archive configuration.
pub mod bootstrap {
    /// aarch64 Termux bootstrap.
    pub const DEFAULT_URL: &str = "https://github.com/termux/termux-packages/releases/download/bootstrap-2026.01.04-r1%2Bapt.android-7/bootstrap-aarch64.zip";
    /// Content of the version marker for a complete install.
    pub const VERSION: &str = "mobilecli-v162";
    /// Marker file name, relative to the prefix.
    pub const VERSION_MARKER: &str = ".mobilecli_version";
    /// Archive entry holding the symlink manifest.
    pub const MANIFEST_ENTRY: &str = "SYMLINKS.txt";
    /// Separator between link and target in the manifest.
    pub const MANIFEST_ARROW: char = '\u{2190}';
    /// Downloaded archive file name, relative to the files dir.
    pub const ARCHIVE_FILE: &str = "bootstrap.zip";
    /// Termux version advertised to the userland.
    pub const TERMUX_VERSION: &str = "0.118.0";
}

/// Network configuration for the archive download.
pub mod network {
    use std::time::Duration;

    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
    pub const READ_TIMEOUT: Duration = Duration::from_secs(30);
    pub const MAX_REDIRECTS: usize = 5;
    /// Copy buffer for download and extraction.
    pub const CHUNK_SIZE: usize = 8192;
}

/// Admin mode gate on the drawer version label.
pub mod admin {
    use std::time::Duration;

    /// Taps required to open the admin prompt.
    pub const TAP_COUNT: u32 = 7;
    /// Maximum gap between taps before the count resets.
    pub const TAP_TIMEOUT: Duration = Duration::from_millis(2000);
    /// Start showing "N taps remaining" hints at this many remaining taps.
    pub const HINT_THRESHOLD: u32 = 3;
}

/// Settings file validation limits.
pub mod settings {
    /// Maximum settings file size in bytes (64 KB).
    pub const MAX_FILE_SIZE: u64 = 64 * 1024;

    /// Maximum length for string fields (assistant name, URLs).
    pub const MAX_STRING_LENGTH: usize = 256;
}
