//! Configuration system for MobileCLI.
//!
//! Provides compile-time constants, the TOML config file, and the persisted
//! preference set.

pub mod constants;
pub mod file;
pub mod preferences;

pub use file::{ensure_config_file, load_config, load_config_from, CommandAlias, Config};
pub use preferences::{Assistant, PreferenceStore, Preferences};
