//! Application directory paths.
//!
//! Uses the [`dirs`] crate for platform-appropriate locations.
//!
//! | Purpose | macOS | Linux |
//! |---------|-------|-------|
//! | Data | `~/Library/Application Support/goalboard/` | `~/.local/share/goalboard/` |
//! | Config | `~/Library/Application Support/goalboard/` | `~/.config/goalboard/` |
//!
//! # Environment Overrides
//!
//! - `GOALBOARD_DATA_DIR` overrides [`data_dir`]
//! - `GOALBOARD_CONFIG_DIR` overrides [`config_dir`]

use std::path::PathBuf;

/// Persistent data root (the photo store lives here).
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("GOALBOARD_DATA_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::data_dir()
        .map(|d| d.join("goalboard"))
        .unwrap_or_else(|| PathBuf::from("/tmp/goalboard-data"))
}

/// Config directory holding `config.toml`.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("GOALBOARD_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("goalboard"))
        .unwrap_or_else(|| PathBuf::from("/tmp/goalboard-config"))
}

/// `config_dir()/config.toml`.
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// `data_dir()/photos.jsonl`.
#[must_use]
pub fn photos_file() -> PathBuf {
    data_dir().join("photos.jsonl")
}
