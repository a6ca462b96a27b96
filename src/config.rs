//! Configuration types for the dashboard.

use crate::error::{BoardError, Result};
use crate::gesture::GestureTiming;
use crate::refresh::RefreshSettings;
use goalboard_trello::TrelloConfig;
use goalboard_trello::config::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Longest accepted tick or poll period: one week.
const MAX_PERIOD_SECS: u64 = 7 * 24 * 60 * 60;

/// Longest accepted gesture timing: one hour.
const MAX_GESTURE_MS: u64 = 60 * 60 * 1000;

/// Top-level dashboard configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Rotation and clock settings.
    pub display: DisplayConfig,
    /// Card refresh and long-press settings.
    pub refresh: RefreshConfig,
    /// Remote card list. Used only when list id, key and token are all set.
    pub trello: TrelloSection,
    /// Plain goal texts, shown when no remote list is configured.
    pub goals: Vec<String>,
    /// Local photo store.
    pub photos: PhotosConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Seconds each item stays on screen.
    pub tick_period_secs: u64,
    /// Fixed UTC offset of the clock readout, in hours.
    pub clock_utc_offset_hours: i32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            tick_period_secs: 10,
            clock_utc_offset_hours: 7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Seconds between automatic refreshes while auto-refresh is on.
    pub poll_period_secs: u64,
    /// How long the refresh key must be held to toggle auto-refresh.
    pub hold_duration_ms: u64,
    /// Whether auto-refresh starts enabled.
    pub auto_refresh_default: bool,
    /// Hold progress sampling interval.
    pub progress_sample_ms: u64,
    /// How long the completed hold indicator stays up.
    pub completed_linger_ms: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            poll_period_secs: 300,
            hold_duration_ms: 2000,
            auto_refresh_default: false,
            progress_sample_ms: 30,
            completed_linger_ms: 700,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrelloSection {
    pub list_id: Option<String>,
    pub api_key: Option<String>,
    pub token: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for TrelloSection {
    fn default() -> Self {
        Self {
            list_id: None,
            api_key: None,
            token: None,
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout_secs: 15,
        }
    }
}

impl std::fmt::Debug for TrelloSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrelloSection")
            .field("list_id", &self.list_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotosConfig {
    /// JSONL photo store. Defaults to `data_dir()/photos.jsonl`.
    pub path: Option<PathBuf>,
}

impl BoardConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| BoardError::Config(e.to_string()))
    }

    /// Load from `path`, or from the default location when it exists, then
    /// apply environment overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::default_config_path();
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    tracing::debug!(path = %default_path.display(), "no config file; using defaults");
                    Self::default()
                }
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// `config_dir()/config.toml`, see [`crate::board_dirs`].
    pub fn default_config_path() -> PathBuf {
        crate::board_dirs::config_file()
    }

    /// Apply `GOALBOARD_LIST_ID`, `GOALBOARD_API_KEY` and `GOALBOARD_TOKEN`
    /// through `lookup`. Blank values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(list_id) = non_blank("GOALBOARD_LIST_ID") {
            self.trello.list_id = Some(list_id);
        }
        if let Some(api_key) = non_blank("GOALBOARD_API_KEY") {
            self.trello.api_key = Some(api_key);
        }
        if let Some(token) = non_blank("GOALBOARD_TOKEN") {
            self.trello.token = Some(token);
        }
    }

    /// Reject settings the timers cannot run with. Upper bounds keep every
    /// deadline representable as an `Instant`.
    pub fn validate(&self) -> Result<()> {
        if self.display.tick_period_secs == 0 {
            return Err(BoardError::Config(
                "display.tick_period_secs must be greater than 0".into(),
            ));
        }
        check_max("display.tick_period_secs", self.display.tick_period_secs, MAX_PERIOD_SECS)?;
        check_max("refresh.poll_period_secs", self.refresh.poll_period_secs, MAX_PERIOD_SECS)?;
        check_max("refresh.hold_duration_ms", self.refresh.hold_duration_ms, MAX_GESTURE_MS)?;
        check_max("refresh.progress_sample_ms", self.refresh.progress_sample_ms, MAX_GESTURE_MS)?;
        check_max("refresh.completed_linger_ms", self.refresh.completed_linger_ms, MAX_GESTURE_MS)?;
        if !(-23..=23).contains(&self.display.clock_utc_offset_hours) {
            return Err(BoardError::Config(
                "display.clock_utc_offset_hours must be within -23..=23".into(),
            ));
        }
        if self.refresh.poll_period_secs == 0 {
            return Err(BoardError::Config(
                "refresh.poll_period_secs must be greater than 0".into(),
            ));
        }
        if self.refresh.progress_sample_ms == 0 {
            return Err(BoardError::Config(
                "refresh.progress_sample_ms must be greater than 0".into(),
            ));
        }
        if self.refresh.hold_duration_ms < self.refresh.progress_sample_ms {
            return Err(BoardError::Config(
                "refresh.hold_duration_ms must not be shorter than progress_sample_ms".into(),
            ));
        }
        if let Some(trello) = self.trello_config() {
            trello.validate()?;
        }
        Ok(())
    }

    /// The remote list client config, when list id, key and token are all
    /// present and non-blank.
    pub fn trello_config(&self) -> Option<TrelloConfig> {
        let list_id = present(&self.trello.list_id)?;
        let api_key = present(&self.trello.api_key)?;
        let token = present(&self.trello.token)?;
        Some(
            TrelloConfig::new(list_id, api_key, token)
                .with_base_url(self.trello.base_url.clone())
                .with_timeout_secs(self.trello.timeout_secs),
        )
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_secs(self.display.tick_period_secs)
    }

    pub fn refresh_settings(&self) -> RefreshSettings {
        RefreshSettings {
            poll_period: Duration::from_secs(self.refresh.poll_period_secs),
            auto_refresh_default: self.refresh.auto_refresh_default,
            gesture: GestureTiming {
                hold: Duration::from_millis(self.refresh.hold_duration_ms),
                sample_interval: Duration::from_millis(self.refresh.progress_sample_ms),
                linger: Duration::from_millis(self.refresh.completed_linger_ms),
            },
        }
    }

    pub fn photos_path(&self) -> PathBuf {
        self.photos
            .path
            .clone()
            .unwrap_or_else(crate::board_dirs::photos_file)
    }
}

fn check_max(field: &str, value: u64, max: u64) -> Result<()> {
    if value > max {
        return Err(BoardError::Config(format!("{field} must be at most {max}")));
    }
    Ok(())
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
