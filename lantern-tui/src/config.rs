//! Configuration loading for the lantern TUI.
//!
//! Endpoints, timeouts and the log path are required. Paging and refresh
//! tuning fall back to the dashboard defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CITY: &str = "Atlanta";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TuiConfig {
    pub story_api_base_url: String,
    pub weather_api_base_url: String,
    /// Without a key the weather view shows a configuration error.
    pub weather_api_key: Option<String>,
    pub counter_api_url: String,
    pub request_timeout_ms: u64,
    pub tick_interval_ms: u64,
    #[serde(default = "default_city")]
    pub default_city: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_max_stories")]
    pub max_stories: usize,
    #[serde(default = "default_comment_stale_secs")]
    pub comment_stale_secs: u64,
    #[serde(default = "default_weather_secs")]
    pub weather_poll_secs: u64,
    #[serde(default = "default_weather_secs")]
    pub weather_stale_secs: u64,
    pub log_path: PathBuf,
}

fn default_city() -> String {
    DEFAULT_CITY.to_string()
}

fn default_page_size() -> usize {
    10
}

fn default_max_stories() -> usize {
    500
}

fn default_comment_stale_secs() -> u64 {
    300
}

fn default_weather_secs() -> u64 {
    60
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or LANTERN_TUI_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl TuiConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path_from_args().or_else(config_path_from_env);
        let path = path.ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("story_api_base_url", &self.story_api_base_url),
            ("weather_api_base_url", &self.weather_api_base_url),
            ("counter_api_url", &self.counter_api_url),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must not be empty".to_string(),
                });
            }
        }
        if matches!(&self.weather_api_key, Some(key) if key.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "weather_api_key",
                reason: "must not be empty when set".to_string(),
            });
        }

        let positive = [
            ("request_timeout_ms", self.request_timeout_ms),
            ("tick_interval_ms", self.tick_interval_ms),
            ("page_size", self.page_size as u64),
            ("max_stories", self.max_stories as u64),
            ("weather_poll_secs", self.weather_poll_secs),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must be > 0".to_string(),
                });
            }
        }

        if self.log_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "log_path",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn comment_stale_time(&self) -> Duration {
        Duration::from_secs(self.comment_stale_secs)
    }

    pub fn weather_poll_interval(&self) -> Duration {
        Duration::from_secs(self.weather_poll_secs)
    }

    pub fn weather_stale_time(&self) -> Duration {
        Duration::from_secs(self.weather_stale_secs)
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var("LANTERN_TUI_CONFIG").ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}
