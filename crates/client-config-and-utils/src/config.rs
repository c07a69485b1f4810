//! Configuration management for the client.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Default backend URL (can be overridden at compile time via MOODLOG_API_URL env var).
pub const DEFAULT_API_URL: &str = match option_env!("MOODLOG_API_URL") {
    Some(url) => url,
    None => "http://localhost:8080",
};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default interval between inactivity checks in seconds.
pub const DEFAULT_INACTIVITY_POLL_INTERVAL_SECS: u64 = 5;

/// Main client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Base URL of the Moodlog REST backend.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Per-request timeout applied by the HTTP client.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// How often the inactivity monitor checks the idle clock.
    #[serde(default = "default_inactivity_poll_interval_secs")]
    pub inactivity_poll_interval_secs: u64,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_inactivity_poll_interval_secs() -> u64 {
    DEFAULT_INACTIVITY_POLL_INTERVAL_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            api_url: default_api_url(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            inactivity_poll_interval_secs: DEFAULT_INACTIVITY_POLL_INTERVAL_SECS,
        }
    }
}

impl Config {
    /// Create a new Config with default values, then override from environment.
    pub fn new() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    /// Load configuration from the config file under `paths`, falling back to
    /// defaults when the file does not exist. Environment variables win over
    /// file values.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    /// Check values that would otherwise fail later at request time.
    pub fn validate(&self) -> CoreResult<()> {
        self.api_url()?;
        if self.request_timeout_secs == 0 {
            return Err(CoreError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.inactivity_poll_interval_secs == 0 {
            return Err(CoreError::Config(
                "inactivity_poll_interval_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    fn load_from_env(&mut self) {
        if let Ok(log_level) = std::env::var("MOODLOG_LOG_LEVEL") {
            self.log_level = log_level;
        }
        if let Ok(api_url) = std::env::var("MOODLOG_API_URL") {
            if !api_url.trim().is_empty() {
                self.api_url = api_url.trim().to_string();
            }
        }
    }

    /// Get the backend URL as a parsed URL.
    pub fn api_url(&self) -> CoreResult<Url> {
        Url::parse(&self.api_url).map_err(CoreError::from)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn inactivity_poll_interval(&self) -> Duration {
        Duration::from_secs(self.inactivity_poll_interval_secs)
    }
}
