//! Client configuration loading and resolution
//!
//! Configuration file resolution follows this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`CSHIELD_CONFIG`)
//! 3. Platform config file (`~/.config/cshield/config.toml`, then `/etc/cshield/config.toml`)
//! 4. Compiled defaults (fallback)
//!
//! The server URL can additionally be overridden on its own through the
//! command line or `CSHIELD_SERVER_URL`. A missing default config file is
//! not an error; an explicitly named one that cannot be read is.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "CSHIELD_CONFIG";

/// Environment variable overriding the backend URL
pub const SERVER_URL_ENV_VAR: &str = "CSHIELD_SERVER_URL";

/// Backend address used when nothing else is configured
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

/// Theatre identifier the backend assumes when none is supplied
pub const DEFAULT_THEATRE_ID: &str = "THEATRE_001";

/// Complete client configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the CinemaShield backend
    pub server_url: String,
    /// Timeout for ordinary request/response calls (not the progress stream)
    pub request_timeout_secs: u64,
    pub playback: PlaybackConfig,
    pub producer: ProducerConfig,
    pub logging: LoggingConfig,
}

/// Playback session timing
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Local countdown tick
    pub countdown_interval_ms: u64,
    /// Server reconciliation poll
    pub expiry_check_interval_secs: u64,
    /// Availability poll
    pub status_poll_interval_secs: u64,
    /// Remaining time at or below which the session enters Warning
    pub warning_threshold_secs: i64,
    /// Remaining time at or below which the session enters Danger
    pub danger_threshold_secs: i64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            countdown_interval_ms: 1000,
            expiry_check_interval_secs: 60,
            status_poll_interval_secs: 30,
            warning_threshold_secs: 300,
            danger_threshold_secs: 60,
        }
    }
}

impl PlaybackConfig {
    pub fn countdown_interval(&self) -> Duration {
        Duration::from_millis(self.countdown_interval_ms)
    }

    pub fn expiry_check_interval(&self) -> Duration {
        Duration::from_secs(self.expiry_check_interval_secs)
    }

    pub fn status_poll_interval(&self) -> Duration {
        Duration::from_secs(self.status_poll_interval_secs)
    }
}

/// Producer-side settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ProducerConfig {
    /// Theatre identifier sent when the user leaves it blank
    pub default_theatre_id: String,
    /// Playback window length the backend grants (display only)
    pub playback_window_hours: u32,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            default_theatre_id: DEFAULT_THEATRE_ID.to_string(),
            playback_window_hours: 3,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            request_timeout_secs: 30,
            playback: PlaybackConfig::default(),
            producer: ProducerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Parse a TOML document; missing fields take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Read and parse a TOML config file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Reject configurations the controllers cannot run with
    pub fn validate(&self) -> Result<()> {
        self.base_url()?;

        if self.request_timeout_secs == 0 {
            return Err(Error::Config("request_timeout_secs must be > 0".to_string()));
        }

        let p = &self.playback;
        if p.countdown_interval_ms == 0
            || p.expiry_check_interval_secs == 0
            || p.status_poll_interval_secs == 0
        {
            return Err(Error::Config("playback intervals must be > 0".to_string()));
        }
        if p.danger_threshold_secs <= 0 || p.danger_threshold_secs >= p.warning_threshold_secs {
            return Err(Error::Config(format!(
                "thresholds must satisfy 0 < danger ({}) < warning ({})",
                p.danger_threshold_secs, p.warning_threshold_secs
            )));
        }

        if self.producer.default_theatre_id.trim().is_empty() {
            return Err(Error::Config("default_theatre_id must not be empty".to_string()));
        }

        Ok(())
    }

    /// Parsed backend base URL
    pub fn base_url(&self) -> Result<reqwest::Url> {
        let url = reqwest::Url::parse(&self.server_url)
            .map_err(|e| Error::Config(format!("Invalid server_url {:?}: {}", self.server_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "server_url must be http or https, got {}",
                url.scheme()
            )));
        }
        Ok(url)
    }

    /// Absolute URL for an endpoint path such as `/api/status`
    pub fn endpoint_url(&self, path: &str) -> Result<reqwest::Url> {
        let joined = format!(
            "{}/{}",
            self.server_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        reqwest::Url::parse(&joined)
            .map_err(|e| Error::Config(format!("Invalid endpoint URL {:?}: {}", joined, e)))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Resolves the effective [`ClientConfig`] for one client binary
pub struct ConfigResolver {
    module_name: String,
}

impl ConfigResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
        }
    }

    /// Resolve configuration from CLI arguments, environment and files
    ///
    /// # Arguments
    /// * `cli_config` - `--config` path, if given
    /// * `cli_server_url` - `--server-url`, if given
    pub fn resolve(
        &self,
        cli_config: Option<&Path>,
        cli_server_url: Option<&str>,
    ) -> Result<ClientConfig> {
        let mut config = match self.config_file_path(cli_config)? {
            Some(path) => {
                info!(module = %self.module_name, "Loading config from {}", path.display());
                ClientConfig::load_file(&path)?
            }
            None => {
                warn!(
                    module = %self.module_name,
                    "No config file found, using compiled defaults"
                );
                ClientConfig::default()
            }
        };

        if let Some(url) = cli_server_url {
            debug!("server_url overridden by command line");
            config.server_url = url.to_string();
        } else if let Ok(url) = std::env::var(SERVER_URL_ENV_VAR) {
            debug!("server_url overridden by {}", SERVER_URL_ENV_VAR);
            config.server_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Locate the config file to load, if any
    ///
    /// Explicit paths (CLI or environment) must exist; platform defaults
    /// are optional.
    fn config_file_path(&self, cli_config: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = cli_config {
            return Self::require_exists(path.to_path_buf());
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::require_exists(PathBuf::from(path));
        }

        Ok(default_config_paths().into_iter().find(|p| p.exists()))
    }

    fn require_exists(path: PathBuf) -> Result<Option<PathBuf>> {
        if path.exists() {
            Ok(Some(path))
        } else {
            Err(Error::Config(format!("Config file not found: {}", path.display())))
        }
    }
}

/// Platform config file candidates, most specific first
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("cshield").join("config.toml"));
    }
    if cfg!(unix) {
        paths.push(PathBuf::from("/etc/cshield/config.toml"));
    }
    paths
}
