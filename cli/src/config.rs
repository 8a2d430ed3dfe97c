//! Settings file management
//!
//! Settings live in `~/.config/nimbus/config.json`. A missing file is
//! not an error: defaults apply, and the API token can always be
//! supplied through the `NIMBUS_TOKEN` environment variable.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

use crate::errors::CliError;
use crate::logs::LogLevel;
use crate::utils::BackoffOptions;

/// CLI settings
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Platform API configuration
    #[serde(default)]
    pub api: ApiSettings,

    /// Deployment driver tuning
    #[serde(default)]
    pub driver: DriverSettings,

    /// Log streamer tuning
    #[serde(default)]
    pub stream: StreamSettings,
}

/// Platform API settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    /// Base URL for the platform API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token for the platform API
    #[serde(default)]
    pub token: Option<SecretString>,
}

fn default_base_url() -> String {
    "https://api.nimbus.example/v1".to_string()
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
        }
    }
}

/// Deployment driver settings
#[derive(Debug, Clone, Deserialize)]
pub struct DriverSettings {
    /// Status polling interval in seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Consecutive transient failures tolerated before giving up
    #[serde(default = "default_retry_ceiling")]
    pub retry_ceiling: u32,

    /// Base backoff delay between retries, in seconds
    #[serde(default = "default_backoff_base")]
    pub backoff_base_secs: u64,

    /// Maximum backoff delay, in seconds
    #[serde(default = "default_backoff_max")]
    pub backoff_max_secs: u64,
}

fn default_poll_interval() -> u64 {
    2
}

fn default_retry_ceiling() -> u32 {
    5
}

fn default_backoff_base() -> u64 {
    1
}

fn default_backoff_max() -> u64 {
    30
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            retry_ceiling: default_retry_ceiling(),
            backoff_base_secs: default_backoff_base(),
            backoff_max_secs: default_backoff_max(),
        }
    }
}

impl DriverSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn backoff(&self) -> BackoffOptions {
        BackoffOptions {
            base_delay: Duration::from_secs(self.backoff_base_secs),
            max_delay: Duration::from_secs(self.backoff_max_secs),
            multiplier: 2.0,
        }
    }
}

/// Log streamer settings
#[derive(Debug, Clone, Deserialize)]
pub struct StreamSettings {
    /// Base reconnect delay, in seconds
    #[serde(default = "default_reconnect_base")]
    pub reconnect_base_secs: u64,

    /// Maximum reconnect delay, in seconds
    #[serde(default = "default_reconnect_max")]
    pub reconnect_max_secs: u64,
}

fn default_reconnect_base() -> u64 {
    1
}

fn default_reconnect_max() -> u64 {
    15
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            reconnect_base_secs: default_reconnect_base(),
            reconnect_max_secs: default_reconnect_max(),
        }
    }
}

impl StreamSettings {
    pub fn reconnect_backoff(&self) -> BackoffOptions {
        BackoffOptions {
            base_delay: Duration::from_secs(self.reconnect_base_secs),
            max_delay: Duration::from_secs(self.reconnect_max_secs),
            multiplier: 2.0,
        }
    }
}

impl Settings {
    /// Default settings file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("nimbus").join("config.json"))
    }

    /// Load settings from the given path, or the default location
    pub async fn load(path: Option<PathBuf>) -> Result<Self, CliError> {
        let path = match path.or_else(Self::default_path) {
            Some(p) => p,
            None => return Ok(Self::default()),
        };

        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let settings = serde_json::from_slice(&bytes).map_err(|e| {
                    CliError::Config(format!("invalid settings file {}: {}", path.display(), e))
                })?;
                Ok(settings)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve the API token: environment first, then settings file
    pub fn api_token(&self) -> Result<SecretString, CliError> {
        if let Ok(token) = std::env::var("NIMBUS_TOKEN") {
            if !token.is_empty() {
                return Ok(SecretString::from(token));
            }
        }

        self.api.token.clone().ok_or_else(|| {
            CliError::Config(
                "no API token configured: set NIMBUS_TOKEN or api.token in the settings file"
                    .to_string(),
            )
        })
    }
}
