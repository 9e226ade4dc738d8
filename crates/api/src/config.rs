//! Service configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `CORRELATOR__SECTION__KEY` environment variables.

use auth::AuthConfig;
use change_feed::FeedConfig;
use config::{Config, Environment, File};
use notify::{DispatchConfig, NotifierConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to initialise logging: {0}")]
    Logging(String),

    #[error("Failed to install metrics recorder: {0}")]
    Metrics(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub feed: FeedConfig,
    pub dispatch: DispatchConfig,
    pub auth: AuthConfig,
    pub notifiers: Vec<NotifierConfig>,
}

impl AppConfig {
    /// Load from `path` (required when given) or `correlator.toml` in the
    /// working directory (optional), then apply environment overrides
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::with_name(path).required(true),
            None => File::with_name("correlator").required(false),
        };

        let settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("CORRELATOR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document, without environment overrides
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feed.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "feed.poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.feed.batch_size == 0 {
            return Err(ConfigError::Invalid(
                "feed.batch_size must be greater than zero".to_string(),
            ));
        }
        if !self.feed.backoff_factor.is_finite() || self.feed.backoff_factor < 1.0 {
            return Err(ConfigError::Invalid(
                "feed.backoff_factor must be a finite number of at least 1".to_string(),
            ));
        }
        if self.dispatch.queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "dispatch.queue_capacity must be greater than zero".to_string(),
            ));
        }
        if self.auth.enabled && self.auth.signing_key.is_empty() {
            return Err(ConfigError::Invalid(
                "auth.signing_key is required when auth is enabled".to_string(),
            ));
        }
        Ok(())
    }
}
