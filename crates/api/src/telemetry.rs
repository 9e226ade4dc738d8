//! Logging and metrics setup

use crate::config::{ConfigError, LoggingConfig};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigError> {
    let level = Level::from_str(&config.level)
        .map_err(|_| ConfigError::Invalid(format!("unknown log level {}", config.level)))?;

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    let result = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    result.map_err(|e| ConfigError::Logging(e.to_string()))
}

/// Install the global Prometheus recorder and return the handle used to
/// render `/metrics`
pub fn init_metrics() -> Result<PrometheusHandle, ConfigError> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ConfigError::Metrics(e.to_string()))
}
