//! Alert Correlator - Main Entry Point

use api::{init_logging, init_metrics, run_server, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // optional config file path; CORRELATOR__* variables apply either way
    let config_path = std::env::args().nth(1);
    let config = AppConfig::load(config_path.as_deref())?;

    init_logging(&config.logging)?;
    let metrics = init_metrics()?;

    info!("=== Alert Correlator v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "Polling change feed every {}ms, {} notifiers configured",
        config.feed.poll_interval_ms,
        config.notifiers.iter().filter(|n| n.enabled).count()
    );

    run_server(config, metrics).await
}
