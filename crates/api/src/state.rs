//! Shared handler state

use alerting::AlertService;
use auth::LoginService;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
pub struct AppState {
    pub alerts: Arc<AlertService>,
    /// Present when authentication is enabled
    pub login: Option<Arc<LoginService>>,
    pub metrics: PrometheusHandle,
    pub version: String,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        alerts: Arc<AlertService>,
        login: Option<Arc<LoginService>>,
        metrics: PrometheusHandle,
    ) -> Self {
        Self {
            alerts,
            login,
            metrics,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
        }
    }
}
