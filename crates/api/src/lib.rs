//! Alert Correlator API Server
//!
//! HTTP front end for alert submission plus the wiring that runs the
//! correlation engine, change-feed consumer and notifiers in one process.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

mod config;
mod error;
mod guard;
mod routes;
mod state;
mod telemetry;

pub use crate::config::{AppConfig, ConfigError, LoggingConfig, ServerConfig};
pub use error::ApiError;
pub use state::AppState;
pub use telemetry::{init_logging, init_metrics};

use alerting::AlertService;
use auth::LoginService;
use change_feed::ChangeFeedConsumer;
use metrics_exporter_prometheus::PrometheusHandle;
use notify::{build_notifiers, NotificationDispatcher};
use storage::MemoryStore;

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let alerts = Router::new()
        .route("/alert", post(routes::alerts::create_alert))
        .route(
            "/alert/:id",
            get(routes::alerts::get_alert).delete(routes::alerts::delete_alert),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            guard::require_bearer,
        ));

    Router::new()
        .merge(alerts)
        .route("/auth/login", post(routes::auth::login))
        .route("/health", get(routes::health::health))
        .route("/metrics", get(routes::health::metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the login service when authentication is enabled
fn login_service(config: &AppConfig) -> Option<Arc<LoginService>> {
    if !config.auth.enabled {
        warn!("Authentication disabled, alert routes are open");
        return None;
    }
    let authenticator = config.auth.authenticator();
    info!("Authentication enabled with {} users", authenticator.user_count());
    Some(Arc::new(LoginService::new(
        Arc::new(authenticator),
        config.auth.roles.build(),
        config.auth.token_issuer(),
    )))
}

/// Run the server until ctrl-c, then stop the feed consumer and drain the
/// notifier queues
pub async fn run_server(
    config: AppConfig,
    metrics: PrometheusHandle,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let alerts = Arc::new(AlertService::new(store.clone()));

    let notifiers = build_notifiers(&config.notifiers)?;
    if notifiers.is_empty() {
        warn!("No notifiers configured, change events will be discarded");
    }
    let dispatcher = Arc::new(NotificationDispatcher::new(notifiers, &config.dispatch));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let consumer = ChangeFeedConsumer::new(store.clone(), dispatcher.clone(), config.feed.clone());
    let feed_task = tokio::spawn(consumer.run(shutdown_rx));

    let state = Arc::new(AppState::new(alerts, login_service(&config), metrics));
    let app = create_router(state);

    info!("Starting API server on {}", config.server.listen_addr);
    let listener = tokio::net::TcpListener::bind(&config.server.listen_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down");
    // receiver may already be gone if the consumer exited
    let _ = shutdown_tx.send(true);
    feed_task.await?;
    match Arc::try_unwrap(dispatcher) {
        Ok(dispatcher) => dispatcher.shutdown().await,
        Err(_) => warn!("Dispatcher still shared at shutdown, pending notifications dropped"),
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}
