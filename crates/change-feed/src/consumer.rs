//! Feed consumer loop

use crate::backoff::Backoff;
use notify::NotificationDispatcher;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use storage::{ChangeStream, PersistenceGateway, StorageError};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Consumer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Time between drains of the feed (milliseconds)
    pub poll_interval_ms: u64,
    /// Maximum events taken from the stream per drain call
    pub batch_size: usize,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_factor: f64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 5000,
            batch_size: 256,
            initial_backoff_ms: 500,
            max_backoff_ms: 30_000,
            backoff_factor: 2.0,
        }
    }
}

impl FeedConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn backoff(&self) -> Backoff {
        Backoff::new(
            Duration::from_millis(self.initial_backoff_ms),
            Duration::from_millis(self.max_backoff_ms),
            self.backoff_factor,
        )
    }
}

/// Why a subscription stopped being consumed
enum Exit {
    Shutdown,
    Lost(StorageError),
}

/// Sole reader of the store's change feed
pub struct ChangeFeedConsumer {
    gateway: Arc<dyn PersistenceGateway>,
    dispatcher: Arc<NotificationDispatcher>,
    config: FeedConfig,
}

impl ChangeFeedConsumer {
    pub fn new(
        gateway: Arc<dyn PersistenceGateway>,
        dispatcher: Arc<NotificationDispatcher>,
        config: FeedConfig,
    ) -> Self {
        Self {
            gateway,
            dispatcher,
            config,
        }
    }

    /// Consume the feed until `shutdown` flips to true (or its sender is
    /// dropped). Feed loss is never fatal: the loop backs off and
    /// subscribes again.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut backoff = self.config.backoff();
        info!(
            "Change-feed consumer started (poll every {}ms)",
            self.config.poll_interval_ms
        );

        loop {
            if *shutdown.borrow_and_update() {
                break;
            }

            let failure = match self.gateway.subscribe().await {
                Ok(stream) => {
                    debug!("Subscribed to change feed");
                    match self.consume(stream, &mut backoff, &mut shutdown).await {
                        Exit::Shutdown => break,
                        Exit::Lost(e) => e,
                    }
                }
                Err(e) => e,
            };

            let delay = backoff.next_delay();
            warn!(
                error = %failure,
                retry_in_ms = delay.as_millis() as u64,
                "Change feed unavailable, re-subscribing"
            );
            metrics::counter!("change_feed_reconnects_total").increment(1);

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = stopped(&mut shutdown) => break,
            }
        }

        info!("Change-feed consumer stopped");
    }

    async fn consume(
        &self,
        mut stream: Box<dyn ChangeStream>,
        backoff: &mut Backoff,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Exit {
        let batch_size = self.config.batch_size.max(1);
        let mut ticker = tokio::time::interval(self.config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = stopped(shutdown) => return Exit::Shutdown,
            }

            // take everything available before sleeping again
            loop {
                let batch = match stream.drain(batch_size).await {
                    Ok(batch) => batch,
                    Err(e) => return Exit::Lost(e),
                };
                if batch.is_empty() {
                    break;
                }
                // only delivered data proves the feed healthy again
                backoff.reset();

                debug!("Forwarding {} change events", batch.len());
                for event in &batch {
                    metrics::counter!("change_events_total", "kind" => event.kind.as_str())
                        .increment(1);
                    self.dispatcher.dispatch(event);
                }
                if batch.len() < batch_size {
                    break;
                }
            }
        }
    }
}

/// Resolves once shutdown is requested or the sender is gone
async fn stopped(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}
