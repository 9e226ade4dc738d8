//! Notification Dispatcher
//!
//! Each backend gets its own delivery task fed by a bounded queue. Handing an
//! event to the dispatcher only enqueues it, so a backend that is slow or
//! failing affects nobody but itself, and every backend sees events in the
//! order they were dispatched.

use crate::notifier::Notifier;
use crate::NotifyError;
use alert_model::ChangeEvent;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Dispatcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Events buffered per backend before new ones are dropped for it
    pub queue_capacity: usize,
    /// Upper bound on a single delivery (milliseconds)
    pub notify_timeout_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            notify_timeout_ms: 10_000,
        }
    }
}

struct Backend {
    name: String,
    tx: mpsc::Sender<Arc<ChangeEvent>>,
    worker: JoinHandle<()>,
}

pub struct NotificationDispatcher {
    backends: Vec<Backend>,
}

impl NotificationDispatcher {
    /// Start one delivery task per notifier. Must be called from within a
    /// tokio runtime.
    pub fn new(notifiers: Vec<Arc<dyn Notifier>>, config: &DispatchConfig) -> Self {
        let timeout = Duration::from_millis(config.notify_timeout_ms);
        let capacity = config.queue_capacity.max(1);

        let backends: Vec<Backend> = notifiers
            .into_iter()
            .map(|notifier| {
                let (tx, rx) = mpsc::channel(capacity);
                let name = notifier.name().to_string();
                let worker = tokio::spawn(deliver(notifier, rx, timeout));
                Backend { name, tx, worker }
            })
            .collect();

        info!("Notification dispatcher started with {} backends", backends.len());
        Self { backends }
    }

    /// Hand `event` to every backend without waiting for delivery
    pub fn dispatch(&self, event: &ChangeEvent) {
        let event = Arc::new(event.clone());
        for backend in &self.backends {
            match backend.tx.try_send(event.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!(
                        notifier = %backend.name,
                        alert_id = %event.alert_id(),
                        "Notifier queue full, dropping event"
                    );
                    metrics::counter!("notifications_dropped_total", "notifier" => backend.name.clone())
                        .increment(1);
                }
                Err(TrySendError::Closed(_)) => {
                    error!(notifier = %backend.name, "Notifier worker has stopped");
                    metrics::counter!("notifications_dropped_total", "notifier" => backend.name.clone())
                        .increment(1);
                }
            }
        }
    }

    /// Number of configured backends
    pub fn backend_count(&self) -> usize {
        self.backends.len()
    }

    /// Close every queue and wait for the workers to finish what they hold
    pub async fn shutdown(self) {
        info!("Stopping notification dispatcher");
        for backend in self.backends {
            drop(backend.tx);
            if let Err(e) = backend.worker.await {
                error!(notifier = %backend.name, error = %e, "Notifier worker ended abnormally");
            }
        }
    }
}

async fn deliver(
    notifier: Arc<dyn Notifier>,
    mut rx: mpsc::Receiver<Arc<ChangeEvent>>,
    timeout: Duration,
) {
    while let Some(event) = rx.recv().await {
        // a panicking backend takes down this delivery, not the worker
        let delivery = tokio::spawn({
            let notifier = notifier.clone();
            let event = event.clone();
            async move { tokio::time::timeout(timeout, notifier.notify(&event)).await }
        });
        let result = match delivery.await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(NotifyError::Timeout(timeout.as_millis() as u64)),
            Err(e) => Err(NotifyError::Aborted(e.to_string())),
        };

        match result {
            Ok(()) => debug!(
                notifier = notifier.name(),
                alert_id = %event.alert_id(),
                "Notification delivered"
            ),
            Err(e) => {
                error!(
                    notifier = notifier.name(),
                    alert_id = %event.alert_id(),
                    error = %e,
                    "Failed to send notification"
                );
                metrics::counter!("notifications_failed_total", "notifier" => notifier.name().to_string())
                    .increment(1);
            }
        }
    }
    debug!(notifier = notifier.name(), "Notifier worker exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use alert_model::{Alert, AlertDraft};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct RecordingNotifier {
        name: String,
        seen: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn new(name: &str) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        fn name(&self) -> &str {
            &self.name
        }

        async fn notify(&self, event: &ChangeEvent) -> Result<(), NotifyError> {
            self.seen.lock().unwrap().push(event.current.value.clone());
            Ok(())
        }
    }

    struct FailingNotifier {
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl Notifier for FailingNotifier {
        fn name(&self) -> &str {
            "failing"
        }

        async fn notify(&self, _event: &ChangeEvent) -> Result<(), NotifyError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(NotifyError::Delivery("connection refused".to_string()))
        }
    }

    /// Panics on its first delivery, succeeds afterwards
    struct PanicOnceNotifier {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Notifier for PanicOnceNotifier {
        fn name(&self) -> &str {
            "panic-once"
        }

        async fn notify(&self, _event: &ChangeEvent) -> Result<(), NotifyError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("backend bug");
            }
            Ok(())
        }
    }

    struct StalledNotifier;

    #[async_trait]
    impl Notifier for StalledNotifier {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn notify(&self, _event: &ChangeEvent) -> Result<(), NotifyError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    fn event(value: &str) -> ChangeEvent {
        let mut draft = AlertDraft::new("testServer01", "cpu usage idle", "syd01", "CRITICAL");
        draft.value = value.to_string();
        ChangeEvent::insert(Alert::from_draft("a-1", &draft, Utc::now()))
    }

    #[tokio::test]
    async fn test_every_backend_receives_every_event_in_order() {
        let a = RecordingNotifier::new("a");
        let b = RecordingNotifier::new("b");
        let dispatcher =
            NotificationDispatcher::new(vec![a.clone(), b.clone()], &DispatchConfig::default());
        assert_eq!(dispatcher.backend_count(), 2);

        let expected: Vec<String> = (0..50).map(|i| i.to_string()).collect();
        for value in &expected {
            dispatcher.dispatch(&event(value));
        }
        dispatcher.shutdown().await;

        assert_eq!(a.seen(), expected);
        assert_eq!(b.seen(), expected);
    }

    #[tokio::test]
    async fn test_failing_backend_is_isolated() {
        let failing = Arc::new(FailingNotifier {
            attempts: AtomicUsize::new(0),
        });
        let healthy = RecordingNotifier::new("healthy");
        let dispatcher = NotificationDispatcher::new(
            vec![failing.clone(), healthy.clone()],
            &DispatchConfig::default(),
        );

        for i in 0..10 {
            dispatcher.dispatch(&event(&i.to_string()));
        }
        dispatcher.shutdown().await;

        assert_eq!(healthy.seen().len(), 10);
        // failures are not retried
        assert_eq!(failing.attempts.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn test_panicking_backend_keeps_its_worker() {
        let flaky = Arc::new(PanicOnceNotifier {
            calls: AtomicUsize::new(0),
        });
        let healthy = RecordingNotifier::new("healthy");
        let dispatcher = NotificationDispatcher::new(
            vec![flaky.clone(), healthy.clone()],
            &DispatchConfig::default(),
        );

        dispatcher.dispatch(&event("0"));
        tokio::time::sleep(Duration::from_millis(50)).await;
        for i in 1..4 {
            dispatcher.dispatch(&event(&i.to_string()));
        }
        dispatcher.shutdown().await;

        assert_eq!(flaky.calls.load(Ordering::SeqCst), 4);
        assert_eq!(healthy.seen().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_backend_does_not_delay_others() {
        let healthy = RecordingNotifier::new("healthy");
        let config = DispatchConfig {
            queue_capacity: 4,
            notify_timeout_ms: 7_200_000,
        };
        let dispatcher =
            NotificationDispatcher::new(vec![Arc::new(StalledNotifier), healthy.clone()], &config);

        let started = tokio::time::Instant::now();
        for i in 0..3 {
            dispatcher.dispatch(&event(&i.to_string()));
        }
        while healthy.seen().len() < 3 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        assert!(started.elapsed() < Duration::from_secs(3600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_counts_as_failure_and_moves_on() {
        let config = DispatchConfig {
            queue_capacity: 8,
            notify_timeout_ms: 50,
        };
        let dispatcher = NotificationDispatcher::new(vec![Arc::new(StalledNotifier)], &config);
        for i in 0..3 {
            dispatcher.dispatch(&event(&i.to_string()));
        }

        let started = tokio::time::Instant::now();
        dispatcher.shutdown().await;
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_queue_drops_only_for_that_backend() {
        let healthy = RecordingNotifier::new("healthy");
        let config = DispatchConfig {
            queue_capacity: 2,
            notify_timeout_ms: 7_200_000,
        };
        let dispatcher =
            NotificationDispatcher::new(vec![Arc::new(StalledNotifier), healthy.clone()], &config);

        for i in 0..6 {
            dispatcher.dispatch(&event(&i.to_string()));
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        assert_eq!(healthy.seen().len(), 6);
    }
}
