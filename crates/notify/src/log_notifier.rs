//! Log Notifier

use crate::notifier::Notifier;
use crate::NotifyError;
use alert_model::{ChangeEvent, ChangeKind};
use async_trait::async_trait;
use tracing::info;

/// Writes every change to the service log
pub struct LogNotifier {
    name: String,
}

impl LogNotifier {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn notify(&self, event: &ChangeEvent) -> Result<(), NotifyError> {
        let alert = &event.current;
        match (event.kind, &event.previous) {
            (ChangeKind::Update, Some(prev)) if event.is_state_change() => info!(
                notifier = %self.name,
                "Alert {} {}/{} in {}: {} {} -> {} {}",
                alert.id,
                alert.resource,
                alert.event,
                alert.environment,
                prev.severity,
                prev.status,
                alert.severity,
                alert.status
            ),
            (ChangeKind::Update, _) => info!(
                notifier = %self.name,
                "Alert {} {}/{} repeated (count: {})",
                alert.id,
                alert.resource,
                alert.event,
                alert.duplicate_count
            ),
            (ChangeKind::Insert, _) => info!(
                notifier = %self.name,
                "Alert {} opened: {}/{} in {} is {}",
                alert.id,
                alert.resource,
                alert.event,
                alert.environment,
                alert.severity
            ),
        }
        Ok(())
    }
}
