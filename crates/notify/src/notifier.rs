//! Notifier Backend Interface

use crate::NotifyError;
use alert_model::ChangeEvent;
use async_trait::async_trait;

/// A downstream channel that wants to hear about alert changes.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Name used in logs and metrics
    fn name(&self) -> &str;

    async fn notify(&self, event: &ChangeEvent) -> Result<(), NotifyError>;
}
