//! Notification Dispatch
//!
//! Fans committed alert changes out to independently configured notifier
//! backends. A failing or slow backend never holds up the others and never
//! reports back to the change-feed consumer.

mod config;
mod dispatcher;
mod log_notifier;
mod mqtt;
mod notifier;

pub use config::{build_notifiers, NotifierConfig, NotifierKind};
pub use dispatcher::{DispatchConfig, NotificationDispatcher};
pub use log_notifier::LogNotifier;
pub use mqtt::{MqttConfig, MqttNotifier};
pub use notifier::Notifier;

use thiserror::Error;

/// Notifier failures. Logged per backend, never propagated past the
/// dispatcher.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Delivery timed out after {0}ms")]
    Timeout(u64),

    #[error("Delivery task aborted: {0}")]
    Aborted(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid notifier config: {0}")]
    Config(String),
}
