//! Alert Processing Errors

use alert_model::DraftError;
use storage::StorageError;
use thiserror::Error;

/// Errors surfaced by the alert-processing entry points
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("Invalid alert: {0}")]
    InvalidDraft(#[from] DraftError),

    #[error("Alert not found: {0}")]
    NotFound(String),

    /// More than one stored record answers to the same identity key
    #[error("{count} alerts match {resource}/{event} in {environment}")]
    AmbiguousMatch {
        resource: String,
        event: String,
        environment: String,
        count: usize,
    },

    /// Lost an optimistic write race
    #[error("Concurrent write conflict on alert {0}")]
    Conflict(String),

    #[error("Alert {0} disappeared before it could be updated")]
    NotFoundDuringUpdate(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AlertError {
    /// Races that warrant re-running resolve-then-mutate
    pub fn is_retryable(&self) -> bool {
        matches!(self, AlertError::Conflict(_) | AlertError::NotFoundDuringUpdate(_))
    }
}
