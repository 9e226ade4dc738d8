//! Draft Validation Errors

use thiserror::Error;

/// Errors raised when an inbound draft cannot identify a condition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    /// Identity field is empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}
