//! Storage Layer
//!
//! Persistence gateway consumed by the correlation engine and the change-feed
//! consumer, plus an in-memory implementation with a push-based change feed.

mod gateway;
mod memory;

pub use gateway::{ChangeStream, PersistenceGateway, StoredAlert};
pub use memory::MemoryStore;

use thiserror::Error;

/// Storage errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Record not found: {0}")]
    NotFound(String),
    /// Optimistic check lost, or an insert collided with an existing identity
    #[error("Write conflict on {0}")]
    Conflict(String),
    #[error("Change feed disconnected")]
    StreamDisconnected,
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
