//! Persistence Gateway Interface

use crate::StorageError;
use alert_model::{Alert, ChangeEvent, IdentityKey};
use async_trait::async_trait;

/// Alert together with the store's version counter for optimistic updates
#[derive(Debug, Clone, PartialEq)]
pub struct StoredAlert {
    pub alert: Alert,
    pub version: u64,
}

/// Store operations the core depends on.
///
/// Implementations are the single source of truth: callers never cache what
/// they read, and every write is either an identity-checked insert or an
/// update conditioned on a previously observed version.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// All records answering to `key`. More than one entry means the store
    /// invariant is broken; interpretation is left to the caller.
    async fn find_by_key(&self, key: &IdentityKey) -> Result<Vec<StoredAlert>, StorageError>;

    /// Fetch a record by id
    async fn get(&self, id: &str) -> Result<Option<StoredAlert>, StorageError>;

    /// Insert a new record and return its version. Fails with
    /// [`StorageError::Conflict`] if a record with the same identity exists.
    async fn insert(&self, alert: Alert) -> Result<u64, StorageError>;

    /// Replace record `id` if its version is still `expected_version`.
    ///
    /// Returns the new version, [`StorageError::Conflict`] on a version
    /// mismatch or [`StorageError::NotFound`] if the record is gone.
    async fn update_conditional(
        &self,
        id: &str,
        expected_version: u64,
        alert: Alert,
    ) -> Result<u64, StorageError>;

    /// Remove a record. Deletes do not appear on the change feed.
    async fn delete(&self, id: &str) -> Result<(), StorageError>;

    /// Open a subscription to the change feed
    async fn subscribe(&self) -> Result<Box<dyn ChangeStream>, StorageError>;
}

/// Subscription to committed mutations, in commit order.
#[async_trait]
pub trait ChangeStream: Send {
    /// Take up to `max` changes committed since the last drain.
    ///
    /// An empty batch means no new data. A lost subscription is reported as
    /// [`StorageError::StreamDisconnected`] once buffered changes are drained.
    async fn drain(&mut self, max: usize) -> Result<Vec<ChangeEvent>, StorageError>;
}
