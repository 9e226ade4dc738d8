//! In-Memory Store

use crate::gateway::{ChangeStream, PersistenceGateway, StoredAlert};
use crate::StorageError;
use alert_model::{Alert, ChangeEvent, IdentityKey};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{debug, info, warn};

struct Inner {
    /// Records by id
    records: HashMap<String, StoredAlert>,
    /// Open change-feed subscriptions
    subscribers: Vec<mpsc::UnboundedSender<ChangeEvent>>,
    /// When false, new subscriptions are refused
    available: bool,
}

impl Inner {
    /// Send a committed change to every live subscriber. Called with the
    /// commit lock held so that feed order equals commit order.
    fn publish(&mut self, event: ChangeEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

/// Gateway backed by process memory.
///
/// Every operation runs under a single lock, which makes the identity check
/// on insert and the version check on update atomic.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        info!("Creating in-memory alert store");
        Self {
            inner: Mutex::new(Inner {
                records: HashMap::new(),
                subscribers: Vec::new(),
                available: true,
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StorageError> {
        self.inner
            .lock()
            .map_err(|e| StorageError::DatabaseError(format!("Lock error: {}", e)))
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.inner.lock().map(|i| i.records.len()).unwrap_or(0)
    }

    /// Check if the store holds no records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of live change-feed subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().map(|i| i.subscribers.len()).unwrap_or(0)
    }

    /// Refuse (or accept again) new subscriptions
    pub fn set_available(&self, available: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.available = available;
        }
    }

    /// Drop every open subscription, as a lost connection would
    pub fn disconnect_feeds(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            warn!("Disconnecting {} change-feed subscribers", inner.subscribers.len());
            inner.subscribers.clear();
        }
    }

    /// Store a record without the identity check or a change event.
    /// Used to seed fixtures that violate the one-record-per-key invariant.
    pub fn insert_unchecked(&self, alert: Alert) -> Result<(), StorageError> {
        let mut inner = self.lock()?;
        inner
            .records
            .insert(alert.id.clone(), StoredAlert { alert, version: 1 });
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PersistenceGateway for MemoryStore {
    async fn find_by_key(&self, key: &IdentityKey) -> Result<Vec<StoredAlert>, StorageError> {
        let inner = self.lock()?;
        let mut found: Vec<StoredAlert> = inner
            .records
            .values()
            .filter(|r| key.matches(&r.alert))
            .cloned()
            .collect();
        found.sort_by_key(|r| r.alert.create_time);
        Ok(found)
    }

    async fn get(&self, id: &str) -> Result<Option<StoredAlert>, StorageError> {
        let inner = self.lock()?;
        Ok(inner.records.get(id).cloned())
    }

    async fn insert(&self, alert: Alert) -> Result<u64, StorageError> {
        let mut inner = self.lock()?;

        let key = IdentityKey::of(&alert);
        if let Some(existing) = inner.records.values().find(|r| key.matches(&r.alert)) {
            debug!(
                "Insert for {}/{} collided with {}",
                alert.resource, alert.event, existing.alert.id
            );
            return Err(StorageError::Conflict(existing.alert.id.clone()));
        }
        if inner.records.contains_key(&alert.id) {
            return Err(StorageError::Conflict(alert.id));
        }

        inner.records.insert(
            alert.id.clone(),
            StoredAlert {
                alert: alert.clone(),
                version: 1,
            },
        );
        debug!("Inserted alert {}", alert.id);
        inner.publish(ChangeEvent::insert(alert));
        Ok(1)
    }

    async fn update_conditional(
        &self,
        id: &str,
        expected_version: u64,
        mut alert: Alert,
    ) -> Result<u64, StorageError> {
        let mut inner = self.lock()?;

        let stored = inner
            .records
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        if stored.version != expected_version {
            debug!(
                "Version mismatch on {}: expected {}, found {}",
                id, expected_version, stored.version
            );
            return Err(StorageError::Conflict(id.to_string()));
        }

        alert.id = id.to_string();
        let previous = std::mem::replace(&mut stored.alert, alert.clone());
        stored.version += 1;
        let version = stored.version;

        debug!("Updated alert {} to version {}", id, version);
        inner.publish(ChangeEvent::update(previous, alert));
        Ok(version)
    }

    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        let mut inner = self.lock()?;
        inner
            .records
            .remove(id)
            .map(|_| debug!("Deleted alert {}", id))
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    async fn subscribe(&self) -> Result<Box<dyn ChangeStream>, StorageError> {
        let mut inner = self.lock()?;
        if !inner.available {
            return Err(StorageError::Unavailable("change feed refused".to_string()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        inner.subscribers.push(tx);
        info!("Change-feed subscription opened ({} active)", inner.subscribers.len());
        Ok(Box::new(MemoryChangeStream { rx }))
    }
}

/// Change stream fed by [`MemoryStore`] commits
struct MemoryChangeStream {
    rx: mpsc::UnboundedReceiver<ChangeEvent>,
}

#[async_trait]
impl ChangeStream for MemoryChangeStream {
    async fn drain(&mut self, max: usize) -> Result<Vec<ChangeEvent>, StorageError> {
        let mut batch = Vec::new();
        while batch.len() < max {
            match self.rx.try_recv() {
                Ok(event) => batch.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if batch.is_empty() {
                        return Err(StorageError::StreamDisconnected);
                    }
                    break;
                }
            }
        }
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alert_model::{AlertDraft, ChangeKind};
    use chrono::Utc;

    fn alert(id: &str, event: &str) -> Alert {
        let draft = AlertDraft::new("testServer01", event, "syd01", "CRITICAL");
        Alert::from_draft(id, &draft, Utc::now())
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = MemoryStore::new();
        let version = store.insert(alert("a-1", "cpu usage idle")).await.unwrap();
        assert_eq!(version, 1);

        let stored = store.get("a-1").await.unwrap().unwrap();
        assert_eq!(stored.alert.event, "cpu usage idle");
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_rejects_existing_identity() {
        let store = MemoryStore::new();
        store.insert(alert("a-1", "cpu usage idle")).await.unwrap();

        let err = store.insert(alert("a-2", "cpu usage idle")).await.unwrap_err();
        assert_eq!(err, StorageError::Conflict("a-1".to_string()));
        assert_eq!(store.len(), 1);

        store.insert(alert("a-3", "disk full")).await.unwrap();
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_find_by_key() {
        let store = MemoryStore::new();
        store.insert(alert("a-1", "cpu usage idle")).await.unwrap();

        let key = IdentityKey::from_draft(&AlertDraft::new(
            "testServer01",
            "cpu usage idle",
            "syd01",
            "NORMAL",
        ));
        let found = store.find_by_key(&key).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].alert.id, "a-1");

        let other = IdentityKey::from_draft(&AlertDraft::new("testServer02", "cpu usage idle", "syd01", ""));
        assert!(store.find_by_key(&other).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_conditional_update() {
        let store = MemoryStore::new();
        store.insert(alert("a-1", "cpu usage idle")).await.unwrap();

        let mut changed = alert("a-1", "cpu usage idle");
        changed.severity = "NORMAL".to_string();
        let version = store.update_conditional("a-1", 1, changed.clone()).await.unwrap();
        assert_eq!(version, 2);

        // stale version
        let err = store.update_conditional("a-1", 1, changed.clone()).await.unwrap_err();
        assert_eq!(err, StorageError::Conflict("a-1".to_string()));

        let err = store.update_conditional("gone", 1, changed).await.unwrap_err();
        assert_eq!(err, StorageError::NotFound("gone".to_string()));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        store.insert(alert("a-1", "cpu usage idle")).await.unwrap();
        store.delete("a-1").await.unwrap();
        assert!(store.is_empty());
        assert_eq!(
            store.delete("a-1").await.unwrap_err(),
            StorageError::NotFound("a-1".to_string())
        );
    }

    #[tokio::test]
    async fn test_feed_emits_commits_in_order() {
        let store = MemoryStore::new();
        let mut feed = store.subscribe().await.unwrap();
        assert!(feed.drain(16).await.unwrap().is_empty());

        store.insert(alert("a-1", "cpu usage idle")).await.unwrap();
        let mut changed = alert("a-1", "cpu usage idle");
        changed.severity = "NORMAL".to_string();
        store.update_conditional("a-1", 1, changed).await.unwrap();

        let events = feed.drain(16).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, ChangeKind::Insert);
        assert!(events[0].previous.is_none());
        assert_eq!(events[1].kind, ChangeKind::Update);
        assert_eq!(events[1].previous.as_ref().unwrap().severity, "CRITICAL");
        assert_eq!(events[1].current.severity, "NORMAL");

        assert!(feed.drain(16).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_drain_respects_batch_limit() {
        let store = MemoryStore::new();
        let mut feed = store.subscribe().await.unwrap();
        for i in 0..5 {
            store.insert(alert(&format!("a-{}", i), &format!("event {}", i))).await.unwrap();
        }
        assert_eq!(feed.drain(3).await.unwrap().len(), 3);
        assert_eq!(feed.drain(3).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_disconnect_is_distinct_from_no_data() {
        let store = MemoryStore::new();
        let mut feed = store.subscribe().await.unwrap();
        store.insert(alert("a-1", "cpu usage idle")).await.unwrap();
        store.disconnect_feeds();

        // buffered change still delivered before the disconnect surfaces
        assert_eq!(feed.drain(16).await.unwrap().len(), 1);
        assert_eq!(feed.drain(16).await.unwrap_err(), StorageError::StreamDisconnected);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_store_refuses_subscriptions() {
        let store = MemoryStore::new();
        store.set_available(false);
        assert!(matches!(
            store.subscribe().await,
            Err(StorageError::Unavailable(_))
        ));
        store.set_available(true);
        assert!(store.subscribe().await.is_ok());
    }
}
