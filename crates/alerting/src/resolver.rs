//! Identity Resolver

use crate::AlertError;
use alert_model::{AlertDraft, IdentityKey};
use std::sync::Arc;
use storage::{PersistenceGateway, StoredAlert};
use tracing::{debug, error};

/// Finds the stored record an incoming draft refers to.
///
/// Always reads through to the gateway: two processors racing on one key
/// must see each other's writes.
pub struct IdentityResolver {
    gateway: Arc<dyn PersistenceGateway>,
}

impl IdentityResolver {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self { gateway }
    }

    /// Look up the record for `draft`, or `None` on a first sighting
    pub async fn resolve(&self, draft: &AlertDraft) -> Result<Option<StoredAlert>, AlertError> {
        let key = IdentityKey::from_draft(draft);
        let mut candidates = self.gateway.find_by_key(&key).await?;

        match candidates.len() {
            0 => {
                debug!("No record for {}/{} in {}", key.resource, key.event, key.environment);
                Ok(None)
            }
            1 => Ok(candidates.pop()),
            count => {
                error!(
                    resource = %key.resource,
                    event = %key.event,
                    environment = %key.environment,
                    count,
                    "Identity key matches more than one stored alert"
                );
                Err(AlertError::AmbiguousMatch {
                    resource: key.resource,
                    event: key.event,
                    environment: key.environment,
                    count,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alert_model::Alert;
    use chrono::Utc;
    use storage::MemoryStore;

    #[tokio::test]
    async fn test_resolve_miss_and_hit() {
        let store = Arc::new(MemoryStore::new());
        let resolver = IdentityResolver::new(store.clone());
        let draft = AlertDraft::new("testServer01", "cpu usage idle", "syd01", "CRITICAL");

        assert!(resolver.resolve(&draft).await.unwrap().is_none());

        store.insert(Alert::from_draft("a-1", &draft, Utc::now())).await.unwrap();
        let found = resolver.resolve(&draft).await.unwrap().unwrap();
        assert_eq!(found.alert.id, "a-1");
        assert_eq!(found.version, 1);
    }

    #[tokio::test]
    async fn test_resolve_through_correlate_set() {
        let store = Arc::new(MemoryStore::new());
        let resolver = IdentityResolver::new(store.clone());

        let mut down = AlertDraft::new("router7", "NodeDown", "dc1", "major");
        down.correlate = vec!["NodeDown".to_string(), "NodeUp".to_string()];
        store.insert(Alert::from_draft("a-1", &down, Utc::now())).await.unwrap();

        let up = AlertDraft::new("router7", "NodeUp", "dc1", "normal");
        let found = resolver.resolve(&up).await.unwrap().unwrap();
        assert_eq!(found.alert.id, "a-1");
    }

    #[tokio::test]
    async fn test_ambiguous_store_is_surfaced() {
        let store = Arc::new(MemoryStore::new());
        let resolver = IdentityResolver::new(store.clone());
        let draft = AlertDraft::new("testServer01", "cpu usage idle", "syd01", "CRITICAL");
        store.insert_unchecked(Alert::from_draft("a-1", &draft, Utc::now())).unwrap();
        store.insert_unchecked(Alert::from_draft("a-2", &draft, Utc::now())).unwrap();

        match resolver.resolve(&draft).await {
            Err(AlertError::AmbiguousMatch { count, .. }) => assert_eq!(count, 2),
            other => panic!("expected ambiguous match, got {:?}", other),
        }
    }
}
