//! Alert Service
//!
//! Entry points used by the HTTP layer.

use crate::processor::AlertProcessor;
use crate::AlertError;
use alert_model::{Alert, AlertDraft};
use std::sync::Arc;
use storage::{PersistenceGateway, StorageError};
use tracing::info;

pub struct AlertService {
    gateway: Arc<dyn PersistenceGateway>,
    processor: AlertProcessor,
}

impl AlertService {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self {
            processor: AlertProcessor::new(gateway.clone()),
            gateway,
        }
    }

    /// Run a submission through the correlation engine, returning the id of
    /// the canonical record
    pub async fn process_alert(&self, draft: &AlertDraft) -> Result<String, AlertError> {
        self.processor.process(draft).await.map(|p| p.id)
    }

    pub async fn get_alert(&self, id: &str) -> Result<Alert, AlertError> {
        self.gateway
            .get(id)
            .await?
            .map(|stored| stored.alert)
            .ok_or_else(|| AlertError::NotFound(id.to_string()))
    }

    /// Remove a record. The engine itself never deletes.
    pub async fn delete_alert(&self, id: &str) -> Result<(), AlertError> {
        match self.gateway.delete(id).await {
            Ok(()) => {
                info!("Deleted alert {}", id);
                Ok(())
            }
            Err(StorageError::NotFound(id)) => Err(AlertError::NotFound(id)),
            Err(e) => Err(e.into()),
        }
    }
}
