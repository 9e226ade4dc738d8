//! Alert Processor

use crate::resolver::IdentityResolver;
use crate::transition::{apply_submission, create_alert, Outcome};
use crate::AlertError;
use alert_model::AlertDraft;
use chrono::Utc;
use std::sync::Arc;
use storage::{PersistenceGateway, StorageError};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Attempts per submission: the first try plus one retry after a lost race
const MAX_ATTEMPTS: u32 = 2;

/// Outcome of processing one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processed {
    /// Id of the canonical record
    pub id: String,
    pub outcome: Outcome,
}

/// Owns the new / duplicate / correlated-change decision
pub struct AlertProcessor {
    gateway: Arc<dyn PersistenceGateway>,
    resolver: IdentityResolver,
}

impl AlertProcessor {
    /// Create a processor writing through `gateway`
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self {
            resolver: IdentityResolver::new(gateway.clone()),
            gateway,
        }
    }

    /// Process one submission and return the id of the record it landed on.
    ///
    /// A lost insert race or a failed conditional update re-runs the whole
    /// resolve-then-mutate sequence once before the error is surfaced.
    pub async fn process(&self, draft: &AlertDraft) -> Result<Processed, AlertError> {
        draft.validate()?;

        let mut attempt = 1;
        loop {
            match self.try_process(draft).await {
                Err(e) if e.is_retryable() && attempt < MAX_ATTEMPTS => {
                    warn!(
                        resource = %draft.resource,
                        event = %draft.event,
                        attempt,
                        error = %e,
                        "Lost write race, retrying"
                    );
                    metrics::counter!("alert_conflict_retries_total").increment(1);
                    attempt += 1;
                }
                Ok(processed) => {
                    metrics::counter!("alerts_processed_total", "outcome" => processed.outcome.as_str())
                        .increment(1);
                    return Ok(processed);
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_process(&self, draft: &AlertDraft) -> Result<Processed, AlertError> {
        let now = Utc::now();

        let Some(stored) = self.resolver.resolve(draft).await? else {
            let id = Uuid::new_v4().to_string();
            let alert = create_alert(draft, &id, now);

            self.gateway.insert(alert).await.map_err(|e| match e {
                StorageError::Conflict(existing) => AlertError::Conflict(existing),
                other => AlertError::Storage(other),
            })?;

            info!(
                "New alert {} for {}/{} in {} ({})",
                id,
                draft.resource,
                draft.event,
                draft.environment,
                draft.severity_name()
            );
            return Ok(Processed {
                id,
                outcome: Outcome::Created,
            });
        };

        let id = stored.alert.id.clone();
        let receive_id = Uuid::new_v4().to_string();
        let transition = apply_submission(&stored.alert, draft, &receive_id, now);
        let outcome = transition.outcome;
        let duplicate_count = transition.alert.duplicate_count;

        self.gateway
            .update_conditional(&id, stored.version, transition.alert)
            .await
            .map_err(|e| match e {
                StorageError::Conflict(id) => AlertError::Conflict(id),
                StorageError::NotFound(id) => AlertError::NotFoundDuringUpdate(id),
                other => AlertError::Storage(other),
            })?;

        match outcome {
            Outcome::Duplicate => debug!("Duplicate of alert {} (count: {})", id, duplicate_count),
            _ => info!(
                "Alert {} changed to {} (was {})",
                id,
                draft.severity_name(),
                stored.alert.severity
            ),
        }

        Ok(Processed { id, outcome })
    }
}
