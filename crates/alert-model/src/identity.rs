//! Identity Keys
//!
//! An alert is identified by `(resource, environment, customer)` plus either
//! its event name or any name in its correlate set.

use crate::alert::{Alert, AlertDraft};

/// Match key computed for a submission or a stored record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityKey {
    pub resource: String,
    pub event: String,
    pub environment: String,
    pub customer: Option<String>,
    pub correlate: Vec<String>,
}

impl IdentityKey {
    /// Key for an inbound draft
    pub fn from_draft(draft: &AlertDraft) -> Self {
        Self {
            resource: draft.resource.clone(),
            event: draft.event.clone(),
            environment: draft.environment.clone(),
            customer: draft.customer_scope().map(str::to_string),
            correlate: draft.correlate.clone(),
        }
    }

    /// Key for a stored record
    pub fn of(alert: &Alert) -> Self {
        Self {
            resource: alert.resource.clone(),
            event: alert.event.clone(),
            environment: alert.environment.clone(),
            customer: alert.customer.clone().filter(|c| !c.trim().is_empty()),
            correlate: alert.correlate.clone(),
        }
    }

    /// Whether `alert` is the record this key identifies.
    ///
    /// Scope must match exactly; the event matches when the names are equal
    /// or either side lists the other's event in its correlate set.
    pub fn matches(&self, alert: &Alert) -> bool {
        let customer = alert.customer.as_deref().filter(|c| !c.trim().is_empty());
        if alert.resource != self.resource
            || alert.environment != self.environment
            || customer != self.customer.as_deref()
        {
            return false;
        }

        alert.answers_to(&self.event) || self.correlate.iter().any(|c| *c == alert.event)
    }
}
