//! Alert State Transitions
//!
//! Pure half of the processor: given what the store holds and what just
//! arrived, produce the next version of the record. No I/O happens here.

use crate::history::record_history;
use alert_model::{Alert, AlertDraft, TrendIndication};
use chrono::{DateTime, Utc};

/// Which path a submission took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// First sighting of the identity key
    Created,
    /// Severity and status unchanged
    Duplicate,
    /// Severity or status moved
    Correlated,
}

impl Outcome {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Created => "created",
            Outcome::Duplicate => "duplicate",
            Outcome::Correlated => "correlated",
        }
    }
}

/// Result of applying a submission to an existing record
#[derive(Debug, Clone)]
pub struct Transition {
    pub alert: Alert,
    pub outcome: Outcome,
}

/// Build the record for a first sighting, history seeded with one entry
pub fn create_alert(draft: &AlertDraft, id: &str, now: DateTime<Utc>) -> Alert {
    record_history(Alert::from_draft(id, draft, now), id, now)
}

/// Apply a later submission to the stored record.
///
/// `receive_id` identifies this submission; it becomes `lastReceiveId` and,
/// on a state change, the id of the new history entry.
pub fn apply_submission(
    existing: &Alert,
    draft: &AlertDraft,
    receive_id: &str,
    now: DateTime<Utc>,
) -> Transition {
    let severity = draft.severity_name();
    let status = draft.status.unwrap_or(existing.status);
    let severity_changed = !existing.severity.eq_ignore_ascii_case(severity);
    let status_changed = status != existing.status;

    let mut alert = existing.clone();
    refresh_descriptive(&mut alert, draft);
    alert.receive_time = now;
    alert.last_receive_time = now;
    alert.last_receive_id = receive_id.to_string();

    if !severity_changed && !status_changed {
        alert.duplicate_count += 1;
        alert.repeat = true;
        return Transition {
            alert,
            outcome: Outcome::Duplicate,
        };
    }

    alert.previous_severity = Some(existing.severity.clone());
    alert.trend_indication = Some(TrendIndication::between_names(&existing.severity, severity));
    alert.duplicate_count = 0;
    alert.repeat = false;
    alert.severity = severity.to_string();
    alert.status = status;

    Transition {
        alert: record_history(alert, receive_id, now),
        outcome: Outcome::Correlated,
    }
}

/// Carry the latest descriptive payload onto the record. Identity fields
/// are never touched.
fn refresh_descriptive(alert: &mut Alert, draft: &AlertDraft) {
    alert.value = draft.value.clone();
    alert.text = draft.text.clone();
    alert.raw_data = draft.raw_data.clone();

    if !draft.origin.is_empty() {
        alert.origin = draft.origin.clone();
    }
    if draft.timeout.is_some() {
        alert.timeout = draft.timeout;
    }
    if draft.acknowledgement_duration.is_some() {
        alert.acknowledgement_duration = draft.acknowledgement_duration;
    }

    for tag in &draft.tags {
        if !alert.tags.contains(tag) {
            alert.tags.push(tag.clone());
        }
    }
    alert
        .attributes
        .extend(draft.attributes.iter().map(|(k, v)| (k.clone(), v.clone())));
}
