//! Alert Record Types

use crate::error::DraftError;
use crate::severity::{TrendIndication, DEFAULT_SEVERITY};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Lifecycle state of an alert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Open,
    Assign,
    Ack,
    Shelved,
    Blackout,
    Closed,
    Expired,
    Unknown,
}

impl Status {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Open => "open",
            Status::Assign => "assign",
            Status::Ack => "ack",
            Status::Shelved => "shelved",
            Status::Blackout => "blackout",
            Status::Closed => "closed",
            Status::Expired => "expired",
            Status::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable snapshot appended whenever severity or status changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEvent {
    pub id: String,
    pub event: String,
    pub status: Status,
    pub severity: String,
    pub value: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub text: String,
    pub update_time: DateTime<Utc>,
}

/// Canonical record for one logical condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Globally unique id, assigned once at creation
    pub id: String,
    /// Resource under alarm, deliberately not host-centric
    pub resource: String,
    /// Event name (e.g. NodeDown, QUEUE:LENGTH:EXCEEDED)
    pub event: String,
    /// Namespace for the resource
    pub environment: String,
    /// Tenant scope within an environment
    pub customer: Option<String>,

    /// Severity name as submitted by the source
    pub severity: String,
    pub status: Status,
    /// Event names treated as the same condition as `event`
    pub correlate: Vec<String>,
    pub service: Vec<String>,
    pub group: String,
    /// Event value (e.g. 100%, Down, 55ms)
    pub value: String,
    pub text: String,
    pub tags: Vec<String>,
    pub attributes: HashMap<String, String>,
    /// Monitoring component that generated the alert
    pub origin: String,
    pub event_type: String,
    /// Unprocessed payload (e.g. full syslog line)
    pub raw_data: String,
    /// Seconds before the alert is considered stale
    pub timeout: Option<u64>,
    /// Seconds before an acknowledgement lapses back to open
    pub acknowledgement_duration: Option<u64>,

    pub duplicate_count: u64,
    /// True iff the latest submission left severity and status unchanged
    pub repeat: bool,
    pub previous_severity: Option<String>,
    pub trend_indication: Option<TrendIndication>,
    pub create_time: DateTime<Utc>,
    pub receive_time: DateTime<Utc>,
    /// Receive id of the most recent submission
    pub last_receive_id: String,
    pub last_receive_time: DateTime<Utc>,
    /// Append-only audit log, oldest first
    pub history: Vec<HistoryEvent>,
}

impl Alert {
    /// Build a fresh record from a draft.
    ///
    /// Derived fields start at their initial values and `history` is empty;
    /// seeding the first history entry is up to the caller.
    pub fn from_draft(id: &str, draft: &AlertDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            resource: draft.resource.clone(),
            event: draft.event.clone(),
            environment: draft.environment.clone(),
            customer: draft.customer_scope().map(str::to_string),
            severity: draft.severity_name().to_string(),
            status: draft.status.unwrap_or_default(),
            correlate: draft.correlate.clone(),
            service: draft.service.clone(),
            group: draft.group.clone(),
            value: draft.value.clone(),
            text: draft.text.clone(),
            tags: draft.tags.clone(),
            attributes: draft.attributes.clone(),
            origin: draft.origin.clone(),
            event_type: draft.event_type.clone(),
            raw_data: draft.raw_data.clone(),
            timeout: draft.timeout,
            acknowledgement_duration: draft.acknowledgement_duration,
            duplicate_count: 0,
            repeat: false,
            previous_severity: None,
            trend_indication: None,
            create_time: now,
            receive_time: now,
            last_receive_id: id.to_string(),
            last_receive_time: now,
            history: Vec::new(),
        }
    }

    /// Whether `event` names this condition, directly or via `correlate`
    pub fn answers_to(&self, event: &str) -> bool {
        self.event == event || self.correlate.iter().any(|c| c == event)
    }
}

/// Inbound submission from a monitoring source.
///
/// Drafts carry identity and descriptive fields only; everything derived is
/// owned by the processor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertDraft {
    pub resource: String,
    pub event: String,
    pub environment: String,
    pub customer: Option<String>,
    pub severity: String,
    /// Defaults to open on creation and to the stored status afterwards
    pub status: Option<Status>,
    pub correlate: Vec<String>,
    pub service: Vec<String>,
    pub group: String,
    pub value: String,
    pub text: String,
    pub tags: Vec<String>,
    pub attributes: HashMap<String, String>,
    pub origin: String,
    pub event_type: String,
    pub raw_data: String,
    pub timeout: Option<u64>,
    pub acknowledgement_duration: Option<u64>,
}

impl AlertDraft {
    /// Create a draft with the identity fields and a severity
    pub fn new(resource: &str, event: &str, environment: &str, severity: &str) -> Self {
        Self {
            resource: resource.to_string(),
            event: event.to_string(),
            environment: environment.to_string(),
            severity: severity.to_string(),
            ..Default::default()
        }
    }

    /// Check that the draft can identify a condition
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.resource.trim().is_empty() {
            return Err(DraftError::MissingField("resource"));
        }
        if self.event.trim().is_empty() {
            return Err(DraftError::MissingField("event"));
        }
        if self.environment.trim().is_empty() {
            return Err(DraftError::MissingField("environment"));
        }
        Ok(())
    }

    /// Submitted severity without surrounding whitespace, or the default
    /// when none was given
    pub fn severity_name(&self) -> &str {
        match self.severity.trim() {
            "" => DEFAULT_SEVERITY,
            name => name,
        }
    }

    /// Tenant scope with blank values treated as absent
    pub fn customer_scope(&self) -> Option<&str> {
        self.customer.as_deref().filter(|c| !c.trim().is_empty())
    }
}
