//! Change-Feed Events

use crate::alert::Alert;
use serde::{Deserialize, Serialize};

/// Kind of committed mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
}

impl ChangeKind {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Insert => "insert",
            ChangeKind::Update => "update",
        }
    }
}

/// One committed insert or update, as emitted by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Record before the mutation (absent for inserts)
    pub previous: Option<Alert>,
    /// Record after the mutation
    pub current: Alert,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn insert(current: Alert) -> Self {
        Self {
            previous: None,
            current,
            kind: ChangeKind::Insert,
        }
    }

    pub fn update(previous: Alert, current: Alert) -> Self {
        Self {
            previous: Some(previous),
            current,
            kind: ChangeKind::Update,
        }
    }

    /// Id of the record this event concerns
    pub fn alert_id(&self) -> &str {
        &self.current.id
    }

    /// True when the mutation moved severity or status (i.e. not a duplicate)
    pub fn is_state_change(&self) -> bool {
        match &self.previous {
            None => true,
            Some(prev) => {
                !prev.severity.eq_ignore_ascii_case(&self.current.severity)
                    || prev.status != self.current.status
            }
        }
    }
}
