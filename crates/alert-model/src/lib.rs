//! Alert Data Model
//!
//! Shared types for the correlation engine and the notification pipeline:
//! the canonical [`Alert`] record and its history, inbound drafts, the
//! severity ranking table used for trend computation, identity keys and
//! change-feed events.

mod alert;
mod change;
mod error;
mod identity;
mod severity;

pub use alert::{Alert, AlertDraft, HistoryEvent, Status};
pub use change::{ChangeEvent, ChangeKind};
pub use error::DraftError;
pub use identity::IdentityKey;
pub use severity::{Severity, TrendIndication, DEFAULT_SEVERITY};
