//! Alert Identity & Correlation Engine
//!
//! Decides whether an incoming alert is a new condition, a duplicate of an
//! existing one, or a state change of a correlated condition, and writes the
//! canonical record back through the persistence gateway.

mod error;
mod history;
mod processor;
mod resolver;
mod service;
mod transition;

pub use error::AlertError;
pub use history::record_history;
pub use processor::{AlertProcessor, Processed};
pub use resolver::IdentityResolver;
pub use service::AlertService;
pub use transition::{apply_submission, create_alert, Outcome, Transition};
