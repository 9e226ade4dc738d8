//! Change-Feed Consumer
//!
//! Long-lived task that reads committed alert changes from the store and
//! hands them to the notification dispatcher, re-subscribing with bounded
//! exponential backoff whenever the feed is lost.

mod backoff;
mod consumer;

pub use backoff::Backoff;
pub use consumer::{ChangeFeedConsumer, FeedConfig};
