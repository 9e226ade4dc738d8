//! Reconnect backoff

use std::time::Duration;

/// Exponential delay sequence capped at `max`
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    factor: f64,
    current: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration, factor: f64) -> Self {
        let initial = initial.min(max);
        Self {
            initial,
            max,
            factor: factor.max(1.0),
            current: initial,
        }
    }

    /// Delay to wait now; the following call returns a longer one
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        // a product too large for Duration saturates at the cap
        self.current = Duration::try_from_secs_f64(self.current.as_secs_f64() * self.factor)
            .map_or(self.max, |grown| grown.min(self.max));
        delay
    }

    /// Start over from the initial delay after a healthy period
    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}
