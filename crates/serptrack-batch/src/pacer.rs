//! Inter-request pacing for the batch loop.

use std::time::Duration;

/// Fixed-interval pacer applied between consecutive keyword searches.
///
/// The pause is unconditional and not adaptive. Holding it as a value on
/// the runner keeps the loop logic untouched if the pacing policy is ever
/// replaced with adaptive backoff.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    interval: Duration,
}

impl Pacer {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    #[must_use]
    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    /// Sleeps for the configured interval. A zero interval returns
    /// immediately, which tests rely on.
    pub async fn pause(&self) {
        if !self.interval.is_zero() {
            tokio::time::sleep(self.interval).await;
        }
    }
}

impl Default for Pacer {
    /// 100 ms between provider requests, the rate Serper tolerates without
    /// throttling sequential traffic.
    fn default() -> Self {
        Self::from_millis(100)
    }
}
