//! Fixed-delay throttle between outbound community-service requests.

use std::time::Duration;

/// Sleeps a fixed interval between requests. The community service has no
/// published rate limit; the delay keeps sweep traffic polite. A zero
/// delay makes this a no-op, which is what tests use.
#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    delay: Duration,
}

impl Throttle {
    #[must_use]
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
        }
    }

    /// No delay at all; for tests and one-off lookups.
    #[must_use]
    pub fn none() -> Self {
        Self::new(0)
    }

    pub async fn wait(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}
