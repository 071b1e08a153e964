//! Retry with exponential backoff.

use crate::error::NetworkResult;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Default number of attempts per request.
pub const DEFAULT_RETRIES: u32 = 3;

/// Default delay before the first re-attempt.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(1000);

/// Retry policy for a single logical request.
///
/// `retries` is the total number of attempts; a request that keeps failing
/// retryably is sent exactly `retries` times. Non-retryable errors abort
/// on first occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            initial_delay: DEFAULT_INITIAL_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Backoff before re-attempt `n` (zero-indexed): `initial * 2^n`.
    #[must_use]
    pub fn delay_before(&self, retry: u32) -> Duration {
        self.initial_delay * 2u32.saturating_pow(retry)
    }

    /// Runs `op` under this policy.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> NetworkResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = NetworkResult<T>>,
    {
        let attempts = self.retries.max(1);
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    if attempt + 1 >= attempts {
                        return Err(e);
                    }
                    let delay = self.delay_before(attempt);
                    warn!(
                        attempt = attempt + 1,
                        attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "request failed, retrying after backoff"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
