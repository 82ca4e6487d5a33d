//! Retry policy with exponential backoff for NCBI requests
//!
//! The attempt counter lives inside a single [`with_retry`] call; nothing is
//! shared between calls.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};

/// Classification of an error for the retry loop
pub(crate) trait RetryableError {
    /// Whether the failure is transient and the request may be sent again
    fn is_retryable(&self) -> bool;

    /// Short human-readable reason, used in log fields
    fn retry_reason(&self) -> &str;
}

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Randomize delays to avoid synchronized retries
    pub use_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            use_jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the total number of attempts (values below 1 are treated as 1)
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.use_jitter = false;
        self
    }

    /// A policy that sends every request exactly once
    pub fn no_retry() -> Self {
        Self::default().with_max_attempts(1)
    }

    /// Delay schedule: `initial`, `2 * initial`, `4 * initial`, ... capped at `max_delay`
    pub(crate) fn backoff(&self) -> impl Iterator<Item = Duration> + use<> {
        // ExponentialBackoff yields 2^n * factor milliseconds, starting at n = 1
        let factor = (self.initial_delay.as_millis() as u64 / 2).max(1);
        let use_jitter = self.use_jitter;

        ExponentialBackoff::from_millis(2)
            .factor(factor)
            .max_delay(self.max_delay)
            .map(move |delay| if use_jitter { jitter(delay) } else { delay })
    }
}

/// Run `operation` until it succeeds, fails permanently, or runs out of attempts
///
/// Returns the final result together with the number of retries consumed
/// (attempts after the first one).
pub(crate) async fn with_retry<T, E, F, Fut>(
    mut operation: F,
    config: &RetryConfig,
    context: &str,
) -> (Result<T, E>, u32)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryableError + Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut delays = config.backoff();
    let mut retries = 0u32;

    loop {
        match operation().await {
            Ok(value) => {
                if retries > 0 {
                    info!(context, retries, "Operation succeeded after retrying");
                }
                return (Ok(value), retries);
            }
            Err(err) if !err.is_retryable() => {
                debug!(context, reason = err.retry_reason(), error = %err, "Permanent failure, not retrying");
                return (Err(err), retries);
            }
            Err(err) if retries + 1 >= max_attempts => {
                warn!(
                    context,
                    attempts = retries + 1,
                    reason = err.retry_reason(),
                    error = %err,
                    "Giving up after exhausting retry attempts"
                );
                return (Err(err), retries);
            }
            Err(err) => {
                let delay = delays.next().unwrap_or(config.max_delay);
                warn!(
                    context,
                    attempt = retries + 1,
                    delay_ms = delay.as_millis() as u64,
                    reason = err.retry_reason(),
                    error = %err,
                    "Transient failure, retrying"
                );
                sleep(delay).await;
                retries += 1;
            }
        }
    }
}
