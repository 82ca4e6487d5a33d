//! Rate limiting for NCBI API compliance
//!
//! NCBI E-utilities rate limits:
//! - 3 requests per second without API key
//! - 10 requests per second with API key
//! - Violations can result in IP blocking
//!
//! The limiter is a gate that enforces a minimum spacing between consecutive
//! sends. Clones share the same gate, so every request path of one engine is
//! serialized through it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, instrument};

/// Longest spacing the gate will enforce, whatever rate is requested
pub const MAX_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Minimum-spacing gate shared by every request sent to NCBI
#[derive(Clone, Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_send: Arc<Mutex<Option<Instant>>>,
}

/// Held while a request is being sent; dropping it opens the gate again
#[must_use = "the gate is released as soon as the permit is dropped"]
pub struct RateLimitPermit<'a> {
    _last_send: MutexGuard<'a, Option<Instant>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the specified rate
    ///
    /// # Arguments
    ///
    /// * `rate` - Maximum requests per second (e.g., 3.0 for NCBI without API key).
    ///   Non-positive or non-finite rates disable spacing. Tiny rates are
    ///   capped at [`MAX_INTERVAL`].
    ///
    /// # Example
    ///
    /// ```
    /// use pubmed_literature::rate_limit::RateLimiter;
    /// use std::time::Duration;
    ///
    /// let limiter = RateLimiter::new(4.0);
    /// assert_eq!(limiter.min_interval(), Duration::from_millis(250));
    /// ```
    pub fn new(rate: f64) -> Self {
        let min_interval = if rate.is_finite() && rate > 0.0 {
            Duration::try_from_secs_f64(1.0 / rate).unwrap_or(MAX_INTERVAL)
        } else {
            Duration::ZERO
        };
        Self::with_min_interval(min_interval)
    }

    /// Create a rate limiter from an explicit spacing between sends
    pub fn with_min_interval(min_interval: Duration) -> Self {
        Self {
            min_interval: min_interval.min(MAX_INTERVAL),
            last_send: Arc::new(Mutex::new(None)),
        }
    }

    /// Create rate limiter for NCBI API without API key (3 requests/second)
    pub fn ncbi_default() -> Self {
        Self::new(3.0)
    }

    /// Create rate limiter for NCBI API with API key (10 requests/second)
    pub fn ncbi_with_key() -> Self {
        Self::new(10.0)
    }

    /// Minimum spacing enforced between two sends
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until a send is allowed and take the gate
    ///
    /// Waits out whatever remains of the spacing interval since the previous
    /// send, records the new send time, and returns a permit. Other callers
    /// block until the permit is dropped.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pubmed_literature::rate_limit::RateLimiter;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let limiter = RateLimiter::ncbi_default();
    ///
    ///     let permit = limiter.acquire().await;
    ///     // Send the request here
    ///     drop(permit);
    /// }
    /// ```
    #[instrument(skip(self))]
    pub async fn acquire(&self) -> RateLimitPermit<'_> {
        let mut last_send = self.last_send.lock().await;

        if let Some(previous) = *last_send {
            let next_allowed = previous + self.min_interval;
            if next_allowed > Instant::now() {
                debug!(
                    wait_ms = (next_allowed - Instant::now()).as_millis() as u64,
                    "Waiting to respect rate limit"
                );
                sleep_until(next_allowed).await;
            }
        }

        *last_send = Some(Instant::now());
        RateLimitPermit {
            _last_send: last_send,
        }
    }

    /// Time of the most recent send, if any
    pub async fn last_send(&self) -> Option<Instant> {
        *self.last_send.lock().await
    }
}
