//! Retry with exponential backoff and jitter around a single logical push.
//!
//! Attempts are counted from 1. After a retryable failure of attempt `n`
//! (with `n <= max_retries`) the sender waits
//! `base_interval * 2^(n-1) + uniform(0, base_jitter)` and tries again, so a
//! permanently rate-limited send makes `max_retries + 1` calls in total.
//! The retry key is fixed for the whole loop.

use std::time::Duration;

use rand::Rng;
use uuid::Uuid;

use ballpark_common::types::PushMessage;

use crate::{PushError, PushProvider};

/// Backoff parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub base_interval: Duration,
    /// Exclusive upper bound of the random jitter
    pub base_jitter: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_interval: Duration, base_jitter: Duration) -> Self {
        Self {
            max_retries,
            base_interval,
            base_jitter,
        }
    }

    /// Wait before the attempt following failed attempt `attempt`, without jitter.
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(20);
        self.base_interval.saturating_mul(1u32 << exp)
    }

    /// `base_delay` plus a random jitter in `[0, base_jitter)`.
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay(attempt) + self.jitter()
    }

    fn jitter(&self) -> Duration {
        let bound = self.base_jitter.as_millis() as u64;
        if bound == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..bound))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1000), Duration::from_millis(250))
    }
}

/// Push `messages` to `to`, retrying rate-limit and provider-internal errors.
///
/// Any other error, or a retryable error once the retry budget is spent, is
/// returned as-is.
pub async fn send_with_retry(
    provider: &dyn PushProvider,
    policy: &RetryPolicy,
    token: &str,
    retry_key: Uuid,
    to: &str,
    messages: &[PushMessage],
) -> Result<(), PushError> {
    let mut attempt: u32 = 1;

    loop {
        match provider.push(token, retry_key, to, messages).await {
            Ok(()) => return Ok(()),
            Err(e) if e.is_retryable() && attempt <= policy.max_retries => {
                let wait = policy.delay(attempt);
                tracing::debug!(
                    attempt,
                    wait_ms = wait.as_millis() as u64,
                    retry_key = %retry_key,
                    error = %e,
                    "Push failed, retrying"
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
