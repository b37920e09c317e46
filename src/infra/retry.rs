//! Exponential-backoff retry around content fetches.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use serde_json::Value;
use tracing::warn;

use crate::domain::types::{ContentKind, Locale};

use super::fetch::{ContentFetcher, FetchError};

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);
const MAX_BACKOFF_EXPONENT: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included. Zero behaves like one.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Wait before the retry that follows failed attempt `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2_u32.saturating_pow(attempt.min(MAX_BACKOFF_EXPONENT)))
    }
}

/// Run `op(attempt)` until it succeeds, fails with a non-retryable error, or the
/// policy runs out of attempts. The last error is returned on exhaustion and
/// no sleep follows the final attempt.
pub async fn fetch_with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, FetchError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        let error = match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        if !error.is_retryable() || attempt + 1 >= max_attempts {
            return Err(error);
        }

        let delay = policy.delay_for(attempt);
        counter!("atrium_content_fetch_retry_total", "class" => error.class()).increment(1);
        warn!(
            attempt = attempt + 1,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            class = error.class(),
            error = %error,
            "content fetch failed, retrying"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

/// Decorates any fetcher with [`fetch_with_retry`].
pub struct RetryingFetcher<F> {
    inner: F,
    policy: RetryPolicy,
}

impl<F> RetryingFetcher<F> {
    pub fn new(inner: F, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<F: ContentFetcher> ContentFetcher for RetryingFetcher<F> {
    async fn fetch(&self, kind: ContentKind, locale: &Locale) -> Result<Value, FetchError> {
        fetch_with_retry(&self.policy, |_| self.inner.fetch(kind, locale)).await
    }
}
