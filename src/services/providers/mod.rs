/*
 * Provider Registry (C1) and Provider Adapter (C2) machinery: the outbound protocol this service
 * speaks to upstream content sources, plus the shared rate limiter and retry policy every adapter uses.
 * I'm generalizing the teacher's GitHub pagination/rate-limit fetch loop away from its exponential
 * backoff — this path is linear (attempt * 1s), per the spec's explicit correction.
 */

pub mod json_v1;
pub mod xml_v1;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::models::content::NormalizedRecord;
use crate::models::provider::Provider;
use crate::utils::error::{AppError, Result};

/// Normalizes one upstream record feed into `NormalizedRecord`s. Implemented once per wire
/// format (`json_v1`, `xml_v1`); dispatch happens via `build_adapter`.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Fetch and normalize every available record, capped at a defensive safety limit so a
    /// misbehaving upstream can't make a sync run unbounded.
    async fn fetch_all(&self, cancel: &CancellationToken) -> Result<Vec<NormalizedRecord>>;
}

/// The maximum number of records any single adapter will pull in one sync pass.
pub const MAX_RECORDS_PER_SYNC: usize = 1000;

/// Build the adapter matching a provider's `format_tag`. New wire formats plug in here.
pub fn build_adapter(provider: &Provider, client: reqwest::Client, rate_limiter: Arc<TokenBucket>) -> Result<Box<dyn ProviderAdapter>> {
    match provider.format_tag.as_str() {
        "json_v1" => Ok(Box::new(json_v1::JsonV1Adapter::new(
            client,
            provider.feed_url.clone(),
            rate_limiter,
        ))),
        "xml_v1" => Ok(Box::new(xml_v1::XmlV1Adapter::new(
            client,
            provider.feed_url.clone(),
            rate_limiter,
        ))),
        other => Err(AppError::ConfigurationError(format!("unknown provider format_tag: {}", other))),
    }
}

/// A single-capacity token bucket refilling at a fixed rate, shared across every call an
/// adapter makes to its upstream so concurrent pagination requests still respect the limit.
pub struct TokenBucket {
    state: Mutex<TokenBucketState>,
    capacity: f64,
    refill_per_second: f64,
}

struct TokenBucketState {
    tokens: f64,
    last_refill: std::time::Instant,
}

impl TokenBucket {
    pub fn new(capacity: u32, refill_per_second: u32) -> Self {
        Self {
            state: Mutex::new(TokenBucketState {
                tokens: capacity as f64,
                last_refill: std::time::Instant::now(),
            }),
            capacity: capacity as f64,
            refill_per_second: refill_per_second as f64,
        }
    }

    /// Block until a token is available, then consume it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                let now = std::time::Instant::now();
                let elapsed = now.duration_since(state.last_refill).as_secs_f64();
                state.tokens = (state.tokens + elapsed * self.refill_per_second).min(self.capacity);
                state.last_refill = now;

                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    None
                } else {
                    let deficit = 1.0 - state.tokens;
                    Some(Duration::from_secs_f64(deficit / self.refill_per_second))
                }
            };

            match wait {
                None => return,
                Some(duration) => tokio::time::sleep(duration).await,
            }
        }
    }
}

/// Linear retry backoff: attempt N sleeps `N` seconds before the next try. This is an explicit,
/// binding correction over the teacher's exponential `async_utils::retry_with_backoff` — that
/// helper is intentionally not reused on this path.
pub async fn retry_linear<F, Fut, T>(max_attempts: u32, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut last_err = None;
    for attempt in 1..=max_attempts {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < max_attempts => {
                warn!("provider call failed (attempt {}/{}): {}", attempt, max_attempts, err);
                tokio::time::sleep(Duration::from_secs(attempt as u64)).await;
                last_err = Some(err);
            }
            Err(err) => return Err(err),
        }
    }
    Err(last_err.unwrap_or_else(|| AppError::internal("retry loop exited without a result")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn token_bucket_allows_burst_up_to_capacity() {
        let bucket = TokenBucket::new(1, 1);
        bucket.acquire().await;
    }

    #[tokio::test]
    async fn retry_linear_gives_up_after_max_attempts() {
        let attempts = std::sync::atomic::AtomicU32::new(0);
        let result: Result<()> = retry_linear(3, || {
            attempts.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            async { Err(AppError::TimeoutError("always fails".to_string())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(attempts.load(std::sync::atomic::Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retry_linear_does_not_retry_non_retryable_errors() {
        let attempts = std::sync::atomic::AtomicU32::new(0);
        let result: Result<()> = retry_linear(3, || {
            attempts.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            async { Err(AppError::bad_request("never retry this")) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(attempts.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
