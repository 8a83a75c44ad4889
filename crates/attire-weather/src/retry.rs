//! Retry with exponential backoff for transient transport failures.
//!
//! Retried: timeouts, connection failures, 5xx, 429, 408.
//! Not retried: other 4xx and anything that is not a transport failure.

use std::future::Future;
use std::time::Duration;

use crate::types::TransportError;

const DEFAULT_MAX_DELAY_SECS: u64 = 30;

/// Retry policy: `n_retries` additional attempts after the first, with a
/// delay of `backoff_factor * 2^k` seconds before retry `k` (0-based).
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub n_retries: u32,
    pub backoff_factor: f64,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            n_retries: 1,
            backoff_factor: 0.2,
            max_delay: Duration::from_secs(DEFAULT_MAX_DELAY_SECS),
        }
    }
}

impl RetryConfig {
    pub fn new(n_retries: u32, backoff_factor: f64) -> Self {
        Self {
            n_retries,
            backoff_factor,
            max_delay: Duration::from_secs(DEFAULT_MAX_DELAY_SECS),
        }
    }

    /// Delay before the given retry (0-based), capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2f64.powi(attempt.min(i32::MAX as u32) as i32);
        let delay = self.backoff_factor.max(0.0) * factor;
        Duration::from_secs_f64(delay.min(self.max_delay.as_secs_f64()))
    }
}

/// Drive an async operation through the retry policy.
///
/// Makes `n_retries + 1` attempts at most; non-retryable errors return
/// immediately.
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, operation: F) -> Result<T, TransportError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, TransportError>>,
{
    let mut attempt = 0;
    loop {
        if attempt > 0 {
            let delay = config.delay_for_attempt(attempt - 1);
            tracing::info!(
                "Retry attempt {} of {}, waiting {:?}",
                attempt,
                config.n_retries,
                delay
            );
            tokio::time::sleep(delay).await;
        }

        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!("Request succeeded after {} retries", attempt);
                }
                return Ok(value);
            }
            Err(e) if !e.is_retryable() => {
                tracing::debug!("Non-retryable error: {}", e);
                return Err(e);
            }
            Err(e) if attempt >= config.n_retries => {
                tracing::error!("All {} attempts exhausted", config.n_retries + 1);
                return Err(e);
            }
            Err(e) => {
                tracing::warn!(
                    "Retryable error on attempt {} of {}: {}",
                    attempt + 1,
                    config.n_retries + 1,
                    e
                );
            }
        }

        attempt += 1;
    }
}
