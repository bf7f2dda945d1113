use crate::types::{RetryConfig, RetryResult};
use crate::{IngestError, Result};
use std::future::Future;

/// Delay before retry number `retries` (0-based) after a rate limit.
///
/// Spotify's `Retry-After` is honoured as the floor; exponential backoff on
/// top of it is capped at `max_delay`.
pub fn backoff_delay(config: &RetryConfig, retry_after: u64, retries: u32) -> u64 {
    let base_backoff = config
        .base_delay
        .saturating_mul(2_u64.saturating_pow(retries));
    std::cmp::max(
        retry_after,
        std::cmp::min(retry_after.saturating_add(base_backoff), config.max_delay),
    )
}

/// Execute an async operation with retry logic for rate limiting
///
/// Only [`IngestError::RateLimit`] is retried; every other error is returned
/// immediately.
///
/// # Arguments
/// * `config` - Retry configuration
/// * `operation_name` - Name of the operation for logging
/// * `operation` - Async function that returns a Result
/// * `on_rate_limit` - Callback for rate limit events (delay in seconds)
pub async fn retry_with_backoff<T, F, Fut, OnRateLimit>(
    config: RetryConfig,
    operation_name: &str,
    mut operation: F,
    mut on_rate_limit: OnRateLimit,
) -> Result<RetryResult<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    OnRateLimit: FnMut(u64, &str),
{
    let mut retries = 0;
    let mut total_retry_time = 0;

    loop {
        match operation().await {
            Ok(result) => {
                return Ok(RetryResult {
                    result,
                    attempts_made: retries,
                    total_retry_time,
                });
            }
            Err(IngestError::RateLimit { retry_after }) => {
                if !config.enabled || retries >= config.max_retries {
                    log::warn!(
                        "Max retries ({}) exceeded for {} operation",
                        config.max_retries,
                        operation_name
                    );
                    return Err(IngestError::RateLimit { retry_after });
                }

                let delay = backoff_delay(&config, retry_after, retries);

                log::info!(
                    "{} rate limited. Waiting {} seconds before retry {} of {}",
                    operation_name,
                    delay,
                    retries + 1,
                    config.max_retries
                );

                on_rate_limit(delay, operation_name);

                tokio::time::sleep(std::time::Duration::from_secs(delay)).await;
                retries += 1;
                total_retry_time += delay;
            }
            Err(other_error) => {
                return Err(other_error);
            }
        }
    }
}
