//! Retry with exponential backoff for remote page and API fetches.
//!
//! Only transient failures are retried: network errors and 5xx responses.
//! The number of attempts is capped since every caller is waiting on a UI.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_INITIAL_DELAY_MS: u64 = 500;
pub const DEFAULT_MAX_DELAY_MS: u64 = 10_000;
pub const DEFAULT_MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    /// `None` retries until success or cancellation.
    pub max_retries: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: DEFAULT_INITIAL_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            max_retries: Some(DEFAULT_MAX_RETRIES),
        }
    }
}

/// Network errors and 5xx API responses are transient.
pub fn is_retryable(err: &AppError) -> bool {
    match err {
        AppError::Network(_) => true,
        AppError::Api(msg) => msg.starts_with("status=5"),
        AppError::Io(_)
        | AppError::NotFound(_)
        | AppError::Storage(_)
        | AppError::Unsupported(_)
        | AppError::Internal(_) => false,
    }
}

/// Backoff for the given attempt: doubling from the initial delay, capped at
/// the maximum, then spread by up to 10% in either direction.
pub fn calculate_delay(attempt: u32, policy: &RetryPolicy) -> u64 {
    let capped = policy
        .initial_delay_ms
        .saturating_mul(1u64 << attempt.min(31))
        .min(policy.max_delay_ms);
    let spread = capped / 10;
    if spread == 0 {
        return capped;
    }
    let offset = (u64::from(attempt) * 31 + 7) % (spread * 2 + 1);
    capped - spread + offset
}

/// Run `operation` until it succeeds, fails permanently, runs out of retries
/// or `cancel_flag` is raised.
pub async fn with_retry<F, Fut, T>(
    policy: &RetryPolicy,
    cancel_flag: Option<&AtomicBool>,
    what: &str,
    mut operation: F,
) -> crate::error::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = crate::error::Result<T>>,
{
    let mut attempt: u32 = 0;
    loop {
        if cancel_flag.is_some_and(|f| f.load(Ordering::Relaxed)) {
            return Err(AppError::Internal(format!("{} cancelled by user", what)));
        }
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retryable(&err) || policy.max_retries.is_some_and(|max| attempt >= max) {
                    return Err(err);
                }
                let delay = calculate_delay(attempt, policy);
                log::warn!(
                    "{} failed, retrying in {}ms: attempt={}, error={}",
                    what,
                    delay,
                    attempt,
                    err
                );
                tokio::time::sleep(Duration::from_millis(delay)).await;
                attempt = attempt.saturating_add(1);
            }
        }
    }
}
