//! Retry logic for upstream calls with exponential backoff and taxonomy-based classification.

use std::future::Future;
use std::time::Duration;

use log::{debug, warn};

use crate::error::{ErrorKind, ProviderError};

/// Maximum number of attempts (the first call plus three retries).
pub const MAX_ATTEMPTS: usize = 4;

/// Delay before the first retry in milliseconds.
pub const INITIAL_DELAY_MS: u64 = 1000;

/// Factor applied to the delay after each failed attempt.
pub const BACKOFF_MULTIPLIER: u32 = 2;

/// Upper bound for a single backoff delay in milliseconds.
pub const MAX_DELAY_MS: u64 = 30_000;

/// Backoff parameters shared by every provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub initial_delay: Duration,
    pub multiplier: u32,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            initial_delay: Duration::from_millis(INITIAL_DELAY_MS),
            multiplier: BACKOFF_MULTIPLIER,
            max_delay: Duration::from_millis(MAX_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(1).min(u32::MAX as usize) as u32;
        let factor = self.multiplier.saturating_pow(exponent);
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Default retryability predicate over the error taxonomy.
///
/// Rate limits and upstream server errors are retried. An `ApiError` is retried
/// only when it carries no HTTP status, i.e. a transport or decoding failure;
/// authentication, authorization and other client errors are final.
pub fn is_retryable(error: &ProviderError) -> bool {
    match error.kind() {
        ErrorKind::InvalidInput => false,
        ErrorKind::RateLimit | ErrorKind::ProviderError => true,
        ErrorKind::ApiError => error.status().is_none(),
    }
}

/// Executes an async operation, retrying failures accepted by [`is_retryable`].
pub async fn with_retry<F, Fut, T>(
    operation_name: &str,
    policy: &RetryPolicy,
    operation: F,
) -> Result<T, ProviderError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    with_retry_if(operation_name, policy, is_retryable, operation).await
}

/// Executes an async operation, retrying failures accepted by `should_retry`.
///
/// Non-retryable errors are returned immediately. When attempts run out the
/// last error is returned unchanged.
pub async fn with_retry_if<F, Fut, T, P>(
    operation_name: &str,
    policy: &RetryPolicy,
    should_retry: P,
    operation: F,
) -> Result<T, ProviderError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
    P: Fn(&ProviderError) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let error = match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => e,
        };

        if !should_retry(&error) {
            debug!("{}: non-retryable error: {}", operation_name, error);
            return Err(error);
        }

        if attempt >= max_attempts {
            warn!(
                "{}: giving up after {} attempts ({})",
                operation_name, max_attempts, error
            );
            return Err(error);
        }

        let delay = policy.delay_for(attempt);
        warn!(
            "{}: attempt {}/{} failed ({}), retrying in {}ms...",
            operation_name,
            attempt,
            max_attempts,
            error,
            delay.as_millis()
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
