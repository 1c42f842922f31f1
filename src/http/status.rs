//! Maps non-success upstream responses onto the error taxonomy.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};

use crate::error::{ErrorKind, ProviderError};

/// Classifies a non-success status into a `ProviderError`.
///
/// `body` is only surfaced for statuses without a dedicated message.
pub fn classify_status(provider_name: &str, status: StatusCode, body: &str) -> ProviderError {
    let (kind, message) = match status {
        StatusCode::UNAUTHORIZED => (ErrorKind::ApiError, "Invalid API key".to_string()),
        StatusCode::FORBIDDEN => (
            ErrorKind::ApiError,
            "API key does not have access to this endpoint".to_string(),
        ),
        StatusCode::TOO_MANY_REQUESTS => {
            (ErrorKind::RateLimit, "Rate limit exceeded".to_string())
        }
        s if s.is_server_error() => (
            ErrorKind::ProviderError,
            "Exa API internal error".to_string(),
        ),
        _ => (ErrorKind::ApiError, format!("Unexpected error: {}", body)),
    };

    ProviderError::with_status(kind, message, provider_name, status)
}

/// Reads a `Retry-After` header given in seconds.
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
