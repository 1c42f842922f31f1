//! Error taxonomy shared by every provider.

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// The closed set of failure kinds a provider can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller-supplied arguments failed validation (empty ID list, bad URL, missing key).
    InvalidInput,
    /// Authentication/authorization failure, or any unclassified upstream failure.
    ApiError,
    /// Upstream signaled request-rate exhaustion (HTTP 429).
    RateLimit,
    /// Upstream reported an internal server error (HTTP 5xx).
    ProviderError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "INVALID_INPUT",
            ErrorKind::ApiError => "API_ERROR",
            ErrorKind::RateLimit => "RATE_LIMIT",
            ErrorKind::ProviderError => "PROVIDER_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure attributed to a single provider.
///
/// Constructed once at the failure point and never mutated afterwards. The
/// optional HTTP status is only consulted by the retry predicate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{provider_name}] {kind}: {message}")]
pub struct ProviderError {
    kind: ErrorKind,
    message: String,
    provider_name: String,
    status: Option<u16>,
}

impl ProviderError {
    pub fn new(
        kind: ErrorKind,
        message: impl Into<String>,
        provider_name: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            provider_name: provider_name.into(),
            status: None,
        }
    }

    /// Builds an error tied to the upstream HTTP status that produced it.
    pub fn with_status(
        kind: ErrorKind,
        message: impl Into<String>,
        provider_name: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            status: Some(status.as_u16()),
            ..Self::new(kind, message, provider_name)
        }
    }

    pub fn invalid_input(message: impl Into<String>, provider_name: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message, provider_name)
    }

    /// Converts an arbitrary failure into a `ProviderError`.
    ///
    /// A `ProviderError` (with or without added context) passes through
    /// unchanged; anything else becomes an `ApiError` whose message is
    /// `"<context>: <error chain>"`.
    pub fn wrap(error: anyhow::Error, context: &str, provider_name: &str) -> Self {
        match error.downcast::<ProviderError>() {
            Ok(provider_error) => provider_error,
            Err(other) => Self::new(
                ErrorKind::ApiError,
                format!("{}: {:#}", context, other),
                provider_name,
            ),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    /// Upstream HTTP status, when the error came from a non-success response.
    pub fn status(&self) -> Option<u16> {
        self.status
    }
}
