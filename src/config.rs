//! Explicit configuration handed to provider constructors.

use std::time::Duration;

use url::Url;

use crate::error::ProviderError;
use crate::retry::RetryPolicy;

/// Public Exa API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.exa.ai";

/// Default per-request timeout enforced by the HTTP client.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Raw settings for one provider, as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl ProviderSettings {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Validates the settings for `provider_name`.
    ///
    /// A missing or blank API key and an unparsable base URL are both
    /// reported as `InvalidInput`.
    pub fn resolve(&self, provider_name: &str) -> Result<Endpoint, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                ProviderError::invalid_input(
                    format!("API key not found for {}", provider_name),
                    provider_name,
                )
            })?;

        let base_url = Url::parse(&self.base_url).map_err(|e| {
            ProviderError::invalid_input(
                format!("Invalid base URL '{}': {}", self.base_url, e),
                provider_name,
            )
        })?;

        // Requests are built from the parsed form, never the raw setting.
        Ok(Endpoint {
            api_key: api_key.to_string(),
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        })
    }
}

/// Validated credentials and location of one upstream API.
#[derive(Clone, PartialEq, Eq)]
pub struct Endpoint {
    api_key: String,
    base_url: String,
}

impl Endpoint {
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins `path` onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("api_key", &mask_key(&self.api_key))
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Configuration for both Exa providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExaConfig {
    pub contents: ProviderSettings,
    pub similar: ProviderSettings,
    pub retry: RetryPolicy,
    pub timeout: Duration,
}

impl ExaConfig {
    /// Uses the same API key for both providers against the public endpoint.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            contents: ProviderSettings::new(api_key.clone()),
            similar: ProviderSettings::new(api_key),
            retry: RetryPolicy::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Points both providers at `base_url`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.contents.base_url = base_url.clone();
        self.similar.base_url = base_url;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Masks an API key for logging, keeping only a short prefix and suffix.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}*********{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_resolve_success() {
        let settings = ProviderSettings::new(Some("secret-key".into()));
        let endpoint = settings.resolve("exa_contents").unwrap();
        assert_eq!(endpoint.api_key(), "secret-key");
        assert_eq!(endpoint.base_url(), DEFAULT_BASE_URL);
        assert_eq!(endpoint.url("/contents"), "https://api.exa.ai/contents");
    }

    #[test]
    fn test_resolve_missing_key() {
        let err = ProviderSettings::new(None).resolve("exa_contents").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.provider_name(), "exa_contents");
        assert!(err.message().contains("API key not found"));
    }

    #[test]
    fn test_resolve_blank_key() {
        let err = ProviderSettings::new(Some("   ".into()))
            .resolve("exa_similar")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_resolve_invalid_base_url() {
        let settings = ProviderSettings {
            api_key: Some("key".into()),
            base_url: "not a url".into(),
        };
        let err = settings.resolve("exa_similar").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.message().contains("Invalid base URL"));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = ExaConfig::new(Some("key".into())).with_base_url("http://127.0.0.1:1234/");
        let endpoint = config.similar.resolve("exa_similar").unwrap();
        assert_eq!(endpoint.url("findSimilar"), "http://127.0.0.1:1234/findSimilar");
    }

    #[test]
    fn test_base_url_surrounding_whitespace_is_normalized() {
        let config = ExaConfig::new(Some("key".into())).with_base_url(" http://127.0.0.1:1234 ");
        let endpoint = config.contents.resolve("exa_contents").unwrap();
        assert_eq!(endpoint.base_url(), "http://127.0.0.1:1234");
        assert_eq!(endpoint.url("contents"), "http://127.0.0.1:1234/contents");
    }

    #[test]
    fn test_base_url_keeps_path_prefix() {
        let config = ExaConfig::new(Some("key".into())).with_base_url("http://proxy.local/exa/");
        let endpoint = config.similar.resolve("exa_similar").unwrap();
        assert_eq!(endpoint.url("findSimilar"), "http://proxy.local/exa/findSimilar");
    }

    #[test]
    fn test_config_shares_key_between_providers() {
        let config = ExaConfig::new(Some("shared".into()));
        assert_eq!(config.contents.api_key.as_deref(), Some("shared"));
        assert_eq!(config.similar.api_key.as_deref(), Some("shared"));
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("abcd1234efgh5678"), "abcd*********5678");
        assert_eq!(mask_key("short"), "*****");
    }

    #[test]
    fn test_endpoint_debug_hides_key() {
        let endpoint = ProviderSettings::new(Some("abcd1234efgh5678".into()))
            .resolve("exa_contents")
            .unwrap();
        let debug = format!("{:?}", endpoint);
        assert!(!debug.contains("abcd1234efgh5678"));
        assert!(debug.contains("abcd*********5678"));
    }
}
