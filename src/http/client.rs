//! HTTP client wrapper used by every provider.

use std::sync::Arc;

use anyhow::{Context, Result};
use log::debug;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::status::{classify_status, retry_after};
use crate::config::ExaConfig;
use crate::rate_limit::{RateLimitHandler, RateLimitTracker};

/// Header carrying the Exa API key.
const API_KEY_HEADER: &str = "x-api-key";

/// HTTP client issuing single JSON requests against the upstream API.
///
/// Retrying is left to the caller; a 429 response is reported to the
/// configured [`RateLimitHandler`] before the error is returned.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    rate_limits: Arc<dyn RateLimitHandler>,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self::with_rate_limit_handler(client, Arc::new(RateLimitTracker::new()))
    }

    pub fn with_rate_limit_handler(client: Client, rate_limits: Arc<dyn RateLimitHandler>) -> Self {
        Self {
            client,
            rate_limits,
        }
    }

    /// Builds the underlying reqwest Client from the configured timeout.
    pub fn from_config(config: &ExaConfig, rate_limits: Arc<dyn RateLimitHandler>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("exa-retrieval/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self::with_rate_limit_handler(client, rate_limits))
    }

    /// Performs a single POST with a JSON body and deserializes the JSON response.
    ///
    /// Non-success statuses become a [`crate::error::ProviderError`] inside the
    /// returned `anyhow::Error`; transport and decoding failures keep their context.
    #[tracing::instrument(skip(self, api_key, body))]
    pub async fn post_json<B, T>(
        &self,
        provider_name: &str,
        url: &str,
        api_key: &str,
        body: &B,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST JSON to {}...", url);

        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, api_key)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        if !status.is_success() {
            if status == StatusCode::TOO_MANY_REQUESTS {
                self.rate_limits
                    .on_rate_limit(provider_name, retry_after(response.headers()));
            }
            let body = response.text().await.unwrap_or_default();
            debug!("{}: upstream answered {}", provider_name, status);
            return Err(classify_status(provider_name, status, &body).into());
        }

        let result = response
            .json::<T>()
            .await
            .context("Failed to parse JSON response")?;

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, ProviderError};
    use crate::rate_limit::MockRateLimitHandler;
    use mockall::predicate::eq;
    use mockito::Matcher;
    use std::time::Duration;

    #[derive(serde::Deserialize, Debug, PartialEq)]
    struct TestResponse {
        name: String,
        value: i32,
    }

    #[tokio::test]
    async fn test_post_json_success() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("POST", "/test")
            .match_header("x-api-key", "test-key")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(serde_json::json!({"ids": ["a", "b"]})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name": "test", "value": 42}"#)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result: TestResponse = client
            .post_json(
                "exa_contents",
                &format!("{}/test", url),
                "test-key",
                &serde_json::json!({"ids": ["a", "b"]}),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result.name, "test");
        assert_eq!(result.value, 42);
    }

    #[tokio::test]
    async fn test_post_json_unauthorized_is_typed() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("POST", "/test")
            .with_status(401)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result: Result<serde_json::Value> = client
            .post_json("exa_contents", &format!("{}/test", url), "bad", &())
            .await;

        mock.assert_async().await;
        let err = result.unwrap_err();
        let provider_error = err.downcast_ref::<ProviderError>().unwrap();
        assert_eq!(provider_error.kind(), ErrorKind::ApiError);
        assert_eq!(provider_error.status(), Some(401));
    }

    #[tokio::test]
    async fn test_post_json_rate_limit_invokes_handler() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("POST", "/test")
            .with_status(429)
            .with_header("retry-after", "3")
            .create_async()
            .await;

        let mut handler = MockRateLimitHandler::new();
        handler
            .expect_on_rate_limit()
            .with(eq("exa_similar"), eq(Some(Duration::from_secs(3))))
            .times(1)
            .return_const(());

        let client = HttpClient::with_rate_limit_handler(Client::new(), Arc::new(handler));
        let result: Result<serde_json::Value> = client
            .post_json("exa_similar", &format!("{}/test", url), "key", &())
            .await;

        mock.assert_async().await;
        let err = result.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ProviderError>().unwrap().kind(),
            ErrorKind::RateLimit
        );
    }

    #[tokio::test]
    async fn test_post_json_invalid_json_is_untyped() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let _mock = server
            .mock("POST", "/test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("not json")
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result: Result<TestResponse> = client
            .post_json("exa_contents", &format!("{}/test", url), "key", &())
            .await;

        let err = result.unwrap_err();
        assert!(err.downcast_ref::<ProviderError>().is_none());
        assert!(err.to_string().contains("Failed to parse JSON response"));
    }

    #[tokio::test]
    async fn test_post_json_connection_failure() {
        let client = HttpClient::new(Client::new());
        let result: Result<TestResponse> = client
            .post_json("exa_contents", "http://127.0.0.1:1/test", "key", &())
            .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to send request"));
    }

    #[test]
    fn test_from_config_builds_client() {
        let config = ExaConfig::new(Some("key".into()));
        let client = HttpClient::from_config(&config, Arc::new(RateLimitTracker::new()));
        assert!(client.is_ok());
    }
}
