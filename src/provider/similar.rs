//! Finds pages semantically similar to a given URL.

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, warn};
use url::Url;

use crate::config::{Endpoint, ExaConfig};
use crate::error::ProviderError;
use crate::http::HttpClient;
use crate::retry::{RetryPolicy, with_retry};

use super::api::{ExaResponse, SimilarContents, SimilarRequest, TextOptions};
use super::normalize::{DocumentStyle, PREVIEW_CHARS, normalize};
use super::{ExtractDepth, ProcessingProvider, ProcessingResult, ProviderInput, ResultMetadata};

const NAME: &str = "exa_similar";
const DESCRIPTION: &str = "Find web pages semantically similar to a given URL using Exa";

/// Provider for `POST /findSimilar`.
pub struct ExaSimilarProvider {
    http_client: HttpClient,
    endpoint: Endpoint,
    retry: RetryPolicy,
    include_domains: Vec<String>,
    exclude_domains: Vec<String>,
}

impl ExaSimilarProvider {
    /// Creates the provider, failing with `InvalidInput` when no API key is configured.
    pub fn new(http_client: HttpClient, config: &ExaConfig) -> Result<Self, ProviderError> {
        let endpoint = config.similar.resolve(NAME)?;
        debug!("{}: using {:?}", NAME, endpoint);
        Ok(Self {
            http_client,
            endpoint,
            retry: config.retry,
            include_domains: Vec::new(),
            exclude_domains: Vec::new(),
        })
    }

    /// Restricts results to these domains.
    pub fn include_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_domains = domains.into_iter().map(Into::into).collect();
        self
    }

    /// Drops results from these domains.
    pub fn exclude_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_domains = domains.into_iter().map(Into::into).collect();
        self
    }

    fn build_request(&self, url: &str, depth: ExtractDepth) -> SimilarRequest {
        let (num_results, max_characters) = match depth {
            ExtractDepth::Basic => (10, 1500),
            ExtractDepth::Advanced => (15, 3000),
        };

        SimilarRequest {
            url: url.to_string(),
            num_results,
            contents: SimilarContents {
                text: TextOptions { max_characters },
                highlights: depth.is_advanced(),
                summary: depth.is_advanced(),
                livecrawl: depth.live_crawl(),
            },
            include_domains: self.include_domains.clone(),
            exclude_domains: self.exclude_domains.clone(),
        }
    }

    async fn fetch(
        &self,
        request: &SimilarRequest,
        depth: ExtractDepth,
    ) -> Result<ProcessingResult> {
        let data: ExaResponse = self
            .http_client
            .post_json(
                NAME,
                &self.endpoint.url("findSimilar"),
                self.endpoint.api_key(),
                request,
            )
            .await?;

        let count = data.results.len();
        let normalized = normalize(
            &data.results,
            DocumentStyle::Preview {
                max_chars: PREVIEW_CHARS,
            },
        );

        let mut content = format!(
            "# Similar Pages to {}\n\nFound {} similar pages:\n\n",
            request.url, count
        );
        content.push_str(&normalized.document);

        Ok(ProcessingResult {
            content,
            raw_contents: normalized.raw_contents,
            metadata: ResultMetadata {
                title: format!("Similar pages to {}", request.url),
                word_count: normalized.word_count,
                urls_processed: count,
                successful_extractions: count,
                extract_depth: depth,
                original_url: Some(request.url.clone()),
                request_id: data.request_id,
            },
            source_provider: NAME.to_string(),
        })
    }
}

/// Picks the single URL this provider works on.
///
/// Only the first entry of a list is used; the rest are dropped with a warning.
fn target_url(input: &ProviderInput) -> Result<&str, ProviderError> {
    if input.len() > 1 {
        warn!(
            "{}: {} URLs given, only the first is used",
            NAME,
            input.len()
        );
    }

    let url = input
        .first()
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ProviderError::invalid_input("A URL must be provided", NAME))?;

    Url::parse(url).map_err(|_| ProviderError::invalid_input("Invalid URL format", NAME))?;

    Ok(url)
}

#[async_trait]
impl ProcessingProvider for ExaSimilarProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    #[tracing::instrument(skip(self))]
    async fn process(
        &self,
        input: ProviderInput,
        extract_depth: ExtractDepth,
    ) -> Result<ProcessingResult, ProviderError> {
        let url = target_url(&input)?;

        debug!("{}: finding pages similar to {}", NAME, url);
        let request = &self.build_request(url, extract_depth);

        with_retry(NAME, &self.retry, move || async move {
            self.fetch(request, extract_depth)
                .await
                .map_err(|e| ProviderError::wrap(e, "Failed to find similar pages", NAME))
        })
        .await
    }
}
