//! Fetches full contents for previously returned Exa result IDs.

use anyhow::Result;
use async_trait::async_trait;
use log::debug;

use crate::config::{Endpoint, ExaConfig};
use crate::error::ProviderError;
use crate::http::HttpClient;
use crate::retry::{RetryPolicy, with_retry};

use super::api::{ContentsRequest, ExaResponse};
use super::normalize::{DocumentStyle, normalize};
use super::{ExtractDepth, ProcessingProvider, ProcessingResult, ProviderInput, ResultMetadata};

const NAME: &str = "exa_contents";
const DESCRIPTION: &str = "Extract full content from Exa search result IDs";

/// Provider for `POST /contents`.
pub struct ExaContentsProvider {
    http_client: HttpClient,
    endpoint: Endpoint,
    retry: RetryPolicy,
}

impl ExaContentsProvider {
    /// Creates the provider, failing with `InvalidInput` when no API key is configured.
    pub fn new(http_client: HttpClient, config: &ExaConfig) -> Result<Self, ProviderError> {
        let endpoint = config.contents.resolve(NAME)?;
        debug!("{}: using {:?}", NAME, endpoint);
        Ok(Self {
            http_client,
            endpoint,
            retry: config.retry,
        })
    }

    async fn fetch(
        &self,
        request: &ContentsRequest,
        depth: ExtractDepth,
    ) -> Result<ProcessingResult> {
        let data: ExaResponse = self
            .http_client
            .post_json(
                NAME,
                &self.endpoint.url("contents"),
                self.endpoint.api_key(),
                request,
            )
            .await?;

        let count = data.results.len();
        let normalized = normalize(&data.results, DocumentStyle::FullContent);

        Ok(ProcessingResult {
            content: normalized.document,
            raw_contents: normalized.raw_contents,
            metadata: ResultMetadata {
                title: format!("Content from {} Exa results", count),
                word_count: normalized.word_count,
                urls_processed: count,
                successful_extractions: count,
                extract_depth: depth,
                original_url: None,
                request_id: data.request_id,
            },
            source_provider: NAME.to_string(),
        })
    }
}

#[async_trait]
impl ProcessingProvider for ExaContentsProvider {
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
        let ids = input.into_vec();
        if ids.is_empty() {
            return Err(ProviderError::invalid_input(
                "At least one ID must be provided",
                NAME,
            ));
        }

        debug!("{}: fetching contents for {} IDs", NAME, ids.len());
        let request = &ContentsRequest::new(ids, extract_depth);

        with_retry(NAME, &self.retry, move || async move {
            self.fetch(request, extract_depth)
                .await
                .map_err(|e| ProviderError::wrap(e, "Failed to extract contents", NAME))
        })
        .await
    }
}
