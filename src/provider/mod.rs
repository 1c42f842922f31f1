//! Content-retrieval providers backed by the Exa API.
//!
//! Every provider performs one upstream call per invocation (with retries) and
//! normalizes the response into a [`ProcessingResult`].

mod api;
mod contents;
mod normalize;
mod similar;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ProviderError;

pub use contents::ExaContentsProvider;
pub use similar::ExaSimilarProvider;

/// How much content and metadata to request upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExtractDepth {
    #[default]
    Basic,
    Advanced,
}

impl ExtractDepth {
    pub fn is_advanced(self) -> bool {
        self == ExtractDepth::Advanced
    }

    /// Live-crawl preference sent alongside this depth.
    pub fn live_crawl(self) -> LiveCrawl {
        match self {
            ExtractDepth::Basic => LiveCrawl::Fallback,
            ExtractDepth::Advanced => LiveCrawl::Preferred,
        }
    }
}

impl fmt::Display for ExtractDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractDepth::Basic => write!(f, "basic"),
            ExtractDepth::Advanced => write!(f, "advanced"),
        }
    }
}

impl FromStr for ExtractDepth {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(ExtractDepth::Basic),
            "advanced" => Ok(ExtractDepth::Advanced),
            _ => anyhow::bail!("Unknown extract depth: {}. Expected basic or advanced.", s),
        }
    }
}

/// Upstream freshness preference for crawled content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiveCrawl {
    Always,
    Fallback,
    Preferred,
}

/// Input accepted by a provider: a single value or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderInput {
    One(String),
    Many(Vec<String>),
}

impl ProviderInput {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            ProviderInput::One(value) => vec![value],
            ProviderInput::Many(values) => values,
        }
    }

    pub fn first(&self) -> Option<&str> {
        match self {
            ProviderInput::One(value) => Some(value),
            ProviderInput::Many(values) => values.first().map(String::as_str),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ProviderInput::One(_) => 1,
            ProviderInput::Many(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for ProviderInput {
    fn from(value: &str) -> Self {
        ProviderInput::One(value.to_string())
    }
}

impl From<String> for ProviderInput {
    fn from(value: String) -> Self {
        ProviderInput::One(value)
    }
}

impl From<Vec<String>> for ProviderInput {
    fn from(values: Vec<String>) -> Self {
        ProviderInput::Many(values)
    }
}

impl From<Vec<&str>> for ProviderInput {
    fn from(values: Vec<&str>) -> Self {
        ProviderInput::Many(values.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for ProviderInput {
    fn from(values: &[&str]) -> Self {
        ProviderInput::Many(values.iter().map(|v| v.to_string()).collect())
    }
}

/// Text extracted for a single upstream result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawContent {
    pub url: String,
    pub content: String,
}

/// Summary of one provider invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultMetadata {
    pub title: String,
    pub word_count: usize,
    pub urls_processed: usize,
    pub successful_extractions: usize,
    pub extract_depth: ExtractDepth,
    /// URL the similarity search started from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
    /// Upstream request identifier.
    #[serde(rename = "requestId", default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Output of a successful provider invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingResult {
    /// Combined markdown document covering every result.
    pub content: String,
    /// One entry per upstream result, in response order.
    pub raw_contents: Vec<RawContent>,
    pub metadata: ResultMetadata,
    pub source_provider: String,
}

/// A content-retrieval provider.
#[async_trait]
pub trait ProcessingProvider: Send + Sync {
    /// Stable provider name used for error attribution.
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Runs one retrieval. Either every result is normalized or the call fails.
    async fn process(
        &self,
        input: ProviderInput,
        extract_depth: ExtractDepth,
    ) -> Result<ProcessingResult, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_depth_parse() {
        assert_eq!("basic".parse::<ExtractDepth>().unwrap(), ExtractDepth::Basic);
        assert_eq!(
            "Advanced".parse::<ExtractDepth>().unwrap(),
            ExtractDepth::Advanced
        );
        assert!("deep".parse::<ExtractDepth>().is_err());
    }

    #[test]
    fn test_extract_depth_display_and_default() {
        assert_eq!(ExtractDepth::default(), ExtractDepth::Basic);
        assert_eq!(ExtractDepth::Basic.to_string(), "basic");
        assert_eq!(ExtractDepth::Advanced.to_string(), "advanced");
    }

    #[test]
    fn test_extract_depth_live_crawl() {
        assert_eq!(ExtractDepth::Basic.live_crawl(), LiveCrawl::Fallback);
        assert_eq!(ExtractDepth::Advanced.live_crawl(), LiveCrawl::Preferred);
        assert_eq!(
            serde_json::to_value(LiveCrawl::Preferred).unwrap(),
            serde_json::json!("preferred")
        );
    }

    #[test]
    fn test_provider_input_conversions() {
        let one = ProviderInput::from("abc");
        assert_eq!(one.first(), Some("abc"));
        assert_eq!(one.len(), 1);

        let many = ProviderInput::from(vec!["a", "b"]);
        assert_eq!(many.first(), Some("a"));
        assert_eq!(many.clone().into_vec(), vec!["a".to_string(), "b".to_string()]);

        let ids: &[&str] = &["id-1", "id-2", "id-3"];
        let slice = ProviderInput::from(ids);
        assert_eq!(slice.len(), 3);
        assert_eq!(slice.first(), Some("id-1"));

        let empty = ProviderInput::from(Vec::<String>::new());
        assert!(empty.is_empty());
        assert_eq!(empty.first(), None);
    }

    #[test]
    fn test_metadata_serialization_keys() {
        let metadata = ResultMetadata {
            title: "Similar pages to https://example.com".into(),
            word_count: 3,
            urls_processed: 1,
            successful_extractions: 1,
            extract_depth: ExtractDepth::Advanced,
            original_url: Some("https://example.com".into()),
            request_id: Some("req-1".into()),
        };

        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["extract_depth"], "advanced");
        assert_eq!(json["requestId"], "req-1");
        assert_eq!(json["original_url"], "https://example.com");
    }
}
