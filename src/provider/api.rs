//! Exa API wire types (internal).

use serde::{Deserialize, Serialize};

use super::{ExtractDepth, LiveCrawl};

/// Body of `POST /contents`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ContentsRequest {
    pub ids: Vec<String>,
    pub text: bool,
    pub highlights: bool,
    pub summary: bool,
    pub livecrawl: LiveCrawl,
}

impl ContentsRequest {
    pub fn new(ids: Vec<String>, depth: ExtractDepth) -> Self {
        Self {
            ids,
            text: true,
            highlights: depth.is_advanced(),
            summary: depth.is_advanced(),
            livecrawl: depth.live_crawl(),
        }
    }
}

/// Body of `POST /findSimilar`.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SimilarRequest {
    pub url: String,
    pub num_results: u32,
    pub contents: SimilarContents,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include_domains: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude_domains: Vec<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SimilarContents {
    pub text: TextOptions,
    pub highlights: bool,
    pub summary: bool,
    pub livecrawl: LiveCrawl,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TextOptions {
    pub max_characters: u32,
}

/// One result record, shared by both endpoints.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExaResult {
    #[serde(default)]
    pub title: Option<String>,
    pub url: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub highlights: Option<Vec<String>>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExaResponse {
    pub results: Vec<ExaResult>,
    #[serde(default)]
    pub request_id: Option<String>,
}
