//! Tavily 검색 구현체
//!
//! source: https://docs.tavily.com/documentation/api-reference/endpoint/search

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{SearchOptions, SearchResponse, SearchResult, WebSearch};
use crate::config::TavilyConfig;
use crate::error::with_call_timeout;

/// Tavily 검색 클라이언트
pub struct TavilySearch {
    config: TavilyConfig,
    client: reqwest::Client,
}

impl TavilySearch {
    pub fn new(config: TavilyConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { config, client })
    }

    async fn post_search(&self, query: &str, options: &SearchOptions) -> Result<SearchResponse> {
        let request = TavilyRequest {
            query,
            max_results: options.max_results,
            include_answer: options.include_answer,
            include_raw_content: options.include_raw_content,
            include_images: options.include_images,
            include_domains: &options.include_domains,
        };

        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send Tavily search request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read search response body")?;

        if !status.is_success() {
            anyhow::bail!("Tavily API error ({}): {}", status, body);
        }

        let parsed: TavilyResponse =
            serde_json::from_str(&body).context("Failed to parse search response")?;

        let results = parsed
            .results
            .into_iter()
            .filter_map(|r| match Url::parse(&r.url) {
                Ok(url) => Some(SearchResult {
                    title: r.title,
                    url,
                    snippet: r.content,
                }),
                Err(e) => {
                    tracing::warn!("Skipping search result with invalid URL {}: {}", r.url, e);
                    None
                }
            })
            .take(options.max_results)
            .collect();

        Ok(SearchResponse {
            answer: parsed.answer.filter(|a| !a.trim().is_empty()),
            results,
        })
    }
}

#[async_trait]
impl WebSearch for TavilySearch {
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<SearchResponse> {
        with_call_timeout(self.config.timeout, self.post_search(query, options)).await
    }

    fn name(&self) -> &str {
        "Tavily"
    }
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    max_results: usize,
    include_answer: bool,
    include_raw_content: bool,
    include_images: bool,
    include_domains: &'a [String],
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    url: String,
    #[serde(default)]
    content: String,
}

// ============================================================================
// Tests
// ============================================================================
