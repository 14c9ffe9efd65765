//! 웹 검색 모듈
//!
//! 단일 도메인으로 제한된 외부 웹 검색 인터페이스와 Tavily 구현체,
//! 그리고 검색을 모델 도구로 노출하는 `SearchTool`을 제공합니다.

mod tavily;

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::llm::Tool;

pub use tavily::TavilySearch;

/// 파이프라인이 유지하는 최대 검색 결과 수
pub const MAX_SEARCH_RESULTS: usize = 3;

// ============================================================================
// Types
// ============================================================================

/// 검색 결과 항목
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: Url,
    pub snippet: String,
}

/// 검색 응답
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResponse {
    /// 검색 서비스가 요약한 답변 (include_answer)
    pub answer: Option<String>,
    pub results: Vec<SearchResult>,
}

/// 검색 옵션
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub max_results: usize,
    pub include_answer: bool,
    pub include_raw_content: bool,
    pub include_images: bool,
    /// 결과를 제한할 도메인 목록
    pub include_domains: Vec<String>,
}

impl SearchOptions {
    /// 한 도메인으로 제한된 기본 옵션 (최대 3건, 요약 포함)
    pub fn for_domain(domain: impl Into<String>) -> Self {
        Self {
            max_results: MAX_SEARCH_RESULTS,
            include_answer: true,
            include_raw_content: false,
            include_images: false,
            include_domains: vec![domain.into()],
        }
    }
}

// ============================================================================
// WebSearch Trait
// ============================================================================

/// 웹 검색 트레이트
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// 검색 실행
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<SearchResponse>;

    /// 검색 서비스 이름 (reasoning 라벨에 사용)
    fn name(&self) -> &str;
}

// ============================================================================
// SearchTool
// ============================================================================

/// 모델이 호출하는 검색 도구 이름
pub const SEARCH_TOOL_NAME: &str = "tavily_search_results_json";

/// `WebSearch`를 모델 도구로 감싼 어댑터
pub struct SearchTool {
    search: Arc<dyn WebSearch>,
    options: SearchOptions,
}

impl SearchTool {
    pub fn new(search: Arc<dyn WebSearch>, options: SearchOptions) -> Self {
        Self { search, options }
    }
}

#[derive(Debug, Deserialize)]
struct SearchToolArgs {
    query: String,
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        SEARCH_TOOL_NAME
    }

    fn description(&self) -> &str {
        "A search engine optimized for comprehensive, accurate, and trusted results. \
         Useful for when you need to answer questions about current events. \
         Input should be a search query."
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "search query to look up"
                }
            },
            "required": ["query"]
        })
    }

    async fn call(&self, arguments: serde_json::Value) -> Result<serde_json::Value> {
        let args: SearchToolArgs =
            serde_json::from_value(arguments).context("Invalid search tool arguments")?;

        tracing::debug!("Search tool invoked: {}", args.query);

        let response = self.search.search(&args.query, &self.options).await?;

        let results: Vec<serde_json::Value> = response
            .results
            .iter()
            .take(self.options.max_results)
            .map(|r| serde_json::json!({"url": r.url.as_str(), "content": r.snippet}))
            .collect();

        Ok(serde_json::Value::Array(results))
    }
}

// ============================================================================
// Tests
// ============================================================================
