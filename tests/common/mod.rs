//! 테스트용 모델/검색 스텁

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use itmo_qa::{
    AgentSettings, ChatModel, CompletionRequest, ItmoAgent, SearchOptions, SearchResponse,
    SearchResult, Tool, WebSearch,
};
use url::Url;

/// 고정 응답 모델
///
/// temperature 0 요청은 선택지 결정 호출로 간주합니다.
/// `delay`는 completion 한 번마다 적용되고, 도구가 바인딩되면
/// `tool_rounds`만큼 도구를 호출한 뒤 답합니다.
#[derive(Default)]
pub struct StubModel {
    pub answer: String,
    pub resolution: String,
    pub fail: bool,
    pub delay: Option<Duration>,
    pub tool_rounds: usize,
    pub tool_calls: AtomicUsize,
    pub answer_calls: AtomicUsize,
    pub resolution_calls: AtomicUsize,
    pub tool_bound_calls: AtomicUsize,
}

impl StubModel {
    pub fn new(answer: &str, resolution: &str) -> Self {
        Self {
            answer: answer.to_string(),
            resolution: resolution.to_string(),
            ..Default::default()
        }
    }

    pub fn resolution_calls(&self) -> usize {
        self.resolution_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl ChatModel for StubModel {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        self.pause().await;
        if self.fail {
            anyhow::bail!("GigaChat API error (401 Unauthorized): Token has expired");
        }
        if let Some(tool) = request.tools.first() {
            self.tool_bound_calls.fetch_add(1, Ordering::SeqCst);
            for _ in 0..self.tool_rounds {
                tool.call(serde_json::json!({"query": "ИТМО"})).await?;
                self.tool_calls.fetch_add(1, Ordering::SeqCst);
                self.pause().await;
            }
        }
        if request.temperature == Some(0.0) {
            self.resolution_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.resolution.clone())
        } else {
            self.answer_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.answer.clone())
        }
    }

    fn name(&self) -> &str {
        "GigaChat"
    }
}

/// 고정 결과 검색
#[derive(Default)]
pub struct StubSearch {
    pub urls: Vec<String>,
    pub answer: Option<String>,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl StubSearch {
    pub fn with_urls(count: usize) -> Self {
        Self {
            urls: (1..=count)
                .map(|i| format!("https://itmo.ru/ru/page/{}", i))
                .collect(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl WebSearch for StubSearch {
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<SearchResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("Failed to send Tavily search request: connection refused");
        }
        assert_eq!(options.include_domains, vec!["itmo.ru".to_string()]);

        let results = self
            .urls
            .iter()
            .map(|u| SearchResult {
                title: format!("{} - ИТМО", query),
                url: Url::parse(u).expect("valid test url"),
                snippet: "Университет ИТМО основан в 1900 году".to_string(),
            })
            .collect();

        Ok(SearchResponse {
            answer: self.answer.clone(),
            results,
        })
    }

    fn name(&self) -> &str {
        "Tavily"
    }
}

pub fn agent(model: Arc<StubModel>, search: Arc<StubSearch>) -> ItmoAgent {
    agent_with(model, search, AgentSettings::default())
}

pub fn agent_with(model: Arc<StubModel>, search: Arc<StubSearch>, settings: AgentSettings) -> ItmoAgent {
    ItmoAgent::new(model, search, settings)
}
