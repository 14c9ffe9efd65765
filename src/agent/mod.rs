//! ИТМО 질의응답 에이전트
//!
//! 4단계 고정 파이프라인:
//! 1. parse_query - 객관식 선택지 감지
//! 2. generate_initial_answer - 검색 도구를 바인딩한 LLM 답변
//! 3. search_external - 도메인 제한 웹 검색 (최대 3건)
//! 4. decide_answer - 선택지 번호 결정 및 결과 조립
//!
//! 단계는 순차 실행되며 각 외부 호출은 어댑터에서 `call_timeout`으로 제한됩니다.
//! 단계 전체에는 그 단계가 할 수 있는 호출 수만큼의 예산을 둡니다.
//! 재시도나 폴백 답변은 없습니다.

mod generator;
mod parser;
mod resolver;
mod retrieval;
mod state;

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::config::{AppConfig, DEFAULT_SEARCH_DOMAIN, DEFAULT_TIMEOUT_SECS};
use crate::error::{call_timeout_of, AgentError, Stage};
use crate::llm::{ChatModel, GigaChat, Tool, MAX_TOOL_ROUNDS};
use crate::search::{SearchOptions, SearchTool, TavilySearch, WebSearch};

pub use generator::generate_initial_answer;
pub use parser::{detect_options, parse_query};
pub use resolver::{decide_answer, parse_option_index};
pub use retrieval::search_external;
pub use state::{FinalAnswer, GeneratedAnswer, ParsedQuery, Question, SearchedAnswer};

// ============================================================================
// Settings
// ============================================================================

/// 에이전트 동작 설정
#[derive(Debug, Clone)]
pub struct AgentSettings {
    /// 검색을 제한할 도메인
    pub search_domain: String,
    /// 외부 호출당 타임아웃
    pub call_timeout: Duration,
    /// 초기 답변 생성 시 검색 도구 바인딩 여부
    pub tool_augmented: bool,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            search_domain: DEFAULT_SEARCH_DOMAIN.to_string(),
            call_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            tool_augmented: true,
        }
    }
}

// ============================================================================
// ItmoAgent
// ============================================================================

/// 질의응답 에이전트
///
/// 모델/검색 클라이언트만 공유하며 요청별 상태는 `invoke` 안에서만 존재합니다.
pub struct ItmoAgent {
    model: Arc<dyn ChatModel>,
    search: Arc<dyn WebSearch>,
    search_options: SearchOptions,
    call_timeout: Duration,
    tool_augmented: bool,
}

impl ItmoAgent {
    /// 모델과 검색 구현체로 생성
    pub fn new(model: Arc<dyn ChatModel>, search: Arc<dyn WebSearch>, settings: AgentSettings) -> Self {
        Self {
            model,
            search,
            search_options: SearchOptions::for_domain(settings.search_domain),
            call_timeout: settings.call_timeout,
            tool_augmented: settings.tool_augmented,
        }
    }

    /// 설정에서 GigaChat + Tavily 에이전트 생성
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let model = GigaChat::new(config.gigachat.clone())?;
        let search = TavilySearch::new(config.tavily.clone())?;

        tracing::info!(
            "Agent ready (model: {}, search domain: {}, timeout: {:?})",
            config.gigachat.model,
            config.search_domain,
            config.call_timeout
        );

        Ok(Self::new(
            Arc::new(model),
            Arc::new(search),
            AgentSettings {
                search_domain: config.search_domain.clone(),
                call_timeout: config.call_timeout,
                tool_augmented: true,
            },
        ))
    }

    /// 파이프라인 실행
    pub async fn invoke(&self, question: Question) -> Result<FinalAnswer, AgentError> {
        if question.query.trim().is_empty() {
            return Err(AgentError::InvalidRequest("query must not be empty".to_string()));
        }

        let id = question.id;
        let started = Instant::now();

        let parsed = parse_query(question);

        let generated = self
            .bounded(
                Stage::Generate,
                generate_initial_answer(self.model.as_ref(), self.search_tool(), parsed),
            )
            .await?;

        let searched = self
            .bounded(
                Stage::Search,
                search_external(self.search.as_ref(), &self.search_options, generated),
            )
            .await?;

        let final_answer = self
            .bounded(
                Stage::Decide,
                decide_answer(self.model.as_ref(), self.search.name(), searched),
            )
            .await?;

        tracing::info!(
            "Request {} resolved in {:.3}s (answer: {:?}, sources: {})",
            id,
            started.elapsed().as_secs_f64(),
            final_answer.answer,
            final_answer.sources.len()
        );

        Ok(final_answer)
    }

    /// 초기 답변에 바인딩할 검색 도구
    fn search_tool(&self) -> Option<Arc<dyn Tool>> {
        self.tool_augmented.then(|| {
            Arc::new(SearchTool::new(self.search.clone(), self.search_options.clone())) as Arc<dyn Tool>
        })
    }

    /// 단계 전체 예산 (단계가 할 수 있는 최대 외부 호출 수 × `call_timeout`)
    fn stage_budget(&self, stage: Stage) -> Duration {
        let calls = match stage {
            // 토큰 + completion (도구 라운드 + 마지막 텍스트) + 도구 검색
            Stage::Generate => 1 + (MAX_TOOL_ROUNDS + 1) + MAX_TOOL_ROUNDS,
            Stage::Search => 1,
            // 토큰 + completion
            Stage::Decide => 2,
        };
        self.call_timeout * calls as u32
    }

    /// 단계 실행 + 타임아웃 + 에러 분류
    async fn bounded<T>(&self, stage: Stage, fut: impl Future<Output = Result<T>>) -> Result<T, AgentError> {
        let budget = self.stage_budget(stage);

        match tokio::time::timeout(budget, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => {
                if let Some(after) = call_timeout_of(&source) {
                    tracing::error!("{} timed out: {:#}", stage, source);
                    return Err(AgentError::Timeout { stage, after });
                }
                tracing::error!("{} failed: {:#}", stage, source);
                Err(match stage {
                    Stage::Search => AgentError::Search { source },
                    _ => AgentError::Model { stage, source },
                })
            }
            Err(_) => {
                tracing::error!("{} timed out after {:?}", stage, budget);
                Err(AgentError::Timeout { stage, after: budget })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchResponse;

    struct NoModel;

    #[async_trait::async_trait]
    impl ChatModel for NoModel {
        async fn complete(&self, _request: crate::llm::CompletionRequest) -> Result<String> {
            Ok(String::new())
        }

        fn name(&self) -> &str {
            "none"
        }
    }

    struct NoSearch;

    #[async_trait::async_trait]
    impl WebSearch for NoSearch {
        async fn search(&self, _query: &str, _options: &SearchOptions) -> Result<SearchResponse> {
            Ok(SearchResponse::default())
        }

        fn name(&self) -> &str {
            "none"
        }
    }

    fn agent(call_timeout: Duration) -> ItmoAgent {
        ItmoAgent::new(
            Arc::new(NoModel),
            Arc::new(NoSearch),
            AgentSettings {
                call_timeout,
                ..AgentSettings::default()
            },
        )
    }

    #[test]
    fn test_stage_budget_scales_with_calls() {
        let agent = agent(Duration::from_secs(30));
        assert_eq!(agent.stage_budget(Stage::Search), Duration::from_secs(30));
        assert_eq!(agent.stage_budget(Stage::Decide), Duration::from_secs(60));
        assert_eq!(agent.stage_budget(Stage::Generate), Duration::from_secs(30 * 8));
    }

    #[tokio::test]
    async fn test_call_timeout_in_chain_is_timeout() {
        let agent = agent(Duration::from_secs(5));
        let result: Result<(), AgentError> = agent
            .bounded(Stage::Search, async {
                crate::error::with_call_timeout(Duration::from_millis(10), async {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    Ok(())
                })
                .await
            })
            .await;

        match result {
            Err(AgentError::Timeout { stage, after }) => {
                assert_eq!(stage, Stage::Search);
                assert_eq!(after, Duration::from_millis(10));
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }
}
