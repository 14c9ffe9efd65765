//! itmo-qa - ИТМО 질의응답 에이전트
//!
//! GigaChat의 사전 지식과 itmo.ru 도메인 웹 검색(Tavily)을 결합해
//! 질문에 답하고, 객관식 질문은 선택지 번호로 결정합니다.

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod search;
pub mod server;

// Re-exports
pub use agent::{AgentSettings, FinalAnswer, ItmoAgent, Question};
pub use config::AppConfig;
pub use error::{AgentError, CallTimeout, Stage};
pub use llm::{ChatMessage, ChatModel, CompletionRequest, GigaChat, Role, Tool};
pub use search::{SearchOptions, SearchResponse, SearchResult, SearchTool, TavilySearch, WebSearch};
pub use server::{router, PredictionRequest, PredictionResponse};
