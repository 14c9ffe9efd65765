//! 언어 모델 모듈
//!
//! 채팅 완성(chat completion) 인터페이스와 GigaChat 구현체입니다.
//!
//! ## 사용법
//! ```rust,ignore
//! let model = GigaChat::new(config.gigachat.clone())?;
//! let text = model
//!     .complete(CompletionRequest::new(vec![ChatMessage::user("Привет!")]))
//!     .await?;
//! ```

mod gigachat;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use gigachat::GigaChat;

/// 한 번의 `complete`에서 허용하는 도구 호출 라운드 수
///
/// 마지막 라운드 뒤에는 함수 목록 없이 한 번 더 호출해 텍스트 응답을 받습니다.
pub const MAX_TOOL_ROUNDS: usize = 3;

// ============================================================================
// Messages
// ============================================================================

/// 메시지 역할
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    /// 도구(함수) 실행 결과
    Function,
}

/// 채팅 메시지
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

// ============================================================================
// Tool Capability
// ============================================================================

/// 모델이 생성 도중 호출할 수 있는 외부 기능
///
/// 호출 프로토콜은 모델 어댑터가 처리하며, 호출자는 최종 텍스트만 받습니다.
#[async_trait]
pub trait Tool: Send + Sync {
    /// 함수 이름 (모델에 노출)
    fn name(&self) -> &str;

    /// 함수 설명
    fn description(&self) -> &str;

    /// 인자 JSON Schema
    fn parameters(&self) -> serde_json::Value;

    /// 도구 실행
    async fn call(&self, arguments: serde_json::Value) -> Result<serde_json::Value>;
}

// ============================================================================
// Completion Request
// ============================================================================

/// 완성 요청
#[derive(Clone, Default)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    /// None이면 서비스 기본값 사용
    pub temperature: Option<f32>,
    /// 모델에 바인딩할 도구
    pub tools: Vec<Arc<dyn Tool>>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }
}

impl std::fmt::Debug for CompletionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tools: Vec<&str> = self.tools.iter().map(|t| t.name()).collect();
        f.debug_struct("CompletionRequest")
            .field("messages", &self.messages)
            .field("temperature", &self.temperature)
            .field("tools", &tools)
            .finish()
    }
}

// ============================================================================
// ChatModel Trait
// ============================================================================

/// 채팅 모델 트레이트
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// 완성 요청 → 최종 응답 텍스트
    async fn complete(&self, request: CompletionRequest) -> Result<String>;

    /// 모델 이름 (reasoning 라벨에 사용)
    fn name(&self) -> &str;
}
