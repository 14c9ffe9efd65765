//! GigaChat 채팅 모델 구현체
//!
//! source: https://developers.sber.ru/docs/ru/gigachat/api/reference/rest/gigachat-api
//!
//! 1. OAuth 엔드포인트에서 access token 발급 (약 30분 유효)
//! 2. `/chat/completions` 호출
//! 3. 모델이 함수 호출을 요청하면 바인딩된 도구를 실행하고 결과를 돌려줌
//!
//! 토큰 발급, 각 completion 호출, 각 도구 호출이 따로 `timeout`으로 제한됩니다.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{ChatModel, CompletionRequest, Role, MAX_TOOL_ROUNDS};
use crate::config::GigaChatConfig;
use crate::error::with_call_timeout;

/// 만료 전 토큰 갱신 여유 시간 (초)
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

// ============================================================================
// GigaChat
// ============================================================================

/// GigaChat REST API 클라이언트
pub struct GigaChat {
    config: GigaChatConfig,
    client: reqwest::Client,
    token: Mutex<Option<AccessToken>>,
}

/// 발급된 access token
#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - ChronoDuration::seconds(TOKEN_REFRESH_MARGIN_SECS) > now
    }
}

impl GigaChat {
    /// 새 클라이언트 생성
    pub fn new(config: GigaChatConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_ssl_certs)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            client,
            token: Mutex::new(None),
        })
    }

    /// 유효한 access token 반환 (만료 임박 시 재발급)
    async fn access_token(&self) -> Result<String> {
        let mut guard = self.token.lock().await;

        if let Some(token) = guard.as_ref() {
            if token.is_fresh(Utc::now()) {
                return Ok(token.value.clone());
            }
        }

        let token = with_call_timeout(self.config.timeout, self.fetch_token()).await?;
        let value = token.value.clone();
        *guard = Some(token);
        Ok(value)
    }

    async fn fetch_token(&self) -> Result<AccessToken> {
        tracing::debug!("Requesting GigaChat access token (scope: {})", self.config.scope);

        let response = self
            .client
            .post(&self.config.auth_url)
            .header("Authorization", format!("Basic {}", self.config.credentials))
            .header("RqUID", uuid::Uuid::new_v4().to_string())
            .header("Accept", "application/json")
            .form(&[("scope", self.config.scope.as_str())])
            .send()
            .await
            .context("Failed to send GigaChat token request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read token response body")?;

        if !status.is_success() {
            anyhow::bail!("GigaChat auth error ({}): {}", status, api_error_message(&body));
        }

        let parsed: TokenResponse =
            serde_json::from_str(&body).context("Failed to parse token response")?;

        let expires_at = DateTime::from_timestamp_millis(parsed.expires_at)
            .ok_or_else(|| anyhow::anyhow!("Invalid token expiry: {}", parsed.expires_at))?;

        Ok(AccessToken {
            value: parsed.access_token,
            expires_at,
        })
    }

    /// 단일 `/chat/completions` 호출
    async fn send_chat(&self, request: &ChatRequest<'_>) -> Result<ResponseMessage> {
        let token = self.access_token().await?;
        with_call_timeout(self.config.timeout, self.post_chat(token, request)).await
    }

    async fn post_chat(&self, token: String, request: &ChatRequest<'_>) -> Result<ResponseMessage> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(request)
            .send()
            .await
            .context("Failed to send GigaChat completion request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read completion response body")?;

        if !status.is_success() {
            anyhow::bail!("GigaChat API error ({}): {}", status, api_error_message(&body));
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).context("Failed to parse completion response")?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| anyhow::anyhow!("GigaChat returned no choices"))
    }
}

#[async_trait]
impl ChatModel for GigaChat {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let functions: Vec<FunctionSpec> = request
            .tools
            .iter()
            .map(|tool| FunctionSpec {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters(),
            })
            .collect();

        let mut messages: Vec<WireMessage> = request
            .messages
            .iter()
            .map(|m| WireMessage {
                role: m.role,
                content: m.content.clone(),
                function_call: None,
                name: None,
            })
            .collect();

        let mut round = 0;
        loop {
            // 마지막 라운드에서는 함수 목록을 빼서 텍스트 응답을 강제
            let allow_tools = !functions.is_empty() && round < MAX_TOOL_ROUNDS;

            let body = ChatRequest {
                model: &self.config.model,
                messages: &messages,
                temperature: request.temperature,
                functions: allow_tools.then_some(functions.as_slice()),
                function_call: allow_tools.then_some("auto"),
            };

            let message = self.send_chat(&body).await?;

            let call = match message.function_call {
                Some(call) if allow_tools => call,
                _ => return Ok(message.content.unwrap_or_default()),
            };

            let tool = request
                .tools
                .iter()
                .find(|t| t.name() == call.name)
                .ok_or_else(|| anyhow::anyhow!("Model requested unknown function: {}", call.name))?;

            tracing::debug!("GigaChat called function {} (round {})", call.name, round + 1);

            let result = with_call_timeout(self.config.timeout, tool.call(call.arguments.clone()))
                .await
                .with_context(|| format!("Function {} failed", call.name))?;

            messages.push(WireMessage {
                role: Role::Assistant,
                content: message.content.unwrap_or_default(),
                function_call: Some(call.clone()),
                name: None,
            });
            messages.push(WireMessage {
                role: Role::Function,
                content: result.to_string(),
                function_call: None,
                name: Some(call.name),
            });

            round += 1;
        }
    }

    fn name(&self) -> &str {
        "GigaChat"
    }
}

/// 에러 응답 본문에서 메시지 추출
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiError>(body)
        .ok()
        .and_then(|e| e.message)
        .unwrap_or_else(|| body.to_string())
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Unix epoch milliseconds
    expires_at: i64,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [WireMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    functions: Option<&'a [FunctionSpec]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: Role,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
struct FunctionSpec {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    arguments: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================
