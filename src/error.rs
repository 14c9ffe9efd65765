//! 에러 타입
//!
//! 어댑터 내부는 `anyhow::Result`로 컨텍스트를 쌓고,
//! 파이프라인 경계에서 `AgentError`로 분류합니다.

use std::fmt;
use std::future::Future;
use std::time::Duration;

/// 외부 호출이 있는 파이프라인 단계
///
/// 선택지 파싱은 실패하지 않으므로 단계로 구분하지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// LLM 초기 답변 생성
    Generate,
    /// 외부 웹 검색
    Search,
    /// 최종 선택지 결정
    Decide,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Generate => "generate_initial_answer",
            Stage::Search => "search_external",
            Stage::Decide => "decide_answer",
        };
        f.write_str(name)
    }
}

/// 파이프라인 실행 에러
///
/// 선택지 결정 실패(모델이 숫자가 아닌 응답을 반환)는 에러가 아니라
/// `answer = None`으로 처리되므로 여기에 포함되지 않습니다.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// 언어 모델 호출 실패 (네트워크, 인증, 응답 파싱)
    #[error("language model call failed during {stage}: {source:#}")]
    Model {
        stage: Stage,
        #[source]
        source: anyhow::Error,
    },

    /// 검색 서비스 호출 실패
    #[error("search call failed: {source:#}")]
    Search {
        #[source]
        source: anyhow::Error,
    },

    /// 외부 호출 타임아웃
    #[error("{stage} timed out after {after:?}")]
    Timeout { stage: Stage, after: Duration },

    /// 잘못된 입력
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl AgentError {
    /// 클라이언트 입력 문제인지 여부 (HTTP 400 매핑용)
    pub fn is_client_error(&self) -> bool {
        matches!(self, AgentError::InvalidRequest(_))
    }
}

/// 단일 외부 호출 타임아웃
///
/// 어댑터가 `anyhow::Error`로 감싸 올리며, 파이프라인 경계에서
/// `AgentError::Timeout`으로 분류됩니다.
#[derive(Debug, thiserror::Error)]
#[error("external call timed out after {0:?}")]
pub struct CallTimeout(pub Duration);

/// 외부 호출 하나를 `limit` 안에 끝내도록 제한
pub async fn with_call_timeout<T>(
    limit: Duration,
    call: impl Future<Output = anyhow::Result<T>>,
) -> anyhow::Result<T> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| anyhow::Error::new(CallTimeout(limit)))?
}

/// 에러 체인에 포함된 호출 타임아웃
pub fn call_timeout_of(err: &anyhow::Error) -> Option<Duration> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<CallTimeout>())
        .map(|timeout| timeout.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Generate.to_string(), "generate_initial_answer");
        assert_eq!(Stage::Decide.to_string(), "decide_answer");
    }

    #[test]
    fn test_timeout_message() {
        let err = AgentError::Timeout {
            stage: Stage::Search,
            after: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "search_external timed out after 30s");
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_model_error_keeps_context() {
        let source = anyhow::anyhow!("connection refused").context("GigaChat request failed");
        let err = AgentError::Model {
            stage: Stage::Generate,
            source,
        };
        let msg = err.to_string();
        assert!(msg.contains("generate_initial_answer"));
        assert!(msg.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_with_call_timeout_expires() {
        let result: anyhow::Result<()> = with_call_timeout(Duration::from_millis(20), async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok(())
        })
        .await;

        let err = result.err().map(|e| e.context("Failed to send search request"));
        assert_eq!(err.as_ref().and_then(call_timeout_of), Some(Duration::from_millis(20)));
    }

    #[tokio::test]
    async fn test_with_call_timeout_passes_inner_error() {
        let result: anyhow::Result<()> =
            with_call_timeout(Duration::from_secs(1), async { Err(anyhow::anyhow!("connection refused")) }).await;

        let err = result.err();
        assert!(err.as_ref().map(|e| call_timeout_of(e).is_none()).unwrap_or(false));
        assert!(err.map(|e| e.to_string().contains("connection refused")).unwrap_or(false));
    }

    #[test]
    fn test_invalid_request_is_client_error() {
        assert!(AgentError::InvalidRequest("empty query".into()).is_client_error());
    }
}
