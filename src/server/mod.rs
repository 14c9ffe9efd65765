//! HTTP API 서버
//!
//! - `POST /api/request` - 질문 처리
//! - `GET /health` - 상태 확인

mod logging;
mod schema;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::agent::ItmoAgent;

pub use logging::log_requests;
pub use schema::{ErrorBody, PredictionRequest, PredictionResponse};

// ============================================================================
// Errors
// ============================================================================

/// HTTP 에러 응답
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 요청 형식 오류 (400)
    #[error("{0}")]
    BadRequest(String),

    /// 파이프라인 실패 (500), 내부 상세는 로그에만 남김
    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// ============================================================================
// Router
// ============================================================================

/// 라우터 생성
pub fn router(agent: Arc<ItmoAgent>) -> Router {
    Router::new()
        .route("/api/request", post(predict))
        .route("/health", get(health))
        .layer(axum::middleware::from_fn(log_requests))
        .with_state(agent)
}

/// 서버 실행 (Ctrl-C로 종료)
pub async fn serve(agent: Arc<ItmoAgent>, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(agent))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

// ============================================================================
// Handlers
// ============================================================================

/// 질문 처리
async fn predict(
    State(agent): State<Arc<ItmoAgent>>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        tracing::error!("Rejected request body: {}", rejection.body_text());
        ApiError::BadRequest(rejection.body_text())
    })?;

    let id = body.id;
    tracing::info!("Processing prediction request with id: {}", id);

    match agent.invoke(body.into()).await {
        Ok(answer) => {
            tracing::info!("Successfully processed request {}", id);
            Ok(Json(answer.into()))
        }
        Err(e) if e.is_client_error() => {
            tracing::error!("Validation error for request {}: {}", id, e);
            Err(ApiError::BadRequest(e.to_string()))
        }
        Err(e) => {
            tracing::error!("Internal error processing request {}: {}", id, e);
            Err(ApiError::Internal)
        }
    }
}

/// 상태 확인
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
