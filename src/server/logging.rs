//! 요청/응답 로깅 미들웨어
//!
//! 요청 본문, 응답 상태·본문, 처리 시간을 기록합니다.
//! 본문을 한 번 버퍼링한 뒤 그대로 다시 전달하므로 핸들러 동작에는 영향이 없습니다.

use std::time::Instant;

use axum::body::{to_bytes, Body};
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// 버퍼링할 최대 본문 크기
const MAX_BODY_BYTES: usize = 1024 * 1024;

pub async fn log_requests(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Failed to read request body for {} {}: {}", method, uri, e);
            return (StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into_response();
        }
    };

    tracing::info!(
        "Incoming request: {} {}\nRequest body: {}",
        method,
        uri,
        String::from_utf8_lossy(&bytes)
    );

    let response = next.run(Request::from_parts(parts, Body::from(bytes))).await;

    let (parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("Failed to read response body for {} {}: {}", method, uri, e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    tracing::info!(
        "Request completed: {} {}\nStatus: {}\nResponse body: {}\nDuration: {:.3}s",
        method,
        uri,
        parts.status.as_u16(),
        String::from_utf8_lossy(&bytes),
        started.elapsed().as_secs_f64()
    );

    Response::from_parts(parts, Body::from(bytes))
}
