//! HTTP API 통합 테스트

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use common::{agent, StubModel, StubSearch};
use itmo_qa::router;

fn post_json(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/request")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(model: StubModel, search: StubSearch, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let app = router(Arc::new(agent(Arc::new(model), Arc::new(search))));
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1_000_000)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_multiple_choice_request() {
    let body = serde_json::json!({
        "id": 2,
        "query": "В каком году основан ИТМО?\n1. 1900\n2. 1930\n3. 1945"
    });

    let (status, json) = send(
        StubModel::new("ИТМО основан в 1900 году.", "1"),
        StubSearch::with_urls(2),
        post_json(&body.to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], 2);
    assert_eq!(json["answer"], 1);
    assert_eq!(json["reasoning"], "GigaChat: ИТМО основан в 1900 году.");
    assert_eq!(json["sources"][0], "https://itmo.ru/ru/page/1");
    assert_eq!(json["sources"].as_array().map(|a| a.len()), Some(2));
}

#[tokio::test]
async fn test_free_text_request_has_null_answer() {
    let body = serde_json::json!({"id": 1, "query": "Когда основан Университет ИТМО?"});

    let (status, json) = send(
        StubModel::new("В 1900 году.", "1"),
        StubSearch::default(),
        post_json(&body.to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["answer"], serde_json::Value::Null);
    assert_eq!(json["sources"], serde_json::json!([]));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (status, json) = send(
        StubModel::new("", ""),
        StubSearch::default(),
        post_json("{\"id\": 1, \"query\": "),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["detail"].is_string());
}

#[tokio::test]
async fn test_missing_field_is_bad_request() {
    let (status, json) = send(
        StubModel::new("", ""),
        StubSearch::default(),
        post_json(r#"{"id": 1}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["detail"].as_str().unwrap_or_default().contains("query"));
}

#[tokio::test]
async fn test_blank_query_is_bad_request() {
    let (status, _) = send(
        StubModel::new("", ""),
        StubSearch::default(),
        post_json(r#"{"id": 1, "query": ""}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upstream_failure_is_internal_error() {
    let model = StubModel {
        fail: true,
        ..StubModel::new("", "")
    };

    let (status, json) = send(
        model,
        StubSearch::with_urls(1),
        post_json(r#"{"id": 1, "query": "Вопрос?"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["detail"], "Internal server error");
}

#[tokio::test]
async fn test_health() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, json) = send(StubModel::new("", ""), StubSearch::default(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}
