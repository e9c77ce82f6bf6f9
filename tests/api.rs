//! Router tests driven in-process with `tower::ServiceExt::oneshot`

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use common::*;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use truthlens::{api, Config};

fn router(config: &Config, urls: Vec<String>) -> Router {
    let checker = checker_with(config.clone(), StaticSearch::new(urls));
    api::app(Arc::new(checker), config).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn form_request(facts: &str) -> Request<Body> {
    let body = format!("facts={}", urlencoding::encode(facts));
    Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = router(&test_config(), Vec::new());
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["circuits"]["search"], "closed");
    assert_eq!(body["circuits"]["embed"], "closed");
    assert_eq!(body["circuits"]["classify"], "closed");
}

#[tokio::test]
async fn test_home_and_about_pages() {
    let app = router(&test_config(), Vec::new());

    let home = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(home.status(), StatusCode::OK);
    let html = body_string(home).await;
    assert!(html.contains("analysis-form"));
    assert!(html.contains("name=\"facts\""));
    assert!(!html.contains("verdict-text"));

    let about = app
        .oneshot(Request::builder().uri("/about").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(about.status(), StatusCode::OK);
    assert!(body_string(about).await.contains(env!("CARGO_PKG_VERSION")));
}

#[tokio::test]
async fn test_verify_rejects_empty_claim() {
    let app = router(&test_config(), Vec::new());
    let response = app.oneshot(json_request("/verify", json!({}))).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_verify_returns_verdict_and_sources() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/bridge")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(article_html("Bridge vote", &BRIDGE_STORY))
        .create_async()
        .await;
    let url = format!("{}/bridge", server.url());

    let app = router(&test_config(), vec![url.clone()]);
    let response = app
        .oneshot(json_request("/verify", json!({ "claim": "The river bridge was approved" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["verdict"], "The News is True (High Confidence)");
    assert_eq!(body["confidence"], "100%");
    assert_eq!(body["sources"], 1);
    assert_eq!(body["source_urls"], json!([url]));
}

#[tokio::test]
async fn test_verify_allows_cross_origin_callers() {
    let app = router(&test_config(), Vec::new());
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/verify")
        .header(header::ORIGIN, "chrome-extension://truthlens")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn test_form_submission_renders_result() {
    let app = router(&test_config(), Vec::new());
    let response = app
        .oneshot(form_request("Aliens built the <b>pyramids</b>"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("id=\"verdict-text\""));
    assert!(html.contains("Insufficient data found to verify."));
    assert!(html.contains("&lt;b&gt;pyramids&lt;/b&gt;"));
    assert!(!html.contains("<b>pyramids</b>"));
}

#[tokio::test]
async fn test_form_submission_with_blank_claim_shows_error() {
    let app = router(&test_config(), Vec::new());
    let response = app.oneshot(form_request("   ")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = body_string(response).await;
    assert!(html.contains("claim cannot be empty"));
    assert!(html.contains("analysis-form"));
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let mut config = test_config();
    config.server.max_body_bytes = 64;
    let app = router(&config, Vec::new());

    let body = json!({ "claim": "x".repeat(500) }).to_string();
    let request = Request::builder()
        .method("POST")
        .uri("/verify")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_metrics_exposition() {
    let app = router(&test_config(), Vec::new());
    let _ = app
        .clone()
        .oneshot(json_request("/verify", json!({ "claim": "Nothing to find here" })))
        .await
        .unwrap();

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"));
    assert!(body_string(response).await.contains("truthlens_verifications_total"));
}
