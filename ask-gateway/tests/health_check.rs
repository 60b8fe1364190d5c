mod common;

use ask_gateway::services::providers::mock::MockModelClient;
use ask_gateway::services::providers::ProviderReply;
use common::TestApp;
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn health_check_returns_ok() {
    let app = TestApp::spawn().await;

    let response = app.get("/health").await;

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "ask-gateway");
    assert_eq!(body["model_client"], "unconfigured");
}

#[tokio::test]
async fn health_check_reports_configured_client() {
    let client = MockModelClient::replying(ProviderReply::new(json!({ "text": "hi" })));
    let app = TestApp::spawn_with_client(Arc::new(client)).await;

    let body: serde_json::Value = app.get("/health").await.json().await.unwrap();

    assert_eq!(body["model_client"], "configured");
}

#[tokio::test]
async fn readiness_check_returns_ok() {
    let app = TestApp::spawn().await;

    let response = app.get("/ready").await;

    assert!(response.status().is_success());
}

#[tokio::test]
async fn metrics_include_gateway_counters() {
    let app = TestApp::spawn().await;
    app.ask(json!({ "prompt": "你是谁" })).await;

    let response = app.get("/metrics").await;

    assert!(response.status().is_success());
    let text = response.text().await.unwrap();
    assert!(text.contains("gateway_ask_total"));
}

#[tokio::test]
async fn request_models_do_not_become_metric_labels() {
    let client = MockModelClient::replying(ProviderReply::new(json!({ "text": "hi" })));
    let app = TestApp::spawn_with_client(Arc::new(client)).await;
    for i in 0..5 {
        app.ask(json!({ "model": format!("caller-model-{i}"), "prompt": "p" }))
            .await;
    }

    let text = app.get("/metrics").await.text().await.unwrap();

    assert!(text.contains(r#"gateway_provider_latency_seconds_count{provider="mock"}"#));
    assert!(!text.contains("caller-model-"));
}

#[tokio::test]
async fn unknown_route_returns_json_404() {
    let app = TestApp::spawn().await;

    let response = app.get("/api/unknown").await;

    assert_eq!(response.status().as_u16(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Not found" }));
}

#[tokio::test]
async fn security_headers_are_set() {
    let app = TestApp::spawn().await;

    let response = app.get("/health").await;

    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert!(response.headers().contains_key("x-request-id"));
}
