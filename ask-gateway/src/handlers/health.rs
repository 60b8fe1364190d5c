use crate::services::get_metrics;
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let model_client = if state.gateway.is_configured() {
        "configured"
    } else {
        "unconfigured"
    };

    Json(json!({
        "status": "ok",
        "service": "ask-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "model_client": model_client
    }))
}

/// Nothing to wait for: without a model client the gateway still answers.
pub async fn readiness_check() -> impl IntoResponse {
    StatusCode::OK
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}
