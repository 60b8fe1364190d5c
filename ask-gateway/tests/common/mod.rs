#![allow(dead_code)]

use ask_gateway::config::GatewayConfig;
use ask_gateway::services::ModelClient;
use ask_gateway::startup::Application;
use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Gateway with no credentials: placeholder answers, weather disabled.
    pub async fn spawn() -> Self {
        Self::spawn_with(GatewayConfig::unconfigured(), None).await
    }

    /// Gateway around a specific model client.
    pub async fn spawn_with_client(client: Arc<dyn ModelClient>) -> Self {
        Self::spawn_with(GatewayConfig::unconfigured(), Some(client)).await
    }

    /// Gateway whose model client is resolved from `config`, as in production.
    pub async fn spawn_from_config(config: GatewayConfig) -> Self {
        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        Self::run(app).await
    }

    pub async fn spawn_with(config: GatewayConfig, client: Option<Arc<dyn ModelClient>>) -> Self {
        let app = Application::build_with_client(config, client)
            .await
            .expect("Failed to build test application");
        Self::run(app).await
    }

    async fn run(app: Application) -> Self {
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            client,
        }
    }

    pub async fn ask(&self, body: Value) -> reqwest::Response {
        self.client
            .post(format!("{}/api/ask", self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to send request")
    }

    pub async fn ask_raw(&self, body: &'static str) -> reqwest::Response {
        self.client
            .post(format!("{}/api/ask", self.address))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to send request")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to send request")
    }
}

/// Serve `router` on a random local port and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock server");
    let port = listener.local_addr().expect("No local address").port();

    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    format!("http://127.0.0.1:{}", port)
}

/// Weather provider stand-in that echoes the query it received.
pub async fn spawn_weather_server() -> String {
    async fn current(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
        Json(json!({
            "location": { "name": params.get("q") },
            "current": { "temp_c": 21.5, "condition": { "text": "晴" } },
            "received": params
        }))
    }

    serve(Router::new().route("/current.json", get(current))).await
}

/// Weather provider stand-in that always fails.
pub async fn spawn_failing_weather_server() -> String {
    async fn current() -> impl IntoResponse {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": { "code": 9999, "message": "Internal application error." } })),
        )
    }

    serve(Router::new().route("/current.json", get(current))).await
}

/// Gemini REST stand-in. Answers every well-formed `generateContent` call
/// with `status` and `body`. The key must arrive as a header, never in the
/// query string.
pub async fn spawn_gemini_server(status: StatusCode, body: Value) -> String {
    let handler = move |Path(target): Path<String>,
                        Query(params): Query<HashMap<String, String>>,
                        headers: HeaderMap,
                        Json(request): Json<Value>| {
        let body = body.clone();
        async move {
            if !target.ends_with(":generateContent") {
                return (StatusCode::NOT_FOUND, Json(json!({ "error": "bad target" })));
            }
            if params.contains_key("key") || !headers.contains_key("x-goog-api-key") {
                return (StatusCode::FORBIDDEN, Json(json!({ "error": "bad credentials" })));
            }
            if request["contents"][0]["parts"][0]["text"].is_null() {
                return (StatusCode::BAD_REQUEST, Json(json!({ "error": "no prompt" })));
            }
            (status, Json(body))
        }
    };

    let base = serve(Router::new().route("/v1beta/models/:target", post(handler))).await;
    format!("{}/v1beta", base)
}
