//! Application startup and lifecycle management.

use crate::config::GatewayConfig;
use crate::handlers;
use crate::services::{resolve_model_client, AskGateway, ModelClient, ShortcutInterceptor, WeatherClient};
use axum::{
    http::{header, HeaderValue},
    middleware,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics_middleware, request_id_middleware, security_headers_middleware,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: GatewayConfig,
    pub gateway: Arc<AskGateway>,
    pub weather: Arc<WeatherClient>,
}

pub fn build_router(state: AppState) -> Router {
    let weather = get(handlers::current_weather).layer(SetResponseHeaderLayer::overriding(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store"),
    ));

    Router::new()
        .route("/api/ask", post(handlers::ask))
        .route("/api/weather", weather)
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route_layer(middleware::from_fn(metrics_middleware))
        .fallback(handlers::not_found)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        // The browser front-end may be served from another origin.
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application, resolving the model client from configuration.
    pub async fn build(config: GatewayConfig) -> Result<Self, AppError> {
        let client = resolve_model_client(&config.google);
        Self::build_with_client(config, client).await
    }

    /// Build the application around an already chosen model client.
    pub async fn build_with_client(
        config: GatewayConfig,
        client: Option<Arc<dyn ModelClient>>,
    ) -> Result<Self, AppError> {
        let shortcut = ShortcutInterceptor::new(config.models.shortcut_answer.clone());
        let gateway = AskGateway::new(shortcut, client);
        let weather = WeatherClient::new(&config.weather);

        if !weather.is_configured() {
            tracing::warn!("WEATHER_API_KEY not set, /api/weather will return errors");
        }

        tracing::info!(
            default_model = %config.models.default_model,
            model_client = gateway.is_configured(),
            "Initialized ask gateway"
        );

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let state = AppState {
            config,
            gateway: Arc::new(gateway),
            weather: Arc::new(weather),
        };

        Ok(Self {
            port,
            listener,
            router: build_router(state),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until SIGINT or SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
