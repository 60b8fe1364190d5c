use crate::services::metrics::record_weather_request;
use crate::services::WeatherError;
use crate::startup::AppState;
use axum::{extract::State, Json};
use serde_json::Value;
use service_core::error::AppError;

const FETCH_FAILED: &str = "Failed to fetch weather data";

/// `GET /api/weather`
///
/// Query parameters are ignored; clients add one to defeat caches.
pub async fn current_weather(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    match state.weather.current_for_random_city().await {
        Ok(body) => {
            record_weather_request("ok");
            Ok(Json(body))
        }
        Err(WeatherError::NotConfigured) => {
            record_weather_request("not_configured");
            tracing::error!("Weather request rejected: WEATHER_API_KEY is not set");
            Err(AppError::UpstreamError(
                WeatherError::NotConfigured.to_string(),
            ))
        }
        Err(e) => {
            record_weather_request("upstream_error");
            tracing::error!(error = %e, "Weather lookup failed");
            Err(AppError::UpstreamError(FETCH_FAILED.to_string()))
        }
    }
}
