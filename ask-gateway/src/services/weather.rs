//! Current-weather passthrough for a random city.

use crate::config::WeatherConfig;
use rand::seq::SliceRandom;
use reqwest::Client;
use serde_json::Value;
use service_core::observability::TracePropagation;
use thiserror::Error;

/// Cities a lookup picks from, as the provider's `q` parameter.
pub const CITIES: &[&str] = &[
    "Beijing",
    "Shanghai",
    "Guangzhou",
    "Shenzhen",
    "Chengdu",
    "Hangzhou",
    "Chongqing",
    "Wuhan",
    "Xi'an",
    "Suzhou",
    "Nanjing",
    "Tianjin",
    "Qingdao",
    "Dalian",
    "Xiamen",
    "Kunming",
    "Harbin",
    "Changsha",
    "Taipei",
    "Hong Kong",
];

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("Weather API key is not configured")]
    NotConfigured,

    #[error("Weather request failed: {0}")]
    RequestFailed(String),

    #[error("Weather API returned {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Weather API returned an unreadable body: {0}")]
    InvalidBody(String),
}

#[derive(Clone)]
pub struct WeatherClient {
    api_key: Option<String>,
    api_base: String,
    client: Client,
}

impl WeatherClient {
    pub fn new(config: &WeatherConfig) -> Self {
        Self {
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn pick_city() -> &'static str {
        CITIES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(CITIES[0])
    }

    /// Current conditions for a random city, as the provider sent them.
    pub async fn current_for_random_city(&self) -> Result<Value, WeatherError> {
        self.current(Self::pick_city()).await
    }

    pub async fn current(&self, city: &str) -> Result<Value, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::NotConfigured)?;

        tracing::debug!(city, "Fetching current weather");

        let response = self
            .client
            .get(format!("{}/current.json", self.api_base))
            .query(&[("key", api_key), ("q", city), ("aqi", "yes"), ("lang", "zh")])
            .with_trace_context()
            .send()
            .await
            .map_err(|e| WeatherError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WeatherError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| WeatherError::InvalidBody(e.to_string()))
    }
}
