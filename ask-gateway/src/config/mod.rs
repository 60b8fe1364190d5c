use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Model used when a request does not name one.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";

/// Gemini REST endpoint.
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// WeatherAPI.com REST endpoint.
pub const DEFAULT_WEATHER_API_BASE: &str = "https://api.weatherapi.com/v1";

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub common: core_config::Config,
    pub models: ModelConfig,
    pub google: GoogleConfig,
    pub weather: WeatherConfig,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Model used when the request omits `model`.
    pub default_model: String,
    /// Replacement for the built-in identity answer.
    pub shortcut_answer: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// Absent means "answer with the placeholder", never an error.
    pub api_key: Option<String>,
    pub api_base: String,
    /// No timeout unless set.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct WeatherConfig {
    /// No built-in key; unset disables the weather endpoint.
    pub api_key: Option<String>,
    pub api_base: String,
}

impl GatewayConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(GatewayConfig {
            common: common_config,
            models: ModelConfig {
                default_model: get_env("GENAI_DEFAULT_MODEL", Some(DEFAULT_MODEL), is_prod)?,
                shortcut_answer: optional_env("SHORTCUT_ANSWER"),
            },
            google: GoogleConfig {
                api_key: optional_env("GOOGLE_API_KEY"),
                api_base: get_env("GEMINI_API_BASE", Some(DEFAULT_GEMINI_API_BASE), is_prod)?,
                timeout_secs: optional_env("GEMINI_TIMEOUT_SECS")
                    .map(|v| {
                        v.parse().map_err(|e| {
                            AppError::ConfigError(anyhow::anyhow!(
                                "GEMINI_TIMEOUT_SECS must be a whole number of seconds: {}",
                                e
                            ))
                        })
                    })
                    .transpose()?,
            },
            weather: WeatherConfig {
                api_key: optional_env("WEATHER_API_KEY"),
                api_base: get_env("WEATHER_API_BASE", Some(DEFAULT_WEATHER_API_BASE), is_prod)?,
            },
        })
    }

    /// Settings suitable for local runs and tests: no credentials, public
    /// endpoints, random port.
    pub fn unconfigured() -> Self {
        GatewayConfig {
            common: core_config::Config {
                port: 0,
                ..Default::default()
            },
            models: ModelConfig {
                default_model: DEFAULT_MODEL.to_string(),
                shortcut_answer: None,
            },
            google: GoogleConfig {
                api_key: None,
                api_base: DEFAULT_GEMINI_API_BASE.to_string(),
                timeout_secs: None,
            },
            weather: WeatherConfig {
                api_key: None,
                api_base: DEFAULT_WEATHER_API_BASE.to_string(),
            },
        }
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

/// Empty values count as unset.
fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
