use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;

/// Settings shared by every service: listen port, plus logging knobs that
/// must be known before the service-specific configuration is read.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

impl Config {
    /// Load from an optional `configuration.*` file, then `APP__*` variables.
    ///
    /// `LOG_LEVEL` and `OTLP_ENDPOINT` are honoured without the prefix so that
    /// deployments can keep using the conventional names.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .set_override_option("log_level", std::env::var("LOG_LEVEL").ok())?
            .set_override_option(
                "otlp_endpoint",
                std::env::var("OTLP_ENDPOINT").ok().filter(|v| !v.is_empty()),
            )?
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
