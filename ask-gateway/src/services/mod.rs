pub mod fallback;
pub mod gateway;
pub mod metrics;
pub mod normalizer;
pub mod providers;
pub mod shortcut;
pub mod weather;

pub use gateway::AskGateway;
pub use metrics::{get_metrics, init_metrics};
pub use providers::{resolve_model_client, ModelClient};
pub use shortcut::ShortcutInterceptor;
pub use weather::{WeatherClient, WeatherError};
