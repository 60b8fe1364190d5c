pub mod ask;
pub mod health;
pub mod weather;

pub use ask::ask;
pub use health::{health_check, metrics_endpoint, not_found, readiness_check};
pub use weather::current_weather;
