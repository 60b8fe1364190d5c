//! Prometheus metrics for ask-gateway.
//!
//! HTTP-level counters from `service_core::middleware::metrics_middleware` go
//! through the `metrics` facade and are rendered by the installed Prometheus
//! recorder. Gateway metrics live in a dedicated registry that is created on
//! first use, so recording works in tests that never install the recorder.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

/// Handle to the facade recorder, set by [`init_metrics`].
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

static GATEWAY_METRICS: OnceLock<Option<GatewayMetrics>> = OnceLock::new();

struct GatewayMetrics {
    registry: Registry,
    ask_total: IntCounterVec,
    provider_latency_seconds: HistogramVec,
    normalizer_matches_total: IntCounterVec,
    weather_requests_total: IntCounterVec,
}

impl GatewayMetrics {
    fn build() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // path: shortcut, unconfigured, provider, provider_error
        let ask_total = IntCounterVec::new(
            Opts::new("gateway_ask_total", "Questions answered, by answer path"),
            &["path"],
        )?;

        let provider_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "gateway_provider_latency_seconds",
                "Model provider call latency in seconds",
            )
            .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]),
            // Request models are caller input and never become labels.
            &["provider"],
        )?;

        let normalizer_matches_total = IntCounterVec::new(
            Opts::new(
                "gateway_normalizer_matches_total",
                "Provider replies normalized, by matched shape",
            ),
            &["shape"],
        )?;

        let weather_requests_total = IntCounterVec::new(
            Opts::new("gateway_weather_requests_total", "Weather lookups, by outcome"),
            &["status"],
        )?;

        registry.register(Box::new(ask_total.clone()))?;
        registry.register(Box::new(provider_latency_seconds.clone()))?;
        registry.register(Box::new(normalizer_matches_total.clone()))?;
        registry.register(Box::new(weather_requests_total.clone()))?;

        Ok(Self {
            registry,
            ask_total,
            provider_latency_seconds,
            normalizer_matches_total,
            weather_requests_total,
        })
    }
}

fn gateway_metrics() -> Option<&'static GatewayMetrics> {
    GATEWAY_METRICS
        .get_or_init(|| match GatewayMetrics::build() {
            Ok(metrics) => Some(metrics),
            Err(e) => {
                tracing::error!(error = %e, "Failed to create gateway metrics");
                None
            }
        })
        .as_ref()
}

/// Install the Prometheus recorder for the `metrics` facade.
///
/// Call once from `main`, before the server starts.
pub fn init_metrics() -> anyhow::Result<()> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    if METRICS_HANDLE.set(handle).is_err() {
        anyhow::bail!("metrics recorder already initialized");
    }

    gateway_metrics();
    tracing::info!("Prometheus metrics initialized");
    Ok(())
}

/// All metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_default();

    let Some(metrics) = gateway_metrics() else {
        output.push_str("# Gateway metrics not available\n");
        return output;
    };

    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&metrics.registry.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        output.push_str(&format!("# Failed to encode metrics: {}\n", e));
        return output;
    }

    match String::from_utf8(buffer) {
        Ok(s) => output.push_str(&s),
        Err(e) => {
            tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
            output.push_str(&format!("# Failed to convert metrics to UTF-8: {}\n", e));
        }
    }
    output
}

pub fn record_ask(path: &str) {
    if let Some(m) = gateway_metrics() {
        m.ask_total.with_label_values(&[path]).inc();
    }
}

pub fn record_provider_latency(provider: &str, duration_secs: f64) {
    if let Some(m) = gateway_metrics() {
        m.provider_latency_seconds
            .with_label_values(&[provider])
            .observe(duration_secs);
    }
}

pub fn record_normalizer_match(shape: &str) {
    if let Some(m) = gateway_metrics() {
        m.normalizer_matches_total.with_label_values(&[shape]).inc();
    }
}

/// `status` is `ok`, `not_configured` or `upstream_error`.
pub fn record_weather_request(status: &str) {
    if let Some(m) = gateway_metrics() {
        m.weather_requests_total.with_label_values(&[status]).inc();
    }
}
