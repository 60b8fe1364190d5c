//! Generative-model client abstraction.
//!
//! The gateway talks to a model through [`ModelClient`]. Which implementation
//! (if any) is available is decided once at startup by
//! [`resolve_model_client`]; `None` routes every question to the placeholder
//! answer.

#[cfg(feature = "gemini")]
pub mod gemini;
pub mod mock;

use crate::config::GoogleConfig;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Response blocked: {0}")]
    Blocked(String),

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Lazily-evaluated answer text exposed by a client library.
///
/// Calling it may fail, e.g. when the provider withheld the content.
#[async_trait]
pub trait TextAccessor: Send + Sync {
    async fn text(&self) -> Result<String, ProviderError>;
}

/// What a client hands back: the provider's payload as opaque JSON plus any
/// text accessors the client library offers on top of it.
///
/// The payload shape is not owned by this service; see
/// [`crate::services::normalizer`] for how it is interpreted.
#[derive(Clone)]
pub struct ProviderReply {
    result: Value,
    response_text: Option<Arc<dyn TextAccessor>>,
    result_text: Option<Arc<dyn TextAccessor>>,
}

/// One level of a [`ProviderReply`]: its JSON plus the accessor bound to it.
#[derive(Clone, Copy)]
pub struct PayloadView<'a> {
    pub value: &'a Value,
    pub text_accessor: Option<&'a Arc<dyn TextAccessor>>,
}

impl ProviderReply {
    pub fn new(result: Value) -> Self {
        Self {
            result,
            response_text: None,
            result_text: None,
        }
    }

    /// Accessor bound to the nested `response` object. Ignored when the result
    /// has no `response` field.
    pub fn with_response_text(mut self, accessor: Arc<dyn TextAccessor>) -> Self {
        self.response_text = Some(accessor);
        self
    }

    /// Accessor bound to the outer result.
    pub fn with_result_text(mut self, accessor: Arc<dyn TextAccessor>) -> Self {
        self.result_text = Some(accessor);
        self
    }

    /// The outer result.
    pub fn result(&self) -> PayloadView<'_> {
        PayloadView {
            value: &self.result,
            text_accessor: self.result_text.as_ref(),
        }
    }

    /// The nested `response` when present and non-null, otherwise the result
    /// itself.
    pub fn response(&self) -> PayloadView<'_> {
        match self.result.get("response") {
            Some(nested) if !nested.is_null() => PayloadView {
                value: nested,
                text_accessor: self.response_text.as_ref(),
            },
            _ => self.result(),
        }
    }

    /// The provider payload as returned to callers for auditing.
    pub fn into_raw(self) -> Value {
        self.result
    }
}

impl std::fmt::Debug for ProviderReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderReply")
            .field("result", &self.result)
            .field("response_text", &self.response_text.is_some())
            .field("result_text", &self.result_text.is_some())
            .finish()
    }
}

/// A generative-model backend.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Provider name for logs and metrics.
    fn name(&self) -> &str;

    /// Submit `prompt` to `model` and return the provider's reply untouched.
    async fn generate(&self, model: &str, prompt: &str) -> Result<ProviderReply, ProviderError>;
}

/// Pick the model client for this process.
///
/// A missing credential, a client library that was compiled out, or a client
/// that cannot be constructed all yield `None`.
pub fn resolve_model_client(config: &GoogleConfig) -> Option<Arc<dyn ModelClient>> {
    let Some(api_key) = config.api_key.as_deref().filter(|k| !k.is_empty()) else {
        tracing::info!("GOOGLE_API_KEY not set, answers will use the placeholder");
        return None;
    };

    #[cfg(feature = "gemini")]
    {
        let gemini_config = gemini::GeminiConfig {
            api_key: api_key.to_string(),
            api_base: config.api_base.clone(),
            timeout: config.timeout_secs.map(std::time::Duration::from_secs),
        };
        match gemini::GeminiClient::new(gemini_config) {
            Ok(client) => {
                tracing::info!(api_base = %config.api_base, "Initialized Gemini client");
                Some(Arc::new(client) as Arc<dyn ModelClient>)
            }
            Err(e) => {
                tracing::warn!("Failed to initialize Gemini client: {}. Using placeholder.", e);
                None
            }
        }
    }

    #[cfg(not(feature = "gemini"))]
    {
        let _ = api_key;
        tracing::warn!("GOOGLE_API_KEY is set but the gemini feature is disabled");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_GEMINI_API_BASE;
    use serde_json::json;

    fn google(api_key: Option<&str>) -> GoogleConfig {
        GoogleConfig {
            api_key: api_key.map(str::to_string),
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            timeout_secs: None,
        }
    }

    #[test]
    fn no_credential_means_no_client() {
        assert!(resolve_model_client(&google(None)).is_none());
        assert!(resolve_model_client(&google(Some(""))).is_none());
    }

    #[cfg(feature = "gemini")]
    #[test]
    fn credential_resolves_gemini_client() {
        let client = resolve_model_client(&google(Some("key"))).expect("client");
        assert_eq!(client.name(), "gemini");
    }

    #[test]
    fn response_view_prefers_nested_response() {
        let reply = ProviderReply::new(json!({ "response": { "text": "inner" }, "text": "outer" }));
        assert_eq!(reply.response().value["text"], "inner");
        assert_eq!(reply.result().value["text"], "outer");
    }

    #[test]
    fn response_view_falls_back_to_result() {
        let reply = ProviderReply::new(json!({ "response": null, "text": "outer" }));
        assert_eq!(reply.response().value["text"], "outer");

        let reply = ProviderReply::new(json!({ "text": "outer" }));
        assert_eq!(reply.response().value["text"], "outer");
    }

    #[test]
    fn response_accessor_only_binds_to_nested_response() {
        let accessor: Arc<dyn TextAccessor> = Arc::new(mock::StaticText::ok("x"));

        let nested = ProviderReply::new(json!({ "response": {} }))
            .with_response_text(accessor.clone());
        assert!(nested.response().text_accessor.is_some());
        assert!(nested.result().text_accessor.is_none());

        let flat = ProviderReply::new(json!({})).with_response_text(accessor);
        assert!(flat.response().text_accessor.is_none());
    }
}
