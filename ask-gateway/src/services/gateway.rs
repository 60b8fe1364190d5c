//! The ask pipeline: shortcut, client check, model call, normalization.
//!
//! Every path produces an [`AskResponse`]; failures to reach or understand the
//! model degrade to a placeholder or an inline error answer.

use super::fallback::{placeholder_answer, provider_error_answer};
use super::metrics;
use super::normalizer::normalize;
use super::providers::{ModelClient, ProviderError, ProviderReply};
use super::shortcut::ShortcutInterceptor;
use crate::models::{AskRequest, AskResponse};
use std::sync::Arc;
use std::time::Instant;

/// Which branch answered a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerPath {
    Shortcut,
    Unconfigured,
    Provider,
    ProviderError,
}

impl AnswerPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerPath::Shortcut => "shortcut",
            AnswerPath::Unconfigured => "unconfigured",
            AnswerPath::Provider => "provider",
            AnswerPath::ProviderError => "provider_error",
        }
    }
}

#[derive(Clone)]
pub struct AskGateway {
    shortcut: ShortcutInterceptor,
    client: Option<Arc<dyn ModelClient>>,
}

impl AskGateway {
    pub fn new(shortcut: ShortcutInterceptor, client: Option<Arc<dyn ModelClient>>) -> Self {
        Self { shortcut, client }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    pub async fn ask(&self, request: AskRequest) -> AskResponse {
        let (path, response) = self.route(request).await;
        metrics::record_ask(path.as_str());
        response
    }

    async fn route(&self, request: AskRequest) -> (AnswerPath, AskResponse) {
        if let Some(answer) = self.shortcut.intercept(&request.prompt) {
            tracing::info!(model = %request.model, "Identity question answered from shortcut");
            return (AnswerPath::Shortcut, AskResponse::plain(answer, request));
        }

        let Some(client) = self.client.as_deref() else {
            tracing::info!(model = %request.model, "No model client configured, using placeholder");
            let answer = placeholder_answer(&request.model, &request.prompt);
            return (AnswerPath::Unconfigured, AskResponse::plain(answer, request));
        };

        match self.call(client, &request).await {
            Ok(normalized) => {
                metrics::record_normalizer_match(normalized.shape);
                let mut response = AskResponse::plain(normalized.answer, request);
                response.usage = normalized.usage;
                response.model_version = normalized.model_version;
                response.response_id = normalized.response_id;
                response.raw = Some(normalized.raw);
                (AnswerPath::Provider, response)
            }
            Err(e) => {
                let error = e.to_string();
                tracing::warn!(
                    provider = client.name(),
                    model = %request.model,
                    error = %error,
                    "Model call failed, answering with fallback"
                );
                let answer = provider_error_answer(&error, &request.prompt);
                let mut response = AskResponse::plain(answer, request);
                response.error = Some(error);
                (AnswerPath::ProviderError, response)
            }
        }
    }

    async fn call(
        &self,
        client: &dyn ModelClient,
        request: &AskRequest,
    ) -> Result<super::normalizer::Normalized, ProviderError> {
        let start = Instant::now();
        let reply: Result<ProviderReply, ProviderError> =
            client.generate(&request.model, &request.prompt).await;
        metrics::record_provider_latency(client.name(), start.elapsed().as_secs_f64());

        let reply = reply?;
        tracing::debug!(provider = client.name(), model = %request.model, "Model replied");
        normalize(reply).await
    }
}
