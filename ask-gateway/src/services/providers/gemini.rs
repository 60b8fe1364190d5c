//! Gemini model client.
//!
//! Calls the `generateContent` REST method and returns the body wrapped the
//! way the official client libraries expose it: `{ "response": <body> }` with
//! a `text()` accessor on the response.

use super::{ModelClient, ProviderError, ProviderReply, TextAccessor};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use service_core::observability::TracePropagation;
use std::sync::Arc;
use std::time::Duration;

/// Finish reasons for which the official libraries refuse to return text.
const BLOCKED_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "RECITATION",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
];

/// Gemini client configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub api_base: String,
    /// `None` leaves the request unbounded.
    pub timeout: Option<Duration>,
}

/// Header carrying the API key. The key must never appear in the request URL:
/// `reqwest` errors quote it, and provider errors are returned to callers.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini model client.
pub struct GeminiClient {
    config: GeminiConfig,
    api_base: Url,
    client: Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let api_base = Url::parse(&config.api_base)
            .map_err(|e| ProviderError::NotConfigured(format!("GEMINI_API_BASE: {}", e)))?;
        if api_base.cannot_be_a_base() {
            return Err(ProviderError::NotConfigured(format!(
                "GEMINI_API_BASE is not a base URL: {}",
                config.api_base
            )));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self {
            config,
            api_base,
            client,
        })
    }

    /// `{base}/models/{model}:{method}`, with `model` encoded as a single path
    /// segment so caller input cannot change the target.
    fn api_url(&self, model: &str, method: &str) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("models")
                .push(&format!("{}:{}", model, method));
        }
        url
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<ProviderReply, ProviderError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        tracing::debug!(
            model = %model,
            prompt_len = prompt.len(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(self.api_url(model, "generateContent"))
            .header(API_KEY_HEADER, &self.config.api_key)
            .with_trace_context()
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.without_url().to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| {
                ProviderError::ApiError(format!("Failed to parse response: {}", e.without_url()))
            })?;

        let accessor = ResponseText::from_body(&body);
        Ok(ProviderReply::new(json!({ "response": body })).with_response_text(Arc::new(accessor)))
    }
}

/// `response.text()` as the official client libraries define it: the text
/// parts of the first candidate, concatenated. Fails when the content was
/// withheld.
#[derive(Debug)]
pub struct ResponseText {
    outcome: Result<String, String>,
}

impl ResponseText {
    pub fn from_body(body: &Value) -> Self {
        let parsed: GenerateContentResponse =
            serde_json::from_value(body.clone()).unwrap_or_default();
        Self {
            outcome: Self::evaluate(&parsed),
        }
    }

    fn evaluate(response: &GenerateContentResponse) -> Result<String, String> {
        let Some(candidate) = response.candidates.first() else {
            return match response
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.as_deref())
            {
                Some(reason) => Err(format!(
                    "Text not available. Response was blocked due to {}",
                    reason
                )),
                None => Ok(String::new()),
            };
        };

        if let Some(reason) = candidate.finish_reason.as_deref() {
            if BLOCKED_FINISH_REASONS.contains(&reason) {
                return Err(format!("Candidate was blocked due to {}", reason));
            }
        }

        Ok(candidate
            .content
            .as_ref()
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl TextAccessor for ResponseText {
    async fn text(&self) -> Result<String, ProviderError> {
        self.outcome.clone().map_err(ProviderError::Blocked)
    }
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn text_concatenates_first_candidate_parts() {
        let body = json!({
            "candidates": [
                { "content": { "parts": [{ "text": "Hello, " }, { "text": "world" }] }, "finishReason": "STOP" },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        });
        assert_eq!(ResponseText::from_body(&body).text().await.unwrap(), "Hello, world");
    }

    #[tokio::test]
    async fn text_fails_for_blocked_prompt() {
        let body = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let err = ResponseText::from_body(&body).text().await.unwrap_err();
        assert!(matches!(err, ProviderError::Blocked(_)));
        assert!(err.to_string().contains("SAFETY"));
    }

    #[tokio::test]
    async fn text_fails_for_blocked_candidate() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": "partial" }] }, "finishReason": "RECITATION" }]
        });
        assert!(ResponseText::from_body(&body).text().await.is_err());
    }

    #[tokio::test]
    async fn text_is_empty_without_candidates_or_feedback() {
        let body = json!({ "usageMetadata": { "promptTokenCount": 3 } });
        assert_eq!(ResponseText::from_body(&body).text().await.unwrap(), "");
    }

    fn client(api_key: &str, api_base: &str) -> GeminiClient {
        GeminiClient::new(GeminiConfig {
            api_key: api_key.to_string(),
            api_base: api_base.to_string(),
            timeout: None,
        })
        .unwrap()
    }

    #[test]
    fn api_url_targets_model_method_without_key() {
        let url = client("k", "http://localhost:9/v1beta/")
            .api_url("gemini-2.5-flash", "generateContent");
        assert_eq!(
            url.as_str(),
            "http://localhost:9/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert!(url.query().is_none());
    }

    #[test]
    fn model_cannot_escape_its_path_segment() {
        let client = client("k", "http://localhost:9/v1beta");
        for model in ["x:other?foo=", "m#frag", "../../admin", "a/b"] {
            let url = client.api_url(model, "generateContent");
            assert!(url.query().is_none(), "{model}");
            assert!(url.fragment().is_none(), "{model}");
            assert_eq!(url.path_segments().unwrap().count(), 3, "{model}");
            assert!(url.path().ends_with(":generateContent"), "{model}");
        }
    }

    #[test]
    fn invalid_base_is_a_configuration_error() {
        let result = GeminiClient::new(GeminiConfig {
            api_key: "k".to_string(),
            api_base: "not a url".to_string(),
            timeout: None,
        });
        assert!(matches!(result, Err(ProviderError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn network_errors_do_not_carry_the_key() {
        // Nothing listens on the discard port.
        let client = client("SECRET-KEY-123", "http://127.0.0.1:9/v1beta");

        let err = client.generate("gemini-2.5-flash-lite", "hi").await.unwrap_err();

        assert!(matches!(err, ProviderError::NetworkError(_)));
        assert!(!err.to_string().contains("SECRET-KEY-123"));
    }
}
