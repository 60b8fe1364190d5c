use serde::Serialize;
use serde_json::Value;
use service_core::error::AppError;

/// A question for the model.
///
/// Built leniently from whatever JSON the client sent: both fields are
/// coerced to strings and missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskRequest {
    pub model: String,
    pub prompt: String,
}

impl AskRequest {
    /// Parse a raw request body.
    ///
    /// Only bodies that are not JSON, or are JSON `null`, are rejected.
    pub fn from_body(body: &[u8], default_model: &str) -> Result<Self, AppError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!(e.to_string())))?;

        if value.is_null() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Request body must be a JSON object, got null"
            )));
        }

        Ok(Self::from_value(&value, default_model))
    }

    pub fn from_value(value: &Value, default_model: &str) -> Self {
        let field = |key: &str, default: &str| match value.get(key) {
            None | Some(Value::Null) => default.to_string(),
            Some(other) => coerce_to_string(other),
        };

        Self {
            model: field("model", default_model),
            prompt: field("prompt", ""),
        }
    }
}

/// String conversion with the conventions browsers use for form values.
fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(coerce_to_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Answer returned by `POST /api/ask`.
///
/// `answer`, `model` and `prompt` are always present; the rest only when the
/// path that produced the answer knows them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub answer: String,
    pub model: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AskResponse {
    /// Response carrying only the answer and the echoed request.
    pub fn plain(answer: impl Into<String>, request: AskRequest) -> Self {
        Self {
            answer: answer.into(),
            model: request.model,
            prompt: request.prompt,
            usage: None,
            model_version: None,
            response_id: None,
            raw: None,
            error: None,
        }
    }
}
