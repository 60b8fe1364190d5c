//! Reduce a provider reply of unknown shape to a flat answer.
//!
//! Providers do not tag their payloads, so the answer text is located by
//! trying a fixed, ordered list of shape matchers. The first matcher that
//! recognises the payload wins. The last one accepts anything, so
//! normalization never fails for shape reasons; the only error is a text
//! accessor that refuses to produce text.

use super::providers::{PayloadView, ProviderError, ProviderReply, TextAccessor};
use serde_json::Value;
use std::sync::Arc;

/// Where the answer text comes from once a matcher has fired.
pub enum TextSource {
    Text(String),
    Accessor(Arc<dyn TextAccessor>),
}

/// Both levels of a reply, as seen by the matchers.
#[derive(Clone, Copy)]
pub struct Shapes<'a> {
    pub response: PayloadView<'a>,
    pub result: PayloadView<'a>,
}

pub type ShapeMatcher = fn(&Shapes<'_>) -> Option<TextSource>;

/// Matchers in priority order. Must end with a total matcher.
pub const SHAPE_MATCHERS: &[(&str, ShapeMatcher)] = &[
    ("empty_response", empty_response),
    ("response_text_accessor", response_text_accessor),
    ("response_text_field", response_text_field),
    ("first_candidate", first_candidate),
    ("result_text_accessor", result_text_accessor),
    ("result_text_field", result_text_field),
    ("stringified_result", stringified_result),
];

/// Normalized provider answer and metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub answer: String,
    pub usage: Option<Value>,
    pub model_version: Option<String>,
    pub response_id: Option<String>,
    pub raw: Value,
    /// Name of the matcher that produced `answer`.
    pub shape: &'static str,
}

/// Pick the first matching shape, without resolving accessors.
pub fn match_shape(shapes: &Shapes<'_>) -> (&'static str, TextSource) {
    for (name, matcher) in SHAPE_MATCHERS {
        if let Some(source) = matcher(shapes) {
            return (*name, source);
        }
    }
    // Unreachable while the list ends with `stringified_result`.
    ("stringified_result", TextSource::Text(stringify(shapes.result.value)))
}

pub async fn normalize(reply: ProviderReply) -> Result<Normalized, ProviderError> {
    let (shape, answer, usage, model_version, response_id) = {
        let shapes = Shapes {
            response: reply.response(),
            result: reply.result(),
        };

        let (shape, source) = match_shape(&shapes);
        let answer = match source {
            TextSource::Text(text) => text,
            TextSource::Accessor(accessor) => accessor.text().await?,
        };

        let response = shapes.response.value;
        let result = shapes.result.value;
        let usage = first_present(&[
            response.get("usageMetadata"),
            response.get("usage"),
            result.get("usage"),
        ])
        .cloned();
        let model_version =
            first_present(&[response.get("modelVersion"), result.get("modelVersion")])
                .map(as_text);
        let response_id = first_present(&[response.get("responseId"), result.get("responseId")])
            .map(as_text);

        (shape, answer, usage, model_version, response_id)
    };

    tracing::debug!(shape, answer_len = answer.len(), "Normalized provider reply");

    Ok(Normalized {
        answer,
        usage,
        model_version,
        response_id,
        raw: reply.into_raw(),
        shape,
    })
}

fn empty_response(shapes: &Shapes<'_>) -> Option<TextSource> {
    is_falsy(shapes.response.value).then(|| TextSource::Text(stringify(shapes.result.value)))
}

fn response_text_accessor(shapes: &Shapes<'_>) -> Option<TextSource> {
    shapes
        .response
        .text_accessor
        .map(|a| TextSource::Accessor(a.clone()))
}

fn response_text_field(shapes: &Shapes<'_>) -> Option<TextSource> {
    string_field(shapes.response.value, "text").map(TextSource::Text)
}

fn first_candidate(shapes: &Shapes<'_>) -> Option<TextSource> {
    let candidate = shapes
        .response
        .value
        .get("candidates")?
        .as_array()?
        .first()?;

    if let Some(text) = string_field(candidate, "text") {
        return Some(TextSource::Text(text));
    }

    let Some(content) = candidate.get("content").and_then(Value::as_array) else {
        return Some(TextSource::Text(stringify(candidate)));
    };

    let entry = content
        .iter()
        .find(|c| {
            c.get("type").and_then(Value::as_str) == Some("output_text")
                || c.get("text").is_some_and(Value::is_string)
        })
        .or_else(|| content.first());

    let text = match entry.and_then(|e| e.get("text")).filter(|t| !t.is_null()) {
        Some(text) => as_text(text),
        None => stringify(candidate.get("content").unwrap_or(&Value::Null)),
    };
    Some(TextSource::Text(text))
}

fn result_text_accessor(shapes: &Shapes<'_>) -> Option<TextSource> {
    shapes
        .result
        .text_accessor
        .map(|a| TextSource::Accessor(a.clone()))
}

fn result_text_field(shapes: &Shapes<'_>) -> Option<TextSource> {
    string_field(shapes.result.value, "text").map(TextSource::Text)
}

fn stringified_result(shapes: &Shapes<'_>) -> Option<TextSource> {
    Some(TextSource::Text(stringify(shapes.result.value)))
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// First value that is present and not null.
fn first_present<'a>(candidates: &[Option<&'a Value>]) -> Option<&'a Value> {
    candidates.iter().flatten().copied().find(|v| !v.is_null())
}

/// Strings verbatim, anything else as compact JSON.
fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => stringify(other),
    }
}

fn stringify(value: &Value) -> String {
    value.to_string()
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
