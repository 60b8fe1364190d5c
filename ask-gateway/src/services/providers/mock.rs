//! Mock model client for testing.

use super::{ModelClient, ProviderError, ProviderReply, TextAccessor};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// What the mock does when asked to generate.
#[derive(Clone)]
enum Script {
    Reply(ProviderReply),
    Fail(String),
}

/// Mock model client returning a scripted reply or failure, counting calls.
#[derive(Clone)]
pub struct MockModelClient {
    script: Script,
    calls: Arc<AtomicUsize>,
}

impl MockModelClient {
    pub fn replying(reply: ProviderReply) -> Self {
        Self {
            script: Script::Reply(reply),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Every call fails with an API error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            script: Script::Fail(message.into()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of `generate` calls so far, shared between clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, _model: &str, _prompt: &str) -> Result<ProviderReply, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Reply(reply) => Ok(reply.clone()),
            Script::Fail(message) => Err(ProviderError::ApiError(message.clone())),
        }
    }
}

/// Text accessor with a fixed outcome.
pub struct StaticText(Result<String, String>);

impl StaticText {
    pub fn ok(text: impl Into<String>) -> Self {
        Self(Ok(text.into()))
    }

    pub fn blocked(reason: impl Into<String>) -> Self {
        Self(Err(reason.into()))
    }
}

#[async_trait]
impl TextAccessor for StaticText {
    async fn text(&self) -> Result<String, ProviderError> {
        self.0.clone().map_err(ProviderError::Blocked)
    }
}
