//! Canned answers for identity questions.
//!
//! Matching is a case-insensitive substring test, so any prompt mentioning a
//! trigger phrase is answered from here, even when it also asks something
//! else.

/// Phrases that ask the assistant who or what it is.
pub const IDENTITY_TRIGGERS: &[&str] = &[
    "是什么模型",
    "是谁",
    "谁是",
    "what model are you",
    "who are you",
];

pub const DEFAULT_IDENTITY_ANSWER: &str = "我是一个接入可配置生成式模型的 AI 助手，擅长处理编程和技术问题。只要是编程相关的内容，我都可以帮忙！你现在有什么想做的？";

#[derive(Debug, Clone)]
pub struct ShortcutInterceptor {
    answer: String,
}

impl Default for ShortcutInterceptor {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ShortcutInterceptor {
    pub fn new(answer: Option<String>) -> Self {
        Self {
            answer: answer.unwrap_or_else(|| DEFAULT_IDENTITY_ANSWER.to_string()),
        }
    }

    /// The canned answer if `prompt` contains a trigger phrase.
    pub fn intercept(&self, prompt: &str) -> Option<&str> {
        let lowered = prompt.to_lowercase();
        IDENTITY_TRIGGERS
            .iter()
            .any(|trigger| lowered.contains(trigger))
            .then_some(self.answer.as_str())
    }
}
