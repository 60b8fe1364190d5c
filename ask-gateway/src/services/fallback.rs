//! Deterministic answers used when the model cannot be reached.

/// Every placeholder answer starts with this.
pub const PLACEHOLDER_MARKER: &str = "【模拟回答";

/// Answer for requests that cannot reach a model because no client is
/// configured. Names the model, echoes the prompt and tells the operator how
/// to enable the real backend.
pub fn placeholder_answer(model: &str, prompt: &str) -> String {
    format!(
        "{PLACEHOLDER_MARKER} - {model}】\n您提问：{prompt}\n\n\
         这是一个模拟响应，若要接入真实模型，请在项目根创建一个 .env 文件并设置 GOOGLE_API_KEY，\
         并确保以启用 gemini feature 的方式构建服务（默认已启用）。"
    )
}

/// Answer for requests whose model call failed. Embeds the error and the
/// prompt and says that a fallback was used.
pub fn provider_error_answer(error: &str, prompt: &str) -> String {
    format!("调用模型时发生错误：{error}\n\n（已回退到模拟响应）\n您提问：{prompt}")
}
