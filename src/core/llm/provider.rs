use async_trait::async_trait;

use super::error::Result;
use super::types::{ChatRequest, ChatResponse};

/// A model service able to complete a chat request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Stable provider identifier ("google").
    fn id(&self) -> &str;

    /// Default model used when a request does not name one.
    fn model(&self) -> &str;

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;
}

/// Generate text for `prompt` with `model` at `temperature`.
///
/// The single-shot call every validator and analyzer goes through.
pub async fn generate_text(
    provider: &dyn LLMProvider,
    model: &str,
    prompt: &str,
    temperature: f32,
) -> Result<String> {
    let request = ChatRequest::prompt(prompt)
        .with_temperature(temperature)
        .with_model(model);

    let response = provider.chat(request).await?;
    log::debug!(
        "Model {} replied in {}ms ({} chars)",
        response.model,
        response.latency_ms,
        response.content.len()
    );
    Ok(response.content)
}
