//! Google Provider Implementation (API Key-based)
//!
//! Talks to Google's Generative Language API (`generateContent`) for
//! Gemini models.

use crate::core::llm::error::{LLMError, Result};
use crate::core::llm::provider::LLMProvider;
use crate::core::llm::types::{ChatRequest, ChatResponse, MessageRole, TokenUsage};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Google provider (API key-based)
pub struct GoogleProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl GoogleProvider {
    pub fn new(api_key: String, model: String) -> Result<Self> {
        Self::with_endpoint(
            api_key,
            model,
            DEFAULT_BASE_URL.to_string(),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Provider against a custom endpoint and request timeout.
    pub fn with_endpoint(
        api_key: String,
        model: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self> {
        let api_key = api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(LLMError::NotConfigured(
                "GEMINI_API_KEY is not set".to_string(),
            ));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    fn build_contents(request: &ChatRequest) -> Vec<serde_json::Value> {
        request
            .messages
            .iter()
            .map(|msg| {
                let role = match msg.role {
                    MessageRole::User => "user",
                    MessageRole::Assistant => "model",
                };
                serde_json::json!({
                    "role": role,
                    "parts": [{ "text": msg.content }]
                })
            })
            .collect()
    }

    fn build_body(request: &ChatRequest) -> serde_json::Value {
        let mut body = serde_json::json!({ "contents": Self::build_contents(request) });
        if let Some(temp) = request.temperature {
            body["generationConfig"] = serde_json::json!({ "temperature": temp });
        }
        body
    }
}

#[async_trait]
impl LLMProvider for GoogleProvider {
    fn id(&self) -> &str {
        "google"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let model = request
            .model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.model.clone());
        let url = self.endpoint(&model);
        let body = Self::build_body(&request);

        let start = std::time::Instant::now();
        let resp = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let latency = start.elapsed().as_millis() as u64;

        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            log::warn!("Gemini returned {} for model {}", status.as_u16(), model);
            return Err(LLMError::ApiError {
                status: status.as_u16(),
                message: text,
            });
        }

        let json: serde_json::Value = resp.json().await?;

        let candidate = json["candidates"].as_array().and_then(|arr| arr.first());

        let content = candidate
            .and_then(|c| c["content"]["parts"].as_array())
            .and_then(|parts| parts.first())
            .and_then(|p| p["text"].as_str())
            .ok_or_else(|| LLMError::InvalidResponse("Missing content".to_string()))?
            .to_string();

        let usage = json["usageMetadata"].as_object().map(|u| TokenUsage {
            input_tokens: u
                .get("promptTokenCount")
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as u32,
            output_tokens: u
                .get("candidatesTokenCount")
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as u32,
        });

        Ok(ChatResponse {
            content,
            model,
            provider: "google".to_string(),
            usage,
            finish_reason: candidate
                .and_then(|c| c["finishReason"].as_str())
                .map(|s| s.to_string()),
            latency_ms: latency,
        })
    }
}
