//! Mock implementations for testing
//!
//! `ScriptedProvider` replays canned replies in order and records every
//! prompt it was sent. Use it where a test cares about the sequence of model
//! calls; use the generated `MockLLMProvider` for single-call expectations.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::llm::{ChatRequest, ChatResponse, LLMError, LLMProvider, Result};

pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Number of `chat` calls made so far.
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    fn id(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let prompt = request.last_user_content().unwrap_or_default().to_string();
        self.prompts.lock().unwrap().push(prompt);

        let model = request.model.unwrap_or_else(|| self.model().to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(ChatResponse::text(text, model, "scripted")),
            Some(Err(e)) => Err(e),
            None => Err(LLMError::InvalidResponse("script exhausted".to_string())),
        }
    }
}

#[tokio::test]
async fn test_scripted_provider_replays_in_order() {
    let provider = ScriptedProvider::new(vec![
        Ok("first".to_string()),
        Err(LLMError::ApiError {
            status: 500,
            message: "boom".to_string(),
        }),
    ]);

    let first = provider.chat(ChatRequest::prompt("one")).await.unwrap();
    assert_eq!(first.content, "first");
    assert!(provider.chat(ChatRequest::prompt("two")).await.is_err());
    assert!(matches!(
        provider.chat(ChatRequest::prompt("three")).await,
        Err(LLMError::InvalidResponse(_))
    ));
    assert_eq!(provider.prompts(), ["one", "two", "three"]);
}
