//! Google Provider Unit Tests (API Key-based)

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::core::llm::{generate_text, ChatRequest, GoogleProvider, LLMError, LLMProvider};

const KEY: &str = "AIzaTestApiKey";

fn provider(server: &MockServer) -> GoogleProvider {
    GoogleProvider::with_endpoint(
        KEY.to_string(),
        "gemini-3-flash-preview".to_string(),
        server.uri(),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }],
        "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 3 }
    })
}

// =============================================================================
// Request Formatting
// =============================================================================

#[tokio::test]
async fn test_request_carries_key_prompt_and_temperature() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-3-flash-preview:generateContent"))
        .and(header("x-goog-api-key", KEY))
        .and(body_partial_json(json!({
            "contents": [{ "role": "user", "parts": [{ "text": "Is this a rulebook?" }] }],
            "generationConfig": { "temperature": 0.5 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("yes")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider(&server);
    let text = generate_text(&provider, "gemini-3-flash-preview", "Is this a rulebook?", 0.5)
        .await
        .unwrap();
    assert_eq!(text, "yes");
}

#[tokio::test]
async fn test_request_model_overrides_default() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("pro")))
        .expect(1)
        .mount(&server)
        .await;

    let response = provider(&server)
        .chat(ChatRequest::prompt("hi").with_model("gemini-2.5-pro"))
        .await
        .unwrap();
    assert_eq!(response.model, "gemini-2.5-pro");
    assert_eq!(response.content, "pro");
}

// =============================================================================
// Response Parsing
// =============================================================================

#[tokio::test]
async fn test_usage_and_finish_reason_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("ok")))
        .mount(&server)
        .await;

    let response = provider(&server).chat(ChatRequest::prompt("hi")).await.unwrap();
    let usage = response.usage.expect("usage metadata");
    assert_eq!(usage.input_tokens, 12);
    assert_eq!(usage.output_tokens, 3);
    assert_eq!(response.finish_reason.as_deref(), Some("STOP"));
    assert_eq!(response.provider, "google");
}

#[tokio::test]
async fn test_missing_candidates_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let err = provider(&server).chat(ChatRequest::prompt("hi")).await.unwrap_err();
    assert!(matches!(err, LLMError::InvalidResponse(_)));
}

// =============================================================================
// Error Handling
// =============================================================================

#[tokio::test]
async fn test_error_status_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exhausted"))
        .mount(&server)
        .await;

    let err = provider(&server).chat(ChatRequest::prompt("hi")).await.unwrap_err();
    match err {
        LLMError::ApiError { status, message } => {
            assert_eq!(status, 429);
            assert_eq!(message, "quota exhausted");
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(reply("late"))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let provider = GoogleProvider::with_endpoint(
        KEY.to_string(),
        "gemini-3-flash-preview".to_string(),
        server.uri(),
        Duration::from_millis(50),
    )
    .unwrap();

    let err = provider.chat(ChatRequest::prompt("hi")).await.unwrap_err();
    assert!(matches!(err, LLMError::HttpError(_)));
}
