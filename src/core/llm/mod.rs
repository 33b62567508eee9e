//! LLM Client Module
//!
//! Provides the model-service seam used by every validator and analyzer:
//! - `LLMProvider` trait and the `generate_text` convenience
//! - `GoogleProvider` for the Gemini `generateContent` API
//! - Reply parsing (code-fence stripping + strict JSON decoding)
//!
//! # Module Structure
//!
//! - `types`: chat messages, requests and responses
//! - `error`: `LLMError`
//! - `provider`: the `LLMProvider` trait
//! - `providers`: concrete provider implementations
//! - `reply`: model reply parsing

pub mod error;
pub mod provider;
pub mod providers;
pub mod reply;
pub mod types;

pub use error::{LLMError, Result};
pub use provider::{generate_text, LLMProvider};
pub use providers::*;
pub use types::{ChatMessage, ChatRequest, ChatResponse, MessageRole, TokenUsage};

#[cfg(test)]
pub use provider::MockLLMProvider;
