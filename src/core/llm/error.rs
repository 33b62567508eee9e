//! LLM Error Types

use thiserror::Error;

/// Errors raised while talking to the model service.
#[derive(Debug, Error)]
pub enum LLMError {
    /// Transport-level failure (connection, timeout, body decoding).
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// The service answered, but not with the shape we expect.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// No credential or model configured.
    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl LLMError {
    /// Short label used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            LLMError::HttpError(_) => "http",
            LLMError::ApiError { .. } => "api",
            LLMError::InvalidResponse(_) => "invalid_response",
            LLMError::NotConfigured(_) => "not_configured",
        }
    }
}

pub type Result<T> = std::result::Result<T, LLMError>;
