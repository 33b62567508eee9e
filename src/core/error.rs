//! Oracle Error Types
//!
//! Failure kinds raised inside the validators and analyzers. None of these
//! escape the component boundaries: they are logged by kind and turned into
//! an absent result or a default verdict.

use thiserror::Error;

use crate::core::llm::LLMError;

#[derive(Debug, Error)]
pub enum OracleError {
    /// The PDF library could not produce text for a document.
    #[error("Failed to extract text from {file_name}: {message}")]
    ExtractionFailure { file_name: String, message: String },

    /// The rulebook check could not reach a verdict.
    #[error("Could not determine whether the document is a rulebook: {0}")]
    ValidationIndeterminate(String),

    /// The model service call failed.
    #[error("Model call failed: {0}")]
    ModelCallFailure(#[from] LLMError),

    /// The model reply did not decode into the expected shape.
    #[error("Failed to parse model reply: {0}")]
    ParseFailure(String),

    /// The logic gate vetoed the user's input.
    #[error("Input rejected: {0}")]
    InputRejected(String),
}

impl OracleError {
    /// Create an extraction failure for `file_name`.
    pub fn extraction(file_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExtractionFailure {
            file_name: file_name.into(),
            message: message.into(),
        }
    }

    /// Short label used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ExtractionFailure { .. } => "extraction_failure",
            Self::ValidationIndeterminate(_) => "validation_indeterminate",
            Self::ModelCallFailure(_) => "model_call_failure",
            Self::ParseFailure(_) => "parse_failure",
            Self::InputRejected(_) => "input_rejected",
        }
    }
}

impl From<serde_json::Error> for OracleError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseFailure(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OracleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_display() {
        let err = OracleError::extraction("catan.pdf", "encrypted");
        assert_eq!(err.to_string(), "Failed to extract text from catan.pdf: encrypted");
        assert_eq!(err.kind(), "extraction_failure");
    }

    #[test]
    fn test_serde_error_becomes_parse_failure() {
        let err: OracleError = serde_json::from_str::<serde_json::Value>("not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, OracleError::ParseFailure(_)));
    }

    #[test]
    fn test_llm_error_wraps() {
        let err: OracleError = LLMError::InvalidResponse("Missing content".to_string()).into();
        assert_eq!(err.kind(), "model_call_failure");
        assert!(err.to_string().contains("Missing content"));
    }
}
