//! Rulebook Validator
//!
//! Authenticates uploaded tomes. Cheap keyword matching admits obvious
//! rulebooks without a model call; everything else is shown to the model.
//! Any failure on the model path rejects the document.

use serde::{Deserialize, Serialize};

use crate::core::analysis::corpus::truncate_chars;
use crate::core::error::OracleError;
use crate::core::llm::{generate_text, reply, LLMProvider};
use crate::core::session::DocumentCache;
use crate::ingestion::Document;

// ============================================================================
// Constants
// ============================================================================

/// Terminology that marks a text as a board game rulebook.
pub const RULEBOOK_KEYWORDS: [&str; 8] = [
    "setup",
    "gameplay",
    "components",
    "turn order",
    "victory conditions",
    "rules",
    "player",
    "phase",
];

/// Distinct keyword matches needed to skip the model check.
pub const MIN_KEYWORD_MATCHES: usize = 2;

/// Characters of the text shown to the model.
pub const SNIPPET_CHARS: usize = 2000;

pub const VALIDATION_TEMPERATURE: f32 = 0.1;

pub const NO_TEXT_REASON: &str = "No readable text found in the tome.";
pub const KEYWORDS_REASON: &str = "Valid board game terminology detected.";
pub const UNVERIFIED_REASON: &str = "The Oracle could not verify this text's nature.";

// ============================================================================
// Validation Result
// ============================================================================

/// Verdict on one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    #[serde(alias = "is_rulebook")]
    pub is_valid: bool,
    #[serde(default)]
    pub reason: String,
}

impl ValidationResult {
    pub fn valid(reason: impl Into<String>) -> Self {
        Self {
            is_valid: true,
            reason: reason.into(),
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            reason: reason.into(),
        }
    }
}

// ============================================================================
// Validator
// ============================================================================

/// Keywords from `RULEBOOK_KEYWORDS` that occur in `text` (case-insensitive
/// substring match).
pub fn keyword_matches(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    RULEBOOK_KEYWORDS
        .iter()
        .copied()
        .filter(|keyword| lower.contains(keyword))
        .collect()
}

/// Decide whether `text` (extracted from `file_name`) is a board game rulebook.
pub async fn validate(
    provider: &dyn LLMProvider,
    text: Option<&str>,
    file_name: &str,
    model: &str,
) -> ValidationResult {
    let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
        log::info!("Rejected {file_name}: no readable text");
        return ValidationResult::invalid(NO_TEXT_REASON);
    };

    let matches = keyword_matches(text);
    if matches.len() >= MIN_KEYWORD_MATCHES {
        log::info!("Authenticated {file_name} by keywords: {matches:?}");
        return ValidationResult::valid(KEYWORDS_REASON);
    }

    log::debug!(
        "{file_name} matched {} keyword(s), asking the model",
        matches.len()
    );

    let prompt = validation_prompt(file_name, truncate_chars(text, SNIPPET_CHARS));
    let result = match generate_text(provider, model, &prompt, VALIDATION_TEMPERATURE).await {
        Ok(raw) => reply::parse_json::<ValidationResult>(&raw),
        Err(e) => Err(OracleError::from(e)),
    };

    match result {
        Ok(verdict) => {
            log::info!(
                "Model verdict for {file_name}: is_rulebook={} ({})",
                verdict.is_valid,
                verdict.reason
            );
            verdict
        }
        Err(e) => {
            let err = OracleError::ValidationIndeterminate(format!("{file_name}: {e}"));
            log::error!("[{}] {}", err.kind(), err);
            ValidationResult::invalid(UNVERIFIED_REASON)
        }
    }
}

/// `validate` memoized by the document's key.
pub async fn validate_cached(
    cache: &mut DocumentCache<ValidationResult>,
    provider: &dyn LLMProvider,
    document: &Document,
    text: Option<&str>,
    model: &str,
) -> ValidationResult {
    let key = document.key();
    if let Some(cached) = cache.get(&key).cloned() {
        cache.record_hit();
        return cached;
    }

    let result = validate(provider, text, document.file_name(), model).await;
    cache.insert(key, result.clone());
    result
}

fn validation_prompt(file_name: &str, snippet: &str) -> String {
    format!(
        r#"Analyze the following text snippet from a file named '{file_name}'.
Determine if this is a board game rulebook.

Text Snippet:
---
{snippet}
---

Return JSON:
{{
    "is_rulebook": bool,
    "reason": "Clear explanation of why it is or isn't a rulebook"
}}"#
    )
}
