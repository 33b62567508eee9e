//! Logic Validator
//!
//! Screens free-text input (house rules, rules questions) before it reaches an
//! analyzer. Only a length check is local; the rest is the model's call. When
//! the model cannot be reached or answers nonsense, the input is allowed.

use serde::{Deserialize, Serialize};

use crate::core::error::OracleError;
use crate::core::llm::{generate_text, reply, LLMProvider};

/// Inputs shorter than this (in characters, after trimming) are rejected.
pub const MIN_INPUT_CHARS: usize = 5;

pub const LOGIC_TEMPERATURE: f32 = 0.1;

pub const TOO_SHORT_REASON: &str = "The scroll is too short or empty to be meaningful.";
pub const INTUITION_REASON: &str = "The Oracle's intuition allows this to pass.";

/// What kind of input is being screened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputContext {
    HouseRule,
    RulesQuestion,
}

impl InputContext {
    /// Phrase inserted into the screening prompt.
    pub fn label(&self) -> &'static str {
        match self {
            InputContext::HouseRule => "house rule",
            InputContext::RulesQuestion => "question about game rules",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicVerdict {
    pub is_logical: bool,
    #[serde(default)]
    pub reason: String,
}

impl LogicVerdict {
    pub fn logical(reason: impl Into<String>) -> Self {
        Self {
            is_logical: true,
            reason: reason.into(),
        }
    }

    pub fn illogical(reason: impl Into<String>) -> Self {
        Self {
            is_logical: false,
            reason: reason.into(),
        }
    }
}

/// Decide whether `text` is a sensible input of kind `context`.
pub async fn check(
    provider: &dyn LLMProvider,
    text: &str,
    context: InputContext,
    model: &str,
) -> LogicVerdict {
    if text.trim().chars().count() < MIN_INPUT_CHARS {
        return LogicVerdict::illogical(TOO_SHORT_REASON);
    }

    let prompt = logic_prompt(text, context);
    let result = match generate_text(provider, model, &prompt, LOGIC_TEMPERATURE).await {
        Ok(raw) => reply::parse_json::<LogicVerdict>(&raw),
        Err(e) => Err(OracleError::from(e)),
    };

    match result {
        Ok(verdict) => {
            if !verdict.is_logical {
                let err = OracleError::InputRejected(verdict.reason.clone());
                log::info!("[{}] {} ({})", err.kind(), err, context.label());
            }
            verdict
        }
        Err(e) => {
            log::error!("Logic check failed, letting input through: [{}] {}", e.kind(), e);
            LogicVerdict::logical(INTUITION_REASON)
        }
    }
}

fn logic_prompt(text: &str, context: InputContext) -> String {
    format!(
        r#"Determine if the following text is a logical and relevant {label} for a tabletop game.
It should not be gibberish, offensive, or completely unrelated to gaming.

Text: "{text}"

Return JSON:
{{
    "is_logical": bool,
    "reason": "Brief explanation (1 sentence)"
}}"#,
        label = context.label()
    )
}
