//! RuleMaster Assistant
//!
//! Answers a free-form rules question in Markdown.

use serde::{Deserialize, Serialize};

use crate::core::error::{OracleError, Result};

use super::pipeline::{AnalysisPipeline, ParseReply};
use super::profile::{PromptContext, RequiredInput, ToolKind, ToolProfile};

pub const ASSISTANT_PROFILE: ToolProfile = ToolProfile {
    tool: ToolKind::Assistant,
    char_ceiling: 800_000,
    temperature: 0.4,
    required_input: RequiredInput::UserInput,
    template: assistant_prompt,
};

pub fn assistant() -> AnalysisPipeline<RulingAnswer> {
    AnalysisPipeline::new(ASSISTANT_PROFILE)
}

/// The model's answer, verbatim Markdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RulingAnswer(pub String);

impl RulingAnswer {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl ParseReply for RulingAnswer {
    fn parse_reply(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(OracleError::ParseFailure("empty answer".to_string()));
        }
        Ok(RulingAnswer(raw.to_string()))
    }
}

fn assistant_prompt(ctx: &PromptContext<'_>) -> String {
    format!(
        r#"You are the 'RuleMaster Assistant', a divine sage and expert in tabletop game rules for '{title}'.
Your task is to answer user questions about the game rules accurately and concisely, citing the official rules where possible.

{context}

User Question:
---
{question}
---

Return your answer in Markdown format. If the answer is not found in the provided rules, use your vast internal knowledge but mention that it's based on general game expertise."#,
        title = ctx.title_or("all games"),
        context = ctx.context_block(),
        question = ctx.user_input,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analysis::pipeline::AnalysisRequest;
    use crate::core::llm::{ChatResponse, MockLLMProvider};

    #[test]
    fn test_answer_is_verbatim() {
        let raw = "```\nnot stripped\n```\n**Yes.**";
        assert_eq!(RulingAnswer::parse_reply(raw).unwrap().as_str(), raw);
    }

    #[test]
    fn test_blank_answer_fails() {
        assert!(RulingAnswer::parse_reply("  \n").is_err());
    }

    #[test]
    fn test_prompt_shape() {
        let request = AnalysisRequest::new("m")
            .with_title(Some("Root"))
            .with_input("Can the Marquise build twice?");
        let prompt = assistant().build_prompt(&request).unwrap();
        assert!(prompt.contains("expert in tabletop game rules for 'Root'"));
        assert!(prompt.contains("User Question:\n---\nCan the Marquise build twice?\n---"));
        assert!(prompt.contains("Game Title: Root\n\nNote: No official rulebook PDF was provided."));
    }

    #[tokio::test]
    async fn test_analyze_at_assistant_temperature() {
        let mut mock = MockLLMProvider::new();
        mock.expect_chat()
            .withf(|req| req.temperature == Some(0.4))
            .times(1)
            .returning(|_| Ok(ChatResponse::text("**No.** Only once per turn.", "m", "mock")));

        let request = AnalysisRequest::new("m").with_input("Can I build twice?");
        let answer = assistant().analyze(&mock, &request).await.unwrap();
        assert_eq!(answer.into_inner(), "**No.** Only once per turn.");
    }
}
