//! Rule Simplifier
//!
//! Rewrites the loaded rulebooks into three progressive learning tiers.

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::llm::reply;

use super::pipeline::{AnalysisPipeline, ParseReply};
use super::profile::{PromptContext, RequiredInput, ToolKind, ToolProfile};

pub const SIMPLIFIER_PROFILE: ToolProfile = ToolProfile {
    tool: ToolKind::Simplifier,
    char_ceiling: 500_000,
    temperature: 0.3,
    required_input: RequiredInput::Corpus,
    template: simplifier_prompt,
};

pub fn simplifier() -> AnalysisPipeline<TieredRulebook> {
    AnalysisPipeline::new(SIMPLIFIER_PROFILE)
}

/// The rulebook at three difficulty levels, each in Markdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieredRulebook {
    pub first_game: String,
    pub advanced: String,
    pub expert: String,
    #[serde(default)]
    pub summary: String,
}

impl TieredRulebook {
    pub fn summary_or_default(&self) -> &str {
        if self.summary.trim().is_empty() {
            "No summary available."
        } else {
            &self.summary
        }
    }
}

impl ParseReply for TieredRulebook {
    fn parse_reply(raw: &str) -> Result<Self> {
        reply::parse_json(raw)
    }
}

fn simplifier_prompt(ctx: &PromptContext<'_>) -> String {
    format!(
        r#"You are an expert tabletop game educator.
Your task is to rewrite the provided rulebook text for '{title}' into three progressive learning modes.

Rulebook Text:
---
{rulebook}
---

Output Specifications:
1. **First Game Rules**: Simplify using straightforward language, focusing ONLY on core mechanics and essential gameplay. Use bullet points and short paragraphs.
2. **Advanced Rules**: Include additional mechanics and strategies but maintain clarity. Provide clear examples.
3. **Expert Rules**: Comprehensive overview including all nuances, edge cases, and advanced strategies for experienced players.

Return JSON:
{{
    "first_game": "Markdown text for first game rules",
    "advanced": "Markdown text for advanced rules",
    "expert": "Markdown text for expert rules",
    "summary": "Quick meta-summary of the rulebook structure"
}}"#,
        title = ctx.title_or("a tabletop game"),
        rulebook = ctx.corpus,
    )
}
