//! House Rule Oracle
//!
//! Judges a proposed house rule against the loaded rulebooks: risk level,
//! contradictions, exploits, pacing, and five impact scores.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::core::error::Result;
use crate::core::llm::reply;

use super::pipeline::{AnalysisPipeline, ParseReply};
use super::profile::{PromptContext, RequiredInput, ToolKind, ToolProfile};

pub const ORACLE_PROFILE: ToolProfile = ToolProfile {
    tool: ToolKind::Oracle,
    char_ceiling: 1_000_000,
    temperature: 0.2,
    required_input: RequiredInput::UserInput,
    template: oracle_prompt,
};

/// The impact axes, in display order.
pub const IMPACT_AXES: [&str; 5] = ["Balance", "Complexity", "Fun Factor", "Pacing", "Clarity"];

/// Score shown for an axis the model left out.
pub const DEFAULT_IMPACT_SCORE: f64 = 5.0;
pub const MAX_IMPACT_SCORE: f64 = 10.0;

pub fn oracle() -> AnalysisPipeline<HouseRuleAnalysis> {
    AnalysisPipeline::new(ORACLE_PROFILE)
}

// ============================================================================
// Result Types
// ============================================================================

/// Risk verdict, ordered by severity. Labels that name no known level map
/// to `Unknown`, which is treated as the most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum RiskLevel {
    Safe,
    Risky,
    GameBreaking,
    #[default]
    Unknown,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "Safe",
            RiskLevel::Risky => "Risky",
            RiskLevel::GameBreaking => "Game-Breaking",
            RiskLevel::Unknown => "Unknown",
        }
    }

    pub fn default_emoji(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "✅",
            RiskLevel::Risky => "⚠️",
            RiskLevel::GameBreaking => "❌",
            RiskLevel::Unknown => "❓",
        }
    }

    /// Classify a free-form label by the level it mentions, so "Mostly Safe"
    /// is `Safe`. The most severe mention wins.
    pub fn classify(label: &str) -> Self {
        let normalized: String = label
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        if normalized.contains("gamebreaking") {
            RiskLevel::GameBreaking
        } else if normalized.contains("risky") {
            RiskLevel::Risky
        } else if normalized.contains("safe") {
            RiskLevel::Safe
        } else {
            RiskLevel::Unknown
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The model's risk label as written, with the level it classifies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RiskScore {
    label: String,
    level: RiskLevel,
}

impl RiskScore {
    pub fn level(&self) -> RiskLevel {
        self.level
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Default for RiskScore {
    fn default() -> Self {
        Self::from(String::new())
    }
}

impl From<String> for RiskScore {
    fn from(raw: String) -> Self {
        let level = RiskLevel::classify(&raw);
        let label = match raw.trim() {
            "" => level.label().to_string(),
            trimmed => trimmed.to_string(),
        };
        Self { label, level }
    }
}

impl From<RiskScore> for String {
    fn from(score: RiskScore) -> Self {
        score.label
    }
}

impl std::fmt::Display for RiskScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label)
    }
}

/// An alternative rule proposed by the Oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub rule: String,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseRuleAnalysis {
    #[serde(default)]
    pub risk_score: RiskScore,
    #[serde(default)]
    pub risk_emoji: Option<String>,
    #[serde(default)]
    pub risk_explanation: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub contradictions: Vec<String>,
    #[serde(default, deserialize_with = "lenient_scores")]
    pub impact_scores: BTreeMap<String, f64>,
    #[serde(default)]
    pub balance_impact: Option<String>,
    #[serde(default)]
    pub exploits: Option<String>,
    #[serde(default)]
    pub game_pace: Option<String>,
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}

impl HouseRuleAnalysis {
    pub fn risk_level(&self) -> RiskLevel {
        self.risk_score.level()
    }

    /// Score for `axis`, clamped into [0, 10]; 5 when the model omitted it.
    pub fn impact_score(&self, axis: &str) -> f64 {
        match self.impact_scores.get(axis) {
            Some(score) if score.is_finite() => score.clamp(0.0, MAX_IMPACT_SCORE),
            _ => DEFAULT_IMPACT_SCORE,
        }
    }

    /// The five axes with their display scores, in display order.
    pub fn axis_scores(&self) -> Vec<(&'static str, f64)> {
        IMPACT_AXES
            .iter()
            .map(|axis| (*axis, self.impact_score(axis)))
            .collect()
    }

    pub fn emoji(&self) -> &str {
        self.risk_emoji
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| self.risk_level().default_emoji())
    }

    pub fn risk_explanation_or_default(&self) -> &str {
        non_empty(&self.risk_explanation).unwrap_or("The Oracle weighs the consequences...")
    }

    pub fn summary_or_default(&self) -> &str {
        non_empty(&self.summary).unwrap_or("No summary available.")
    }

    pub fn balance_impact_or_default(&self) -> &str {
        non_empty(&self.balance_impact).unwrap_or("N/A")
    }

    pub fn exploits_or_default(&self) -> &str {
        non_empty(&self.exploits).unwrap_or("N/A")
    }

    pub fn game_pace_or_default(&self) -> &str {
        non_empty(&self.game_pace).unwrap_or("N/A")
    }
}

/// Impact scores as numbers or numeric strings. Any other value is dropped,
/// so the axis renders with the default score.
fn lenient_scores<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(axis, value)| {
            let score = match &value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            score.map(|score| (axis, score))
        })
        .collect())
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.trim().is_empty())
}

/// Render a score without a trailing ".0" for whole numbers.
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{}", score as i64)
    } else {
        format!("{score:.1}")
    }
}

impl ParseReply for HouseRuleAnalysis {
    fn parse_reply(raw: &str) -> Result<Self> {
        reply::parse_json(raw)
    }
}

// ============================================================================
// Prompt
// ============================================================================

fn oracle_prompt(ctx: &PromptContext<'_>) -> String {
    format!(
        r#"You are an expert tabletop game designer and rules lawyer.
Analyze the 'House Rule' for '{title}'.

{context}

Proposed House Rule:
---
{house_rule}
---

Analysis Criteria:
1. **Contradictions**: Breaks existing rules?
2. **Economics**: Resource impact?
3. **Exploits**: Infinite loops/Solved states?
4. **Pacing**: Game length impact?
5. **Impact Scores** (0-10): Balance, Complexity, Fun Factor, Pacing, Clarity.

Return JSON:
{{
    "risk_score": "Safe | Risky | Game-Breaking",
    "risk_emoji": "✅ | ⚠️ | ❌",
    "risk_explanation": "A detailed 1-2 sentence explanation of the risk level.",
    "summary": "...",
    "contradictions": [],
    "impact_scores": {{ "Balance": 7, "Complexity": 8, "Fun Factor": 9, "Pacing": 6, "Clarity": 10 }},
    "balance_impact": "...",
    "exploits": "...",
    "game_pace": "...",
    "suggestions": [
        {{ "rule": "...", "explanation": "..." }}
    ]
}}"#,
        title = ctx.title_or("this game"),
        context = ctx.context_block(),
        house_rule = ctx.user_input,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analysis::pipeline::AnalysisRequest;
    use crate::core::llm::{ChatResponse, MockLLMProvider};
    use rstest::rstest;

    const FULL_REPLY: &str = r#"```json
{
    "risk_score": "Risky",
    "risk_emoji": "⚠️",
    "risk_explanation": "Extra cards speed up engines.",
    "summary": "Faster, swingier games.",
    "contradictions": ["Hand limit of 7"],
    "impact_scores": { "Balance": 4, "Complexity": 12, "Fun Factor": 8.5, "Pacing": -2 },
    "balance_impact": "Favors the leader.",
    "exploits": "Card cycling loop.",
    "game_pace": "Shorter by 15 minutes.",
    "suggestions": [ { "rule": "Draw 2, discard 1", "explanation": "Keeps hand size" } ]
}
```"#;

    #[rstest]
    #[case("Safe", RiskLevel::Safe)]
    #[case("risky", RiskLevel::Risky)]
    #[case("Game-Breaking", RiskLevel::GameBreaking)]
    #[case("game breaking", RiskLevel::GameBreaking)]
    #[case("Mostly Safe", RiskLevel::Safe)]
    #[case("Risky (but fun)", RiskLevel::Risky)]
    #[case("Safe-ish, possibly Game-Breaking", RiskLevel::GameBreaking)]
    #[case("Catastrophic", RiskLevel::Unknown)]
    #[case("", RiskLevel::Unknown)]
    fn test_risk_labels(#[case] label: &str, #[case] expected: RiskLevel) {
        assert_eq!(RiskLevel::classify(label), expected);
    }

    #[test]
    fn test_risk_label_kept_as_written() {
        let analysis = HouseRuleAnalysis::parse_reply(r#"{"risk_score": " Mostly Safe "}"#).unwrap();
        assert_eq!(analysis.risk_level(), RiskLevel::Safe);
        assert_eq!(analysis.risk_score.to_string(), "Mostly Safe");
        assert_eq!(analysis.emoji(), "✅");
    }

    #[test]
    fn test_loose_impact_scores() {
        let analysis = HouseRuleAnalysis::parse_reply(
            r#"{"risk_score":"Safe","impact_scores":{"Balance":"7","Complexity":" 3.5 ","Fun Factor":"high","Pacing":null,"Clarity":[1]}}"#,
        )
        .unwrap();
        assert_eq!(
            analysis.axis_scores(),
            vec![
                ("Balance", 7.0),
                ("Complexity", 3.5),
                ("Fun Factor", 5.0),
                ("Pacing", 5.0),
                ("Clarity", 5.0),
            ]
        );

        let analysis = HouseRuleAnalysis::parse_reply(r#"{"impact_scores": null}"#).unwrap();
        assert!(analysis.impact_scores.is_empty());
    }

    #[test]
    fn test_risk_severity_order() {
        assert!(RiskLevel::Safe < RiskLevel::Risky);
        assert!(RiskLevel::Risky < RiskLevel::GameBreaking);
        assert!(RiskLevel::GameBreaking < RiskLevel::Unknown);
    }

    #[test]
    fn test_parse_full_reply() {
        let analysis = HouseRuleAnalysis::parse_reply(FULL_REPLY).unwrap();
        assert_eq!(analysis.risk_level(), RiskLevel::Risky);
        assert_eq!(analysis.contradictions, vec!["Hand limit of 7"]);
        assert_eq!(analysis.suggestions[0].rule, "Draw 2, discard 1");
        assert_eq!(analysis.emoji(), "⚠️");
    }

    #[test]
    fn test_scores_are_clamped_and_defaulted() {
        let analysis = HouseRuleAnalysis::parse_reply(FULL_REPLY).unwrap();
        let scores = analysis.axis_scores();
        assert_eq!(
            scores,
            vec![
                ("Balance", 4.0),
                ("Complexity", 10.0),
                ("Fun Factor", 8.5),
                ("Pacing", 0.0),
                ("Clarity", 5.0),
            ]
        );
    }

    #[test]
    fn test_minimal_reply_uses_defaults() {
        let analysis = HouseRuleAnalysis::parse_reply("{}").unwrap();
        assert_eq!(analysis.risk_level(), RiskLevel::Unknown);
        assert_eq!(analysis.risk_score.label(), "Unknown");
        assert_eq!(analysis.emoji(), "❓");
        assert_eq!(analysis.summary_or_default(), "No summary available.");
        assert_eq!(analysis.balance_impact_or_default(), "N/A");
        assert!(analysis.axis_scores().iter().all(|(_, s)| *s == 5.0));
    }

    #[test]
    fn test_non_json_reply_fails() {
        assert!(HouseRuleAnalysis::parse_reply("The rule is fine.").is_err());
        assert!(HouseRuleAnalysis::parse_reply(r#"{"risk_score": 3}"#).is_err());
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(7.0), "7");
        assert_eq!(format_score(8.5), "8.5");
    }

    #[test]
    fn test_prompt_includes_rule_context_and_schema() {
        let request = AnalysisRequest::new("m")
            .with_title(Some("Catan"))
            .with_corpus("\nFILE: catan.pdf\nTrade freely")
            .with_input("Robber steals two cards");
        let prompt = oracle().build_prompt(&request).unwrap();

        assert!(prompt.contains("Analyze the 'House Rule' for 'Catan'."));
        assert!(prompt.contains("Game Title: Catan\n\nOfficial Rules (Context from PDFs):\n---\n\nFILE: catan.pdf\nTrade freely\n---"));
        assert!(prompt.contains("Proposed House Rule:\n---\nRobber steals two cards\n---"));
        assert!(prompt.contains("\"impact_scores\""));
    }

    #[test]
    fn test_prompt_without_title_or_corpus() {
        let request = AnalysisRequest::new("m").with_input("No robber");
        let prompt = oracle().build_prompt(&request).unwrap();
        assert!(prompt.contains("'this game'"));
        assert!(prompt.contains("Note: No official rulebook PDF was provided."));
    }

    #[tokio::test]
    async fn test_analyze_at_oracle_temperature() {
        let mut mock = MockLLMProvider::new();
        mock.expect_chat()
            .withf(|req| req.temperature == Some(0.2))
            .times(1)
            .returning(|_| Ok(ChatResponse::text(FULL_REPLY, "m", "mock")));

        let request = AnalysisRequest::new("m").with_input("Draw an extra card");
        let analysis = oracle().analyze(&mock, &request).await.unwrap();
        assert_eq!(analysis.risk_level(), RiskLevel::Risky);
    }

    #[tokio::test]
    async fn test_prose_reply_is_none() {
        let mut mock = MockLLMProvider::new();
        mock.expect_chat()
            .times(1)
            .returning(|_| Ok(ChatResponse::text("I cannot judge this.", "m", "mock")));

        let request = AnalysisRequest::new("m").with_input("Draw an extra card");
        assert!(oracle().analyze(&mock, &request).await.is_none());
    }
}
