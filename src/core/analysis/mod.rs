//! Prompt-Driven Analyzers
//!
//! One generic pipeline (`AnalysisPipeline`) parameterized by a
//! `ToolProfile`, instantiated three times:
//!
//! | tool | corpus ceiling | temperature | reply |
//! |---|---|---|---|
//! | House Rule Oracle | 1,000,000 chars | 0.2 | JSON |
//! | Rule Simplifier | 500,000 chars | 0.3 | JSON |
//! | RuleMaster Assistant | 800,000 chars | 0.4 | Markdown |

pub mod assistant;
pub mod corpus;
pub mod oracle;
pub mod pipeline;
pub mod profile;
pub mod simplifier;

pub use assistant::{assistant, RulingAnswer, ASSISTANT_PROFILE};
pub use oracle::{oracle, HouseRuleAnalysis, RiskLevel, RiskScore, Suggestion, IMPACT_AXES, ORACLE_PROFILE};
pub use pipeline::{AnalysisPipeline, AnalysisRequest, ParseReply};
pub use profile::{PromptContext, RequiredInput, ToolKind, ToolProfile};
pub use simplifier::{simplifier, TieredRulebook, SIMPLIFIER_PROFILE};
