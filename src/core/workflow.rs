//! Tool Workflows
//!
//! What happens when the user presses a tool's button: authenticate the
//! loaded tomes, check preconditions, screen the input, assemble the corpus,
//! run the analyzer and classify the outcome. Calls run strictly in sequence.

use crate::core::analysis::{
    assistant, corpus, oracle, simplifier, AnalysisRequest, HouseRuleAnalysis, RulingAnswer,
    TieredRulebook,
};
use crate::core::llm::LLMProvider;
use crate::core::session::{QaExchange, Session};
use crate::core::validation::{logic, rulebook, InputContext, ValidationResult};
use crate::ingestion::{pdf_extractor, DocumentKey};

// ============================================================================
// Outcomes
// ============================================================================

/// Result of one tool action.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome<T> {
    Completed(T),
    /// No authenticated rulebook is loaded; nothing was sent to the model.
    MissingRulebooks,
    /// The required input was empty; nothing was sent to the model.
    EmptyInput,
    /// The logic gate rejected the input, with its reason.
    Rejected(String),
    /// The analyzer produced no result.
    Failed,
}

impl<T> ToolOutcome<T> {
    pub fn completed(self) -> Option<T> {
        match self {
            ToolOutcome::Completed(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ToolOutcome::Completed(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ToolOutcome<U> {
        match self {
            ToolOutcome::Completed(value) => ToolOutcome::Completed(f(value)),
            ToolOutcome::MissingRulebooks => ToolOutcome::MissingRulebooks,
            ToolOutcome::EmptyInput => ToolOutcome::EmptyInput,
            ToolOutcome::Rejected(reason) => ToolOutcome::Rejected(reason),
            ToolOutcome::Failed => ToolOutcome::Failed,
        }
    }
}

/// Authentication state of one loaded tome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TomeStatus {
    pub key: DocumentKey,
    pub has_text: bool,
    pub validation: ValidationResult,
}

impl TomeStatus {
    pub fn is_admitted(&self) -> bool {
        self.validation.is_valid
    }
}

// ============================================================================
// Operations
// ============================================================================

/// Extract and validate every loaded document through the session caches.
pub async fn admit_documents(
    session: &mut Session,
    provider: &dyn LLMProvider,
    model: &str,
) -> Vec<TomeStatus> {
    let (documents, extractions, validations) = session.documents_and_caches();
    let mut statuses = Vec::with_capacity(documents.len());

    for document in documents {
        let extracted = pdf_extractor::extract_cached(extractions, document);
        let has_text = !extracted.is_absent();
        let validation =
            rulebook::validate_cached(validations, provider, document, extracted.text(), model)
                .await;

        statuses.push(TomeStatus {
            key: document.key(),
            has_text,
            validation,
        });
    }

    let admitted = statuses.iter().filter(|s| s.is_admitted()).count();
    log::info!("{admitted}/{} tome(s) authenticated", statuses.len());
    statuses
}

/// Analyze a proposed house rule.
pub async fn consult_oracle(
    session: &mut Session,
    provider: &dyn LLMProvider,
    model: &str,
    game_title: Option<&str>,
    house_rule: &str,
) -> ToolOutcome<HouseRuleAnalysis> {
    let corpus = match gated_corpus(session, provider, model, house_rule, InputContext::HouseRule).await {
        Ok(corpus) => corpus,
        Err(outcome) => return outcome,
    };

    let request = AnalysisRequest::new(model)
        .with_title(game_title)
        .with_corpus(corpus)
        .with_input(house_rule);

    finish(oracle().analyze(provider, &request).await)
}

/// Rewrite the authenticated rulebooks into three tiers.
pub async fn simplify_rules(
    session: &mut Session,
    provider: &dyn LLMProvider,
    model: &str,
    game_title: Option<&str>,
) -> ToolOutcome<TieredRulebook> {
    if !has_rulebooks(session, provider, model).await {
        return ToolOutcome::MissingRulebooks;
    }

    let corpus = rulebook_corpus(session);
    let request = AnalysisRequest::new(model)
        .with_title(game_title)
        .with_corpus(corpus);

    finish(simplifier().analyze(provider, &request).await)
}

/// Answer a rules question and append it to the session's QA log.
///
/// Each question is answered on its own; earlier exchanges are not sent.
pub async fn ask_question(
    session: &mut Session,
    provider: &dyn LLMProvider,
    model: &str,
    game_title: Option<&str>,
    question: &str,
) -> ToolOutcome<RulingAnswer> {
    let corpus = match gated_corpus(session, provider, model, question, InputContext::RulesQuestion).await {
        Ok(corpus) => corpus,
        Err(outcome) => return outcome,
    };

    let request = AnalysisRequest::new(model)
        .with_title(game_title)
        .with_corpus(corpus)
        .with_input(question);

    let outcome = finish(assistant().analyze(provider, &request).await);
    if let ToolOutcome::Completed(answer) = &outcome {
        session.record_exchange(QaExchange::new(question, answer.as_str()));
    }
    outcome
}

/// The rule text of the Oracle's `index`-th suggestion, ready to be loaded
/// back into the house-rule input.
pub fn apply_suggestion(analysis: &HouseRuleAnalysis, index: usize) -> Option<&str> {
    analysis
        .suggestions
        .get(index)
        .map(|s| s.rule.as_str())
        .filter(|rule| !rule.trim().is_empty())
}

/// Concatenated text of the authenticated tomes, in load order.
pub fn rulebook_corpus(session: &Session) -> String {
    corpus::assemble(session.admitted_documents().into_iter().map(|document| {
        let text = session
            .extractions
            .get(&document.key())
            .and_then(|extracted| extracted.text());
        (document.file_name(), text)
    }))
}

// ============================================================================
// Helpers
// ============================================================================

async fn has_rulebooks(session: &mut Session, provider: &dyn LLMProvider, model: &str) -> bool {
    admit_documents(session, provider, model)
        .await
        .iter()
        .any(TomeStatus::is_admitted)
}

/// Precondition checks and logic gate shared by the Oracle and the Assistant.
async fn gated_corpus<T>(
    session: &mut Session,
    provider: &dyn LLMProvider,
    model: &str,
    input: &str,
    context: InputContext,
) -> Result<String, ToolOutcome<T>> {
    if !has_rulebooks(session, provider, model).await {
        return Err(ToolOutcome::MissingRulebooks);
    }
    if input.trim().is_empty() {
        return Err(ToolOutcome::EmptyInput);
    }

    let verdict = logic::check(provider, input, context, model).await;
    if !verdict.is_logical {
        return Err(ToolOutcome::Rejected(verdict.reason));
    }

    Ok(rulebook_corpus(session))
}

fn finish<T>(result: Option<T>) -> ToolOutcome<T> {
    match result {
        Some(value) => ToolOutcome::Completed(value),
        None => ToolOutcome::Failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analysis::Suggestion;
    use crate::ingestion::Document;
    use crate::tests::common::fixtures::rulebook_pdf;
    use crate::tests::mocks::ScriptedProvider;

    fn session_with_rulebook() -> Session {
        let mut session = Session::new();
        session.add_document(Document::new(
            "catan.pdf",
            rulebook_pdf(&["Setup: place the board", "Victory conditions: 10 points"]),
        ));
        session
    }

    #[tokio::test]
    async fn test_admission_reports_each_tome() {
        let provider = ScriptedProvider::new(vec![Ok("{\"is_rulebook\": false, \"reason\": \"Noise\"}".into())]);
        let mut session = session_with_rulebook();
        session.add_document(Document::new("junk.pdf", b"not a pdf".to_vec()));
        session.add_document(Document::new("memo.pdf", rulebook_pdf(&["Lunch at noon"])));

        let statuses = admit_documents(&mut session, &provider, "m").await;
        assert_eq!(statuses.len(), 3);
        assert!(statuses[0].is_admitted());
        assert!(!statuses[1].has_text);
        assert_eq!(statuses[1].validation.reason, rulebook::NO_TEXT_REASON);
        assert!(!statuses[2].is_admitted());
        assert_eq!(provider.call_count(), 1);

        admit_documents(&mut session, &provider, "m").await;
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_oracle_empty_rule() {
        let provider = ScriptedProvider::new(vec![]);
        let mut session = session_with_rulebook();
        let outcome = consult_oracle(&mut session, &provider, "m", None, "   ").await;
        assert_eq!(outcome, ToolOutcome::EmptyInput);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_oracle_rejected_by_logic_gate() {
        let provider = ScriptedProvider::new(vec![Ok(
            "{\"is_logical\": false, \"reason\": \"Not about games\"}".into(),
        )]);
        let mut session = session_with_rulebook();
        let outcome = consult_oracle(&mut session, &provider, "m", None, "Buy more milk today").await;
        assert_eq!(outcome, ToolOutcome::Rejected("Not about games".to_string()));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_oracle_completes_with_corpus() {
        let provider = ScriptedProvider::new(vec![
            Ok("{\"is_logical\": true, \"reason\": \"ok\"}".into()),
            Ok("{\"risk_score\": \"Safe\", \"summary\": \"Fine\"}".into()),
        ]);
        let mut session = session_with_rulebook();
        let outcome = consult_oracle(&mut session, &provider, "m", Some("Catan"), "Start with 2 extra wood").await;

        let analysis = outcome.completed().expect("analysis");
        assert_eq!(analysis.summary_or_default(), "Fine");

        let prompts = provider.prompts();
        assert!(prompts[1].contains("FILE: catan.pdf"));
        assert!(prompts[1].contains("Victory conditions"));
    }

    #[tokio::test]
    async fn test_question_failure_is_not_logged() {
        let provider = ScriptedProvider::new(vec![
            Ok("{\"is_logical\": true, \"reason\": \"ok\"}".into()),
            Ok("   ".into()),
        ]);
        let mut session = session_with_rulebook();
        let outcome = ask_question(&mut session, &provider, "m", None, "How many dice do I roll?").await;
        assert_eq!(outcome, ToolOutcome::Failed);
        assert!(session.qa_log().is_empty());
    }

    #[test]
    fn test_apply_suggestion() {
        let mut analysis: HouseRuleAnalysis = serde_json::from_str("{}").unwrap();
        analysis.suggestions = vec![
            Suggestion {
                rule: "Draw 2, keep 1".to_string(),
                explanation: String::new(),
            },
            Suggestion {
                rule: " ".to_string(),
                explanation: String::new(),
            },
        ];
        assert_eq!(apply_suggestion(&analysis, 0), Some("Draw 2, keep 1"));
        assert_eq!(apply_suggestion(&analysis, 1), None);
        assert_eq!(apply_suggestion(&analysis, 5), None);
    }

    #[test]
    fn test_outcome_map() {
        let outcome: ToolOutcome<u8> = ToolOutcome::Completed(2);
        assert_eq!(outcome.map(|v| v * 2), ToolOutcome::Completed(4));
        let outcome: ToolOutcome<u8> = ToolOutcome::Rejected("no".into());
        assert_eq!(outcome.map(|v| v * 2), ToolOutcome::Rejected("no".into()));
    }
}
