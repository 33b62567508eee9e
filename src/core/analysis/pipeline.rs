//! Generic analyzer pipeline.
//!
//! required-input check -> corpus truncation -> prompt -> model call -> parse.
//! Every failure after the input check is logged by kind and becomes `None`.

use std::marker::PhantomData;

use tracing::instrument;

use crate::core::error::{OracleError, Result};
use crate::core::llm::{generate_text, LLMProvider};

use super::corpus::truncate_chars;
use super::profile::{PromptContext, RequiredInput, ToolProfile};

/// One analyzer invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub game_title: Option<String>,
    pub rulebook_corpus: String,
    pub user_input: String,
    pub model: String,
}

impl AnalysisRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            game_title: None,
            rulebook_corpus: String::new(),
            user_input: String::new(),
            model: model.into(),
        }
    }

    /// Set the game title; blank titles count as no title.
    pub fn with_title(mut self, title: Option<&str>) -> Self {
        self.game_title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        self
    }

    pub fn with_corpus(mut self, corpus: impl Into<String>) -> Self {
        self.rulebook_corpus = corpus.into();
        self
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.user_input = input.into();
        self
    }
}

/// Turns a raw model reply into a tool result.
pub trait ParseReply: Sized {
    fn parse_reply(raw: &str) -> Result<Self>;
}

/// An analyzer: a profile plus the result type its replies parse into.
pub struct AnalysisPipeline<T> {
    profile: ToolProfile,
    _result: PhantomData<fn() -> T>,
}

impl<T> Clone for AnalysisPipeline<T> {
    fn clone(&self) -> Self {
        Self {
            profile: self.profile,
            _result: PhantomData,
        }
    }
}

impl<T: ParseReply> AnalysisPipeline<T> {
    pub const fn new(profile: ToolProfile) -> Self {
        Self {
            profile,
            _result: PhantomData,
        }
    }

    pub fn profile(&self) -> &ToolProfile {
        &self.profile
    }

    /// Render the prompt for `request`, or `None` when the required input is
    /// empty.
    pub fn build_prompt(&self, request: &AnalysisRequest) -> Option<String> {
        let required = match self.profile.required_input {
            RequiredInput::UserInput => &request.user_input,
            RequiredInput::Corpus => &request.rulebook_corpus,
        };
        if required.trim().is_empty() {
            return None;
        }

        let corpus = truncate_chars(&request.rulebook_corpus, self.profile.char_ceiling);
        if corpus.len() < request.rulebook_corpus.len() {
            log::info!(
                "{}: corpus truncated to {} characters",
                self.profile.tool.display_name(),
                self.profile.char_ceiling
            );
        }

        let context = PromptContext {
            game_title: request.game_title.as_deref(),
            corpus,
            user_input: &request.user_input,
        };
        Some(self.profile.render(&context))
    }

    /// Run the analyzer. `None` means empty input or any failure.
    #[instrument(skip_all, fields(tool = self.profile.tool.display_name(), model = %request.model))]
    pub async fn analyze(&self, provider: &dyn LLMProvider, request: &AnalysisRequest) -> Option<T> {
        let tool = self.profile.tool.display_name();

        let Some(prompt) = self.build_prompt(request) else {
            log::debug!("{tool}: required input is empty, skipping model call");
            return None;
        };

        match self.run(provider, &request.model, &prompt).await {
            Ok(result) => {
                log::info!("{tool}: analysis complete");
                Some(result)
            }
            Err(e) => {
                log::error!("{tool} error: [{}] {}", e.kind(), e);
                None
            }
        }
    }

    async fn run(&self, provider: &dyn LLMProvider, model: &str, prompt: &str) -> Result<T> {
        let raw = generate_text(provider, model, prompt, self.profile.temperature)
            .await
            .map_err(OracleError::from)?;
        T::parse_reply(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analysis::profile::ToolKind;
    use crate::core::llm::{reply, ChatResponse, MockLLMProvider};

    #[derive(Debug, PartialEq)]
    struct Echo(String);

    impl ParseReply for Echo {
        fn parse_reply(raw: &str) -> Result<Self> {
            Ok(Echo(raw.to_string()))
        }
    }

    #[derive(Debug)]
    struct Strict(serde_json::Value);

    impl ParseReply for Strict {
        fn parse_reply(raw: &str) -> Result<Self> {
            reply::parse_json(raw).map(Strict)
        }
    }

    fn echo_template(ctx: &PromptContext<'_>) -> String {
        format!("[{}|{}]", ctx.corpus, ctx.user_input)
    }

    const ECHO: ToolProfile = ToolProfile {
        tool: ToolKind::Assistant,
        char_ceiling: 4,
        temperature: 0.5,
        required_input: RequiredInput::UserInput,
        template: echo_template,
    };

    #[test]
    fn test_prompt_uses_truncated_corpus() {
        let pipeline = AnalysisPipeline::<Echo>::new(ECHO);
        let request = AnalysisRequest::new("m")
            .with_corpus("abcdefgh")
            .with_input("q?");
        assert_eq!(pipeline.build_prompt(&request).as_deref(), Some("[abcd|q?]"));
    }

    #[test]
    fn test_clone_keeps_profile() {
        let pipeline = AnalysisPipeline::<Echo>::new(ECHO);
        let copy = pipeline.clone();
        assert_eq!(copy.profile().tool, ToolKind::Assistant);
        assert_eq!(copy.profile().char_ceiling, 4);
    }

    #[tokio::test]
    async fn test_prose_reply_fails_as_parse_failure() {
        let mut mock = MockLLMProvider::new();
        mock.expect_chat()
            .times(1)
            .returning(|_| Ok(ChatResponse::text("Looks balanced to me.", "m", "mock")));

        let pipeline = AnalysisPipeline::<Strict>::new(ECHO);
        let err = pipeline.run(&mock, "m", "prompt").await.unwrap_err();
        assert_eq!(err.kind(), "parse_failure");
    }

    #[test]
    fn test_blank_title_is_no_title() {
        let request = AnalysisRequest::new("m").with_title(Some("   "));
        assert!(request.game_title.is_none());
        let request = AnalysisRequest::new("m").with_title(Some(" Root "));
        assert_eq!(request.game_title.as_deref(), Some("Root"));
    }

    #[tokio::test]
    async fn test_empty_required_input_skips_model() {
        let mut mock = MockLLMProvider::new();
        mock.expect_chat().never();

        let pipeline = AnalysisPipeline::<Echo>::new(ECHO);
        let request = AnalysisRequest::new("m").with_corpus("rules").with_input("  \n ");
        assert!(pipeline.analyze(&mock, &request).await.is_none());
    }

    #[tokio::test]
    async fn test_profile_temperature_and_model_reach_provider() {
        let mut mock = MockLLMProvider::new();
        mock.expect_chat()
            .withf(|req| req.temperature == Some(0.5) && req.model.as_deref() == Some("gemini-1.5-pro"))
            .times(1)
            .returning(|_| Ok(ChatResponse::text("reply", "gemini-1.5-pro", "mock")));

        let pipeline = AnalysisPipeline::<Echo>::new(ECHO);
        let request = AnalysisRequest::new("gemini-1.5-pro").with_input("why?");
        assert_eq!(
            pipeline.analyze(&mock, &request).await,
            Some(Echo("reply".to_string()))
        );
    }
}
