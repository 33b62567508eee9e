//! Tool profiles: everything that differs between the three analyzers.

use super::corpus::context_block;

/// The three analyzers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Oracle,
    Simplifier,
    Assistant,
}

impl ToolKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            ToolKind::Oracle => "House Rule Oracle",
            ToolKind::Simplifier => "Rule Simplifier",
            ToolKind::Assistant => "RuleMaster Assistant",
        }
    }
}

/// Which request field must be non-empty for the tool to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredInput {
    UserInput,
    Corpus,
}

/// Values a template can draw on.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub game_title: Option<&'a str>,
    /// Corpus after truncation to the tool's ceiling.
    pub corpus: &'a str,
    pub user_input: &'a str,
}

impl PromptContext<'_> {
    pub fn title_or<'b>(&'b self, fallback: &'b str) -> &'b str {
        self.game_title.unwrap_or(fallback)
    }

    pub fn context_block(&self) -> String {
        context_block(self.game_title, self.corpus)
    }
}

pub type PromptTemplate = fn(&PromptContext<'_>) -> String;

#[derive(Debug, Clone, Copy)]
pub struct ToolProfile {
    pub tool: ToolKind,
    /// Maximum corpus length in characters.
    pub char_ceiling: usize,
    pub temperature: f32,
    pub required_input: RequiredInput,
    pub template: PromptTemplate,
}

impl ToolProfile {
    pub fn render(&self, context: &PromptContext<'_>) -> String {
        (self.template)(context)
    }
}
