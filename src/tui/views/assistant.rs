//! RuleMaster Assistant view: question and answer against the loaded tomes.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::core::analysis::RulingAnswer;
use crate::core::session::QaExchange;
use crate::core::workflow::{self, ToolOutcome};
use crate::tui::events::{AppEvent, NotificationLevel};
use crate::tui::services::Services;
use crate::tui::theme;
use crate::tui::widgets::input_buffer::{EditOutcome, InputBuffer, InputMode};
use crate::tui::widgets::markdown::markdown_to_lines;

use super::{bottom_offset, outcome_notice, wrapped_height, OutcomeMessages};

const MESSAGES: OutcomeMessages = OutcomeMessages {
    missing_rulebooks: "Please upload at least one ancient tome (rulebook) before asking questions.",
    empty_input: "Ask the Sage a question first.",
    rejected_prefix: "The Sage only discusses game rules.",
    failed: "The Sage could not provide an answer. Please try again.",
};

pub struct AssistantState {
    input: InputBuffer,
    mode: InputMode,
    /// Mirror of the session's QA log, oldest first.
    exchanges: Vec<QaExchange>,
    pending_question: Option<String>,
    /// Lines scrolled up from the bottom of the log.
    scroll_back: u16,
}

impl AssistantState {
    pub fn new() -> Self {
        Self {
            input: InputBuffer::new(),
            mode: InputMode::Normal,
            exchanges: Vec::new(),
            pending_question: None,
            scroll_back: 0,
        }
    }

    pub fn input_mode(&self) -> InputMode {
        self.mode
    }

    pub fn on_finished(
        &mut self,
        question: String,
        outcome: ToolOutcome<RulingAnswer>,
        services: &Services,
    ) {
        self.pending_question = None;
        if let Some((message, level)) = outcome_notice(&outcome, &MESSAGES) {
            services.notify(message, level);
        }
        if let ToolOutcome::Completed(answer) = outcome {
            self.exchanges.push(QaExchange::new(question, answer.into_inner()));
            self.scroll_back = 0;
        }
    }

    pub fn handle_input(&mut self, event: &Event, services: &Services) -> bool {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return false;
        };

        match self.mode {
            InputMode::Insert => {
                if matches!(code, KeyCode::Tab | KeyCode::BackTab)
                    || (*modifiers == KeyModifiers::CONTROL && *code == KeyCode::Char('c'))
                {
                    return false;
                }
                match self.input.handle_key(*code, *modifiers) {
                    EditOutcome::Submitted(question) => {
                        self.mode = InputMode::Normal;
                        self.ask(question, services);
                    }
                    EditOutcome::Cancelled => self.mode = InputMode::Normal,
                    EditOutcome::Edited | EditOutcome::Ignored => {}
                }
                true
            }
            InputMode::Normal => {
                if *modifiers != KeyModifiers::NONE && *modifiers != KeyModifiers::SHIFT {
                    return false;
                }
                match code {
                    KeyCode::Char('i') | KeyCode::Enter => {
                        self.mode = InputMode::Insert;
                        true
                    }
                    KeyCode::Char('k') | KeyCode::Up => {
                        self.scroll_back = self.scroll_back.saturating_add(1);
                        true
                    }
                    KeyCode::Char('j') | KeyCode::Down => {
                        self.scroll_back = self.scroll_back.saturating_sub(1);
                        true
                    }
                    KeyCode::PageUp => {
                        self.scroll_back = self.scroll_back.saturating_add(10);
                        true
                    }
                    KeyCode::PageDown => {
                        self.scroll_back = self.scroll_back.saturating_sub(10);
                        true
                    }
                    KeyCode::Char('G') | KeyCode::End => {
                        self.scroll_back = 0;
                        true
                    }
                    _ => false,
                }
            }
        }
    }

    fn ask(&mut self, question: String, services: &Services) {
        let Some(provider) = services.require_provider() else {
            return;
        };
        let session = services.session.clone();
        let model = services.model.clone();
        let title = services.title();
        let asked = question.clone();

        let started = services.spawn_exclusive(async move {
            let mut session = session.lock().await;
            let outcome =
                workflow::ask_question(&mut session, provider.as_ref(), &model, title.as_deref(), &asked)
                    .await;
            AppEvent::AssistantFinished {
                question: asked,
                outcome,
            }
        });
        if started {
            self.pending_question = Some(question);
        } else {
            self.input.set_text(&question);
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::vertical([Constraint::Min(1), Constraint::Length(3), Constraint::Length(1)])
            .split(area);

        let block = theme::block_default("🧙 RuleMaster Assistant");
        let inner = block.inner(rows[0]);
        let lines = build_log_lines(&self.exchanges, self.pending_question.as_deref());
        let bottom = bottom_offset(wrapped_height(&lines, inner.width), inner.height);
        frame.render_widget(
            Paragraph::new(lines)
                .block(block)
                .wrap(Wrap { trim: false })
                .scroll((bottom.saturating_sub(self.scroll_back), 0)),
            rows[0],
        );

        let input_block = match self.mode {
            InputMode::Insert => theme::block_focused("Question (Enter to ask, Esc to stop editing)"),
            InputMode::Normal => theme::block_default("Question"),
        };
        frame.render_widget(
            Paragraph::new(self.input.render_line(self.mode, "Ask the RuleMaster Sage...")).block(input_block),
            rows[1],
        );

        let mut hints = Vec::new();
        for (key, label) in [("i", "ask"), ("j/k", "scroll"), ("G", "latest")] {
            hints.push(Span::styled(format!(" {key}"), theme::highlight()));
            hints.push(Span::styled(format!(":{label}"), theme::key_hint()));
        }
        frame.render_widget(Paragraph::new(Line::from(hints)), rows[2]);
    }
}

/// The conversation so far, with answers rendered as markdown.
fn build_log_lines(exchanges: &[QaExchange], pending: Option<&str>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if exchanges.is_empty() && pending.is_none() {
        lines.push(Line::styled(
            "Ask the divine sage any question about the rules of your game.",
            theme::muted(),
        ));
        return lines;
    }

    for exchange in exchanges {
        lines.push(question_line(&exchange.question));
        lines.push(Line::styled(
            format!("🧙 Sage · {}", exchange.asked_at.format("%H:%M")),
            theme::heading(),
        ));
        lines.extend(markdown_to_lines(&exchange.answer));
        lines.push(Line::raw(""));
    }

    if let Some(question) = pending {
        lines.push(question_line(question));
        lines.push(Line::styled("Consulting the Sage...", theme::highlight()));
    }
    lines
}

fn question_line(question: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled("❓ You: ", theme::title()),
        Span::raw(question.to_string()),
    ])
}
