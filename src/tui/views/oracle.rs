//! House Rule Oracle view.
//!
//! Scribe a house rule, consult the Oracle, read the divination (risk,
//! impact scores, deep-dive details) and invoke one of its suggested
//! refinements back into the input.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::core::analysis::HouseRuleAnalysis;
use crate::core::export;
use crate::core::workflow::{self, ToolOutcome};
use crate::tui::events::{AppEvent, NotificationLevel};
use crate::tui::services::Services;
use crate::tui::theme;
use crate::tui::widgets::input_buffer::{EditOutcome, InputBuffer, InputMode};
use crate::tui::widgets::score_chart::ScoreChart;

use super::{export_report, outcome_notice, OutcomeMessages};

const MESSAGES: OutcomeMessages = OutcomeMessages {
    missing_rulebooks: "Please upload at least one ancient tome (rulebook) before consulting the Oracle.",
    empty_input: "Rule cannot be empty.",
    rejected_prefix: "The Oracle rejects this rule:",
    failed: "The Oracle has gone silent. Please try again.",
};

/// Deep-dive detail tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailTab {
    Contradictions,
    Economics,
    Pacing,
}

impl DetailTab {
    const ALL: [DetailTab; 3] = [DetailTab::Contradictions, DetailTab::Economics, DetailTab::Pacing];

    fn label(self) -> &'static str {
        match self {
            DetailTab::Contradictions => "Contradictions",
            DetailTab::Economics => "Economics",
            DetailTab::Pacing => "Pacing",
        }
    }

    fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&t| t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

pub struct OracleState {
    input: InputBuffer,
    mode: InputMode,
    result: Option<HouseRuleAnalysis>,
    notice: Option<(String, NotificationLevel)>,
    selected_suggestion: usize,
    detail_tab: DetailTab,
    scroll: u16,
    pending: bool,
}

impl OracleState {
    pub fn new() -> Self {
        Self {
            input: InputBuffer::new(),
            mode: InputMode::Normal,
            result: None,
            notice: None,
            selected_suggestion: 0,
            detail_tab: DetailTab::Contradictions,
            scroll: 0,
            pending: false,
        }
    }

    pub fn input_mode(&self) -> InputMode {
        self.mode
    }

    pub fn on_finished(&mut self, outcome: ToolOutcome<HouseRuleAnalysis>, services: &Services) {
        self.pending = false;
        self.notice = outcome_notice(&outcome, &MESSAGES);
        if let Some((message, level)) = &self.notice {
            services.notify(message.clone(), *level);
        }

        match outcome {
            ToolOutcome::Completed(analysis) => {
                self.result = Some(analysis);
                self.selected_suggestion = 0;
                self.scroll = 0;
                services.notify("The Oracle has spoken", NotificationLevel::Success);
            }
            ToolOutcome::Failed => self.result = None,
            _ => {}
        }
    }

    // ── Input ────────────────────────────────────────────────────────────

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
            InputMode::Insert => self.handle_insert_input(*code, *modifiers, services),
            InputMode::Normal => self.handle_normal_input(*code, *modifiers, services),
        }
    }

    fn handle_insert_input(
        &mut self,
        code: KeyCode,
        modifiers: KeyModifiers,
        services: &Services,
    ) -> bool {
        if matches!(code, KeyCode::Tab | KeyCode::BackTab)
            || (modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c'))
        {
            return false;
        }

        match self.input.handle_key(code, modifiers) {
            EditOutcome::Submitted(rule) => {
                self.mode = InputMode::Normal;
                self.input.set_text(&rule);
                self.consult(rule, services);
            }
            EditOutcome::Cancelled => self.mode = InputMode::Normal,
            EditOutcome::Edited | EditOutcome::Ignored => {}
        }
        true
    }

    fn handle_normal_input(
        &mut self,
        code: KeyCode,
        modifiers: KeyModifiers,
        services: &Services,
    ) -> bool {
        if modifiers != KeyModifiers::NONE && modifiers != KeyModifiers::SHIFT {
            return false;
        }

        match code {
            KeyCode::Char('i') | KeyCode::Enter => {
                self.mode = InputMode::Insert;
                true
            }
            KeyCode::Char('c') => {
                let rule = self.input.text().trim().to_string();
                self.consult(rule, services);
                true
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_suggestion(1);
                true
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_suggestion(-1);
                true
            }
            KeyCode::Char('a') => {
                self.invoke_selected_scroll(services);
                true
            }
            KeyCode::Char('t') => {
                self.detail_tab = self.detail_tab.next();
                true
            }
            KeyCode::Char('e') => {
                self.export(services);
                true
            }
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_add(5);
                true
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(5);
                true
            }
            _ => false,
        }
    }

    fn move_suggestion(&mut self, delta: isize) {
        let count = self.result.as_ref().map_or(0, |r| r.suggestions.len());
        if count == 0 {
            return;
        }
        let next = (self.selected_suggestion as isize + delta).rem_euclid(count as isize);
        self.selected_suggestion = next as usize;
    }

    /// Load the selected suggestion into the house-rule input.
    fn invoke_selected_scroll(&mut self, services: &Services) {
        let Some(analysis) = &self.result else {
            return;
        };
        match workflow::apply_suggestion(analysis, self.selected_suggestion) {
            Some(rule) => {
                self.input.set_text(rule);
                services.notify(
                    format!("Scroll {} invoked", self.selected_suggestion + 1),
                    NotificationLevel::Info,
                );
            }
            None => services.notify("That scroll is blank", NotificationLevel::Warning),
        }
    }

    fn consult(&mut self, rule: String, services: &Services) {
        let Some(provider) = services.require_provider() else {
            return;
        };
        let session = services.session.clone();
        let model = services.model.clone();
        let title = services.title();

        let started = services.spawn_exclusive(async move {
            let mut session = session.lock().await;
            let outcome =
                workflow::consult_oracle(&mut session, provider.as_ref(), &model, title.as_deref(), &rule)
                    .await;
            AppEvent::OracleFinished(outcome)
        });
        if started {
            self.pending = true;
            self.notice = None;
        }
    }

    fn export(&self, services: &Services) {
        let Some(analysis) = &self.result else {
            services.notify("Nothing to export yet", NotificationLevel::Info);
            return;
        };
        let title = services.title();
        export_report(
            services,
            export::oracle_file_name(title.as_deref()),
            export::oracle_report(title.as_deref(), analysis),
        );
    }

    // ── Rendering ────────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::vertical([Constraint::Length(6), Constraint::Min(1), Constraint::Length(1)])
            .split(area);

        let input_block = match self.mode {
            InputMode::Insert => theme::block_focused("📜 Proposed House Rule (Enter to consult, Esc to stop editing)"),
            InputMode::Normal => theme::block_default("📜 Proposed House Rule"),
        };
        frame.render_widget(
            Paragraph::new(
                self.input
                    .render_line(self.mode, "Scribe your ancient rule change here... (i to edit)"),
            )
            .block(input_block)
            .wrap(Wrap { trim: false }),
            rows[0],
        );

        self.render_results(frame, rows[1]);
        frame.render_widget(Paragraph::new(hint_line()), rows[2]);
    }

    fn render_results(&self, frame: &mut Frame, area: Rect) {
        let block = theme::block_default("🔮 Divination Results");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.pending {
            frame.render_widget(
                Paragraph::new(Line::styled("  The Oracle is divining...", theme::highlight())),
                inner,
            );
            return;
        }

        let Some(analysis) = &self.result else {
            let line = match &self.notice {
                Some((message, level)) => Line::styled(format!("  {message}"), notice_style(*level)),
                None => Line::styled("  Consult the Oracle to see its divination.", theme::muted()),
            };
            frame.render_widget(Paragraph::new(line).wrap(Wrap { trim: false }), inner);
            return;
        };

        let sections = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(IMPACT_ROWS),
            Constraint::Min(1),
        ])
        .split(inner);

        frame.render_widget(
            Paragraph::new(risk_lines(analysis)).wrap(Wrap { trim: false }),
            sections[0],
        );

        let scores = analysis.axis_scores();
        frame.render_widget(ScoreChart::new(&scores), sections[1]);

        let body = build_detail_lines(analysis, self.detail_tab, self.selected_suggestion);
        frame.render_widget(
            Paragraph::new(body)
                .wrap(Wrap { trim: false })
                .scroll((self.scroll, 0)),
            sections[2],
        );
    }
}

const IMPACT_ROWS: u16 = 5;

fn notice_style(level: NotificationLevel) -> Style {
    let color = match level {
        NotificationLevel::Info => theme::INFO,
        NotificationLevel::Success => theme::SUCCESS,
        NotificationLevel::Warning => theme::WARNING,
        NotificationLevel::Error => theme::ERROR,
    };
    Style::default().fg(color)
}

fn hint_line() -> Line<'static> {
    let mut spans = Vec::new();
    for (key, label) in [
        ("i", "edit"),
        ("c", "consult"),
        ("j/k", "scroll"),
        ("a", "invoke"),
        ("t", "details"),
        ("e", "export"),
    ] {
        spans.push(Span::styled(format!(" {key}"), theme::highlight()));
        spans.push(Span::styled(format!(":{label}"), theme::key_hint()));
    }
    Line::from(spans)
}

/// Risk banner: emoji, level and the Oracle's explanation.
fn risk_lines(analysis: &HouseRuleAnalysis) -> Vec<Line<'static>> {
    let color = theme::risk_color(analysis.risk_level());
    vec![
        Line::from(Span::styled(
            format!("{} Risk Status: {}", analysis.emoji(), analysis.risk_score),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::styled(analysis.risk_explanation_or_default().to_string(), Style::default().fg(color)),
    ]
}

/// Insight, the active deep-dive tab and the numbered suggestions.
fn build_detail_lines(
    analysis: &HouseRuleAnalysis,
    tab: DetailTab,
    selected: usize,
) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Insight: ", theme::heading()),
            Span::raw(analysis.summary_or_default().to_string()),
        ]),
        Line::raw(""),
    ];

    let mut tabs = vec![Span::styled("🔍 ", theme::muted())];
    for t in DetailTab::ALL {
        let style = if t == tab { theme::highlight() } else { theme::muted() };
        tabs.push(Span::styled(format!("[{}] ", t.label()), style));
    }
    lines.push(Line::from(tabs));

    match tab {
        DetailTab::Contradictions if analysis.contradictions.is_empty() => {
            lines.push(Line::styled("  None found.", theme::dim()));
        }
        DetailTab::Contradictions => {
            for contradiction in &analysis.contradictions {
                lines.push(Line::styled(format!("  • {contradiction}"), Style::default().fg(theme::INFO)));
            }
        }
        DetailTab::Economics => {
            lines.push(Line::raw(format!("  {}", analysis.balance_impact_or_default())));
            lines.push(Line::from(vec![
                Span::styled("  Exploits: ", theme::heading()),
                Span::raw(analysis.exploits_or_default().to_string()),
            ]));
        }
        DetailTab::Pacing => {
            lines.push(Line::raw(format!("  {}", analysis.game_pace_or_default())));
        }
    }

    lines.push(Line::raw(""));
    lines.push(Line::styled("💡 Expert Refinements", theme::title()));
    if analysis.suggestions.is_empty() {
        lines.push(Line::styled("  The Oracle offers no refinements.", theme::dim()));
    }
    for (i, suggestion) in analysis.suggestions.iter().enumerate() {
        let (marker, style) = if i == selected {
            ("▸ ", theme::highlight())
        } else {
            ("  ", Style::default().fg(theme::TEXT))
        };
        lines.push(Line::from(vec![
            Span::styled(marker, theme::highlight()),
            Span::styled(format!("Scroll {}: ", i + 1), style),
            Span::raw(suggestion.rule.clone()),
        ]));
        if !suggestion.explanation.trim().is_empty() {
            lines.push(Line::styled(format!("    {}", suggestion.explanation), theme::dim()));
        }
    }
    lines
}
