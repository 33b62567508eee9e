//! Rule Simplifier view: the loaded rulebooks rewritten into three
//! progressive learning modes.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Tabs, Wrap},
    Frame,
};

use crate::core::analysis::TieredRulebook;
use crate::core::export;
use crate::core::workflow::{self, ToolOutcome};
use crate::tui::events::{AppEvent, NotificationLevel};
use crate::tui::services::Services;
use crate::tui::theme;
use crate::tui::widgets::markdown::markdown_to_lines;

use super::{export_report, outcome_notice, OutcomeMessages};

const MESSAGES: OutcomeMessages = OutcomeMessages {
    missing_rulebooks: "Please upload at least one ancient tome (rulebook) first.",
    empty_input: "There is nothing to simplify.",
    rejected_prefix: "The Scribe refuses:",
    failed: "The Scribe failed to simplify the rules. Please try again.",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    FirstGame,
    Advanced,
    Expert,
}

impl Tier {
    const ALL: [Tier; 3] = [Tier::FirstGame, Tier::Advanced, Tier::Expert];

    fn label(self) -> &'static str {
        match self {
            Tier::FirstGame => "🌱 First Game",
            Tier::Advanced => "⚔️ Advanced",
            Tier::Expert => "👑 Expert",
        }
    }

    fn tagline(self) -> &'static str {
        match self {
            Tier::FirstGame => "Perfect for families and first-time adventurers.",
            Tier::Advanced => "For those who have completed their first quest.",
            Tier::Expert => "The complete codex for masters of the realm.",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|&t| t == self).unwrap_or(0)
    }

    fn content(self, tiers: &TieredRulebook) -> &str {
        match self {
            Tier::FirstGame => &tiers.first_game,
            Tier::Advanced => &tiers.advanced,
            Tier::Expert => &tiers.expert,
        }
    }

    fn shift(self, delta: isize) -> Self {
        let len = Self::ALL.len() as isize;
        Self::ALL[(self.index() as isize + delta).rem_euclid(len) as usize]
    }
}

pub struct SimplifierState {
    result: Option<TieredRulebook>,
    notice: Option<(String, NotificationLevel)>,
    tier: Tier,
    scroll: u16,
    pending: bool,
    /// Stars awarded to the current result.
    rating: Option<u8>,
    rating_open: bool,
}

impl SimplifierState {
    pub fn new() -> Self {
        Self {
            result: None,
            notice: None,
            tier: Tier::FirstGame,
            scroll: 0,
            pending: false,
            rating: None,
            rating_open: false,
        }
    }

    pub fn on_finished(&mut self, outcome: ToolOutcome<TieredRulebook>, services: &Services) {
        self.pending = false;
        self.notice = outcome_notice(&outcome, &MESSAGES);
        if let Some((message, level)) = &self.notice {
            services.notify(message.clone(), *level);
        }

        match outcome {
            ToolOutcome::Completed(tiers) => {
                self.result = Some(tiers);
                self.tier = Tier::FirstGame;
                self.scroll = 0;
                self.rating = None;
                self.rating_open = false;
                services.notify("The Scribe has finished", NotificationLevel::Success);
            }
            ToolOutcome::Failed => self.result = None,
            _ => {}
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
        if *modifiers != KeyModifiers::NONE && *modifiers != KeyModifiers::SHIFT {
            return false;
        }

        if self.rating_open {
            match code {
                KeyCode::Char(c @ '1'..='5') => {
                    self.rate(*c as u8 - b'0', services);
                    return true;
                }
                KeyCode::Esc => {
                    self.rating_open = false;
                    return true;
                }
                _ => self.rating_open = false,
            }
        }

        match code {
            KeyCode::Char('r') => {
                if self.result.is_some() {
                    self.rating_open = true;
                } else {
                    services.notify("Nothing to rate yet", NotificationLevel::Info);
                }
                true
            }
            KeyCode::Enter | KeyCode::Char('s') => {
                self.simplify(services);
                true
            }
            KeyCode::Char('l') | KeyCode::Right => {
                self.select_tier(self.tier.shift(1));
                true
            }
            KeyCode::Char('h') | KeyCode::Left => {
                self.select_tier(self.tier.shift(-1));
                true
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll = self.scroll.saturating_add(1);
                true
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                true
            }
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_add(10);
                true
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(10);
                true
            }
            KeyCode::Char('e') => {
                self.export(services);
                true
            }
            _ => false,
        }
    }

    fn select_tier(&mut self, tier: Tier) {
        if tier != self.tier {
            self.tier = tier;
            self.scroll = 0;
        }
    }

    fn rate(&mut self, stars: u8, services: &Services) {
        self.rating = Some(stars);
        self.rating_open = false;
        log::info!("Simplifier feedback: {stars} stars");
        services.notify(
            format!("The Scribe bows in gratitude for your {stars}-star review!"),
            NotificationLevel::Success,
        );
    }

    fn simplify(&mut self, services: &Services) {
        let Some(provider) = services.require_provider() else {
            return;
        };
        let session = services.session.clone();
        let model = services.model.clone();
        let title = services.title();

        let started = services.spawn_exclusive(async move {
            let mut session = session.lock().await;
            let outcome =
                workflow::simplify_rules(&mut session, provider.as_ref(), &model, title.as_deref()).await;
            AppEvent::SimplifierFinished(outcome)
        });
        if started {
            self.pending = true;
            self.notice = None;
        }
    }

    fn export(&self, services: &Services) {
        let Some(tiers) = &self.result else {
            services.notify("Nothing to export yet", NotificationLevel::Info);
            return;
        };
        let title = services.title();
        export_report(
            services,
            export::simplifier_file_name(title.as_deref()),
            export::simplifier_report(title.as_deref(), tiers),
        );
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

        let header = match &self.result {
            Some(tiers) => vec![
                Line::styled(
                    "Rewrite complex ancient rulebooks into three progressive learning modes.",
                    theme::muted(),
                ),
                Line::from(vec![
                    Span::styled("The Scribe's Overview: ", theme::heading()),
                    Span::raw(tiers.summary_or_default().to_string()),
                ]),
            ],
            None => vec![Line::styled(
                "Rewrite complex ancient rulebooks into three progressive learning modes.",
                theme::muted(),
            )],
        };
        frame.render_widget(Paragraph::new(header).wrap(Wrap { trim: true }), rows[0]);

        let tabs = Tabs::new(Tier::ALL.iter().map(|t| t.label()))
            .select(self.tier.index())
            .style(theme::muted())
            .highlight_style(theme::highlight())
            .divider("│");
        frame.render_widget(tabs, rows[1]);

        let block = theme::block_default(self.tier.label());
        let body = build_tier_lines(self.result.as_ref(), self.tier, self.pending, self.notice.as_ref());
        frame.render_widget(
            Paragraph::new(body)
                .block(block)
                .wrap(Wrap { trim: false })
                .scroll((self.scroll, 0)),
            rows[2],
        );

        frame.render_widget(Paragraph::new(hint_line(self.rating_open, self.rating)), rows[3]);
    }
}

fn hint_line(rating_open: bool, rating: Option<u8>) -> Line<'static> {
    if rating_open {
        return Line::from(vec![
            Span::styled(" 📝 Feedback to the Scribe: ", theme::heading()),
            Span::styled("1-5", theme::highlight()),
            Span::styled(" stars, Esc to cancel", theme::key_hint()),
        ]);
    }

    let mut spans = Vec::new();
    for (key, label) in [
        ("s", "simplify"),
        ("h/l", "tier"),
        ("j/k", "scroll"),
        ("e", "export"),
        ("r", "rate"),
    ] {
        spans.push(Span::styled(format!(" {key}"), theme::highlight()));
        spans.push(Span::styled(format!(":{label}"), theme::key_hint()));
    }
    if let Some(stars) = rating {
        spans.push(Span::styled(format!("  {}", star_bar(stars)), theme::highlight()));
    }
    Line::from(spans)
}

fn star_bar(stars: u8) -> String {
    let stars = usize::from(stars.min(5));
    format!("{}{}", "★".repeat(stars), "☆".repeat(5 - stars))
}

fn build_tier_lines(
    result: Option<&TieredRulebook>,
    tier: Tier,
    pending: bool,
    notice: Option<&(String, NotificationLevel)>,
) -> Vec<Line<'static>> {
    if pending {
        return vec![Line::styled("The Scribe is rewriting the tomes...", theme::highlight())];
    }

    let Some(tiers) = result else {
        return match notice {
            Some((message, _)) => vec![Line::styled(message.clone(), theme::muted())],
            None => vec![Line::styled("Press s to simplify the loaded tomes.", theme::muted())],
        };
    };

    let mut lines = vec![Line::styled(tier.tagline(), theme::dim()), Line::raw("")];
    let content = tier.content(tiers);
    if content.trim().is_empty() {
        lines.push(Line::styled("The Scribe left this tier blank.", theme::dim()));
    } else {
        lines.extend(markdown_to_lines(content));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiers() -> TieredRulebook {
        TieredRulebook {
            first_game: "## Setup\nPlace the board.".into(),
            advanced: "Trading with the bank.".into(),
            expert: String::new(),
            summary: "Catan in three steps".into(),
        }
    }

    fn text_of(lines: &[Line<'_>]) -> String {
        lines.iter().map(|l| l.to_string()).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn test_tier_shift_wraps() {
        assert_eq!(Tier::FirstGame.shift(1), Tier::Advanced);
        assert_eq!(Tier::FirstGame.shift(-1), Tier::Expert);
        assert_eq!(Tier::Expert.shift(1), Tier::FirstGame);
    }

    #[test]
    fn test_tier_lines_render_markdown_with_tagline() {
        let t = tiers();
        let text = text_of(&build_tier_lines(Some(&t), Tier::FirstGame, false, None));
        assert!(text.starts_with("Perfect for families"));
        assert!(text.contains("Setup"));
        assert!(text.contains("Place the board."));
    }

    #[test]
    fn test_blank_tier() {
        let t = tiers();
        let text = text_of(&build_tier_lines(Some(&t), Tier::Expert, false, None));
        assert!(text.contains("left this tier blank"));
    }

    #[test]
    fn test_notice_shown_without_result() {
        let notice = (MESSAGES.failed.to_string(), NotificationLevel::Error);
        let text = text_of(&build_tier_lines(None, Tier::FirstGame, false, Some(&notice)));
        assert_eq!(text, MESSAGES.failed);
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_feedback_rating() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let services = Services::new(crate::config::AppConfig::default(), None, tx);
        let mut state = SimplifierState::new();

        state.handle_input(&key(KeyCode::Char('r')), &services);
        assert!(!state.rating_open);

        state.result = Some(tiers());
        state.handle_input(&key(KeyCode::Char('r')), &services);
        assert!(state.rating_open);
        assert!(state.handle_input(&key(KeyCode::Char('4')), &services));
        assert_eq!(state.rating, Some(4));
        assert!(!state.rating_open);

        let mut messages = Vec::new();
        while let Ok(AppEvent::Notification(n)) = rx.try_recv() {
            messages.push(n.message);
        }
        assert_eq!(
            messages,
            vec![
                "Nothing to rate yet".to_string(),
                "The Scribe bows in gratitude for your 4-star review!".to_string(),
            ]
        );
        assert!(hint_line(false, state.rating).to_string().ends_with("★★★★☆"));
    }

    #[test]
    fn test_digits_pass_through_without_rating_prompt() {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let services = Services::new(crate::config::AppConfig::default(), None, tx);
        let mut state = SimplifierState::new();
        state.result = Some(tiers());
        assert!(!state.handle_input(&key(KeyCode::Char('2')), &services));
        assert_eq!(state.rating, None);
    }

    #[test]
    fn test_switching_tier_resets_scroll() {
        let mut state = SimplifierState::new();
        state.scroll = 7;
        state.select_tier(Tier::FirstGame);
        assert_eq!(state.scroll, 7);
        state.select_tier(Tier::Expert);
        assert_eq!(state.scroll, 0);
    }
}
