//! Settings view: game title, model engine, credential status and paths.
//!
//! The title and engine are shared by all three tools and applied to the
//! next request.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::config::AppConfig;
use crate::core::logging;
use crate::tui::events::NotificationLevel;
use crate::tui::services::Services;
use crate::tui::theme;
use crate::tui::widgets::input_buffer::{EditOutcome, InputBuffer, InputMode};

pub struct SettingsState {
    title_input: InputBuffer,
    mode: InputMode,
    models: Vec<String>,
    selected_model: usize,
}

impl SettingsState {
    pub fn new(services: &Services) -> Self {
        let models = services.config.model.model_choices();
        let selected_model = models.iter().position(|m| *m == services.model).unwrap_or(0);
        let mut title_input = InputBuffer::new();
        title_input.set_text(&services.game_title);
        Self {
            title_input,
            mode: InputMode::Normal,
            models,
            selected_model,
        }
    }

    pub fn input_mode(&self) -> InputMode {
        self.mode
    }

    pub fn handle_input(&mut self, event: &Event, services: &mut Services) -> bool {
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
                match self.title_input.handle_key(*code, *modifiers) {
                    EditOutcome::Submitted(title) => {
                        self.mode = InputMode::Normal;
                        self.title_input.set_text(&title);
                        services.game_title = title;
                        match services.title() {
                            Some(title) => services.notify(format!("Game title set to {title}"), NotificationLevel::Info),
                            None => services.notify("Game title cleared", NotificationLevel::Info),
                        }
                    }
                    EditOutcome::Cancelled => {
                        self.mode = InputMode::Normal;
                        self.title_input.set_text(&services.game_title);
                    }
                    EditOutcome::Edited | EditOutcome::Ignored => {}
                }
                true
            }
            InputMode::Normal => {
                if *modifiers != KeyModifiers::NONE && *modifiers != KeyModifiers::SHIFT {
                    return false;
                }
                match code {
                    KeyCode::Char('t') | KeyCode::Char('i') => {
                        self.mode = InputMode::Insert;
                        true
                    }
                    KeyCode::Char('j') | KeyCode::Down => {
                        self.move_model(1);
                        true
                    }
                    KeyCode::Char('k') | KeyCode::Up => {
                        self.move_model(-1);
                        true
                    }
                    KeyCode::Enter => {
                        self.apply_model(services);
                        true
                    }
                    _ => false,
                }
            }
        }
    }

    fn move_model(&mut self, delta: isize) {
        if self.models.is_empty() {
            return;
        }
        let len = self.models.len() as isize;
        self.selected_model = (self.selected_model as isize + delta).rem_euclid(len) as usize;
    }

    fn apply_model(&self, services: &mut Services) {
        let Some(model) = self.models.get(self.selected_model) else {
            return;
        };
        if *model == services.model {
            return;
        }
        if services.is_busy() {
            services.notify(
                "The engine can be changed once the current request finishes",
                NotificationLevel::Warning,
            );
            return;
        }
        log::info!("Engine switched from {} to {model}", services.model);
        services.model = model.clone();
        services.notify(format!("Engine set to {model}"), NotificationLevel::Success);
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, services: &Services) {
        let rows = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(self.models.len() as u16 + 2),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

        let title_block = match self.mode {
            InputMode::Insert => theme::block_focused("Game Title (Enter to save, Esc to cancel)"),
            InputMode::Normal => theme::block_default("Game Title"),
        };
        frame.render_widget(
            Paragraph::new(
                self.title_input
                    .render_line(self.mode, "e.g. D&D 5e, Terraforming Mars (t to edit)"),
            )
            .block(title_block),
            rows[0],
        );

        frame.render_widget(
            Paragraph::new(build_model_lines(&self.models, self.selected_model, &services.model))
                .block(theme::block_default("Engine")),
            rows[1],
        );

        frame.render_widget(
            Paragraph::new(build_status_lines(services))
                .block(theme::block_default("Status"))
                .wrap(Wrap { trim: false }),
            rows[2],
        );

        let mut hints = Vec::new();
        for (key, label) in [("t", "title"), ("j/k", "engine"), ("Enter", "use engine")] {
            hints.push(Span::styled(format!(" {key}"), theme::highlight()));
            hints.push(Span::styled(format!(":{label}"), theme::key_hint()));
        }
        frame.render_widget(Paragraph::new(Line::from(hints)), rows[3]);
    }
}

fn build_model_lines(models: &[String], selected: usize, active: &str) -> Vec<Line<'static>> {
    models
        .iter()
        .enumerate()
        .map(|(i, model)| {
            let marker = if i == selected { "▸ " } else { "  " };
            let mut spans = vec![Span::styled(marker, theme::highlight())];
            if model == active {
                spans.push(Span::styled(
                    model.clone(),
                    Style::default().fg(theme::SUCCESS).add_modifier(Modifier::BOLD),
                ));
                spans.push(Span::styled("  (active)", theme::dim()));
            } else {
                spans.push(Span::styled(model.clone(), Style::default().fg(theme::TEXT)));
            }
            Line::from(spans)
        })
        .collect()
}

fn build_status_lines(services: &Services) -> Vec<Line<'static>> {
    let credential = if services.is_configured() {
        Line::from(vec![
            Span::styled("  Credential   ", theme::muted()),
            Span::styled("● configured", Style::default().fg(theme::SUCCESS)),
        ])
    } else {
        Line::from(vec![
            Span::styled("  Credential   ", theme::muted()),
            Span::styled(
                "○ Please configure your GEMINI_API_KEY in the .env file.",
                Style::default().fg(theme::WARNING),
            ),
        ])
    };

    let data_dir = services.config.data_dir();
    let path_line = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("  {label:<13}"), theme::muted()),
            Span::styled(value, Style::default().fg(theme::TEXT)),
        ])
    };

    vec![
        credential,
        path_line("Config", AppConfig::config_path().display().to_string()),
        path_line("Exports", services.config.export_dir().display().to_string()),
        path_line("Logs", logging::log_dir(&data_dir).display().to_string()),
        path_line(
            "Timeout",
            format!("{}s", services.config.model.timeout_secs),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn services() -> Services {
        let (tx, _rx) = mpsc::unbounded_channel();
        Services::new(AppConfig::default(), None, tx)
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_selection_starts_at_active_model() {
        let services = services();
        let state = SettingsState::new(&services);
        assert_eq!(state.models[state.selected_model], services.model);
    }

    #[test]
    fn test_enter_switches_engine() {
        let mut services = services();
        let mut state = SettingsState::new(&services);
        if state.models.len() < 2 {
            return;
        }
        state.handle_input(&key(KeyCode::Char('j')), &mut services);
        let expected = state.models[state.selected_model].clone();
        state.handle_input(&key(KeyCode::Enter), &mut services);
        assert_eq!(services.model, expected);
    }

    #[test]
    fn test_title_edit_updates_services() {
        let mut services = services();
        let mut state = SettingsState::new(&services);
        state.handle_input(&key(KeyCode::Char('t')), &mut services);
        assert_eq!(state.input_mode(), InputMode::Insert);
        for c in "Catan".chars() {
            state.handle_input(&key(KeyCode::Char(c)), &mut services);
        }
        state.handle_input(&key(KeyCode::Enter), &mut services);
        assert_eq!(services.title().as_deref(), Some("Catan"));
        assert_eq!(state.input_mode(), InputMode::Normal);
    }

    #[test]
    fn test_model_lines_mark_active() {
        let models = vec!["a".to_string(), "b".to_string()];
        let lines = build_model_lines(&models, 1, "a");
        assert_eq!(lines[0].to_string(), "  a  (active)");
        assert_eq!(lines[1].to_string(), "▸ b");
    }
}
