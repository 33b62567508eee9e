//! Tomes view: load rulebook PDFs by path and show how each one fared in
//! authentication.

use std::path::PathBuf;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::core::workflow::TomeStatus;
use crate::ingestion::{is_pdf_path, Document, DocumentKey};
use crate::tui::events::{AppEvent, Notification, NotificationLevel};
use crate::tui::services::{tome_snapshot, Services};
use crate::tui::theme;
use crate::tui::widgets::input_buffer::{EditOutcome, InputBuffer, InputMode};

pub struct TomesState {
    path_input: InputBuffer,
    mode: InputMode,
    loaded: Vec<DocumentKey>,
    statuses: Vec<TomeStatus>,
    selected: usize,
}

impl TomesState {
    pub fn new() -> Self {
        Self {
            path_input: InputBuffer::new(),
            mode: InputMode::Normal,
            loaded: Vec::new(),
            statuses: Vec::new(),
            selected: 0,
        }
    }

    pub fn input_mode(&self) -> InputMode {
        self.mode
    }

    /// Number of tomes that passed authentication.
    pub fn admitted_count(&self) -> usize {
        self.statuses.iter().filter(|s| s.is_admitted()).count()
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    pub fn on_tomes_updated(&mut self, loaded: Vec<DocumentKey>, statuses: Vec<TomeStatus>) {
        self.loaded = loaded;
        self.statuses = statuses;
        self.selected = self.selected.min(self.loaded.len().saturating_sub(1));
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

        match self.path_input.handle_key(code, modifiers) {
            EditOutcome::Submitted(path) => {
                self.mode = InputMode::Normal;
                if !path.is_empty() {
                    self.load_path(&path, services);
                }
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
            KeyCode::Char('a') | KeyCode::Char('i') | KeyCode::Enter => {
                self.mode = InputMode::Insert;
                true
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if !self.loaded.is_empty() {
                    self.selected = (self.selected + 1) % self.loaded.len();
                }
                true
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if !self.loaded.is_empty() {
                    self.selected = (self.selected + self.loaded.len() - 1) % self.loaded.len();
                }
                true
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                self.unload_selected(services);
                true
            }
            KeyCode::Char('r') => {
                self.refresh(services);
                true
            }
            _ => false,
        }
    }

    // ── Actions ──────────────────────────────────────────────────────────

    fn load_path(&mut self, raw: &str, services: &Services) {
        let path = expand_home(raw);
        if !is_pdf_path(&path) {
            services.notify(
                format!("Only PDF tomes can be loaded: {}", path.display()),
                NotificationLevel::Warning,
            );
            return;
        }

        let session = services.session.clone();
        let provider = services.provider.clone();
        let model = services.model.clone();
        let tx = services.event_tx.clone();

        services.spawn_exclusive(async move {
            let document = match Document::from_path(&path).await {
                Ok(document) => document,
                Err(e) => {
                    log::error!("Failed to read tome {}: {e}", path.display());
                    return AppEvent::Notification(Notification::new(
                        format!("Could not read {}: {e}", path.display()),
                        NotificationLevel::Error,
                    ));
                }
            };

            let mut session = session.lock().await;
            let name = document.file_name().to_string();
            if !session.add_document(document) {
                let _ = tx.send(AppEvent::Notification(Notification::new(
                    format!("{name} is already on the shelf"),
                    NotificationLevel::Info,
                )));
            }
            tome_snapshot(&mut session, provider.as_deref(), &model).await
        });
    }

    fn unload_selected(&mut self, services: &Services) {
        let Some(key) = self.loaded.get(self.selected).cloned() else {
            return;
        };

        let session = services.session.clone();
        let provider = services.provider.clone();
        let model = services.model.clone();

        services.spawn_exclusive(async move {
            let mut session = session.lock().await;
            if session.remove_document(&key).is_some() {
                log::info!("Unloaded tome {key}");
            }
            tome_snapshot(&mut session, provider.as_deref(), &model).await
        });
    }

    /// Re-run authentication; cached results make this free for known tomes.
    fn refresh(&mut self, services: &Services) {
        if services.require_provider().is_none() {
            return;
        }
        let session = services.session.clone();
        let provider = services.provider.clone();
        let model = services.model.clone();

        services.spawn_exclusive(async move {
            let mut session = session.lock().await;
            tome_snapshot(&mut session, provider.as_deref(), &model).await
        });
    }

    // ── Rendering ────────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect, busy: bool) {
        let rows = Layout::vertical([Constraint::Length(3), Constraint::Min(1), Constraint::Length(1)])
            .split(area);

        let input_block = match self.mode {
            InputMode::Insert => theme::block_focused("Load tome (path to PDF, Enter to load, Esc to cancel)"),
            InputMode::Normal => theme::block_default("Load tome"),
        };
        frame.render_widget(
            Paragraph::new(
                self.path_input
                    .render_line(self.mode, "Press a to enter a rulebook path, e.g. ~/games/catan.pdf"),
            )
            .block(input_block),
            rows[0],
        );

        let lines = build_shelf_lines(&self.loaded, &self.statuses, self.selected, busy);
        frame.render_widget(
            Paragraph::new(lines)
                .block(theme::block_default("🛡️ Tome Authentication"))
                .wrap(Wrap { trim: false }),
            rows[1],
        );

        frame.render_widget(Paragraph::new(hint_line()), rows[2]);
    }
}

fn hint_line() -> Line<'static> {
    Line::from(vec![
        Span::styled(" a", theme::highlight()),
        Span::styled(":load ", theme::key_hint()),
        Span::styled("d", theme::highlight()),
        Span::styled(":unload ", theme::key_hint()),
        Span::styled("r", theme::highlight()),
        Span::styled(":re-authenticate ", theme::key_hint()),
        Span::styled("j/k", theme::highlight()),
        Span::styled(":select", theme::key_hint()),
    ])
}

/// Expand a leading `~/` to the home directory.
fn expand_home(raw: &str) -> PathBuf {
    match raw.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(raw)),
        None => PathBuf::from(raw),
    }
}

/// One banner per loaded tome, in load order.
fn build_shelf_lines(
    loaded: &[DocumentKey],
    statuses: &[TomeStatus],
    selected: usize,
    busy: bool,
) -> Vec<Line<'static>> {
    if loaded.is_empty() {
        return vec![
            Line::raw(""),
            Line::styled("  No ancient tomes on the shelf yet.", theme::muted()),
            Line::styled(
                "  Load at least one rulebook before consulting the tools.",
                theme::dim(),
            ),
        ];
    }

    let mut lines = Vec::new();
    for (index, key) in loaded.iter().enumerate() {
        let marker = if index == selected { "▸ " } else { "  " };
        let status = statuses.iter().find(|s| &s.key == key);

        let (badge, color, detail) = match status {
            Some(s) if s.is_admitted() => ("✅", theme::SUCCESS, "Authenticated rulebook.".to_string()),
            Some(s) => ("⚠️", theme::ERROR, format!("Rejected. {}", s.validation.reason)),
            None if busy => ("⏳", theme::INFO, "Authenticating...".to_string()),
            None => ("…", theme::TEXT_MUTED, "Awaiting authentication.".to_string()),
        };

        lines.push(Line::from(vec![
            Span::styled(marker, theme::highlight()),
            Span::raw(format!("{badge} ")),
            Span::styled(key.file_name.clone(), Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::styled(format!("  ({} bytes)", key.byte_size), theme::dim()),
        ]));
        lines.push(Line::styled(format!("     {detail}"), theme::muted()));
        if status.is_some_and(|s| !s.has_text) {
            lines.push(Line::styled("     No readable text could be extracted.", theme::dim()));
        }
    }
    lines
}
