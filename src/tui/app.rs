use std::io;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use tokio::sync::mpsc;

use super::events::{Action, AppEvent, AreaFocus, Focus, Notification, NotificationLevel};
use super::layout::AppLayout;
use super::services::{tome_snapshot, Services};
use super::sidebar::SidebarState;
use super::theme;
use super::views::assistant::AssistantState;
use super::views::oracle::OracleState;
use super::views::settings::SettingsState;
use super::views::simplifier::SimplifierState;
use super::views::tomes::TomesState;
use super::widgets::input_buffer::InputMode;

const MAX_NOTIFICATIONS: usize = 3;
const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];

/// Central application state (Elm architecture).
pub struct AppState {
    /// Whether the app is still running.
    pub running: bool,
    /// Currently focused top-level view.
    pub focus: Focus,
    /// Whether sidebar or main content has input focus.
    pub area_focus: AreaFocus,
    pub sidebar: SidebarState,
    pub tomes: TomesState,
    pub oracle: OracleState,
    pub simplifier: SimplifierState,
    pub assistant: AssistantState,
    pub settings: SettingsState,
    /// Active notifications (max 3 visible).
    pub notifications: Vec<Notification>,
    /// Monotonic counter for notification IDs.
    notification_counter: u64,
    /// Whether the help modal is open.
    pub show_help: bool,
    /// Advances every tick while a model action is in flight.
    spinner_frame: usize,
    /// Receiver for backend events.
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
    services: Services,
}

impl AppState {
    pub fn new(event_rx: mpsc::UnboundedReceiver<AppEvent>, services: Services) -> Self {
        Self {
            running: true,
            focus: Focus::Tomes,
            area_focus: AreaFocus::Main,
            sidebar: SidebarState::new(),
            tomes: TomesState::new(),
            oracle: OracleState::new(),
            simplifier: SimplifierState::new(),
            assistant: AssistantState::new(),
            settings: SettingsState::new(&services),
            notifications: Vec::new(),
            notification_counter: 0,
            show_help: false,
            spinner_frame: 0,
            event_rx,
            services,
        }
    }

    // ── Elm event loop ──────────────────────────────────────────────────

    /// Main event loop: render → select → update → loop.
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        tick_rate: Duration,
    ) -> io::Result<()> {
        let mut tick_interval = tokio::time::interval(tick_rate);
        let mut event_stream = EventStream::new();

        if !self.services.is_configured() {
            self.push_notification(
                "Please configure your GEMINI_API_KEY in the .env file.".to_string(),
                NotificationLevel::Warning,
            );
        }

        while self.running {
            terminal.draw(|frame| self.render(frame))?;

            tokio::select! {
                _ = tick_interval.tick() => {
                    self.on_tick();
                }
                Some(event) = self.event_rx.recv() => {
                    self.handle_event(event);
                }
                Some(Ok(crossterm_event)) = event_stream.next() => {
                    self.handle_event(AppEvent::Input(crossterm_event));
                }
            }
        }

        Ok(())
    }

    // ── Event handling ──────────────────────────────────────────────────

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(crossterm_event) => {
                // Priority 1: Help modal
                if self.show_help {
                    if let Some(action) = self.map_help_input(&crossterm_event) {
                        self.handle_action(action);
                    }
                    return;
                }

                // Priority 2: Sidebar input (when focused)
                if self.area_focus == AreaFocus::Sidebar && self.handle_sidebar_input(&crossterm_event) {
                    return;
                }

                // Priority 3: Focused view
                if self.dispatch_view_input(&crossterm_event) {
                    return;
                }

                // Priority 4: Global keybindings
                if let Some(action) = self.map_input_to_action(crossterm_event) {
                    self.handle_action(action);
                }
            }
            AppEvent::Action(action) => self.handle_action(action),
            AppEvent::Tick => self.on_tick(),
            AppEvent::TomesUpdated { loaded, statuses } => {
                self.tomes.on_tomes_updated(loaded, statuses);
            }
            AppEvent::OracleFinished(outcome) => {
                self.oracle.on_finished(outcome, &self.services);
                self.refresh_tomes();
            }
            AppEvent::SimplifierFinished(outcome) => {
                self.simplifier.on_finished(outcome, &self.services);
                self.refresh_tomes();
            }
            AppEvent::AssistantFinished { question, outcome } => {
                self.assistant.on_finished(question, outcome, &self.services);
                self.refresh_tomes();
            }
            AppEvent::ExportFinished(result) => match result {
                Ok(path) => self.push_notification(
                    format!("Report saved to {}", path.display()),
                    NotificationLevel::Success,
                ),
                Err(e) => self.push_notification(format!("Export failed: {e}"), NotificationLevel::Error),
            },
            AppEvent::Notification(notification) => {
                self.push_notification(notification.message, notification.level);
            }
            AppEvent::Quit => {
                self.running = false;
            }
        }
    }

    /// Dispatch input to the currently focused view. Returns true if consumed.
    fn dispatch_view_input(&mut self, event: &Event) -> bool {
        match self.focus {
            Focus::Tomes => self.tomes.handle_input(event, &self.services),
            Focus::Oracle => self.oracle.handle_input(event, &self.services),
            Focus::Simplifier => self.simplifier.handle_input(event, &self.services),
            Focus::Assistant => self.assistant.handle_input(event, &self.services),
            Focus::Settings => self.settings.handle_input(event, &mut self.services),
        }
    }

    /// Handle sidebar-specific input. Returns true if consumed.
    fn handle_sidebar_input(&mut self, event: &Event) -> bool {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return false;
        };

        match (*modifiers, *code) {
            (KeyModifiers::NONE, KeyCode::Char('j')) | (KeyModifiers::NONE, KeyCode::Down) => {
                self.sidebar.select_next();
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('k')) | (KeyModifiers::NONE, KeyCode::Up) => {
                self.sidebar.select_prev();
                true
            }
            (KeyModifiers::NONE, KeyCode::Enter) | (KeyModifiers::NONE, KeyCode::Char('l')) => {
                let focus = self.sidebar.selected_focus();
                self.handle_action(focus.to_action());
                self.area_focus = AreaFocus::Main;
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('h')) => {
                self.sidebar.user_collapsed = true;
                self.area_focus = AreaFocus::Main;
                true
            }
            (KeyModifiers::NONE, KeyCode::Esc) => {
                self.area_focus = AreaFocus::Main;
                true
            }
            _ => false,
        }
    }

    // ── Input mapping ───────────────────────────────────────────────────

    fn map_help_input(&self, event: &Event) -> Option<Action> {
        let Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return None;
        };
        match code {
            KeyCode::Esc | KeyCode::Char('?') => Some(Action::CloseHelp),
            _ => None,
        }
    }

    fn map_input_to_action(&self, event: Event) -> Option<Action> {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return None;
        };
        map_global_key(modifiers, code)
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::FocusTomes => self.set_focus(Focus::Tomes),
            Action::FocusOracle => self.set_focus(Focus::Oracle),
            Action::FocusSimplifier => self.set_focus(Focus::Simplifier),
            Action::FocusAssistant => self.set_focus(Focus::Assistant),
            Action::FocusSettings => self.set_focus(Focus::Settings),
            Action::TabNext => {
                self.focus = self.focus.next();
                self.sidebar.sync_to_focus(self.focus);
            }
            Action::TabPrev => {
                self.focus = self.focus.prev();
                self.sidebar.sync_to_focus(self.focus);
            }
            Action::ToggleSidebar => {
                self.sidebar.toggle_collapse();
                if !self.sidebar.user_collapsed {
                    self.area_focus = AreaFocus::Sidebar;
                    self.sidebar.sync_to_focus(self.focus);
                }
            }
            Action::ShowHelp => self.show_help = true,
            Action::CloseHelp => self.show_help = false,
        }
    }

    /// Set focus and sync sidebar selection.
    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.sidebar.sync_to_focus(focus);
        self.area_focus = AreaFocus::Main;
    }

    /// Pick up authentication results produced by a tool run. Every loaded
    /// tome is cached by then, so no model call is made.
    fn refresh_tomes(&self) {
        let session = self.services.session.clone();
        let provider = self.services.provider.clone();
        let model = self.services.model.clone();
        let tx = self.services.event_tx.clone();
        tokio::spawn(async move {
            let mut session = session.lock().await;
            let event = tome_snapshot(&mut session, provider.as_deref(), &model).await;
            let _ = tx.send(event);
        });
    }

    fn active_input_mode(&self) -> InputMode {
        match self.focus {
            Focus::Tomes => self.tomes.input_mode(),
            Focus::Oracle => self.oracle.input_mode(),
            Focus::Simplifier => InputMode::Normal,
            Focus::Assistant => self.assistant.input_mode(),
            Focus::Settings => self.settings.input_mode(),
        }
    }

    // ── Notifications ───────────────────────────────────────────────────

    /// Push a notification (dedup by message, max 3).
    pub fn push_notification(&mut self, message: String, level: NotificationLevel) {
        if self.notifications.iter().any(|n| n.message == message) {
            return;
        }

        self.notification_counter += 1;
        let mut notification = Notification::new(message, level);
        notification.id = self.notification_counter;
        self.notifications.push(notification);

        while self.notifications.len() > MAX_NOTIFICATIONS {
            self.notifications.remove(0);
        }
    }

    /// Tick: decrement notification TTLs, dismiss expired, advance spinner.
    fn on_tick(&mut self) {
        for n in &mut self.notifications {
            n.ttl_ticks = n.ttl_ticks.saturating_sub(1);
        }
        self.notifications.retain(|n| n.ttl_ticks > 0);

        if self.services.is_busy() {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER.len();
        }
    }

    // ── Rendering ───────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let (layout, visibility) =
            AppLayout::compute(area, self.sidebar.user_collapsed, !self.services.is_configured());

        if let Some(banner) = layout.banner {
            frame.render_widget(
                Paragraph::new(" ⚠ Please configure your GEMINI_API_KEY in the .env file.")
                    .style(theme::warning_banner()),
                banner,
            );
        }

        if let Some(sidebar_area) = layout.sidebar {
            self.sidebar
                .render(frame, sidebar_area, visibility, self.focus, self.area_focus);
        }

        self.render_content(frame, layout.main);
        self.render_status_bar(frame, layout.status);

        // Overlays
        self.render_notifications(frame, area);

        if self.show_help {
            self.render_help_modal(frame, area);
        }
    }

    fn render_content(&self, frame: &mut Frame, area: Rect) {
        match self.focus {
            Focus::Tomes => self.tomes.render(frame, area, self.services.is_busy()),
            Focus::Oracle => self.oracle.render(frame, area),
            Focus::Simplifier => self.simplifier.render(frame, area),
            Focus::Assistant => self.assistant.render(frame, area),
            Focus::Settings => self.settings.render(frame, area, &self.services),
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let activity = if self.services.is_busy() {
            Span::styled(
                format!("{} pondering", SPINNER[self.spinner_frame]),
                Style::default().fg(theme::PRIMARY_LIGHT),
            )
        } else {
            Span::styled("ready", Style::default().fg(theme::TEXT_MUTED))
        };

        let mode_indicator = match self.active_input_mode() {
            InputMode::Insert => Span::styled(" INSERT ", theme::insert_badge()),
            InputMode::Normal => Span::raw(""),
        };

        let status = Line::from(vec![
            Span::styled(" ORACLE ", theme::brand_badge()),
            Span::raw(" "),
            mode_indicator,
            Span::raw(" "),
            Span::styled(
                self.focus.label(),
                Style::default()
                    .fg(theme::PRIMARY_LIGHT)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" │ "),
            Span::styled("Engine:", theme::key_hint()),
            Span::raw(format!(" {} ", self.services.model)),
            activity,
            Span::raw(" │ "),
            Span::styled("Tomes:", theme::key_hint()),
            Span::raw(format!(
                " {}/{}",
                self.tomes.admitted_count(),
                self.tomes.loaded_count()
            )),
            Span::raw(" │ "),
            Span::styled("Tab", theme::key_hint()),
            Span::raw(":nav "),
            Span::styled("?", theme::key_hint()),
            Span::raw(":help "),
            Span::styled("q", theme::key_hint()),
            Span::raw(":quit"),
        ]);

        frame.render_widget(Paragraph::new(status), area);
    }

    fn render_notifications(&self, frame: &mut Frame, area: Rect) {
        if self.notifications.is_empty() {
            return;
        }

        let max_width = 60.min(area.width.saturating_sub(2));
        let height = self.notifications.len() as u16;
        let x = area.width.saturating_sub(max_width + 1);
        let notification_area = Rect::new(x, 1, max_width, height).intersection(area);

        let lines: Vec<Line> = self
            .notifications
            .iter()
            .map(|n| {
                let (prefix, color) = match n.level {
                    NotificationLevel::Info => ("ℹ", theme::INFO),
                    NotificationLevel::Success => ("✓", theme::SUCCESS),
                    NotificationLevel::Warning => ("⚠", theme::WARNING),
                    NotificationLevel::Error => ("✗", theme::ERROR),
                };
                Line::from(vec![
                    Span::styled(
                        format!(" {prefix} "),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(n.message.as_str()),
                ])
            })
            .collect();

        frame.render_widget(Clear, notification_area);
        frame.render_widget(Paragraph::new(lines), notification_area);
    }

    fn render_help_modal(&self, frame: &mut Frame, area: Rect) {
        let modal = centered_rect(60, 80, area);

        let keybindings = [
            ("Global:", ""),
            ("q", "Quit application"),
            ("?", "Toggle this help"),
            ("Tab / Shift+Tab", "Next / previous view"),
            ("1-5", "Jump to view by number"),
            ("Ctrl+B", "Toggle sidebar collapse/expand"),
            ("Ctrl+C", "Force quit"),
            ("", ""),
            ("Sidebar (when focused):", ""),
            ("j/k", "Navigate up/down"),
            ("Enter / l", "Select view"),
            ("h / Esc", "Focus main content"),
            ("", ""),
            ("Tomes:", ""),
            ("a", "Load a rulebook PDF by path"),
            ("d", "Unload selected tome"),
            ("r", "Re-run authentication"),
            ("", ""),
            ("House Rule Oracle:", ""),
            ("i / Enter", "Edit the proposed rule (Enter consults)"),
            ("c", "Consult the Oracle"),
            ("j/k", "Select a suggested scroll"),
            ("a", "Invoke scroll into the rule"),
            ("t", "Cycle detail tabs"),
            ("e", "Export report"),
            ("", ""),
            ("Rule Simplifier:", ""),
            ("s / Enter", "Simplify loaded tomes"),
            ("h/l", "Switch tier"),
            ("e", "Export report"),
            ("r", "Rate the Scribe (1-5 stars)"),
            ("", ""),
            ("RuleMaster:", ""),
            ("i / Enter", "Ask a question"),
            ("j/k  G", "Scroll history / jump to latest"),
            ("", ""),
            ("Settings:", ""),
            ("t", "Edit game title"),
            ("j/k  Enter", "Choose engine"),
        ];

        let heading = Style::default()
            .fg(theme::ACCENT)
            .add_modifier(Modifier::BOLD);
        let key_style = Style::default()
            .fg(theme::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD);

        let mut lines = vec![
            Line::raw(""),
            Line::from(Span::styled(" Keybindings", heading)),
            Line::raw(""),
        ];

        for (key, desc) in keybindings {
            if key.is_empty() {
                lines.push(Line::raw(""));
            } else if desc.is_empty() {
                lines.push(Line::from(Span::styled(format!("  {key}"), heading)));
            } else {
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(format!("{key:<22}"), key_style),
                    Span::raw(desc),
                ]));
            }
        }

        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            Span::raw("  Press "),
            Span::styled("?", key_style),
            Span::raw(" or "),
            Span::styled("Esc", key_style),
            Span::raw(" to close"),
        ]));

        let block = Block::default()
            .title(" Help ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT));

        frame.render_widget(Clear, modal);
        frame.render_widget(Paragraph::new(lines).block(block), modal);
    }
}

/// Global keybindings, active when no modal, sidebar or view consumes input.
fn map_global_key(modifiers: KeyModifiers, code: KeyCode) -> Option<Action> {
    match (modifiers, code) {
        (KeyModifiers::CONTROL, KeyCode::Char('b')) => Some(Action::ToggleSidebar),
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(Action::Quit),
        (KeyModifiers::NONE | KeyModifiers::SHIFT, _) => match code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('?') => Some(Action::ShowHelp),
            KeyCode::Tab => Some(Action::TabNext),
            KeyCode::BackTab => Some(Action::TabPrev),
            KeyCode::Char(c @ '1'..='5') => {
                let index = c as usize - '1' as usize;
                Some(Focus::ALL[index].to_action())
            }
            _ => None,
        },
        _ => None,
    }
}

/// Calculate a centered rect using percentage of parent area.
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(area);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}
