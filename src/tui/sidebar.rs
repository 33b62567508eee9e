//! Collapsible left sidebar with grouped navigation.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::events::{AreaFocus, Focus, SidebarGroup};
use super::layout::SidebarVisibility;
use super::theme;

/// Sidebar navigation state.
pub struct SidebarState {
    /// Whether the user has toggled collapse (Ctrl+B).
    pub user_collapsed: bool,
    /// Currently highlighted item index (into Focus::ALL).
    pub selected: usize,
}

impl SidebarState {
    pub fn new() -> Self {
        Self {
            user_collapsed: false,
            selected: 0,
        }
    }

    pub fn toggle_collapse(&mut self) {
        self.user_collapsed = !self.user_collapsed;
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % Focus::ALL.len();
    }

    pub fn select_prev(&mut self) {
        self.selected = (self.selected + Focus::ALL.len() - 1) % Focus::ALL.len();
    }

    pub fn selected_focus(&self) -> Focus {
        Focus::ALL[self.selected]
    }

    /// Sync selection to match the active focus (e.g., after Tab navigation).
    pub fn sync_to_focus(&mut self, focus: Focus) {
        if let Some(idx) = Focus::ALL.iter().position(|&f| f == focus) {
            self.selected = idx;
        }
    }

    /// Render the sidebar.
    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        visibility: SidebarVisibility,
        current_focus: Focus,
        area_focus: AreaFocus,
    ) {
        let lines = match visibility {
            SidebarVisibility::Hidden => return,
            SidebarVisibility::Collapsed => self.collapsed_lines(area, current_focus),
            SidebarVisibility::Expanded => self.expanded_lines(area, current_focus, area_focus),
        };

        frame.render_widget(
            Paragraph::new(lines).style(Style::default().bg(theme::BG_SURFACE)),
            area,
        );
    }

    fn collapsed_lines(&self, area: Rect, current_focus: Focus) -> Vec<Line<'static>> {
        Focus::ALL
            .iter()
            .take(area.height as usize)
            .map(|&view| {
                let style = if view == current_focus {
                    theme::highlight()
                } else {
                    theme::muted()
                };
                Line::from(Span::styled(format!(" {}", view.icon()), style))
            })
            .collect()
    }

    fn expanded_lines(
        &self,
        area: Rect,
        current_focus: Focus,
        area_focus: AreaFocus,
    ) -> Vec<Line<'static>> {
        let mut lines: Vec<Line> = Vec::new();
        let sidebar_focused = area_focus == AreaFocus::Sidebar;

        for group in SidebarGroup::ALL {
            lines.push(Line::from(Span::styled(
                format!(" {}", group.label()),
                Style::default()
                    .fg(theme::PRIMARY)
                    .add_modifier(Modifier::BOLD),
            )));

            for &view in group.views() {
                let index = Focus::ALL.iter().position(|&f| f == view).unwrap_or(0);
                let is_current = view == current_focus;
                let is_selected = sidebar_focused && index == self.selected;

                let prefix = if is_selected { "▸ " } else { "  " };
                let style = match (is_selected, is_current) {
                    (_, true) => theme::highlight(),
                    (true, false) => Style::default().fg(theme::TEXT).add_modifier(Modifier::BOLD),
                    (false, false) => theme::muted(),
                };

                let label = format!("{prefix}{} {}", view.icon(), view.label());
                let padded = format!("{:<width$}", label, width = area.width as usize);
                lines.push(Line::from(Span::styled(padded, style)));
            }
        }

        lines.truncate(area.height as usize);
        lines
    }
}
