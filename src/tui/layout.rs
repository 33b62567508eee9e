//! Root layout computation for banner + sidebar + main content + status bar.

use ratatui::layout::{Constraint, Layout, Rect};

/// Width of the expanded sidebar (group headers + labeled items).
pub const SIDEBAR_EXPANDED_WIDTH: u16 = 18;
/// Width of the collapsed sidebar (single-char icons).
pub const SIDEBAR_COLLAPSED_WIDTH: u16 = 4;
/// Auto-collapse sidebar below this terminal width.
pub const AUTO_COLLAPSE_THRESHOLD: u16 = 60;
/// Hide sidebar entirely below this terminal width.
pub const HIDE_SIDEBAR_THRESHOLD: u16 = 20;

/// Computed layout regions for a single frame.
pub struct AppLayout {
    /// Warning banner across the top (None when there is nothing to warn about).
    pub banner: Option<Rect>,
    /// Sidebar area (None if hidden).
    pub sidebar: Option<Rect>,
    /// Main content area.
    pub main: Rect,
    /// Status bar (bottom row).
    pub status: Rect,
}

/// Sidebar visibility state derived from terminal width and user preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarVisibility {
    Expanded,
    Collapsed,
    Hidden,
}

impl AppLayout {
    /// Compute layout regions from the terminal area and sidebar state.
    ///
    /// `user_collapsed`: user has toggled collapse with Ctrl+B.
    /// `show_banner`: reserve the top row for the missing-credential warning.
    pub fn compute(area: Rect, user_collapsed: bool, show_banner: bool) -> (Self, SidebarVisibility) {
        let visibility = if area.width < HIDE_SIDEBAR_THRESHOLD {
            SidebarVisibility::Hidden
        } else if user_collapsed || area.width < AUTO_COLLAPSE_THRESHOLD {
            SidebarVisibility::Collapsed
        } else {
            SidebarVisibility::Expanded
        };

        let banner_height = if show_banner { 1 } else { 0 };
        let rows = Layout::vertical([
            Constraint::Length(banner_height),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

        let banner = show_banner.then_some(rows[0]);
        let content_area = rows[1];
        let status = rows[2];

        let sidebar_width = match visibility {
            SidebarVisibility::Hidden => None,
            SidebarVisibility::Collapsed => Some(SIDEBAR_COLLAPSED_WIDTH),
            SidebarVisibility::Expanded => Some(SIDEBAR_EXPANDED_WIDTH),
        };

        let (sidebar, main) = match sidebar_width {
            None => (None, content_area),
            Some(width) => {
                let cols = Layout::horizontal([Constraint::Length(width), Constraint::Min(1)])
                    .split(content_area);
                (Some(cols[0]), cols[1])
            }
        };

        (
            AppLayout {
                banner,
                sidebar,
                main,
                status,
            },
            visibility,
        )
    }
}
