use std::path::PathBuf;

use crate::core::analysis::{HouseRuleAnalysis, RulingAnswer, TieredRulebook};
use crate::core::workflow::{TomeStatus, ToolOutcome};
use crate::ingestion::DocumentKey;

/// Events flowing through the Elm-architecture event loop.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Periodic tick for notification TTLs and the busy spinner.
    Tick,
    /// Raw terminal input (keyboard/mouse).
    Input(crossterm::event::Event),
    /// The loaded tomes changed or were re-authenticated.
    TomesUpdated {
        loaded: Vec<DocumentKey>,
        statuses: Vec<TomeStatus>,
    },
    /// House Rule Oracle finished.
    OracleFinished(ToolOutcome<HouseRuleAnalysis>),
    /// Rule Simplifier finished.
    SimplifierFinished(ToolOutcome<TieredRulebook>),
    /// RuleMaster Assistant finished answering `question`.
    AssistantFinished {
        question: String,
        outcome: ToolOutcome<RulingAnswer>,
    },
    /// A Markdown report was written (or failed to be).
    ExportFinished(Result<PathBuf, String>),
    /// A resolved action to execute.
    Action(Action),
    /// Notification to display to the user.
    Notification(Notification),
    /// Request to quit the application.
    Quit,
}

/// High-level actions dispatched by the input mapper or the sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // Navigation
    FocusTomes,
    FocusOracle,
    FocusSimplifier,
    FocusAssistant,
    FocusSettings,
    TabNext,
    TabPrev,
    ToggleSidebar,

    // Modals
    ShowHelp,
    CloseHelp,

    // Application
    Quit,
}

/// Whether the sidebar or the main content receives input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaFocus {
    Sidebar,
    Main,
}

/// Which top-level view has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Focus {
    Tomes,
    Oracle,
    Simplifier,
    Assistant,
    Settings,
}

impl Focus {
    /// Sidebar order.
    pub const ALL: [Focus; 5] = [
        Focus::Tomes,
        Focus::Oracle,
        Focus::Simplifier,
        Focus::Assistant,
        Focus::Settings,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Focus::Tomes => "Tomes",
            Focus::Oracle => "Oracle",
            Focus::Simplifier => "Simplifier",
            Focus::Assistant => "RuleMaster",
            Focus::Settings => "Settings",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Focus::Tomes => "📜",
            Focus::Oracle => "🔮",
            Focus::Simplifier => "📖",
            Focus::Assistant => "🧙",
            Focus::Settings => "⚙",
        }
    }

    pub fn group(self) -> SidebarGroup {
        match self {
            Focus::Tomes => SidebarGroup::Library,
            Focus::Oracle | Focus::Simplifier | Focus::Assistant => SidebarGroup::Tools,
            Focus::Settings => SidebarGroup::System,
        }
    }

    pub fn to_action(self) -> Action {
        match self {
            Focus::Tomes => Action::FocusTomes,
            Focus::Oracle => Action::FocusOracle,
            Focus::Simplifier => Action::FocusSimplifier,
            Focus::Assistant => Action::FocusAssistant,
            Focus::Settings => Action::FocusSettings,
        }
    }

    pub fn next(self) -> Focus {
        let idx = Focus::ALL.iter().position(|&f| f == self).unwrap_or(0);
        Focus::ALL[(idx + 1) % Focus::ALL.len()]
    }

    pub fn prev(self) -> Focus {
        let idx = Focus::ALL.iter().position(|&f| f == self).unwrap_or(0);
        Focus::ALL[(idx + Focus::ALL.len() - 1) % Focus::ALL.len()]
    }
}

/// Sidebar section headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarGroup {
    Library,
    Tools,
    System,
}

impl SidebarGroup {
    pub const ALL: [SidebarGroup; 3] = [SidebarGroup::Library, SidebarGroup::Tools, SidebarGroup::System];

    pub fn label(self) -> &'static str {
        match self {
            SidebarGroup::Library => "LIBRARY",
            SidebarGroup::Tools => "TOOLS",
            SidebarGroup::System => "SYSTEM",
        }
    }

    pub fn views(self) -> &'static [Focus] {
        match self {
            SidebarGroup::Library => &[Focus::Tomes],
            SidebarGroup::Tools => &[Focus::Oracle, Focus::Simplifier, Focus::Assistant],
            SidebarGroup::System => &[Focus::Settings],
        }
    }
}

/// Notification level for the overlay system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A timed notification shown in the overlay.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub level: NotificationLevel,
    /// Ticks remaining before auto-dismiss.
    pub ttl_ticks: u32,
}

impl Notification {
    /// A notification with the default lifetime; `AppState` assigns the id.
    pub fn new(message: impl Into<String>, level: NotificationLevel) -> Self {
        Self {
            id: 0,
            message: message.into(),
            level,
            ttl_ticks: 100,
        }
    }
}
