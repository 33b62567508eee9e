//! Parchment & Arcane color theme for the Tabletop Oracle TUI.
//!
//! All color constants are RGB truecolor. Views import from here
//! instead of using inline `Color::*` literals.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders};

use crate::core::analysis::RiskLevel;

// ── Primary palette ─────────────────────────────────────────────────────────

/// Arcane violet: active items, focused borders.
pub const PRIMARY: Color = Color::Rgb(0x7E, 0x57, 0xC2);
/// Light violet: highlights, hints.
pub const PRIMARY_LIGHT: Color = Color::Rgb(0xB3, 0x9D, 0xDB);

// ── Accent ──────────────────────────────────────────────────────────────────

/// Gilded gold: titles, calls to action.
pub const ACCENT: Color = Color::Rgb(0xE6, 0xB8, 0x4C);

// ── Backgrounds ─────────────────────────────────────────────────────────────

/// Ink: base background.
pub const BG_BASE: Color = Color::Rgb(0x14, 0x10, 0x1C);
/// Surface: sidebar, inline code.
pub const BG_SURFACE: Color = Color::Rgb(0x22, 0x1C, 0x2E);

// ── Text ────────────────────────────────────────────────────────────────────

/// Parchment: primary text.
pub const TEXT: Color = Color::Rgb(0xF2, 0xE8, 0xCF);
pub const TEXT_MUTED: Color = Color::Rgb(0x9A, 0x90, 0x80);
pub const TEXT_DIM: Color = Color::Rgb(0x5A, 0x54, 0x4C);

// ── Semantic ────────────────────────────────────────────────────────────────

pub const ERROR: Color = Color::Rgb(0xEF, 0x53, 0x50);
pub const SUCCESS: Color = Color::Rgb(0x66, 0xBB, 0x6A);
pub const WARNING: Color = Color::Rgb(0xFF, 0xA7, 0x26);
pub const INFO: Color = Color::Rgb(0x42, 0xA5, 0xF5);

// ── Domain ──────────────────────────────────────────────────────────────────

/// Color of a risk verdict.
pub fn risk_color(level: RiskLevel) -> Color {
    match level {
        RiskLevel::Safe => SUCCESS,
        RiskLevel::Risky => WARNING,
        RiskLevel::GameBreaking => ERROR,
        RiskLevel::Unknown => TEXT_MUTED,
    }
}

/// Bar color for an impact score in [0, 10].
pub fn score_color(score: f64) -> Color {
    if score >= 7.0 {
        SUCCESS
    } else if score >= 4.0 {
        WARNING
    } else {
        ERROR
    }
}

// ── Style helpers ───────────────────────────────────────────────────────────

/// Accent-colored bold text (titles, active items).
pub fn title() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

/// Section header style.
pub fn heading() -> Style {
    Style::default().fg(PRIMARY_LIGHT).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(PRIMARY)
}

pub fn border_default() -> Style {
    Style::default().fg(TEXT_DIM)
}

/// Highlighted/selected item.
pub fn highlight() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn muted() -> Style {
    Style::default().fg(TEXT_MUTED)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

/// Key hint style (e.g., "[q]:quit").
pub fn key_hint() -> Style {
    Style::default().fg(TEXT_DIM)
}

/// Status bar brand badge.
pub fn brand_badge() -> Style {
    Style::default()
        .fg(BG_BASE)
        .bg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

/// Insert mode badge.
pub fn insert_badge() -> Style {
    Style::default()
        .fg(BG_BASE)
        .bg(PRIMARY_LIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Top-row warning banner.
pub fn warning_banner() -> Style {
    Style::default()
        .fg(BG_BASE)
        .bg(WARNING)
        .add_modifier(Modifier::BOLD)
}

// ── Block builders ──────────────────────────────────────────────────────────

/// A bordered block with focused styling.
pub fn block_focused(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(border_focused())
}

/// A bordered block with default (unfocused) styling.
pub fn block_default(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(border_default())
}
