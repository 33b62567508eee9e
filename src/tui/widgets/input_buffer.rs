//! Single-line text input with cursor management, shared by the tool views.

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    style::Style,
    text::{Line, Span},
};

use crate::tui::theme;

/// Whether keystrokes edit the buffer or drive the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Insert,
}

/// What an editing key did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The key edited the buffer or moved the cursor.
    Edited,
    /// Enter was pressed; carries the trimmed content, buffer cleared.
    Submitted(String),
    /// Esc was pressed.
    Cancelled,
    /// The key is not an editing key.
    Ignored,
}

#[derive(Debug, Default)]
pub struct InputBuffer {
    content: String,
    /// Byte offset, always on a char boundary.
    cursor: usize,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the content and put the cursor at the end.
    pub fn set_text(&mut self, text: &str) {
        self.content = text.to_string();
        self.cursor = self.content.len();
    }

    pub fn insert_char(&mut self, c: char) {
        self.content.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.content.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.content.drain(self.cursor..next);
        }
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.cursor = prev;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.cursor = next;
        }
    }

    /// Take the trimmed content out, resetting the buffer.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.content).trim().to_string()
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    /// Whitespace-only counts as empty.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    pub fn text(&self) -> &str {
        &self.content
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor
    }

    /// Apply an insert-mode key.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> EditOutcome {
        match (modifiers, code) {
            (_, KeyCode::Esc) => EditOutcome::Cancelled,
            (_, KeyCode::Enter) => EditOutcome::Submitted(self.take()),
            (_, KeyCode::Backspace) => {
                self.backspace();
                EditOutcome::Edited
            }
            (_, KeyCode::Delete) => {
                self.delete();
                EditOutcome::Edited
            }
            (_, KeyCode::Left) => {
                self.move_left();
                EditOutcome::Edited
            }
            (_, KeyCode::Right) => {
                self.move_right();
                EditOutcome::Edited
            }
            (_, KeyCode::Home) | (KeyModifiers::CONTROL, KeyCode::Char('a')) => {
                self.cursor = 0;
                EditOutcome::Edited
            }
            (_, KeyCode::End) | (KeyModifiers::CONTROL, KeyCode::Char('e')) => {
                self.cursor = self.content.len();
                EditOutcome::Edited
            }
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => {
                self.clear();
                EditOutcome::Edited
            }
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
                self.insert_char(c);
                EditOutcome::Edited
            }
            _ => EditOutcome::Ignored,
        }
    }

    /// The content as a line; shows a block cursor in insert mode and
    /// `placeholder` when empty.
    pub fn render_line(&self, mode: InputMode, placeholder: &str) -> Line<'static> {
        if self.content.is_empty() && mode == InputMode::Normal {
            return Line::styled(placeholder.to_string(), theme::muted());
        }
        if mode == InputMode::Normal {
            return Line::raw(self.content.clone());
        }

        let before = &self.content[..self.cursor];
        let (cursor_char, after) = match self.content[self.cursor..].chars().next() {
            Some(c) => (c.to_string(), &self.content[self.cursor + c.len_utf8()..]),
            None => (" ".to_string(), ""),
        };

        Line::from(vec![
            Span::raw(before.to_string()),
            Span::styled(cursor_char, Style::default().bg(theme::TEXT).fg(theme::BG_BASE)),
            Span::raw(after.to_string()),
        ])
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.content[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.content[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
    }
}
