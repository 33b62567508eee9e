//! Horizontal bar chart for the Oracle's impact scores.
//!
//! One row per axis: label, a bar scaled to the available width, and the
//! score as `n/10`.

use ratatui::{buffer::Buffer, layout::Rect, style::Style, widgets::Widget};

use crate::core::analysis::oracle::{format_score, MAX_IMPACT_SCORE};
use crate::tui::theme;

const LABEL_WIDTH: usize = 12;
const VALUE_WIDTH: usize = 6;
const FILLED: char = '█';
const EMPTY: char = '░';

/// Scores in [0, 10], in display order.
pub struct ScoreChart<'a> {
    scores: &'a [(&'a str, f64)],
}

impl<'a> ScoreChart<'a> {
    pub fn new(scores: &'a [(&'a str, f64)]) -> Self {
        Self { scores }
    }
}

/// Number of filled cells for `score` on a bar `width` cells wide.
fn filled_cells(score: f64, width: usize) -> usize {
    let ratio = (score / MAX_IMPACT_SCORE).clamp(0.0, 1.0);
    ((ratio * width as f64).round() as usize).min(width)
}

impl Widget for ScoreChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let bar_width = (area.width as usize).saturating_sub(LABEL_WIDTH + VALUE_WIDTH + 2);

        for (row, (label, score)) in self.scores.iter().take(area.height as usize).enumerate() {
            let y = area.y + row as u16;
            let label: String = label.chars().take(LABEL_WIDTH).collect();
            buf.set_stringn(
                area.x,
                y,
                format!("{label:<LABEL_WIDTH$} "),
                area.width as usize,
                theme::muted(),
            );

            if bar_width == 0 {
                continue;
            }

            let filled = filled_cells(*score, bar_width);
            let bar_x = area.x + (LABEL_WIDTH + 1) as u16;
            let bar: String = std::iter::repeat(FILLED)
                .take(filled)
                .chain(std::iter::repeat(EMPTY).take(bar_width - filled))
                .collect();
            buf.set_string(bar_x, y, bar, Style::default().fg(theme::score_color(*score)));

            let value_x = bar_x + bar_width as u16 + 1;
            buf.set_string(value_x, y, format!("{}/10", format_score(*score)), theme::heading());
        }
    }
}
