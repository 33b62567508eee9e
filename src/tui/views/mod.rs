pub mod assistant;
pub mod oracle;
pub mod settings;
pub mod simplifier;
pub mod tomes;

use ratatui::text::Line;

use crate::core::export;
use crate::core::workflow::ToolOutcome;

use super::events::{AppEvent, NotificationLevel};
use super::services::Services;

/// User-facing wording for the outcomes that carry no result.
pub(crate) struct OutcomeMessages {
    pub missing_rulebooks: &'static str,
    pub empty_input: &'static str,
    pub rejected_prefix: &'static str,
    pub failed: &'static str,
}

/// Inline notice for a non-completed outcome. `None` when completed.
pub(crate) fn outcome_notice<T>(
    outcome: &ToolOutcome<T>,
    messages: &OutcomeMessages,
) -> Option<(String, NotificationLevel)> {
    match outcome {
        ToolOutcome::Completed(_) => None,
        ToolOutcome::MissingRulebooks => Some((
            messages.missing_rulebooks.to_string(),
            NotificationLevel::Warning,
        )),
        ToolOutcome::EmptyInput => {
            Some((messages.empty_input.to_string(), NotificationLevel::Warning))
        }
        ToolOutcome::Rejected(reason) => Some((
            format!("{} {reason}", messages.rejected_prefix),
            NotificationLevel::Error,
        )),
        ToolOutcome::Failed => Some((messages.failed.to_string(), NotificationLevel::Error)),
    }
}

/// Write a report into the export directory in the background.
pub(crate) fn export_report(services: &Services, file_name: String, content: String) {
    let dir = services.config.export_dir();
    let tx = services.event_tx.clone();
    tokio::spawn(async move {
        let result = export::write_report(&dir, &file_name, &content)
            .await
            .map_err(|e| e.to_string());
        let _ = tx.send(AppEvent::ExportFinished(result));
    });
}

/// Rows `lines` occupy once wrapped to `width` columns.
pub(crate) fn wrapped_height(lines: &[Line<'_>], width: u16) -> usize {
    let width = width.max(1) as usize;
    lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width))
        .sum()
}

/// Scroll offset that keeps the last row of `content_height` in view.
pub(crate) fn bottom_offset(content_height: usize, viewport: u16) -> u16 {
    content_height
        .saturating_sub(viewport as usize)
        .min(u16::MAX as usize) as u16
}
