/// Tabletop Oracle - AI-assisted rulebook companion (TUI Edition)
///
/// Core library providing PDF rulebook ingestion, rulebook and input
/// validation, model-driven rule analysis, and Markdown export for
/// tabletop game masters and players.

pub mod config;
pub mod core;
pub mod ingestion;
pub mod tui;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
