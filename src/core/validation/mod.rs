//! Validation Module
//!
//! Two gates sit in front of the analyzers:
//! - `rulebook`: decides whether an uploaded document is a board game
//!   rulebook (keyword heuristic, then the model). Fails closed.
//! - `logic`: decides whether a house rule or question is meaningful
//!   (length check, then the model). Fails open.

pub mod logic;
pub mod rulebook;

pub use logic::{InputContext, LogicVerdict};
pub use rulebook::{ValidationResult, RULEBOOK_KEYWORDS};
