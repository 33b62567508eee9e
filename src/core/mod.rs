pub mod analysis;
pub mod error;
pub mod export;
pub mod llm;
pub mod logging;
pub mod session;
pub mod validation;
pub mod workflow;
