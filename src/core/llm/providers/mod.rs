//! LLM Provider Implementations

pub mod google;

pub use google::GoogleProvider;
