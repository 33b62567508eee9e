//! Crate-internal test tree
//!
//! - `common`: shared fixtures (synthetic rulebook PDFs)
//! - `mocks`: scripted model providers
//! - `unit`: component tests that need HTTP mocking
//! - `property`: proptest invariants

pub mod common;
pub mod mocks;

mod property;
mod unit;
