//! Unit tests that need more scaffolding than an inline test module.

mod providers;
