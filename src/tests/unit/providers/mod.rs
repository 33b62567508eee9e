//! LLM Provider Unit Tests
//!
//! Uses wiremock for HTTP mocking to test:
//! - API request formatting
//! - Response parsing (success and error cases)
//! - Model override per request

mod google_tests;
