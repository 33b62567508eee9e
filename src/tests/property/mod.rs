//! Property-based tests
//!
//! Invariants checked with proptest:
//!
//! - `corpus_props`: character truncation is a prefix, idempotent and
//!   never splits a code point
//! - `reply_props`: fenced and bare JSON replies decode to the same value
//! - `score_props`: impact scores always land in [0, 10]
//!
//! By default proptest runs 256 cases per property; override with
//! `PROPTEST_CASES`.

mod corpus_props;
mod reply_props;
mod score_props;
