//! Property-based tests for corpus truncation

use proptest::prelude::*;

use crate::core::analysis::corpus::truncate_chars;

proptest! {
    #[test]
    fn truncation_is_a_char_bounded_prefix(text in "\\PC{0,300}", max in 0usize..400) {
        let truncated = truncate_chars(&text, max);
        prop_assert!(text.starts_with(truncated));
        prop_assert_eq!(truncated.chars().count(), text.chars().count().min(max));
    }

    #[test]
    fn truncation_is_idempotent(text in "\\PC{0,300}", max in 0usize..400) {
        let once = truncate_chars(&text, max);
        prop_assert_eq!(truncate_chars(once, max), once);
    }

    #[test]
    fn truncation_keeps_multibyte_text_valid(text in "[äöü🎲龍 ]{0,100}", max in 0usize..120) {
        let truncated = truncate_chars(&text, max);
        prop_assert!(text.is_char_boundary(truncated.len()));
    }
}
