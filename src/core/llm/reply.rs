//! Model reply parsing.
//!
//! Models tend to wrap JSON in a Markdown code fence, with or without a
//! language tag. A reply that already decodes is taken as is; otherwise the
//! outer fence is removed and the remainder is decoded strictly. A reply that
//! does not decode is a failure, never partial data.

use serde::de::DeserializeOwned;

use crate::core::error::{OracleError, Result};

const FENCE: &str = "```";

/// Return the body of the fenced block wrapping `reply`, or the trimmed
/// reply when it contains no fence.
///
/// The block runs from the first opening fence to the last closing fence, so
/// fences nested inside the body (Markdown code blocks in a JSON string)
/// stay intact. Prose before the opening fence is dropped.
pub fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(open) = trimmed.find(FENCE) else {
        return trimmed;
    };

    let after_open = &trimmed[open + FENCE.len()..];

    // A language tag runs up to the first newline: "```json\n{...}".
    let body = match after_open.find('\n') {
        Some(nl) if is_language_tag(&after_open[..nl]) => &after_open[nl + 1..],
        _ => after_open,
    };

    let body = match body.rfind(FENCE) {
        Some(close) => &body[..close],
        None => body,
    };

    body.trim()
}

fn is_language_tag(candidate: &str) -> bool {
    let candidate = candidate.trim();
    candidate
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '+')
}

/// Decode the reply into `T`, stripping a surrounding code fence when the
/// bare reply is not JSON.
pub fn parse_json<T: DeserializeOwned>(reply: &str) -> Result<T> {
    let trimmed = reply.trim();
    if trimmed.is_empty() {
        return Err(OracleError::ParseFailure("empty reply".to_string()));
    }

    match serde_json::from_str(trimmed) {
        Ok(value) => return Ok(value),
        // Bare JSON keeps its own error; fences inside it belong to strings.
        Err(e) if !trimmed.contains(FENCE) || trimmed.starts_with(['{', '[']) => {
            return Err(e.into())
        }
        Err(_) => {}
    }

    let body = strip_code_fence(trimmed);
    if body.is_empty() {
        return Err(OracleError::ParseFailure("empty reply".to_string()));
    }
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::{json, Value};

    #[rstest]
    #[case("{\"a\":1}")]
    #[case("```json\n{\"a\":1}\n```")]
    #[case("```\n{\"a\":1}\n```")]
    #[case("```JSON\n{\"a\":1}\n```")]
    #[case("Here you go:\n```json\n{\"a\":1}\n```\nAnything else?")]
    #[case("  {\"a\":1}  \n")]
    fn test_fenced_and_bare_replies_agree(#[case] reply: &str) {
        let value: Value = parse_json(reply).unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    const TIERS_WITH_CODE: &str =
        r#"{"first_game": "Roll.\n```\nexample\n```", "advanced": "Trade.\n```text\nbank 4:1\n```"}"#;

    fn tiers_with_code() -> Value {
        json!({
            "first_game": "Roll.\n```\nexample\n```",
            "advanced": "Trade.\n```text\nbank 4:1\n```",
        })
    }

    #[rstest]
    #[case(TIERS_WITH_CODE.to_string())]
    #[case(format!("```json\n{TIERS_WITH_CODE}\n```"))]
    #[case(format!("```\n{TIERS_WITH_CODE}\n```"))]
    #[case(format!("Here are the tiers:\n```json\n{TIERS_WITH_CODE}\n```\nEnjoy!"))]
    fn test_code_blocks_inside_strings_survive(#[case] reply: String) {
        let value: Value = parse_json(&reply).unwrap();
        assert_eq!(value, tiers_with_code());
    }

    #[test]
    fn test_bare_json_keeps_its_own_error() {
        let err = parse_json::<Vec<u8>>(TIERS_WITH_CODE).unwrap_err();
        let OracleError::ParseFailure(message) = err else {
            panic!("expected a parse failure");
        };
        assert!(message.contains("invalid type"), "{message}");
    }

    #[test]
    fn test_fence_on_same_line() {
        assert_eq!(strip_code_fence("```{\"a\":1}```"), "{\"a\":1}");
    }

    #[test]
    fn test_unterminated_fence_keeps_body() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn test_prose_reply_is_a_parse_failure() {
        let err = parse_json::<Value>("The rule seems fine to me.").unwrap_err();
        assert!(matches!(err, OracleError::ParseFailure(_)));
    }

    #[test]
    fn test_empty_reply_is_a_parse_failure() {
        let err = parse_json::<Value>("```json\n```").unwrap_err();
        assert!(matches!(err, OracleError::ParseFailure(_)));
    }
}
