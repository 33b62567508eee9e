//! Property-based tests for model reply parsing

use proptest::prelude::*;
use serde_json::{json, Value};

use crate::core::llm::reply::{parse_json, strip_code_fence};

fn arb_object() -> impl Strategy<Value = Value> {
    ("[a-z_]{1,12}", "[a-zA-Z0-9 .,!?]{0,40}", any::<bool>())
        .prop_map(|(key, text, flag)| {
            let mut object = serde_json::Map::new();
            object.insert("flag".to_string(), json!(flag));
            object.insert(key, json!(text));
            Value::Object(object)
        })
}

proptest! {
    #[test]
    fn fenced_and_bare_replies_decode_alike(value in arb_object(), tag in prop_oneof![Just(""), Just("json"), Just("JSON")]) {
        let bare = value.to_string();
        let fenced = format!("Here you go:\n```{tag}\n{bare}\n```\nThanks");

        let from_bare: Value = parse_json(&bare).unwrap();
        let from_fenced: Value = parse_json(&fenced).unwrap();
        prop_assert_eq!(&from_bare, &value);
        prop_assert_eq!(from_fenced, value);
    }

    #[test]
    fn unfenced_reply_is_only_trimmed(text in "[a-zA-Z0-9 {}:\"]{0,80}") {
        prop_assert_eq!(strip_code_fence(&text), text.trim());
    }
}
