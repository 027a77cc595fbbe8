//! Pulls a readable message out of engine failure lines such as
//! `Failed (Status 400) {'systemErrorMessage': 'Bad token', 'code': 1}`.
//!
//! The trailing object is usually a Python dict repr rather than JSON, so it
//! is parsed leniently and any failure falls back to the text before the `{`.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

const FAILURE_MARKER: &str = "Failed (Status";
const FALLBACK_CHARS: usize = 50;
const MESSAGE_FIELDS: [&str; 2] = ["systemErrorMessage", "message"];

static NONE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bNone\b").expect("None token regex is valid"));

/// Parses a dict-like object after swapping single quotes for double quotes
/// and `None` for `null`. Returns `None` unless the result is a JSON object.
pub fn relaxed_json(text: &str) -> Option<Map<String, Value>> {
    let quoted = text.replace('\'', "\"");
    let normalized = NONE_TOKEN.replace_all(&quoted, "null");
    match serde_json::from_str::<Value>(&normalized) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => None,
        Err(err) => {
            tracing::debug!(%err, "embedded error object did not parse");
            None
        }
    }
}

/// Returns the rewritten line when `text` is a failure line carrying an
/// embedded object, or `None` when the line is not one.
pub fn extract_embedded_error(text: &str) -> Option<String> {
    if !text.contains(FAILURE_MARKER) {
        return None;
    }
    let brace = text.find('{')?;

    let Some(object) = relaxed_json(&text[brace..]) else {
        return Some(text[..brace].trim().to_string());
    };

    let message = MESSAGE_FIELDS
        .iter()
        .filter_map(|field| object.get(*field))
        .find(|value| is_truthy(value));

    Some(match message {
        Some(value) => format!("Error: {}", display_value(value)),
        None => {
            let head: String = text.chars().take(FALLBACK_CHARS).collect();
            format!("Error: {head}...")
        }
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_error_message_wins() {
        let line = "Failed (Status 400) {'systemErrorMessage': 'Bad token', 'message': 'other', 'code': 1}";
        assert_eq!(extract_embedded_error(line).as_deref(), Some("Error: Bad token"));
    }

    #[test]
    fn message_field_is_second_choice() {
        let line = "Failed (Status 403) {'systemErrorMessage': None, 'message': 'Expired'}";
        assert_eq!(extract_embedded_error(line).as_deref(), Some("Error: Expired"));
    }

    #[test]
    fn empty_message_is_skipped() {
        let line = "Failed (Status 403) {'systemErrorMessage': '', 'message': 'Expired'}";
        assert_eq!(extract_embedded_error(line).as_deref(), Some("Error: Expired"));
    }

    #[test]
    fn neither_field_uses_line_head() {
        let line = "Failed (Status 409) {'code': 'conflict', 'retry': None, 'detail': 'xxxxxxxxxx'}";
        let expected: String = line.chars().take(50).collect();
        assert_eq!(
            extract_embedded_error(line),
            Some(format!("Error: {expected}..."))
        );
    }

    #[test]
    fn malformed_object_keeps_prefix() {
        assert_eq!(
            extract_embedded_error("Failed (Status 500) {not-json").as_deref(),
            Some("Failed (Status 500)")
        );
    }

    #[test]
    fn trailing_text_after_object_is_malformed() {
        assert_eq!(
            extract_embedded_error("Failed (Status 500) {'message': 'x'} retrying").as_deref(),
            Some("Failed (Status 500)")
        );
    }

    #[test]
    fn not_a_failure_line() {
        assert_eq!(extract_embedded_error("Status {'message': 'x'}"), None);
        assert_eq!(extract_embedded_error("Failed (Status 500) timeout"), None);
    }

    #[test]
    fn none_inside_words_is_left_alone() {
        let map = relaxed_json("{'name': 'Nonexistent', 'v': None}").unwrap();
        assert_eq!(map["name"], "Nonexistent");
        assert!(map["v"].is_null());
    }

    #[test]
    fn relaxed_json_rejects_non_objects() {
        assert!(relaxed_json("[1, 2]").is_none());
    }
}
