//! Response Interpretation
//!
//! Model completions only tend toward JSON. They arrive wrapped in markdown
//! fences, prefixed with reasoning blocks, or with small syntax slips such as
//! trailing commas. [`extract_json`] peels those layers off and never fails
//! loudly: anything it cannot recover becomes `None`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::warn;

static REASONING_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<think>.*?</think>|<thinking>.*?</thinking>|<reasoning>.*?</reasoning>")
        .expect("invalid reasoning block regex")
});

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[A-Za-z0-9_-]*").expect("invalid code fence regex"));

static TRAILING_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*([}\]])").expect("invalid trailing comma regex"));

// A single-quoted key or value sitting between JSON punctuation.
static SINGLE_QUOTED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([{\[,:]\s*)'([^'"\\]*)'(\s*[,:}\]])"#).expect("invalid single quote regex")
});

/// A parsed JSON object as returned by the model.
pub type JsonObject = Map<String, Value>;

/// Extracts the outermost JSON object from free-form model output.
pub fn extract_json(raw: &str) -> Option<JsonObject> {
    if raw.trim().is_empty() {
        return None;
    }

    let cleaned = strip_noise(raw);
    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;
    if end < start {
        return None;
    }
    let candidate = &cleaned[start..=end];

    if let Some(object) = parse_object(candidate) {
        return Some(object);
    }

    let repaired = repair(candidate);
    match parse_object(&repaired) {
        Some(object) => Some(object),
        None => {
            warn!(text = %candidate, "Could not parse JSON from model output");
            None
        }
    }
}

/// Removes reasoning blocks and code fence markers, then trims.
pub fn strip_noise(raw: &str) -> String {
    let without_reasoning = REASONING_BLOCK.replace_all(raw, "");
    let without_fences = CODE_FENCE.replace_all(&without_reasoning, "");
    without_fences.trim().to_string()
}

/// Best-effort syntactic fixes for almost-JSON.
pub fn repair(text: &str) -> String {
    let straightened: String = text
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect();

    let mut fixed = TRAILING_COMMA.replace_all(&straightened, "$1").into_owned();

    // Adjacent matches share their delimiter, so a single pass can miss every
    // other quote. Repeat until nothing changes.
    loop {
        let next = SINGLE_QUOTED
            .replace_all(&fixed, "$1\"$2\"$3")
            .into_owned();
        if next == fixed {
            break;
        }
        fixed = next;
    }
    fixed
}

fn parse_object(text: &str) -> Option<JsonObject> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

/// The `type` field of a parsed action, if it is a string.
pub fn action_type(object: &JsonObject) -> Option<&str> {
    object.get("type").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_extracts_from_json_fence() {
        let raw = "```json\n{\"type\":\"ask\",\"question\":\"Is it real?\"}\n```";
        assert_eq!(
            extract_json(raw),
            Some(obj(json!({"type": "ask", "question": "Is it real?"})))
        );
    }

    #[test]
    fn test_extracts_from_bare_fence_with_prose() {
        let raw = "Sure! Here you go:\n```\n{\"type\":\"ask\",\"question\":\"Is it alive?\"}\n```\nGood luck.";
        assert_eq!(
            extract_json(raw),
            Some(obj(json!({"type": "ask", "question": "Is it alive?"})))
        );
    }

    #[test]
    fn test_strips_think_block() {
        let raw = "<think>reasoning...</think>{\"type\":\"final\",\"guess\":\"Einstein\",\"confidence\":0.9}";
        assert_eq!(
            extract_json(raw),
            Some(obj(
                json!({"type": "final", "guess": "Einstein", "confidence": 0.9})
            ))
        );
    }

    #[test]
    fn test_think_block_containing_braces_is_removed() {
        let raw = "<THINK>\nmaybe {\"type\":\"ask\"} is wrong\n</Think>\n{\"type\":\"guess\",\"guess\":\"Mozart\",\"confidence\":0.6}";
        let object = extract_json(raw).unwrap();
        assert_eq!(action_type(&object), Some("guess"));
        assert_eq!(object["guess"], json!("Mozart"));
    }

    #[test]
    fn test_repairs_trailing_comma() {
        let raw = r#"{"type":"guess","guess":"Napoleon", "confidence": 0.8,}"#;
        assert_eq!(
            extract_json(raw),
            Some(obj(
                json!({"type": "guess", "guess": "Napoleon", "confidence": 0.8})
            ))
        );
    }

    #[test]
    fn test_repairs_single_quotes() {
        let raw = "{'type': 'ask', 'question': 'Is it a wizard?'}";
        assert_eq!(
            extract_json(raw),
            Some(obj(json!({"type": "ask", "question": "Is it a wizard?"})))
        );
    }

    #[test]
    fn test_repairs_smart_quotes() {
        let raw = "{\u{201C}type\u{201D}: \u{201C}ask\u{201D}, \u{201C}question\u{201D}: \u{201C}Does he sing?\u{201D}}";
        assert_eq!(
            extract_json(raw),
            Some(obj(json!({"type": "ask", "question": "Does he sing?"})))
        );
    }

    #[test]
    fn test_curly_single_quotes_become_json_strings() {
        let raw = "{\u{2018}type\u{2019}: \u{2018}ask\u{2019}, \u{2018}question\u{2019}: \u{2018}Is it real?\u{2019}}";
        assert_eq!(
            extract_json(raw),
            Some(obj(json!({"type": "ask", "question": "Is it real?"})))
        );
    }

    #[test]
    fn test_curly_apostrophe_inside_double_quotes_is_kept() {
        let raw = "{\"type\":\"ask\",\"question\":\"Is it a person\u{2019}s pet?\",}";
        assert_eq!(
            extract_json(raw),
            Some(obj(json!({"type": "ask", "question": "Is it a person's pet?"})))
        );
    }

    #[test]
    fn test_apostrophe_inside_double_quotes_survives_repair() {
        let raw = r#"{"type":"ask","question":"Is it a person's pet?",}"#;
        assert_eq!(
            extract_json(raw),
            Some(obj(json!({"type": "ask", "question": "Is it a person's pet?"})))
        );
    }

    #[test]
    fn test_no_json_returns_none() {
        assert_eq!(extract_json("no json here"), None);
        assert_eq!(extract_json(""), None);
        assert_eq!(extract_json("   \n"), None);
        assert_eq!(extract_json("} backwards {"), None);
    }

    #[test]
    fn test_unrepairable_returns_none() {
        assert_eq!(extract_json("{type: ask question}"), None);
    }

    #[test]
    fn test_non_object_json_is_rejected() {
        assert_eq!(extract_json("[1, 2, 3]"), None);
    }

    #[test]
    fn test_action_type() {
        let object = obj(json!({"type": "ask"}));
        assert_eq!(action_type(&object), Some("ask"));
        assert_eq!(action_type(&obj(json!({"type": 3}))), None);
        assert_eq!(action_type(&obj(json!({}))), None);
    }
}
