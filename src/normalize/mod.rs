//! Turns the webhook's untyped reply into a display string.
//!
//! The automation workflow behind the webhook has changed shape several
//! times: a bare object, a one-element array wrapping an object, and an
//! OpenAI-style `raw_response` nesting have all been observed. This module
//! probes all of them in a fixed order and always produces a string.

use serde_json::{ Map, Value };

/// Shown when the webhook answered but no usable text could be found.
pub const EMPTY_REPLY: &str = "The webhook replied, but the answer text was empty.";

/// Direct answer fields, earliest wins.
const ANSWER_KEYS: [&str; 6] = ["output", "KI_answer", "ki_answer", "content", "answer", "text"];

/// Metadata fields copied into the debug summary when present.
const SUMMARY_FIELDS: [&str; 6] = ["provider", "model", "role", "error", "request_id", "id"];

const SUMMARY_KEY_LIMIT: usize = 12;

/// Discriminated view over the raw reply, so the lookup steps below stay
/// total instead of leaning on implicit truthiness.
#[derive(Debug)]
pub enum Envelope<'a> {
    Object(&'a Map<String, Value>),
    Array(&'a [Value]),
    Other,
}

impl<'a> Envelope<'a> {
    pub fn from_value(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => Envelope::Object(map),
            Value::Array(items) => Envelope::Array(items),
            _ => Envelope::Other,
        }
    }
}

/// A one-element array unwraps to its first object; everything that is not
/// an object at that point is unrecognized.
fn unwrap_object(value: &Value) -> Option<&Map<String, Value>> {
    match Envelope::from_value(value) {
        Envelope::Object(map) => Some(map),
        Envelope::Array(items) => items.first().and_then(Value::as_object),
        Envelope::Other => None,
    }
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}

/// Extracts the assistant answer from an arbitrary reply value.
///
/// Total over all JSON shapes: falls back to [`EMPTY_REPLY`] instead of
/// failing, so a malformed reply never breaks the turn.
pub fn extract_answer(value: &Value) -> String {
    let Some(object) = unwrap_object(value) else {
        return EMPTY_REPLY.to_string();
    };

    for key in ANSWER_KEYS {
        if let Some(answer) = object.get(key).and_then(non_empty_str) {
            return answer.to_string();
        }
    }

    if let Some(answer) = raw_response_text(object) {
        return answer;
    }

    EMPTY_REPLY.to_string()
}

/// Walks a chat-completions style `raw_response.output[].content[]` nesting
/// and returns the first textual part.
fn raw_response_text(object: &Map<String, Value>) -> Option<String> {
    let output = object.get("raw_response")?.get("output")?.as_array()?;
    for item in output {
        let Some(parts) = item.get("content").and_then(Value::as_array) else {
            continue;
        };
        for part in parts {
            let textual = part
                .get("type")
                .and_then(Value::as_str)
                .map(|t| t == "output_text")
                .unwrap_or(false);
            if !textual {
                continue;
            }
            if let Some(text) = part.get("text").and_then(non_empty_str) {
                return Some(text.to_string());
            }
        }
    }
    None
}

/// Collects known metadata fields from the same unwrapped object for the
/// diagnostic panel. Never used for control flow.
pub fn debug_summary(value: &Value) -> Map<String, Value> {
    let mut summary = Map::new();

    let Some(object) = unwrap_object(value) else {
        summary.insert("shape".to_string(), Value::String("unrecognized".to_string()));
        return summary;
    };

    for field in SUMMARY_FIELDS {
        if let Some(v) = object.get(field) {
            summary.insert(field.to_string(), v.clone());
        }
    }

    summary.insert(
        "has_raw_response".to_string(),
        Value::Bool(object.contains_key("raw_response"))
    );

    let keys: Vec<Value> = object
        .keys()
        .take(SUMMARY_KEY_LIMIT)
        .map(|k| Value::String(k.clone()))
        .collect();
    summary.insert("keys".to_string(), Value::Array(keys));

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn direct_output_field_is_trimmed() {
        let value = json!({ "output": "  Hi there  " });
        assert_eq!(extract_answer(&value), "Hi there");
    }

    #[test]
    fn each_direct_key_is_recognized() {
        for key in ["output", "KI_answer", "ki_answer", "content", "answer", "text"] {
            let mut object = Map::new();
            object.insert(key.to_string(), json!("hello"));
            let value = Value::Object(object);
            assert_eq!(extract_answer(&value), "hello", "key '{}' not recognized", key);
        }
    }

    #[test]
    fn earlier_priority_key_wins() {
        let value = json!({ "content": "B", "output": "A" });
        assert_eq!(extract_answer(&value), "A");
    }

    #[test]
    fn one_element_array_is_unwrapped() {
        let value = json!([{ "content": "Y" }]);
        assert_eq!(extract_answer(&value), "Y");
    }

    #[test]
    fn nested_raw_response_is_probed() {
        let value = json!({
            "raw_response": {
                "output": [
                    { "content": [
                        { "type": "reasoning", "text": "ignored" },
                        { "type": "output_text", "text": "Z" }
                    ] }
                ]
            }
        });
        assert_eq!(extract_answer(&value), "Z");
    }

    #[test]
    fn direct_field_beats_raw_response() {
        let value = json!({
            "output": "direct",
            "raw_response": {
                "output": [{ "content": [{ "type": "output_text", "text": "nested" }] }]
            }
        });
        assert_eq!(extract_answer(&value), "direct");
    }

    #[test]
    fn unusable_shapes_fall_back_to_sentinel() {
        for value in [
            json!({}),
            json!(null),
            json!([]),
            json!(42),
            json!("bare string"),
            json!({ "unrelated": true }),
            json!({ "output": "" }),
            json!({ "output": "   " }),
            json!({ "output": 7 }),
            json!({ "raw_response": { "output": [] } }),
            json!({ "raw_response": { "output": [{ "content": [{ "type": "output_text" }] }] } }),
        ] {
            assert_eq!(extract_answer(&value), EMPTY_REPLY, "value: {}", value);
        }
    }

    #[test]
    fn summary_collects_known_fields() {
        let value = json!({
            "output": "hi",
            "provider": "openai",
            "model": "gpt-4o",
            "raw_response": { "output": [] }
        });
        let summary = debug_summary(&value);
        assert_eq!(summary.get("provider"), Some(&json!("openai")));
        assert_eq!(summary.get("model"), Some(&json!("gpt-4o")));
        assert_eq!(summary.get("has_raw_response"), Some(&json!(true)));
        let keys = summary.get("keys").and_then(|k| k.as_array()).unwrap();
        assert!(keys.contains(&json!("output")));
    }

    #[test]
    fn summary_marks_unrecognized_shapes() {
        let summary = debug_summary(&json!("plain"));
        assert_eq!(summary.get("shape"), Some(&json!("unrecognized")));
    }

    #[test]
    fn summary_bounds_the_key_list() {
        let mut object = Map::new();
        for i in 0..40 {
            object.insert(format!("k{:02}", i), json!(i));
        }
        let summary = debug_summary(&Value::Object(object));
        let keys = summary.get("keys").and_then(|k| k.as_array()).unwrap();
        assert_eq!(keys.len(), 12);
    }
}
