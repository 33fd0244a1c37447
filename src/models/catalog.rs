use once_cell::sync::Lazy;
use serde::{ Serialize, Deserialize };
use serde_json::Value;

/// One row of the model catalog served by the optional GET endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelEntry {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub cap: Vec<String>,
}

impl ModelEntry {
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() { &self.id } else { &self.label }
    }
}

static DEFAULT_MODELS: Lazy<Vec<ModelEntry>> = Lazy::new(|| {
    vec![
        ModelEntry {
            id: "gpt-4o".to_string(),
            label: "GPT-4o".to_string(),
            provider: "openai".to_string(),
            cap: vec!["text".to_string(), "vision".to_string()],
        },
        ModelEntry {
            id: "claude-sonnet".to_string(),
            label: "Claude Sonnet".to_string(),
            provider: "anthropic".to_string(),
            cap: vec!["text".to_string(), "vision".to_string()],
        },
        ModelEntry {
            id: "gemini-flash".to_string(),
            label: "Gemini Flash".to_string(),
            provider: "google".to_string(),
            cap: vec!["text".to_string()],
        },
    ]
});

pub fn default_models() -> &'static [ModelEntry] {
    &DEFAULT_MODELS
}

/// Parses a catalog response shaped `{"models": [...]}` or a one-element
/// array wrapping that object. Entries without an `id` are discarded.
pub fn parse_catalog(root: &Value) -> Vec<ModelEntry> {
    let unwrapped = match root {
        Value::Array(items) => match items.first() {
            Some(first) => first,
            None => return Vec::new(),
        },
        other => other,
    };

    let Some(models) = unwrapped.get("models").and_then(Value::as_array) else {
        return Vec::new();
    };

    models
        .iter()
        .filter(|entry| {
            entry
                .get("id")
                .and_then(Value::as_str)
                .map(|id| !id.trim().is_empty())
                .unwrap_or(false)
        })
        .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
        .collect()
}
