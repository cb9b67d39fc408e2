use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::core::config::defaults::{
    DEFAULT_MAX_TOKENS, DEFAULT_REPETITION_PENALTY, DEFAULT_TEMPERATURE, DEFAULT_TOP_P,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SamplingParams {
    pub temperature: f64,
    pub top_p: Option<f64>,
    pub max_tokens: u32,
    pub repetition_penalty: Option<f64>,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            top_p: Some(DEFAULT_TOP_P),
            max_tokens: DEFAULT_MAX_TOKENS,
            repetition_penalty: Some(DEFAULT_REPETITION_PENALTY),
        }
    }
}

impl SamplingParams {
    /// Wire form of `sampling_params` for the inference API.
    pub fn to_wire(&self) -> Value {
        let strategy = if self.temperature <= 0.0 {
            json!({ "type": "greedy" })
        } else {
            let mut strategy = json!({ "type": "top_p", "temperature": self.temperature });
            if let Some(top_p) = self.top_p {
                strategy["top_p"] = json!(top_p);
            }
            strategy
        };

        let mut params = json!({
            "strategy": strategy,
            "max_tokens": self.max_tokens,
        });
        if let Some(penalty) = self.repetition_penalty {
            params["repetition_penalty"] = json!(penalty);
        }
        params
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProviderRecord {
    #[serde(default)]
    pub api: String,
    #[serde(default)]
    pub provider_id: String,
    #[serde(default)]
    pub provider_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegisterVectorDb {
    pub vector_db_id: String,
    pub embedding_model: String,
    pub embedding_dimension: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
}

/// A document handed to the RAG tool for chunking and embedding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagDocument {
    pub document_id: String,
    /// `data:<mime>;base64,<payload>`
    pub content: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RagQueryResult {
    pub content: Option<String>,
    pub metadata: Value,
}

impl RagQueryResult {
    pub fn from_value(value: Value) -> Self {
        let content = value.get("content").and_then(flatten_text);
        let metadata = value.get("metadata").cloned().unwrap_or(Value::Null);
        Self { content, metadata }
    }

    /// Document ids reported by the server alongside the retrieved chunks.
    pub fn document_ids(&self) -> Vec<String> {
        self.metadata
            .get("document_ids")
            .and_then(|v| v.as_array())
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| id.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Raw completion payload; the shape varies between server versions.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion(pub Value);

impl Completion {
    /// Extracts the assistant text, falling back to the raw JSON string when
    /// no known field is present.
    pub fn text(&self) -> String {
        let raw = &self.0;
        raw.get("completion_message")
            .and_then(|m| m.get("content"))
            .and_then(flatten_text)
            .or_else(|| raw.get("content").and_then(flatten_text))
            .or_else(|| {
                raw.pointer("/choices/0/message/content")
                    .and_then(flatten_text)
            })
            .unwrap_or_else(|| raw.to_string())
    }
}

/// Interleaved content: a string, a `{text}` item, or a list of items.
fn flatten_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Object(item) => item.get("text").and_then(|t| t.as_str()).map(str::to_string),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(flatten_text).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(""))
            }
        }
        _ => None,
    }
}
