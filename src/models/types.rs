use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Llm,
    Embedding,
    Unknown,
}

impl ModelKind {
    pub fn from_declared(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("llm") => ModelKind::Llm,
            Some("embedding") => ModelKind::Embedding,
            _ => ModelKind::Unknown,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub identifier: String,
    pub kind: ModelKind,
}

/// Outcome of a model fetch for display. `error` set means the fetch failed
/// and `models` is empty; the client renders an explicit empty state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ModelListing {
    pub endpoint: String,
    pub models: Vec<ModelDescriptor>,
    pub error: Option<String>,
}

impl ModelListing {
    pub fn identifiers(&self) -> Vec<String> {
        self.models.iter().map(|m| m.identifier.clone()).collect()
    }

    /// Identifiers usable in chat model pickers.
    pub fn chat_identifiers(&self) -> Vec<String> {
        self.models
            .iter()
            .filter(|m| m.kind == ModelKind::Llm)
            .map(|m| m.identifier.clone())
            .collect()
    }
}
