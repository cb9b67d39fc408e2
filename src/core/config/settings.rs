use std::env;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::defaults::*;
use crate::core::errors::ApiError;
use crate::stack::SamplingParams;

/// Typed view over the merged configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PanelSettings {
    pub endpoint: EndpointSettings,
    pub sampling: SamplingParams,
    pub probe: ProbeSettings,
    pub vector_db: VectorDbSettings,
    pub chat: ChatSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EndpointSettings {
    pub url: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Endpoint used for vector store operations; falls back to `url`.
    pub document_url: Option<String>,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            document_url: None,
        }
    }
}

/// The minimal completion issued when verifying an endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProbeSettings {
    pub prompt: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            prompt: PROBE_PROMPT.to_string(),
            temperature: PROBE_TEMPERATURE,
            max_tokens: PROBE_MAX_TOKENS,
        }
    }
}

impl ProbeSettings {
    pub fn sampling(&self) -> SamplingParams {
        SamplingParams {
            temperature: self.temperature,
            top_p: None,
            max_tokens: self.max_tokens,
            repetition_penalty: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VectorDbSettings {
    pub default_name: String,
    pub embedding_model: String,
    pub embedding_dimension: u32,
    pub chunk_size_tokens: u32,
    pub unnamed_label: String,
    pub probe_queries: Vec<String>,
}

impl Default for VectorDbSettings {
    fn default() -> Self {
        Self {
            default_name: DEFAULT_VECTOR_DB_NAME.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dimension: DEFAULT_EMBEDDING_DIMENSION,
            chunk_size_tokens: DEFAULT_CHUNK_SIZE_TOKENS,
            unnamed_label: DEFAULT_UNNAMED_STORE_LABEL.to_string(),
            probe_queries: DOCUMENT_PROBE_QUERIES
                .iter()
                .map(|q| q.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PromptVariant {
    #[default]
    Documentation,
    SecurityAdvisor,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChatSettings {
    pub system_prompt: String,
    pub prompt_variant: PromptVariant,
    pub similar_models_preview: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            prompt_variant: PromptVariant::default(),
            similar_models_preview: SIMILAR_MODELS_PREVIEW,
        }
    }
}

impl PanelSettings {
    pub fn from_config(config: &Value) -> Result<Self, ApiError> {
        let settings: PanelSettings = match config {
            Value::Object(_) => serde_json::from_value(config.clone())
                .map_err(|e| ApiError::BadRequest(format!("invalid settings: {}", e)))?,
            _ => PanelSettings::default(),
        };
        Ok(settings.with_env_overrides(|key| env::var(key).ok()))
    }

    /// Applies environment overrides. Blank values are ignored.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_blank(ENV_ENDPOINT) {
            self.endpoint.url = url;
        }
        if let Some(model) = non_blank(ENV_MODEL) {
            self.endpoint.model = model;
        }
        if let Some(key) = non_blank(ENV_API_KEY) {
            self.endpoint.api_key = Some(key);
        }
        if let Some(url) = non_blank(ENV_DOCUMENT_ENDPOINT) {
            self.endpoint.document_url = Some(url);
        }
        self
    }

    pub fn document_endpoint(&self) -> &str {
        self.endpoint
            .document_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(&self.endpoint.url)
    }

    pub fn api_key(&self) -> Option<&str> {
        self.endpoint.api_key.as_deref().filter(|k| !k.is_empty())
    }
}
