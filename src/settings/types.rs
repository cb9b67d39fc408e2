use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a candidate endpoint was not committed.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Incompatibility {
    #[error("connection failed: {error}")]
    ConnectionError { error: String },
    #[error("model not found among {models_found} models")]
    ModelNotFound {
        models_found: usize,
        similar_models: Vec<String>,
    },
    #[error("chat completion failed: {error}")]
    ChatCompletionError { error: String },
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq)]
#[error("{endpoint} is not usable with model {model}: {reason}")]
pub struct IncompatibilityReport {
    pub endpoint: String,
    pub model: String,
    #[serde(flatten)]
    pub reason: Incompatibility,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Confirmation {
    pub endpoint: String,
    pub model: String,
    /// text of the probe completion
    pub response: String,
}

/// Result of the last endpoint test, kept until the user dismisses it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum TestOutcome {
    Success(Confirmation),
    Failure(IncompatibilityReport),
}

impl From<&Result<Confirmation, IncompatibilityReport>> for TestOutcome {
    fn from(result: &Result<Confirmation, IncompatibilityReport>) -> Self {
        match result {
            Ok(confirmation) => TestOutcome::Success(confirmation.clone()),
            Err(report) => TestOutcome::Failure(report.clone()),
        }
    }
}
