use serde_json::Value;

use super::types::{ModelDescriptor, ModelKind, ModelListing};
use crate::stack::{StackApi, StackError};

/// Picks the identifier of a raw model record.
///
/// Order: string `identifier`, string `id`, a scalar `identifier`/`id` of any
/// other type, a bare string record, the record's JSON text.
pub fn normalize_identifier(record: &Value) -> String {
    let text_field = |key: &str| {
        record
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    let scalar_field = |key: &str| match record.get(key) {
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    };

    text_field("identifier")
        .or_else(|| text_field("id"))
        .or_else(|| scalar_field("identifier"))
        .or_else(|| scalar_field("id"))
        .unwrap_or_else(|| match record {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
}

/// Declared model type; newer servers use `model_type`, older ones
/// `api_model_type`.
pub fn model_kind(record: &Value) -> ModelKind {
    let declared = record
        .get("model_type")
        .or_else(|| record.get("api_model_type"))
        .and_then(|v| v.as_str());
    ModelKind::from_declared(declared)
}

pub fn describe(record: &Value) -> ModelDescriptor {
    ModelDescriptor {
        identifier: normalize_identifier(record),
        kind: model_kind(record),
    }
}

pub async fn list_models(api: &dyn StackApi) -> Result<Vec<ModelDescriptor>, StackError> {
    let records = api.list_models().await?;
    Ok(records.iter().map(describe).collect())
}

/// Like [`list_models`] but never fails: errors become an empty listing with
/// the error text attached.
pub async fn fetch_listing(api: &dyn StackApi) -> ModelListing {
    let endpoint = api.endpoint().to_string();
    match list_models(api).await {
        Ok(models) => {
            tracing::debug!("Fetched {} models from {}", models.len(), endpoint);
            ModelListing {
                endpoint,
                models,
                error: None,
            }
        }
        Err(err) => {
            tracing::warn!("Failed to fetch models from {}: {}", endpoint, err);
            ModelListing {
                endpoint,
                models: Vec::new(),
                error: Some(err.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::fake::FakeStack;
    use serde_json::json;

    #[test]
    fn identifier_fallback_priority() {
        assert_eq!(normalize_identifier(&json!({ "id": "only-id" })), "only-id");
        assert_eq!(
            normalize_identifier(&json!({ "identifier": "only-identifier" })),
            "only-identifier"
        );
        assert_eq!(
            normalize_identifier(&json!({ "identifier": "wins", "id": "loses" })),
            "wins"
        );
        assert_eq!(
            normalize_identifier(&json!({ "name": "neither" })),
            r#"{"name":"neither"}"#
        );
    }

    #[test]
    fn empty_identifier_falls_through_to_id() {
        assert_eq!(normalize_identifier(&json!({ "identifier": "", "id": "m1" })), "m1");
        assert_eq!(normalize_identifier(&json!({ "id": 42 })), "42");
        assert_eq!(normalize_identifier(&json!("bare-string")), "bare-string");
    }

    #[test]
    fn model_kind_reads_declared_type() {
        assert_eq!(model_kind(&json!({ "model_type": "llm" })), ModelKind::Llm);
        assert_eq!(
            model_kind(&json!({ "api_model_type": "embedding" })),
            ModelKind::Embedding
        );
        assert_eq!(model_kind(&json!({ "type": "model" })), ModelKind::Unknown);
    }

    #[tokio::test]
    async fn listing_keeps_embeddings_but_chat_ids_exclude_them() {
        let stack = FakeStack::new("http://good:8321").with_llm_models(&["m1"]);
        stack
            .state
            .lock()
            .unwrap()
            .models
            .push(json!({ "identifier": "all-MiniLM-L6-v2", "model_type": "embedding" }));

        let listing = fetch_listing(stack.as_ref()).await;
        assert!(listing.error.is_none());
        assert_eq!(listing.identifiers(), vec!["m1", "all-MiniLM-L6-v2"]);
        assert_eq!(listing.chat_identifiers(), vec!["m1"]);
    }

    #[tokio::test]
    async fn unreachable_endpoint_yields_empty_listing_with_error() {
        let stack = FakeStack::unreachable("http://down:8321");
        let listing = fetch_listing(stack.as_ref()).await;
        assert!(listing.models.is_empty());
        assert!(listing.error.unwrap().contains("connection refused"));

        assert!(matches!(
            list_models(stack.as_ref()).await,
            Err(StackError::Transport(_))
        ));
    }
}
