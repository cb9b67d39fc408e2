use serde::Serialize;

use super::registry::fetch_listing;
use super::types::ModelListing;
use crate::stack::StackApi;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InspectorStatus {
    Connected,
    Error,
    NoLlmModels,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModelRow {
    /// 1-based
    pub index: usize,
    pub identifier: String,
}

/// LLM models of one endpoint, ready for a numbered table.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModelTable {
    pub endpoint: String,
    pub status: InspectorStatus,
    pub error: Option<String>,
    pub total_models: usize,
    pub rows: Vec<ModelRow>,
}

impl From<ModelListing> for ModelTable {
    fn from(listing: ModelListing) -> Self {
        let rows: Vec<ModelRow> = listing
            .chat_identifiers()
            .into_iter()
            .enumerate()
            .map(|(i, identifier)| ModelRow {
                index: i + 1,
                identifier,
            })
            .collect();

        let status = if listing.error.is_some() {
            InspectorStatus::Error
        } else if rows.is_empty() {
            InspectorStatus::NoLlmModels
        } else {
            InspectorStatus::Connected
        };

        ModelTable {
            endpoint: listing.endpoint,
            status,
            error: listing.error,
            total_models: listing.models.len(),
            rows,
        }
    }
}

pub async fn inspect(api: &dyn StackApi) -> ModelTable {
    fetch_listing(api).await.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::fake::FakeStack;
    use serde_json::json;

    #[tokio::test]
    async fn llm_models_are_numbered_from_one() {
        let stack = FakeStack::new("http://good:8321").with_llm_models(&["m1", "m2"]);
        stack
            .state
            .lock()
            .unwrap()
            .models
            .push(json!({ "identifier": "all-MiniLM-L6-v2", "model_type": "embedding" }));

        let table = inspect(stack.as_ref()).await;

        assert_eq!(table.status, InspectorStatus::Connected);
        assert_eq!(table.total_models, 3);
        assert_eq!(table.rows[0], ModelRow { index: 1, identifier: "m1".to_string() });
        assert_eq!(table.rows[1].index, 2);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_explicit_error_state() {
        let stack = FakeStack::unreachable("http://down:1");
        let table = inspect(stack.as_ref()).await;
        assert_eq!(table.status, InspectorStatus::Error);
        assert!(table.error.is_some());
        assert!(table.rows.is_empty());
    }

    #[tokio::test]
    async fn only_embedding_models_means_no_llm_models() {
        let stack = FakeStack::new("http://good:8321");
        stack
            .state
            .lock()
            .unwrap()
            .models
            .push(json!({ "identifier": "all-MiniLM-L6-v2", "model_type": "embedding" }));
        let table = inspect(stack.as_ref()).await;
        assert_eq!(table.status, InspectorStatus::NoLlmModels);
    }
}
