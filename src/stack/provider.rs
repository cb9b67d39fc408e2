use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::error::StackError;
use super::types::{
    ChatMessage, Completion, ProviderRecord, RagDocument, RagQueryResult, RegisterVectorDb,
    SamplingParams,
};

/// Operations consumed from a LlamaStack server.
///
/// Model and vector DB records are returned raw: their field layout differs
/// between server versions and is normalized by the callers.
#[async_trait]
pub trait StackApi: Send + Sync {
    /// base URL this client is bound to
    fn endpoint(&self) -> &str;

    async fn list_models(&self) -> Result<Vec<Value>, StackError>;

    async fn chat_completion(
        &self,
        model_id: &str,
        messages: &[ChatMessage],
        sampling: &SamplingParams,
    ) -> Result<Completion, StackError>;

    async fn list_vector_dbs(&self) -> Result<Vec<Value>, StackError>;

    async fn register_vector_db(&self, request: &RegisterVectorDb) -> Result<Value, StackError>;

    async fn list_providers(&self) -> Result<Vec<ProviderRecord>, StackError>;

    async fn insert_documents(
        &self,
        vector_db_id: &str,
        documents: &[RagDocument],
        chunk_size_tokens: u32,
    ) -> Result<(), StackError>;

    /// one retrieval across all given stores combined
    async fn query(
        &self,
        vector_db_ids: &[String],
        content: &str,
    ) -> Result<RagQueryResult, StackError>;
}

/// Binds a client to an endpoint URL.
pub trait StackConnector: Send + Sync {
    fn connect(&self, endpoint: &str, api_key: Option<&str>) -> Arc<dyn StackApi>;
}
