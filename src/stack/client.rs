use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::{json, Value};

use super::error::StackError;
use super::provider::{StackApi, StackConnector};
use super::types::{
    ChatMessage, Completion, ProviderRecord, RagDocument, RagQueryResult, RegisterVectorDb,
    SamplingParams,
};

/// HTTP client for the LlamaStack REST API.
#[derive(Clone)]
pub struct LlamaStackClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl LlamaStackClient {
    pub fn new(base_url: &str, api_key: Option<&str>, client: Client) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()).map(str::to_string),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn get_json(&self, path: &str) -> Result<Value, StackError> {
        let res = self.authorize(self.client.get(self.url(path))).send().await?;
        read_json(res).await
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, StackError> {
        let res = self
            .authorize(self.client.post(self.url(path)))
            .json(body)
            .send()
            .await?;
        read_json(res).await
    }
}

async fn read_json(res: Response) -> Result<Value, StackError> {
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(StackError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let text = res.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| StackError::Decode(e.to_string()))
}

/// List endpoints answer either `{"data": [...]}` or a bare array.
fn list_payload(value: Value) -> Result<Vec<Value>, StackError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(StackError::Decode("expected a list under 'data'".to_string())),
        },
        Value::Null => Ok(Vec::new()),
        other => Err(StackError::Decode(format!("expected a list, got {}", other))),
    }
}

#[async_trait]
impl StackApi for LlamaStackClient {
    fn endpoint(&self) -> &str {
        &self.base_url
    }

    async fn list_models(&self) -> Result<Vec<Value>, StackError> {
        list_payload(self.get_json("/v1/models").await?)
    }

    async fn chat_completion(
        &self,
        model_id: &str,
        messages: &[ChatMessage],
        sampling: &SamplingParams,
    ) -> Result<Completion, StackError> {
        let body = json!({
            "model_id": model_id,
            "messages": messages,
            "sampling_params": sampling.to_wire(),
            "stream": false,
        });
        let payload = self.post_json("/v1/inference/chat-completion", &body).await?;
        Ok(Completion(payload))
    }

    async fn list_vector_dbs(&self) -> Result<Vec<Value>, StackError> {
        list_payload(self.get_json("/v1/vector-dbs").await?)
    }

    async fn register_vector_db(&self, request: &RegisterVectorDb) -> Result<Value, StackError> {
        let body = serde_json::to_value(request).map_err(|e| StackError::Decode(e.to_string()))?;
        self.post_json("/v1/vector-dbs", &body).await
    }

    async fn list_providers(&self) -> Result<Vec<ProviderRecord>, StackError> {
        let items = list_payload(self.get_json("/v1/providers").await?)?;
        Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect())
    }

    async fn insert_documents(
        &self,
        vector_db_id: &str,
        documents: &[RagDocument],
        chunk_size_tokens: u32,
    ) -> Result<(), StackError> {
        let body = json!({
            "vector_db_id": vector_db_id,
            "documents": documents,
            "chunk_size_in_tokens": chunk_size_tokens,
        });
        self.post_json("/v1/tool-runtime/rag-tool/insert", &body)
            .await?;
        Ok(())
    }

    async fn query(
        &self,
        vector_db_ids: &[String],
        content: &str,
    ) -> Result<RagQueryResult, StackError> {
        let body = json!({
            "content": content,
            "vector_db_ids": vector_db_ids,
        });
        let payload = self
            .post_json("/v1/tool-runtime/rag-tool/query", &body)
            .await?;
        Ok(RagQueryResult::from_value(payload))
    }
}

/// Creates [`LlamaStackClient`]s sharing one connection pool.
#[derive(Clone, Default)]
pub struct HttpConnector {
    client: Client,
}

impl HttpConnector {
    pub fn new() -> Result<Self, StackError> {
        let client = Client::builder()
            .user_agent(concat!("ragpanel-backend/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl StackConnector for HttpConnector {
    fn connect(&self, endpoint: &str, api_key: Option<&str>) -> Arc<dyn StackApi> {
        Arc::new(LlamaStackClient::new(endpoint, api_key, self.client.clone()))
    }
}
