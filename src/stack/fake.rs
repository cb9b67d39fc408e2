//! In-memory stand-in for a LlamaStack server, used by unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::error::StackError;
use super::provider::{StackApi, StackConnector};
use super::types::{
    ChatMessage, Completion, ProviderRecord, RagDocument, RagQueryResult, RegisterVectorDb,
    SamplingParams,
};

#[derive(Default)]
pub struct FakeState {
    pub reachable: bool,
    pub models: Vec<Value>,
    pub providers: Vec<ProviderRecord>,
    pub vector_dbs: Vec<Value>,
    pub inserted: Vec<(String, RagDocument)>,
    pub completion: Option<Result<Value, StackError>>,
    pub query_result: Option<Result<Value, StackError>>,
    pub register_error: Option<StackError>,
    pub insert_error: Option<StackError>,
    pub chat_requests: Vec<(String, Vec<ChatMessage>, SamplingParams)>,
    pub queries: Vec<(Vec<String>, String)>,
    pub register_calls: usize,
}

pub struct FakeStack {
    endpoint: String,
    pub state: Mutex<FakeState>,
}

impl FakeStack {
    pub fn new(endpoint: &str) -> Arc<Self> {
        Arc::new(Self {
            endpoint: endpoint.to_string(),
            state: Mutex::new(FakeState {
                reachable: true,
                providers: vec![
                    ProviderRecord {
                        api: "inference".to_string(),
                        provider_id: "vllm".to_string(),
                        provider_type: None,
                    },
                    ProviderRecord {
                        api: "vector_io".to_string(),
                        provider_id: "faiss".to_string(),
                        provider_type: Some("inline::faiss".to_string()),
                    },
                ],
                ..FakeState::default()
            }),
        })
    }

    pub fn unreachable(endpoint: &str) -> Arc<Self> {
        let stack = Self::new(endpoint);
        stack.state.lock().unwrap().reachable = false;
        stack
    }

    pub fn with_llm_models(self: Arc<Self>, ids: &[&str]) -> Arc<Self> {
        {
            let mut state = self.state.lock().unwrap();
            for id in ids {
                state
                    .models
                    .push(json!({ "identifier": id, "model_type": "llm", "provider_id": "vllm" }));
            }
        }
        self
    }

    pub fn with_vector_db(self: Arc<Self>, record: Value) -> Arc<Self> {
        self.state.lock().unwrap().vector_dbs.push(record);
        self
    }

    pub fn set_completion(&self, result: Result<Value, StackError>) {
        self.state.lock().unwrap().completion = Some(result);
    }

    pub fn set_query_result(&self, result: Result<Value, StackError>) {
        self.state.lock().unwrap().query_result = Some(result);
    }

    fn check_reachable(&self) -> Result<(), StackError> {
        if self.state.lock().unwrap().reachable {
            Ok(())
        } else {
            Err(StackError::Transport(format!(
                "error sending request for url ({}): connection refused",
                self.endpoint
            )))
        }
    }
}

#[async_trait]
impl StackApi for FakeStack {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn list_models(&self) -> Result<Vec<Value>, StackError> {
        self.check_reachable()?;
        Ok(self.state.lock().unwrap().models.clone())
    }

    async fn chat_completion(
        &self,
        model_id: &str,
        messages: &[ChatMessage],
        sampling: &SamplingParams,
    ) -> Result<Completion, StackError> {
        self.check_reachable()?;
        let mut state = self.state.lock().unwrap();
        state
            .chat_requests
            .push((model_id.to_string(), messages.to_vec(), sampling.clone()));
        match &state.completion {
            Some(result) => result.clone().map(Completion),
            None => Ok(Completion(json!({
                "completion_message": { "role": "assistant", "content": "Hello! How can I help?" }
            }))),
        }
    }

    async fn list_vector_dbs(&self) -> Result<Vec<Value>, StackError> {
        self.check_reachable()?;
        Ok(self.state.lock().unwrap().vector_dbs.clone())
    }

    async fn register_vector_db(&self, request: &RegisterVectorDb) -> Result<Value, StackError> {
        self.check_reachable()?;
        let mut state = self.state.lock().unwrap();
        state.register_calls += 1;
        if let Some(err) = &state.register_error {
            return Err(err.clone());
        }
        let exists = state
            .vector_dbs
            .iter()
            .any(|db| db.get("identifier").and_then(|v| v.as_str()) == Some(&request.vector_db_id));
        if exists {
            return Err(StackError::Status {
                status: 400,
                body: format!(
                    "{{\"detail\":\"Vector DB '{}' already exists\"}}",
                    request.vector_db_id
                ),
            });
        }
        let record = json!({
            "identifier": request.vector_db_id,
            "embedding_model": request.embedding_model,
            "embedding_dimension": request.embedding_dimension,
            "provider_id": request.provider_id,
            "type": "vector_db",
        });
        state.vector_dbs.push(record.clone());
        Ok(record)
    }

    async fn list_providers(&self) -> Result<Vec<ProviderRecord>, StackError> {
        self.check_reachable()?;
        Ok(self.state.lock().unwrap().providers.clone())
    }

    async fn insert_documents(
        &self,
        vector_db_id: &str,
        documents: &[RagDocument],
        _chunk_size_tokens: u32,
    ) -> Result<(), StackError> {
        self.check_reachable()?;
        let mut state = self.state.lock().unwrap();
        if let Some(err) = &state.insert_error {
            return Err(err.clone());
        }
        for doc in documents {
            state.inserted.push((vector_db_id.to_string(), doc.clone()));
        }
        Ok(())
    }

    async fn query(
        &self,
        vector_db_ids: &[String],
        content: &str,
    ) -> Result<RagQueryResult, StackError> {
        self.check_reachable()?;
        let mut state = self.state.lock().unwrap();
        state
            .queries
            .push((vector_db_ids.to_vec(), content.to_string()));
        match &state.query_result {
            Some(result) => result.clone().map(RagQueryResult::from_value),
            None => Ok(RagQueryResult::default()),
        }
    }
}

/// Routes endpoints to registered fakes; anything else is unreachable.
#[derive(Default)]
pub struct FakeConnector {
    stacks: Mutex<HashMap<String, Arc<FakeStack>>>,
}

impl FakeConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn register(&self, stack: Arc<FakeStack>) -> Arc<FakeStack> {
        self.stacks
            .lock()
            .unwrap()
            .insert(stack.endpoint.clone(), stack.clone());
        stack
    }
}

impl StackConnector for FakeConnector {
    fn connect(&self, endpoint: &str, _api_key: Option<&str>) -> Arc<dyn StackApi> {
        let endpoint = endpoint.trim().trim_end_matches('/');
        let mut stacks = self.stacks.lock().unwrap();
        let stack = stacks
            .entry(endpoint.to_string())
            .or_insert_with(|| FakeStack::unreachable(endpoint))
            .clone();
        stack
    }
}
