//! Client side of the LlamaStack API: model listing, inference, vector DBs
//! and the RAG tool runtime.

pub mod client;
pub mod error;
#[cfg(test)]
pub mod fake;
pub mod provider;
pub mod types;

pub use client::{HttpConnector, LlamaStackClient};
pub use error::StackError;
pub use provider::{StackApi, StackConnector};
pub use types::{
    ChatMessage, Completion, ProviderRecord, RagDocument, RagQueryResult, RegisterVectorDb,
    SamplingParams,
};
