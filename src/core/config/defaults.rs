//! Hardcoded fallbacks used when neither the config files nor the
//! environment provide a value.

pub const DEFAULT_ENDPOINT: &str = "http://llamastack:8321";
pub const DEFAULT_MODEL: &str = "default-model";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

pub const DEFAULT_VECTOR_DB_NAME: &str = "demo-vector-db";
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-MiniLM-L6-v2";
pub const DEFAULT_EMBEDDING_DIMENSION: u32 = 384;
pub const DEFAULT_CHUNK_SIZE_TOKENS: u32 = 512;
pub const DEFAULT_UNNAMED_STORE_LABEL: &str = "Vector Database";

pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_TOP_P: f64 = 0.9;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_REPETITION_PENALTY: f64 = 1.1;

pub const PROBE_PROMPT: &str = "Hello";
pub const PROBE_TEMPERATURE: f64 = 0.1;
pub const PROBE_MAX_TOKENS: u32 = 10;

pub const SIMILAR_MODELS_PREVIEW: usize = 5;

pub const DOCUMENT_PROBE_QUERIES: [&str; 5] = ["document", "file", "text", "content", "pdf"];

pub const ENV_ENDPOINT: &str = "DEFAULT_CHAT_ENDPOINT";
pub const ENV_MODEL: &str = "DEFAULT_CHAT_MODEL";
pub const ENV_API_KEY: &str = "DEFAULT_API_KEY";
pub const ENV_DOCUMENT_ENDPOINT: &str = "DEFAULT_DOCUMENT_ENDPOINT";
