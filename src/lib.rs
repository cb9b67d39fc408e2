pub mod chat;
pub mod core;
pub mod ingest;
pub mod models;
pub mod server;
pub mod session;
pub mod settings;
pub mod stack;
pub mod state;
pub mod vector_dbs;
