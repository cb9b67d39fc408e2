pub mod chat;
pub mod config;
pub mod health;
pub mod models;
pub mod sessions;
pub mod settings;
pub mod upload;
pub mod utils;
pub mod vector_dbs;
