use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let settings = state.config.settings();
    Ok(Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": state.sessions.count().await,
        "default_endpoint": settings.endpoint.url,
        "default_model": settings.endpoint.model,
        "document_endpoint": settings.document_endpoint(),
        "config_path": state.config.config_path(),
        "log_dir": state.paths.log_dir,
    })))
}
