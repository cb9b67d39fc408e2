use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use super::utils::session;
use crate::core::errors::ApiError;
use crate::state::AppState;

pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(json!({ "sessions": state.sessions.summaries().await })))
}

pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let settings = state.config.settings();
    let (_, handle) = state.sessions.create(&settings).await;
    let view = handle.lock().await.snapshot();
    Ok(Json(json!({ "session": view })))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = session(&state, &session_id).await?;
    let mut ctx = handle.lock().await;
    let flash = ctx.take_flash();
    Ok(Json(json!({ "session": ctx.snapshot(), "flash": flash })))
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.sessions.remove(&session_id).await {
        return Err(ApiError::NotFound(format!("Session not found: {}", session_id)));
    }
    Ok(Json(json!({ "success": true })))
}
