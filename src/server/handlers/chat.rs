use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::utils::session;
use crate::core::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = payload.message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".to_string()));
    }

    let handle = session(&state, &session_id).await?;
    let settings = state.config.settings();
    let mut ctx = handle.lock().await;
    let turn = crate::chat::answer(&mut ctx, state.connector.as_ref(), &settings, message).await;

    let debug_events = if ctx.debug_mode {
        ctx.debug_trail().last().cloned()
    } else {
        None
    };
    Ok(Json(json!({
        "turn": turn,
        "turns": ctx.transcript().len(),
        "debug_events": debug_events,
    })))
}

/// Transcript of the session; debug events only while debug mode is on.
pub async fn get_transcript(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = session(&state, &session_id).await?;
    let ctx = handle.lock().await;
    let debug_events = ctx.debug_mode.then(|| ctx.debug_trail().to_vec());
    Ok(Json(json!({
        "turns": ctx.transcript(),
        "debug_mode": ctx.debug_mode,
        "debug_events": debug_events,
    })))
}

pub async fn reset_conversation(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = session(&state, &session_id).await?;
    handle.lock().await.reset_conversation();
    Ok(Json(json!({ "success": true })))
}
