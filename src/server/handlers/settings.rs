use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::utils::session;
use crate::core::errors::ApiError;
use crate::settings;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EditEndpointRequest {
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TestEndpointRequest {
    /// defaults to the session's edit field
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PickModelRequest {
    pub model: String,
}

#[derive(Debug, Deserialize)]
pub struct DebugModeRequest {
    pub enabled: bool,
}

pub async fn edit_endpoint(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(payload): Json<EditEndpointRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = session(&state, &session_id).await?;
    let mut ctx = handle.lock().await;
    let listing = settings::edit_endpoint(&mut ctx, state.connector.as_ref(), &payload.url).await;
    Ok(Json(json!({ "session": ctx.snapshot(), "models": listing })))
}

/// Runs the endpoint test. Both outcomes are `200`; the outcome itself says
/// whether the endpoint was committed.
pub async fn test_endpoint(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(payload): Json<TestEndpointRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = session(&state, &session_id).await?;
    let mut ctx = handle.lock().await;

    let candidate = payload.url.unwrap_or_else(|| ctx.edit_url.clone());
    if candidate.trim().is_empty() {
        return Err(ApiError::BadRequest("enter a URL to test".to_string()));
    }

    let config = state.config.settings();
    let result = settings::verify_and_maybe_commit(
        &mut ctx,
        state.connector.as_ref(),
        &config,
        &candidate,
    )
    .await;

    Ok(Json(json!({
        "committed": result.is_ok(),
        "outcome": ctx.last_test,
        "session": ctx.snapshot(),
    })))
}

pub async fn reset_endpoint(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = session(&state, &session_id).await?;
    let mut ctx = handle.lock().await;
    settings::reset_to_active(&mut ctx);
    Ok(Json(json!({ "session": ctx.snapshot() })))
}

pub async fn dismiss_test(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = session(&state, &session_id).await?;
    let mut ctx = handle.lock().await;
    settings::dismiss_test(&mut ctx);
    Ok(Json(json!({ "session": ctx.snapshot() })))
}

pub async fn refresh_models(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = session(&state, &session_id).await?;
    let mut ctx = handle.lock().await;
    let listing = settings::refresh_models(&mut ctx, state.connector.as_ref()).await;
    Ok(Json(json!({ "models": listing, "session": ctx.snapshot() })))
}

pub async fn pick_model(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(payload): Json<PickModelRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = session(&state, &session_id).await?;
    let mut ctx = handle.lock().await;
    settings::pick_model(&mut ctx, &payload.model)?;
    Ok(Json(json!({ "session": ctx.snapshot() })))
}

pub async fn set_debug_mode(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(payload): Json<DebugModeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = session(&state, &session_id).await?;
    let mut ctx = handle.lock().await;
    settings::set_debug_mode(&mut ctx, payload.enabled);
    Ok(Json(json!({ "debug_mode": ctx.debug_mode })))
}
