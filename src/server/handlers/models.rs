use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use super::utils::session;
use crate::core::errors::ApiError;
use crate::models;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ModelsQuery {
    pub endpoint: Option<String>,
}

/// LLM models of `?endpoint=`, or of the session's active endpoint.
pub async fn list_models(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Query(query): Query<ModelsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = session(&state, &session_id).await?;
    let api = {
        let ctx = handle.lock().await;
        let endpoint = query
            .endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or(ctx.endpoint());
        state.connector.connect(endpoint, ctx.api_key())
    };
    Ok(Json(models::inspect(api.as_ref()).await))
}
