use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::utils::{read_files, session};
use crate::core::errors::ApiError;
use crate::state::AppState;
use crate::vector_dbs;

#[derive(Debug, Deserialize)]
pub struct CreateVectorDbRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    /// `null` selects every store
    pub names: Option<Vec<String>>,
}

pub async fn list_vector_dbs(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = session(&state, &session_id).await?;
    let settings = state.config.settings();
    let mut ctx = handle.lock().await;
    let api = state
        .connector
        .connect(settings.document_endpoint(), ctx.api_key());

    let stores = vector_dbs::list_stores(api.as_ref(), &settings).await?;
    Ok(Json(json!({
        "vector_dbs": stores,
        "selection": ctx.vector_db_selection,
        "newly_created": ctx.newly_created_db,
        "flash": ctx.take_flash(),
    })))
}

pub async fn create_vector_db(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(payload): Json<CreateVectorDbRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = session(&state, &session_id).await?;
    let settings = state.config.settings();
    let mut ctx = handle.lock().await;
    let api = state
        .connector
        .connect(settings.document_endpoint(), ctx.api_key());

    let created = vector_dbs::create_store(&mut ctx, api.as_ref(), &settings, &payload.name).await?;
    Ok(Json(json!({ "vector_db": created })))
}

pub async fn get_vector_db(
    State(state): State<Arc<AppState>>,
    Path((session_id, name)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = session(&state, &session_id).await?;
    let settings = state.config.settings();
    let mut ctx = handle.lock().await;
    let api = state
        .connector
        .connect(settings.document_endpoint(), ctx.api_key());

    let view = vector_dbs::store_details(&mut ctx, api.as_ref(), &settings, &name).await?;
    Ok(Json(view))
}

pub async fn probe_documents(
    State(state): State<Arc<AppState>>,
    Path((session_id, name)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = session(&state, &session_id).await?;
    let settings = state.config.settings();
    let api = {
        let ctx = handle.lock().await;
        state
            .connector
            .connect(settings.document_endpoint(), ctx.api_key())
    };

    let probe = vector_dbs::probe_store_documents(api.as_ref(), &settings, &name).await?;
    Ok(Json(probe))
}

pub async fn upload_documents(
    State(state): State<Arc<AppState>>,
    Path((session_id, name)): Path<(String, String)>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let handle = session(&state, &session_id).await?;
    let files = read_files(multipart).await?;
    let settings = state.config.settings();
    let api = {
        let ctx = handle.lock().await;
        state
            .connector
            .connect(settings.document_endpoint(), ctx.api_key())
    };

    let summary = vector_dbs::upload_to_store(api.as_ref(), &settings, &name, &files).await?;
    Ok(Json(summary))
}

pub async fn select_vector_dbs(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(payload): Json<SelectionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = session(&state, &session_id).await?;
    let mut ctx = handle.lock().await;
    vector_dbs::select_stores(&mut ctx, payload.names);
    Ok(Json(json!({ "selection": ctx.vector_db_selection })))
}
