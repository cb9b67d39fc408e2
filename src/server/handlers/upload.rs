use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::response::IntoResponse;
use axum::Json;

use super::utils::{read_files, session};
use crate::core::errors::ApiError;
use crate::ingest;
use crate::state::AppState;

/// Ingests the uploaded files into the configured default vector DB.
pub async fn ingest_files(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
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

    let report = ingest::ingest(
        api.as_ref(),
        &settings.vector_db,
        &files,
        &settings.vector_db.default_name,
    )
    .await?;
    Ok(Json(report))
}

pub async fn upload_status(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let settings = state.config.settings();
    let api = state
        .connector
        .connect(settings.document_endpoint(), settings.api_key());
    let status = ingest::status(api.as_ref(), &settings.vector_db).await?;
    Ok(Json(status))
}

pub async fn test_connection(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let settings = state.config.settings();
    let api = state
        .connector
        .connect(settings.document_endpoint(), settings.api_key());
    let report = ingest::test_connection(api.as_ref()).await?;
    Ok(Json(report))
}
