use axum::extract::Multipart;

use crate::core::errors::ApiError;
use crate::ingest::UploadedFile;
use crate::session::SessionHandle;
use crate::state::AppState;

pub async fn session(state: &AppState, session_id: &str) -> Result<SessionHandle, ApiError> {
    state.sessions.get(session_id).await
}

/// Collects every file part of a multipart body. Parts without a filename
/// are form fields and are skipped.
pub async fn read_files(mut multipart: Multipart) -> Result<Vec<UploadedFile>, ApiError> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {}", e)))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed to read {}: {}", filename, e)))?;
        files.push(UploadedFile::new(filename, content_type, bytes.to_vec()));
    }
    Ok(files)
}
