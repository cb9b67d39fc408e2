use thiserror::Error;

use crate::core::errors::ApiError;
use crate::stack::StackError;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("No files selected for upload.")]
    NoFiles,
    #[error("Error registering vector database '{name}': {source}")]
    Registration { name: String, source: StackError },
    #[error("Error inserting documents into '{vector_db_id}': {source}")]
    Insert {
        vector_db_id: String,
        source: StackError,
    },
    #[error("invalid data URI: {0}")]
    InvalidDataUri(String),
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::NoFiles | IngestError::InvalidDataUri(_) => {
                ApiError::BadRequest(err.to_string())
            }
            IngestError::Registration { .. } | IngestError::Insert { .. } => {
                ApiError::BadGateway(err.to_string())
            }
        }
    }
}
