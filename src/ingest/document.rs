use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Map};

use super::error::IngestError;
use crate::stack::RagDocument;

const FALLBACK_MIME: &str = "application/octet-stream";

/// A file as received from the browser.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type,
            bytes,
        }
    }

    /// Declared content type, else a guess from the extension.
    pub fn mime_type(&self) -> String {
        self.content_type
            .as_deref()
            .map(str::trim)
            .filter(|ct| !ct.is_empty() && *ct != FALLBACK_MIME)
            .map(str::to_string)
            .unwrap_or_else(|| guess_mime(&self.filename).to_string())
    }

    pub fn data_uri(&self) -> String {
        encode_data_uri(&self.mime_type(), &self.bytes)
    }

    /// Document for the upload panel: id is the filename and the metadata
    /// records where it came from.
    pub fn to_document(&self) -> RagDocument {
        let mut metadata = Map::new();
        metadata.insert("source".to_string(), json!(self.filename));
        metadata.insert("type".to_string(), json!("uploaded_file"));
        RagDocument {
            document_id: self.filename.clone(),
            content: self.data_uri(),
            metadata,
        }
    }

    /// Document without metadata, as added from the vector DB inspector.
    pub fn to_bare_document(&self) -> RagDocument {
        RagDocument {
            document_id: self.filename.clone(),
            content: self.data_uri(),
            metadata: Map::new(),
        }
    }
}

pub fn guess_mime(filename: &str) -> &'static str {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        Some("md") => "text/markdown",
        Some("json") => "application/json",
        Some("yaml") | Some("yml") => "application/x-yaml",
        Some("html") | Some("htm") => "text/html",
        Some("csv") => "text/csv",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        _ => FALLBACK_MIME,
    }
}

pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Splits a `data:<mime>;base64,<payload>` URI into its mime type and bytes.
pub fn decode_data_uri(uri: &str) -> Result<(String, Vec<u8>), IngestError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| IngestError::InvalidDataUri("missing data: scheme".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| IngestError::InvalidDataUri("missing payload separator".to_string()))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| IngestError::InvalidDataUri("payload is not base64".to_string()))?;
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| IngestError::InvalidDataUri(e.to_string()))?;
    Ok((mime.to_string(), bytes))
}
