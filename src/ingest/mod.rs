//! Document ingestion: uploaded files become data-URI documents inserted
//! into a vector DB that is registered on first use.

pub mod document;
pub mod error;
pub mod pipeline;

pub use document::{decode_data_uri, encode_data_uri, guess_mime, UploadedFile};
pub use error::IngestError;
pub use pipeline::{
    ensure_store, ingest, status, test_connection, vector_io_provider, ConnectionReport,
    IngestionReport, StoreDetails, UploadStatus,
};
