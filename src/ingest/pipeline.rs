use serde::Serialize;

use super::document::UploadedFile;
use super::error::IngestError;
use crate::core::config::settings::VectorDbSettings;
use crate::stack::{ProviderRecord, RegisterVectorDb, StackApi, StackError};
use crate::vector_dbs::naming;

const VECTOR_IO_API: &str = "vector_io";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IngestionReport {
    pub files: usize,
    pub document_ids: Vec<String>,
    pub vector_db_name: String,
    pub vector_db_id: String,
    /// false when the store already existed
    pub store_created: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StoreDetails {
    pub database_id: String,
    pub embedding_model: String,
    pub embedding_dimension: u32,
    pub chunk_size: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UploadStatus {
    pub endpoint: String,
    pub default_store: Option<StoreDetails>,
    pub stores: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConnectionReport {
    pub endpoint: String,
    pub models_available: usize,
    pub vector_provider: Option<String>,
}

/// First provider advertising the vector IO API.
pub fn vector_io_provider(providers: &[ProviderRecord]) -> Option<String> {
    providers
        .iter()
        .find(|p| p.api == VECTOR_IO_API)
        .map(|p| p.provider_id.clone())
}

/// Registers `target` unless it is already listed. A registration rejected
/// with "already exists" counts as reused; any other failure aborts.
pub async fn ensure_store(
    api: &dyn StackApi,
    settings: &VectorDbSettings,
    target: &str,
) -> Result<bool, IngestError> {
    match api.list_vector_dbs().await {
        Ok(records) if naming::store_exists(&records, target, &settings.unnamed_label) => {
            tracing::debug!("Vector database {} already registered", target);
            return Ok(false);
        }
        Ok(_) => {}
        Err(err) => tracing::warn!("Listing vector databases failed, registering blind: {}", err),
    }

    let provider_id = match api.list_providers().await {
        Ok(providers) => vector_io_provider(&providers),
        Err(err) => {
            tracing::warn!("Listing providers failed: {}", err);
            None
        }
    };

    let request = RegisterVectorDb {
        vector_db_id: target.to_string(),
        embedding_model: settings.embedding_model.clone(),
        embedding_dimension: settings.embedding_dimension,
        provider_id,
    };
    match api.register_vector_db(&request).await {
        Ok(_) => {
            tracing::info!("Registered vector database {}", target);
            Ok(true)
        }
        Err(err) if err.is_already_exists() => {
            tracing::debug!("Vector database {} already exists: {}", target, err);
            Ok(false)
        }
        Err(source) => Err(IngestError::Registration {
            name: target.to_string(),
            source,
        }),
    }
}

/// Create-if-absent followed by one batched insert. Not transactional: a
/// failed insert leaves the store registered, and re-running inserts the
/// documents again.
pub async fn ingest(
    api: &dyn StackApi,
    settings: &VectorDbSettings,
    files: &[UploadedFile],
    target: &str,
) -> Result<IngestionReport, IngestError> {
    if files.is_empty() {
        return Err(IngestError::NoFiles);
    }
    let documents: Vec<_> = files.iter().map(UploadedFile::to_document).collect();

    let store_created = ensure_store(api, settings, target).await?;

    let vector_db_id = match api.list_vector_dbs().await {
        Ok(records) => naming::find_store_id(&records, target),
        Err(err) => {
            tracing::warn!("Could not resolve id of {}, using the name: {}", target, err);
            target.to_string()
        }
    };

    api.insert_documents(&vector_db_id, &documents, settings.chunk_size_tokens)
        .await
        .map_err(|source| IngestError::Insert {
            vector_db_id: vector_db_id.clone(),
            source,
        })?;
    tracing::info!("Inserted {} documents into {}", documents.len(), vector_db_id);

    Ok(IngestionReport {
        files: files.len(),
        document_ids: documents.into_iter().map(|d| d.document_id).collect(),
        vector_db_name: target.to_string(),
        vector_db_id,
        store_created,
    })
}

pub async fn status(
    api: &dyn StackApi,
    settings: &VectorDbSettings,
) -> Result<UploadStatus, StackError> {
    let records = api.list_vector_dbs().await?;
    let target = &settings.default_name;

    let default_store = records
        .iter()
        .find(|record| {
            naming::store_identifier(record) == *target
                || naming::display_name(record, &settings.unnamed_label) == *target
        })
        .map(|record| StoreDetails {
            database_id: naming::store_identifier(record),
            embedding_model: settings.embedding_model.clone(),
            embedding_dimension: settings.embedding_dimension,
            chunk_size: settings.chunk_size_tokens,
        });

    Ok(UploadStatus {
        endpoint: api.endpoint().to_string(),
        default_store,
        stores: records.iter().map(naming::store_identifier).collect(),
    })
}

pub async fn test_connection(api: &dyn StackApi) -> Result<ConnectionReport, StackError> {
    let models = api.list_models().await?;
    let providers = api.list_providers().await?;
    Ok(ConnectionReport {
        endpoint: api.endpoint().to_string(),
        models_available: models.len(),
        vector_provider: vector_io_provider(&providers),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::fake::FakeStack;
    use serde_json::json;

    fn files() -> Vec<UploadedFile> {
        vec![
            UploadedFile::new("a.txt", Some("text/plain".to_string()), b"alpha".to_vec()),
            UploadedFile::new("b.pdf", None, b"%PDF-1.4".to_vec()),
        ]
    }

    #[tokio::test]
    async fn repeated_ingest_reuses_store_and_duplicates_documents() {
        let stack = FakeStack::new("http://good:8321");
        let settings = VectorDbSettings::default();

        let first = ingest(stack.as_ref(), &settings, &files(), "demo-vector-db")
            .await
            .unwrap();
        let second = ingest(stack.as_ref(), &settings, &files(), "demo-vector-db")
            .await
            .unwrap();

        assert!(first.store_created);
        assert!(!second.store_created);
        let state = stack.state.lock().unwrap();
        assert_eq!(state.vector_dbs.len(), 1);
        assert_eq!(state.inserted.len(), 4);
        assert_eq!(state.register_calls, 1);
    }

    #[tokio::test]
    async fn ingest_targets_exact_store_among_similar_ids() {
        let stack = FakeStack::new("http://good:8321")
            .with_vector_db(json!({ "identifier": "demo-vector-db-archive" }))
            .with_vector_db(json!({ "identifier": "demo-vector-db" }));

        let report = ingest(
            stack.as_ref(),
            &VectorDbSettings::default(),
            &files(),
            "demo-vector-db",
        )
        .await
        .unwrap();

        assert!(!report.store_created);
        assert_eq!(report.vector_db_id, "demo-vector-db");
        let state = stack.state.lock().unwrap();
        assert_eq!(state.register_calls, 0);
        assert!(state.inserted.iter().all(|(id, _)| id == "demo-vector-db"));
    }

    #[tokio::test]
    async fn registration_uses_vector_io_provider_and_defaults() {
        let stack = FakeStack::new("http://good:8321");
        ingest(
            stack.as_ref(),
            &VectorDbSettings::default(),
            &files(),
            "demo-vector-db",
        )
        .await
        .unwrap();

        let state = stack.state.lock().unwrap();
        let record = &state.vector_dbs[0];
        assert_eq!(record["provider_id"], "faiss");
        assert_eq!(record["embedding_model"], "all-MiniLM-L6-v2");
        assert_eq!(record["embedding_dimension"], 384);
        let (db_id, doc) = &state.inserted[0];
        assert_eq!(db_id, "demo-vector-db");
        assert_eq!(doc.metadata["type"], "uploaded_file");
    }

    #[tokio::test]
    async fn already_exists_error_is_swallowed() {
        let stack = FakeStack::new("http://good:8321");
        stack.state.lock().unwrap().register_error = Some(StackError::Status {
            status: 400,
            body: "Vector DB demo-vector-db ALREADY EXISTS".to_string(),
        });

        let report = ingest(
            stack.as_ref(),
            &VectorDbSettings::default(),
            &files(),
            "demo-vector-db",
        )
        .await
        .unwrap();

        assert!(!report.store_created);
        assert_eq!(stack.state.lock().unwrap().inserted.len(), 2);
    }

    #[tokio::test]
    async fn other_registration_errors_abort_before_insert() {
        let stack = FakeStack::new("http://good:8321");
        stack.state.lock().unwrap().register_error = Some(StackError::Status {
            status: 500,
            body: "provider offline".to_string(),
        });

        let err = ingest(
            stack.as_ref(),
            &VectorDbSettings::default(),
            &files(),
            "demo-vector-db",
        )
        .await
        .unwrap_err();

        assert!(matches!(err, IngestError::Registration { .. }));
        assert!(stack.state.lock().unwrap().inserted.is_empty());
    }

    #[tokio::test]
    async fn inserts_into_resolved_identifier() {
        let stack = FakeStack::new("http://good:8321").with_vector_db(json!({
            "identifier": "vs_0123456789abcdef01234567",
            "vector_db_name": "demo-vector-db"
        }));

        let report = ingest(
            stack.as_ref(),
            &VectorDbSettings::default(),
            &files(),
            "demo-vector-db",
        )
        .await
        .unwrap();

        assert_eq!(report.vector_db_id, "vs_0123456789abcdef01234567");
        assert_eq!(stack.state.lock().unwrap().register_calls, 0);
    }

    #[tokio::test]
    async fn empty_upload_is_rejected() {
        let stack = FakeStack::new("http://good:8321");
        let err = ingest(stack.as_ref(), &VectorDbSettings::default(), &[], "demo-vector-db")
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::NoFiles));
    }

    #[tokio::test]
    async fn status_and_connection_report() {
        let stack = FakeStack::new("http://good:8321")
            .with_llm_models(&["m1", "m2"])
            .with_vector_db(json!({ "identifier": "demo-vector-db" }))
            .with_vector_db(json!({ "identifier": "other" }));

        let status = status(stack.as_ref(), &VectorDbSettings::default()).await.unwrap();
        assert_eq!(status.default_store.unwrap().chunk_size, 512);
        assert_eq!(status.stores, vec!["demo-vector-db", "other"]);

        let report = test_connection(stack.as_ref()).await.unwrap();
        assert_eq!(report.models_available, 2);
        assert_eq!(report.vector_provider.as_deref(), Some("faiss"));
    }
}
