use serde::Serialize;
use serde_json::Value;

use super::naming::{self, VectorStoreDescriptor};
use super::probe::{self, DocumentProbe};
use crate::core::config::PanelSettings;
use crate::core::errors::ApiError;
use crate::ingest::{vector_io_provider, UploadedFile};
use crate::session::{Flash, FlashLevel, SessionContext};
use crate::stack::{RegisterVectorDb, StackApi};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StoreEntry {
    #[serde(flatten)]
    pub descriptor: VectorStoreDescriptor,
    pub record: Value,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StoreView {
    #[serde(flatten)]
    pub entry: StoreEntry,
    /// set once, right after the store was created in this session
    pub newly_created: bool,
    pub flash: Option<Flash>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UploadSummary {
    pub vector_db_id: String,
    pub documents: Vec<String>,
    pub message: String,
}

pub async fn list_stores(
    api: &dyn StackApi,
    settings: &PanelSettings,
) -> Result<Vec<StoreEntry>, ApiError> {
    let records = api.list_vector_dbs().await?;
    Ok(records
        .into_iter()
        .map(|record| StoreEntry {
            descriptor: naming::describe(&record, &settings.vector_db.unnamed_label),
            record,
        })
        .collect())
}

async fn find_store(
    api: &dyn StackApi,
    settings: &PanelSettings,
    name: &str,
) -> Result<StoreEntry, ApiError> {
    list_stores(api, settings)
        .await?
        .into_iter()
        .find(|entry| entry.descriptor.display_name == name)
        .ok_or_else(|| ApiError::NotFound(format!("Vector database '{}' not found", name)))
}

/// Registers a store named `name` with the configured embedding settings.
pub async fn create_store(
    ctx: &mut SessionContext,
    api: &dyn StackApi,
    settings: &PanelSettings,
    name: &str,
) -> Result<VectorStoreDescriptor, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest(
            "Vector database name cannot be empty.".to_string(),
        ));
    }

    let label = &settings.vector_db.unnamed_label;
    let records = api.list_vector_dbs().await?;
    if records
        .iter()
        .any(|record| naming::display_name(record, label) == name)
    {
        return Err(ApiError::Conflict(format!(
            "Vector database '{}' already exists. Please choose a different name.",
            name
        )));
    }

    let providers = api.list_providers().await?;
    let provider_id = vector_io_provider(&providers).ok_or_else(|| {
        ApiError::BadRequest(
            "No vector IO provider found. Cannot create vector database.".to_string(),
        )
    })?;

    let request = RegisterVectorDb {
        vector_db_id: name.to_string(),
        embedding_model: settings.vector_db.embedding_model.clone(),
        embedding_dimension: settings.vector_db.embedding_dimension,
        provider_id: Some(provider_id),
    };
    let record = api.register_vector_db(&request).await.map_err(|err| {
        ApiError::BadGateway(format!("Error creating vector database: {}", err))
    })?;

    tracing::info!("Created vector database {}", name);
    ctx.set_flash(
        FlashLevel::Success,
        format!("Vector database '{}' created successfully!", name),
    );
    ctx.newly_created_db = Some(name.to_string());

    let identifier = match &record {
        Value::Object(_) => naming::store_identifier(&record),
        _ => name.to_string(),
    };
    Ok(VectorStoreDescriptor {
        identifier,
        display_name: name.to_string(),
    })
}

/// Details of one store. Consumes the pending flash and the newly-created
/// marker when they refer to it.
pub async fn store_details(
    ctx: &mut SessionContext,
    api: &dyn StackApi,
    settings: &PanelSettings,
    name: &str,
) -> Result<StoreView, ApiError> {
    let entry = find_store(api, settings, name).await?;
    let newly_created = ctx.newly_created_db.as_deref() == Some(name);
    if newly_created {
        ctx.newly_created_db = None;
    }
    Ok(StoreView {
        entry,
        newly_created,
        flash: ctx.take_flash(),
    })
}

/// Adds files to an existing store, addressed by display name.
pub async fn upload_to_store(
    api: &dyn StackApi,
    settings: &PanelSettings,
    name: &str,
    files: &[UploadedFile],
) -> Result<UploadSummary, ApiError> {
    if files.is_empty() {
        return Err(ApiError::BadRequest("No files selected for upload.".to_string()));
    }

    let records = api.list_vector_dbs().await?;
    let vector_db_id = store_id_for(&records, settings, name);

    let documents: Vec<_> = files.iter().map(UploadedFile::to_bare_document).collect();
    api.insert_documents(
        &vector_db_id,
        &documents,
        settings.vector_db.chunk_size_tokens,
    )
    .await
    .map_err(|err| ApiError::BadGateway(format!("Error uploading documents: {}", err)))?;

    tracing::info!("Uploaded {} documents to {}", documents.len(), vector_db_id);
    Ok(UploadSummary {
        vector_db_id,
        message: format!(
            "Successfully uploaded {} document(s) to '{}'!",
            documents.len(),
            name
        ),
        documents: documents.into_iter().map(|d| d.document_id).collect(),
    })
}

pub async fn probe_store_documents(
    api: &dyn StackApi,
    settings: &PanelSettings,
    name: &str,
) -> Result<DocumentProbe, ApiError> {
    let records = api.list_vector_dbs().await?;
    let vector_db_id = store_id_for(&records, settings, name);
    Ok(probe::probe_documents(api, &vector_db_id, &settings.vector_db.probe_queries).await)
}

/// Identifier behind a display name; unknown names are passed through as ids.
fn store_id_for(records: &[Value], settings: &PanelSettings, name: &str) -> String {
    naming::find_by_display_name(records, name, &settings.vector_db.unnamed_label)
        .map(naming::store_identifier)
        .unwrap_or_else(|| name.to_string())
}
