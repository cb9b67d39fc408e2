//! Vector DB inspector: naming, creation, uploads and the document probe.

pub mod inspector;
pub mod naming;
pub mod probe;

pub use inspector::{
    create_store, list_stores, probe_store_documents, store_details, upload_to_store, StoreEntry,
    StoreView, UploadSummary,
};
pub use naming::{display_name, is_machine_generated, resolve_ids, VectorStoreDescriptor};
pub use probe::{filename_hint, DocumentProbe};

use crate::session::SessionContext;

/// Chat store selection by display name. `None` restores auto-selection of
/// every listed store.
pub fn select_stores(ctx: &mut SessionContext, names: Option<Vec<String>>) {
    ctx.vector_db_selection = names.map(|names| {
        names
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect()
    });
}
