//! Model registry fetcher: lists models from an endpoint and normalizes the
//! heterogeneous records into [`ModelDescriptor`]s.

pub mod inspector;
pub mod registry;
pub mod types;

pub use inspector::{inspect, InspectorStatus, ModelRow, ModelTable};
pub use registry::{describe, fetch_listing, list_models, normalize_identifier};
pub use types::{ModelDescriptor, ModelKind, ModelListing};
