use std::sync::Arc;

use crate::core::config::{AppPaths, ConfigService};
use crate::session::SessionStore;
use crate::stack::{HttpConnector, StackConnector};

pub mod error;

use error::InitializationError;

/// Shared state behind every route.
///
/// Holds the configuration, the in-memory panel sessions and the connector
/// used to reach LlamaStack endpoints.
#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub config: ConfigService,
    pub sessions: SessionStore,
    pub connector: Arc<dyn StackConnector>,
}

impl AppState {
    /// Checks that the configuration on disk is valid and builds the HTTP
    /// connector.
    pub async fn initialize(paths: Arc<AppPaths>) -> Result<Arc<Self>, InitializationError> {
        let config = ConfigService::new(paths.clone());

        let settings = config
            .check()
            .map_err(|e| InitializationError::Config(e.into()))?;
        tracing::info!(
            "Default endpoint {} (model {}), document endpoint {}",
            settings.endpoint.url,
            settings.endpoint.model,
            settings.document_endpoint()
        );

        let connector =
            HttpConnector::new().map_err(|e| InitializationError::HttpClient(e.into()))?;

        Ok(Arc::new(Self::with_connector(paths, config, Arc::new(connector))))
    }

    pub fn with_connector(
        paths: Arc<AppPaths>,
        config: ConfigService,
        connector: Arc<dyn StackConnector>,
    ) -> Self {
        AppState {
            paths,
            config,
            sessions: SessionStore::new(),
            connector,
        }
    }
}
