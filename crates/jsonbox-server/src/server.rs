use std::sync::Arc;

use jsonbox_store::{DocumentStore, FileDocumentStore};
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::AppState;
use crate::router::build_router;

/// jsonbox HTTP server.
pub struct JsonboxServer {
    config: ServerConfig,
    store: Arc<dyn DocumentStore>,
}

impl JsonboxServer {
    /// Open the file store described by `config`.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let store = FileDocumentStore::open(&config.storage_root, config.max_total_bytes)?;
        Ok(Self::with_store(config, Arc::new(store)))
    }

    /// Serve an already constructed store.
    pub fn with_store(config: ServerConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(AppState::new(Arc::clone(&self.store)), &self.config.cors_origins)
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            root = %self.config.storage_root.display(),
            limit_bytes = self.config.max_total_bytes,
            "jsonbox server listening on {}",
            self.config.bind_addr
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
