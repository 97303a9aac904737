use std::sync::Arc;

use chirp_store::RecordStore;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;

/// Chirp HTTP server.
pub struct ChirpServer {
    config: ServerConfig,
    store: Arc<dyn RecordStore>,
}

impl ChirpServer {
    /// Open the configured store and prepare a server around it.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let store = config.open_store()?;
        Ok(Self { config, store })
    }

    /// Serve an already-opened store.
    pub fn with_store(config: ServerConfig, store: Arc<dyn RecordStore>) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<dyn RecordStore> {
        Arc::clone(&self.store)
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.store())
    }

    /// Start serving requests until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("Chirp server listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chirp_store::InMemoryRecordStore;

    #[test]
    fn server_construction() {
        let server = ChirpServer::new(ServerConfig::default()).unwrap();
        assert_eq!(server.config().bind_addr, "127.0.0.1:3001".parse().unwrap());
        assert_eq!(server.store().user_count().unwrap(), 0);
    }

    #[test]
    fn router_shares_the_store() {
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());
        let server = ChirpServer::with_store(ServerConfig::default(), Arc::clone(&store));
        let _router = server.router();
        store.create_user("alice").unwrap();
        assert_eq!(server.store().user_count().unwrap(), 1);
    }
}
