//! cyberquest-server - HTTP API for the cyberquest learning backend
//!
//! This crate owns the axum router, the shared [`AppState`] around the
//! progress engine, and the identity-resolution middleware. Browsers (or
//! any client behind the identity-aware proxy) talk to it directly.

mod error;
pub mod http;
pub mod middleware;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use cyberquest_core::{AccessConfig, ProgressService, SqliteProgressStore};
use tokio::net::TcpListener;

pub use error::ServerError;
pub use http::create_router;
pub use middleware::{AuthLayer, auth_middleware};
pub use state::AppState;

/// The main cyberquest server
pub struct CyberquestServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl CyberquestServer {
    /// Create a new server, opening the progress database at the
    /// configured path
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let store = Arc::new(SqliteProgressStore::open(&config.db_path)?);
        let state = Arc::new(AppState::new(Arc::new(ProgressService::new(store))));
        Ok(Self { config, state })
    }

    /// Create a server with custom state (for testing)
    pub fn with_state(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the shared application state
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Run the server, binding to the configured address
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.clone(),
                source: e,
            })?;

        tracing::info!("cyberquest server listening on {}", addr);

        let router = create_router(self.state, AuthLayer::new(self.config.access));
        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Path of the SQLite progress database
    pub db_path: PathBuf,
    /// Identity-forwarding headers
    pub access: AccessConfig,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7461,
            db_path: PathBuf::from("cyberquest.db"),
            access: AccessConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "127.0.0.1:7461");
    }

    #[test]
    fn test_server_opens_store_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            db_path: dir.path().join("progress.db"),
            ..Default::default()
        };
        let server = CyberquestServer::new(config).unwrap();
        assert!(
            server
                .state()
                .progress
                .user_by_subject("nobody")
                .unwrap()
                .is_none()
        );
    }
}
