//! Shared application state for the cyberquest server

use std::sync::Arc;

use chrono::{DateTime, Utc};
use cyberquest_core::{ProgressError, ProgressService, SqliteProgressStore};

/// Shared application state accessible by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Progress engine over the SQLite store
    pub progress: Arc<ProgressService<SqliteProgressStore>>,
    /// When the server started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create state around an existing progress service
    pub fn new(progress: Arc<ProgressService<SqliteProgressStore>>) -> Self {
        Self {
            progress,
            started_at: Utc::now(),
        }
    }

    /// Create state over an in-memory store (for testing and demos)
    pub fn in_memory() -> Result<Self, ProgressError> {
        let store = Arc::new(SqliteProgressStore::open_in_memory()?);
        Ok(Self::new(Arc::new(ProgressService::new(store))))
    }

    /// Returns how long the server has been running
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
