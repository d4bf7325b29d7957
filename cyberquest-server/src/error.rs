//! Server error types

use thiserror::Error;

/// Errors that can occur in the cyberquest server
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified address
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to open or migrate the progress database
    #[error("storage error: {0}")]
    Storage(#[from] cyberquest_core::ProgressError),

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}
