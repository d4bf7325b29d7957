//! Cyberquest serve command
//!
//! Runs the HTTP API server over the learner-progress database. The
//! server expects an identity-aware proxy in front of it forwarding the
//! caller subject; see the `--subject-header` flag.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use cyberquest_core::AccessConfig;
use cyberquest_server::{CyberquestServer, ServerConfig};
use tracing::info;

/// Default port for the cyberquest server
pub const DEFAULT_PORT: u16 = 7461;
/// Default host for the cyberquest server
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Path of the SQLite progress database (defaults to the platform
    /// data directory)
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Header the upstream proxy uses to forward the caller subject
    #[arg(long, default_value = "x-auth-subject")]
    pub subject_header: String,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let db_path = match args.db {
        Some(path) => path,
        None => default_db_path()?,
    };

    let config = ServerConfig {
        host: args.host,
        port: args.port,
        db_path,
        access: AccessConfig {
            subject_header: args.subject_header,
            ..Default::default()
        },
    };

    info!(
        "Starting cyberquest server on {}:{} (db: {})",
        config.host,
        config.port,
        config.db_path.display()
    );

    let server = CyberquestServer::new(config)?;
    server.run().await.map_err(Into::into)
}

/// Resolve the default database path inside the platform data directory
fn default_db_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .context("could not determine data directory")?
        .join("cyberquest");
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;
    Ok(data_dir.join("progress.db"))
}
