//! Caller identity resolved from the upstream identity provider
//!
//! Authentication itself is delegated to an identity-aware proxy in front
//! of the server; this module only models what the proxy forwards.

mod config;
mod context;

pub use config::AccessConfig;
pub use context::{AccessIdentity, AuthContext};
