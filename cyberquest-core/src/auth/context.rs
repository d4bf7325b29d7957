//! Auth context attached to each request

use serde::{Deserialize, Serialize};

/// Identity forwarded by the identity-aware proxy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessIdentity {
    /// Stable subject identifier assigned by the identity provider
    pub subject: String,
    /// Display name, when the proxy forwards one
    pub name: Option<String>,
}

/// Authentication context for a single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    /// Request carried a resolved identity
    Authenticated { identity: AccessIdentity },
    /// No identity was forwarded with the request
    Anonymous,
}

impl AuthContext {
    /// The caller's subject, if any identity was resolved
    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::Authenticated { identity } => Some(&identity.subject),
            Self::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}
