//! Authentication middleware for axum
//!
//! Authentication itself happens upstream: an identity-aware proxy
//! validates the session and forwards the resolved subject in a header.
//! This middleware turns those headers into an [`AuthContext`] request
//! extension; handlers that require identity reject anonymous contexts.

use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};
use cyberquest_core::{AccessConfig, AccessIdentity, AuthContext};

/// Authentication layer state
#[derive(Clone)]
pub struct AuthLayer {
    config: AccessConfig,
}

impl AuthLayer {
    /// Create a new AuthLayer with the given configuration
    pub fn new(config: AccessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AccessConfig {
        &self.config
    }
}

impl Default for AuthLayer {
    fn default() -> Self {
        Self::new(AccessConfig::default())
    }
}

/// Resolve the caller identity from the forwarded headers
fn resolve_identity(config: &AccessConfig, headers: &HeaderMap) -> AuthContext {
    let subject = headers
        .get(&config.subject_header)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    match subject {
        Some(subject) => {
            let name = headers
                .get(&config.name_header)
                .and_then(|value| value.to_str().ok())
                .map(|value| value.to_string());
            AuthContext::Authenticated {
                identity: AccessIdentity {
                    subject: subject.to_string(),
                    name,
                },
            }
        }
        None => AuthContext::Anonymous,
    }
}

/// Authentication middleware function
pub async fn auth_middleware(
    axum::Extension(auth_layer): axum::Extension<AuthLayer>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_context = resolve_identity(&auth_layer.config, request.headers());

    if !auth_context.is_authenticated() {
        tracing::debug!("no identity forwarded with request");
    }

    // Attach auth context to request extensions
    request.extensions_mut().insert(auth_context);

    next.run(request).await
}
