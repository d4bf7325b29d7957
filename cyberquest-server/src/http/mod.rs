//! HTTP server module

mod api;
mod catalog;
mod progress;

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::middleware::{AuthLayer, auth_middleware};
use crate::state::AppState;

pub use api::HealthResponse;
pub use progress::{CheckProgressResponse, SubmitProgressRequest};

/// Error payload returned by every failing endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

fn error_response(status: StatusCode, error: impl Into<String>, code: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.to_string(),
        }),
    )
        .into_response()
}

fn unauthorized() -> Response {
    error_response(StatusCode::UNAUTHORIZED, "Unauthorized", "UNAUTHORIZED")
}

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>, auth: AuthLayer) -> Router {
    Router::new()
        .route("/api/health", get(api::health))
        .route("/api/check-progress", get(progress::check_progress))
        .route(
            "/api/activities/:id/progress",
            post(progress::submit_activity),
        )
        .route("/api/activities/:id", get(catalog::get_activity))
        .route("/api/levels/:id", get(catalog::get_level))
        .layer(axum::middleware::from_fn(auth_middleware))
        .layer(Extension(auth))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
