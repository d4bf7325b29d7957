//! Level and activity catalog endpoints (read-only)

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::error_response;
use crate::state::AppState;

/// GET /api/levels/:id
pub async fn get_level(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let Ok(level_id) = id.parse::<i64>() else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid level ID", "INVALID_ID");
    };

    match state.progress.level_detail(level_id) {
        Ok(Some(detail)) => Json(detail).into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            format!("Level not found: {}", level_id),
            "NOT_FOUND",
        ),
        Err(e) => {
            tracing::error!("failed to fetch level: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
                "INTERNAL_ERROR",
            )
        }
    }
}

/// GET /api/activities/:id
pub async fn get_activity(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let Ok(activity_id) = id.parse::<i64>() else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid activity ID", "INVALID_ID");
    };

    match state.progress.activity(activity_id) {
        Ok(Some(activity)) => Json(activity).into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            format!("Activity not found: {}", activity_id),
            "NOT_FOUND",
        ),
        Err(e) => {
            tracing::error!("failed to fetch activity: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
                "INTERNAL_ERROR",
            )
        }
    }
}
