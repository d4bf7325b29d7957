//! Progress REST API endpoints

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cyberquest_core::{ActivitySubmission, AuthContext, FixedIssue, ProgressError, User};
use serde::{Deserialize, Serialize};

use super::{error_response, unauthorized};
use crate::state::AppState;

/// Body of an activity submission
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitProgressRequest {
    pub is_completed: bool,
    pub points_earned: u32,
}

/// Response for the check-progress endpoint
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckProgressResponse {
    pub success: bool,
    pub message: String,
    pub fixed_issues: Vec<FixedIssue>,
    pub level_progress_updated: bool,
}

/// Resolve the calling learner, or the error response to return
fn require_user(
    state: &AppState,
    auth: Option<&Extension<AuthContext>>,
) -> Result<User, Response> {
    let Some(subject) = auth.and_then(|Extension(ctx)| ctx.subject()) else {
        return Err(unauthorized());
    };

    match state.progress.user_by_subject(subject) {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(error_response(
            StatusCode::NOT_FOUND,
            "User not found",
            "NOT_FOUND",
        )),
        Err(e) => {
            tracing::error!("failed to resolve user: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
                "INTERNAL_ERROR",
            ))
        }
    }
}

/// POST /api/activities/:id/progress
pub async fn submit_activity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    auth: Option<Extension<AuthContext>>,
    body: Result<Json<SubmitProgressRequest>, JsonRejection>,
) -> Response {
    let user = match require_user(&state, auth.as_ref()) {
        Ok(user) => user,
        Err(response) => return response,
    };

    let Ok(Json(body)) = body else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Invalid request body",
            "INVALID_BODY",
        );
    };

    let Ok(activity_id) = id.parse::<i64>() else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid activity ID", "INVALID_ID");
    };

    let submission = ActivitySubmission {
        is_completed: body.is_completed,
        points_earned: body.points_earned,
    };

    match state
        .progress
        .record_activity(user.id, activity_id, &submission)
    {
        Ok(outcome) => Json(outcome.progress).into_response(),
        Err(ProgressError::ActivityNotFound(_)) => error_response(
            StatusCode::NOT_FOUND,
            format!("Activity not found: {}", activity_id),
            "NOT_FOUND",
        ),
        Err(ProgressError::InvalidSubmission(reason)) => {
            error_response(StatusCode::BAD_REQUEST, reason, "INVALID_BODY")
        }
        Err(e) => {
            tracing::error!("failed to record submission: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
                "INTERNAL_ERROR",
            )
        }
    }
}

/// GET /api/check-progress
pub async fn check_progress(
    State(state): State<Arc<AppState>>,
    auth: Option<Extension<AuthContext>>,
) -> Response {
    let user = match require_user(&state, auth.as_ref()) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.progress.reconcile(user.id) {
        Ok(report) => Json(CheckProgressResponse {
            success: true,
            message: report.summary(),
            fixed_issues: report.fixed_issues,
            level_progress_updated: report.level_progress_updated,
        })
        .into_response(),
        Err(e) => {
            tracing::error!("reconciliation failed: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
                "INTERNAL_ERROR",
            )
        }
    }
}
