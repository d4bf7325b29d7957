//! End-to-end tests for the progress API: submissions, reconciliation,
//! and the catalog reads

mod common;

use common::create_test_fixture;
use serde_json::{Value, json};

const SUBJECT: &str = "learner-1";

#[tokio::test]
async fn submit_without_identity_is_unauthorized() {
    let fx = create_test_fixture();

    let response = fx
        .server
        .post(&format!("/api/activities/{}/progress", fx.quiz_id))
        .json(&json!({"isCompleted": true, "pointsEarned": 30}))
        .await;
    response.assert_status_unauthorized();

    let body: Value = response.json();
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn check_progress_without_identity_is_unauthorized() {
    let fx = create_test_fixture();

    let response = fx.server.get("/api/check-progress").await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn submit_with_unknown_subject_is_not_found() {
    let fx = create_test_fixture();

    let response = fx
        .server
        .post(&format!("/api/activities/{}/progress", fx.quiz_id))
        .add_header("x-auth-subject", "stranger")
        .json(&json!({"isCompleted": true, "pointsEarned": 30}))
        .await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn submit_with_malformed_body_is_bad_request() {
    let fx = create_test_fixture();

    let response = fx
        .server
        .post(&format!("/api/activities/{}/progress", fx.quiz_id))
        .add_header("x-auth-subject", SUBJECT)
        .json(&json!({"isCompleted": "yes"}))
        .await;
    response.assert_status_bad_request();

    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_BODY");

    // negative points must be rejected, not silently accepted
    let response = fx
        .server
        .post(&format!("/api/activities/{}/progress", fx.quiz_id))
        .add_header("x-auth-subject", SUBJECT)
        .json(&json!({"isCompleted": true, "pointsEarned": -5}))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn submit_to_unknown_activity_is_not_found() {
    let fx = create_test_fixture();

    let response = fx
        .server
        .post("/api/activities/9999/progress")
        .add_header("x-auth-subject", SUBJECT)
        .json(&json!({"isCompleted": true, "pointsEarned": 10}))
        .await;
    response.assert_status_not_found();

    let body: Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn submission_returns_updated_activity_progress() {
    let fx = create_test_fixture();

    let response = fx
        .server
        .post(&format!("/api/activities/{}/progress", fx.quiz_id))
        .add_header("x-auth-subject", SUBJECT)
        .json(&json!({"isCompleted": true, "pointsEarned": 30}))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["isCompleted"], true);
    assert_eq!(body["pointsEarned"], 30);
    assert_eq!(body["attempts"], 1);

    // resubmission overwrites and counts another attempt
    let response = fx
        .server
        .post(&format!("/api/activities/{}/progress", fx.quiz_id))
        .add_header("x-auth-subject", SUBJECT)
        .json(&json!({"isCompleted": true, "pointsEarned": 25}))
        .await;
    let body: Value = response.json();
    assert_eq!(body["pointsEarned"], 25);
    assert_eq!(body["attempts"], 2);
}

#[tokio::test]
async fn completing_the_level_advances_the_learner() {
    let fx = create_test_fixture();

    // 30 of 100 needed: level still open
    fx.server
        .post(&format!("/api/activities/{}/progress", fx.quiz_id))
        .add_header("x-auth-subject", SUBJECT)
        .json(&json!({"isCompleted": true, "pointsEarned": 30}))
        .await
        .assert_status_ok();

    let progress = fx
        .state
        .progress
        .level_progress(fx.user_id, fx.level_id)
        .unwrap()
        .unwrap();
    assert_eq!(progress.points_earned, 30);
    assert!(!progress.is_completed);

    // 70 more crosses the gate
    fx.server
        .post(&format!("/api/activities/{}/progress", fx.lab_id))
        .add_header("x-auth-subject", SUBJECT)
        .json(&json!({"isCompleted": true, "pointsEarned": 70}))
        .await
        .assert_status_ok();

    let progress = fx
        .state
        .progress
        .level_progress(fx.user_id, fx.level_id)
        .unwrap()
        .unwrap();
    assert_eq!(progress.points_earned, 100);
    assert!(progress.is_completed);

    let user = fx.state.progress.user_by_subject(SUBJECT).unwrap().unwrap();
    assert_eq!(user.current_level, 2);
    assert_eq!(user.total_points, 100);

    // a follow-up reconcile has nothing left to fix
    let response = fx
        .server
        .get("/api/check-progress")
        .add_header("x-auth-subject", SUBJECT)
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Fixed 0 issues");
    assert_eq!(body["levelProgressUpdated"], false);
    assert!(body["fixedIssues"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn check_progress_repairs_zero_point_completions() {
    let fx = create_test_fixture();

    // a lab finished with no score recorded: the classic anomaly
    fx.server
        .post(&format!("/api/activities/{}/progress", fx.lab_id))
        .add_header("x-auth-subject", SUBJECT)
        .json(&json!({"isCompleted": true, "pointsEarned": 0}))
        .await
        .assert_status_ok();

    let response = fx
        .server
        .get("/api/check-progress")
        .add_header("x-auth-subject", SUBJECT)
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    let fixes = body["fixedIssues"].as_array().unwrap();
    assert!(!fixes.is_empty());
    assert!(fixes.iter().any(|fix| {
        fix["kind"] == "activity_points_repaired" && fix["newPoints"] == 49 // round(0.7 * 70)
    }));

    // a second pass is clean: the reconciler is idempotent
    let response = fx
        .server
        .get("/api/check-progress")
        .add_header("x-auth-subject", SUBJECT)
        .await;
    let body: Value = response.json();
    assert_eq!(body["message"], "Fixed 0 issues");
    assert!(body["fixedIssues"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn get_level_returns_ordered_activities() {
    let fx = create_test_fixture();

    let response = fx.server.get(&format!("/api/levels/{}", fx.level_id)).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["name"], "Security Fundamentals");
    assert_eq!(body["minPointsToPass"], 100);

    let activities = body["activities"].as_array().unwrap();
    assert_eq!(activities.len(), 2);
    assert_eq!(activities[0]["name"], "CIA Triad Quiz");
    assert_eq!(activities[0]["type"], "quiz");
    assert_eq!(activities[1]["name"], "Phishing Lab");
}

#[tokio::test]
async fn get_level_validates_id() {
    let fx = create_test_fixture();

    let response = fx.server.get("/api/levels/abc").await;
    response.assert_status_bad_request();

    let response = fx.server.get("/api/levels/9999").await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn get_activity_returns_activity() {
    let fx = create_test_fixture();

    let response = fx
        .server
        .get(&format!("/api/activities/{}", fx.quiz_id))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["name"], "CIA Triad Quiz");
    assert_eq!(body["points"], 30);
    assert!(body["content"]["questions"].is_array());

    let response = fx.server.get("/api/activities/abc").await;
    response.assert_status_bad_request();

    let response = fx.server.get("/api/activities/9999").await;
    response.assert_status_not_found();
}
