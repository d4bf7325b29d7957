//! Shared test utilities for cyberquest-server integration tests

use std::sync::Arc;

use axum_test::TestServer;
use cyberquest_core::{ActivityType, NewActivity, NewLevel, NewUser};
use cyberquest_server::{AppState, AuthLayer, create_router};

/// Seeded fixture: one learner on level 1 of a two-level curriculum
#[allow(dead_code)]
pub struct Fixture {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub user_id: i64,
    pub level_id: i64,
    pub quiz_id: i64,
    pub lab_id: i64,
}

/// Spins up a TestServer over an in-memory store with a seeded curriculum.
///
/// Level 1 requires 100 points and holds a 30-point quiz plus a 70-point
/// lab; level 2 exists so the current-level pointer has somewhere to go.
pub fn create_test_fixture() -> Fixture {
    let state = Arc::new(AppState::in_memory().unwrap());
    let progress = &state.progress;

    let user = progress
        .create_user(&NewUser {
            subject: "learner-1".into(),
            display_name: Some("Ada".into()),
        })
        .unwrap();

    let level = progress
        .create_level(&NewLevel {
            name: "Security Fundamentals".into(),
            description: "CIA triad and basic security principles".into(),
            order: 1,
            min_points_to_pass: 100,
        })
        .unwrap();
    progress
        .create_level(&NewLevel {
            name: "Network Security".into(),
            description: "Protocols, firewalls, packet analysis".into(),
            order: 2,
            min_points_to_pass: 120,
        })
        .unwrap();

    let quiz = progress
        .create_activity(&NewActivity {
            level_id: level.id,
            name: "CIA Triad Quiz".into(),
            description: String::new(),
            activity_type: ActivityType::Quiz,
            content: Some(serde_json::json!({
                "questions": [{
                    "question": "Which component keeps data accessible when needed?",
                    "options": ["Confidentiality", "Integrity", "Availability"],
                    "correctAnswer": "Availability"
                }]
            })),
            points: 30,
            order: 1,
            is_required: true,
        })
        .unwrap();
    let lab = progress
        .create_activity(&NewActivity {
            level_id: level.id,
            name: "Phishing Lab".into(),
            description: String::new(),
            activity_type: ActivityType::Lab,
            content: None,
            points: 70,
            order: 2,
            is_required: true,
        })
        .unwrap();

    let router = create_router(Arc::clone(&state), AuthLayer::default());
    let server = TestServer::new(router).unwrap();

    Fixture {
        server,
        state,
        user_id: user.id,
        level_id: level.id,
        quiz_id: quiz.id,
        lab_id: lab.id,
    }
}
