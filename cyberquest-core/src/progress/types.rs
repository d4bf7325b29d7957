//! Core progress and catalog types

use serde::{Deserialize, Serialize};

/// Kind of learning activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Quiz,
    Reading,
    Lab,
    Simulation,
    CodeChallenge,
}

impl ActivityType {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quiz => "quiz",
            Self::Reading => "reading",
            Self::Lab => "lab",
            Self::Simulation => "simulation",
            Self::CodeChallenge => "code_challenge",
        }
    }

    /// Parse from database string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "quiz" => Some(Self::Quiz),
            "reading" => Some(Self::Reading),
            "lab" => Some(Self::Lab),
            "simulation" => Some(Self::Simulation),
            "code_challenge" => Some(Self::CodeChallenge),
            _ => None,
        }
    }
}

/// A registered learner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Auto-incremented database ID
    pub id: i64,
    /// Subject identifier from the external identity provider
    pub subject: String,
    pub display_name: Option<String>,
    /// Ordinal of the level the user is currently working through
    pub current_level: u32,
    /// Cached lifetime total; equals the sum of points_earned over all
    /// completed activity-progress rows
    pub total_points: u32,
    /// Unix timestamp (seconds)
    pub created_at: i64,
}

/// An ordered stage of the curriculum
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Unique ordinal, 1..N, defines the unlock sequence
    pub order: u32,
    pub min_points_to_pass: u32,
}

/// A single learning unit belonging to one level
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: i64,
    pub level_id: i64,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    /// Opaque activity payload (quiz questions, reading sections, ...)
    pub content: Option<serde_json::Value>,
    /// Maximum awardable points
    pub points: u32,
    /// Unique within the owning level
    pub order: u32,
    pub is_required: bool,
}

/// Per-user, per-activity completion record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityProgress {
    pub id: i64,
    pub user_id: i64,
    pub activity_id: i64,
    pub is_completed: bool,
    pub points_earned: u32,
    /// Incremented on every submission, never reset
    pub attempts: u32,
    /// Unix timestamp (seconds)
    pub updated_at: i64,
}

/// Per-user, per-level aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub id: i64,
    pub user_id: i64,
    pub level_id: i64,
    /// Sum of points_earned over the level's completed activity rows
    pub points_earned: u32,
    pub activities_completed: u32,
    pub is_completed: bool,
    /// Set once, on the first transition to completed
    pub completed_at: Option<i64>,
}

/// A level together with its activities, ordered by activity order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelDetail {
    #[serde(flatten)]
    pub level: Level,
    pub activities: Vec<Activity>,
}

/// One submitted activity result
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySubmission {
    pub is_completed: bool,
    pub points_earned: u32,
}

/// What a recorded submission changed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    /// The upserted activity-progress row
    pub progress: ActivityProgress,
    /// The recomputed level aggregate
    pub level_progress: UserProgress,
    /// True when this submission crossed the level's pass threshold
    pub level_newly_completed: bool,
}

/// Fields for registering a user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub subject: String,
    pub display_name: Option<String>,
}

/// Fields for creating a level
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLevel {
    pub name: String,
    pub description: String,
    pub order: u32,
    pub min_points_to_pass: u32,
}

/// Fields for creating an activity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
    pub level_id: i64,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub content: Option<serde_json::Value>,
    pub points: u32,
    pub order: u32,
    pub is_required: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_type_roundtrip() {
        for ty in [
            ActivityType::Quiz,
            ActivityType::Reading,
            ActivityType::Lab,
            ActivityType::Simulation,
            ActivityType::CodeChallenge,
        ] {
            let s = ty.as_str();
            let parsed = ActivityType::parse(s);
            assert_eq!(parsed, Some(ty));
        }
    }

    #[test]
    fn test_activity_type_serde() {
        let ty = ActivityType::CodeChallenge;
        let json = serde_json::to_string(&ty).unwrap();
        assert_eq!(json, "\"code_challenge\"");

        let parsed: ActivityType = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ty);
    }

    #[test]
    fn test_activity_serializes_type_key() {
        let activity = Activity {
            id: 1,
            level_id: 1,
            name: "CIA Triad Quiz".into(),
            description: String::new(),
            activity_type: ActivityType::Quiz,
            content: None,
            points: 30,
            order: 1,
            is_required: true,
        };
        let json = serde_json::to_value(&activity).unwrap();
        assert_eq!(json["type"], "quiz");
        assert_eq!(json["levelId"], 1);
        assert_eq!(json["isRequired"], true);
    }

    #[test]
    fn test_level_detail_flattens_level() {
        let detail = LevelDetail {
            level: Level {
                id: 3,
                name: "Web Security".into(),
                description: String::new(),
                order: 3,
                min_points_to_pass: 150,
            },
            activities: vec![],
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["minPointsToPass"], 150);
        assert!(json["activities"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_submission_deserializes_camel_case() {
        let submission: ActivitySubmission =
            serde_json::from_str(r#"{"isCompleted": true, "pointsEarned": 25}"#).unwrap();
        assert!(submission.is_completed);
        assert_eq!(submission.points_earned, 25);
    }
}
