//! Scoring policy for the progress engine

use serde::{Deserialize, Serialize};

use super::types::{Activity, ActivityType};

/// Tunable scoring rules shared by the recorder and the reconciler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressPolicy {
    /// Fraction of an activity's points awarded when repairing a completed
    /// row that was recorded with zero points (readings always repair to
    /// full points)
    #[serde(default = "default_passing_ratio")]
    pub passing_ratio: f64,

    /// Clamp submitted points to the activity's maximum; when disabled,
    /// over-maximum submissions are rejected instead
    #[serde(default = "default_clamp")]
    pub clamp_submitted_points: bool,
}

fn default_passing_ratio() -> f64 {
    0.7
}

fn default_clamp() -> bool {
    true
}

impl Default for ProgressPolicy {
    fn default() -> Self {
        Self {
            passing_ratio: default_passing_ratio(),
            clamp_submitted_points: default_clamp(),
        }
    }
}

impl ProgressPolicy {
    /// Points to award when repairing a completed-but-zero-point row
    pub fn repair_award(&self, activity: &Activity) -> u32 {
        match activity.activity_type {
            ActivityType::Reading => activity.points,
            _ => (self.passing_ratio * f64::from(activity.points)).round() as u32,
        }
    }

    /// Points actually credited for a submission
    pub fn effective_points(&self, submitted: u32, max: u32) -> u32 {
        if self.clamp_submitted_points {
            submitted.min(max)
        } else {
            submitted
        }
    }
}
