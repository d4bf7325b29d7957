//! Pure recompute helpers and the reconciliation report

use serde::{Deserialize, Serialize};

use super::types::ActivityProgress;

/// A level's aggregate, derived from its activity-progress rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelTotals {
    /// Sum of points_earned over completed rows
    pub points: u32,
    /// Count of completed rows
    pub completed: u32,
}

/// Recompute a level's aggregate from the full set of its activity-progress
/// rows. Used identically by the submission path and the reconciler, so the
/// two can never disagree about what a level is worth.
pub fn recompute_level<'a, I>(rows: I) -> LevelTotals
where
    I: IntoIterator<Item = &'a ActivityProgress>,
{
    let mut totals = LevelTotals::default();
    for row in rows {
        if row.is_completed {
            totals.points += row.points_earned;
            totals.completed += 1;
        }
    }
    totals
}

/// One correction applied by the reconciler
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FixedIssue {
    /// A completed activity recorded with zero points was repaired
    #[serde(rename_all = "camelCase")]
    ActivityPointsRepaired {
        activity_id: i64,
        old_points: u32,
        new_points: u32,
    },
    /// A level crossed its pass threshold and was marked completed
    #[serde(rename_all = "camelCase")]
    LevelCompleted {
        level_id: i64,
        level_name: String,
        points_earned: u32,
        min_points_to_pass: u32,
    },
    /// Stored level totals drifted from the recomputed values
    #[serde(rename_all = "camelCase")]
    LevelTotalsCorrected {
        level_id: i64,
        level_name: String,
        old_points: u32,
        new_points: u32,
        old_activities: u32,
        new_activities: u32,
    },
    /// The user's current-level pointer advanced
    #[serde(rename_all = "camelCase")]
    CurrentLevelAdvanced { from_level: u32, to_level: u32 },
    /// The cached lifetime total was corrected
    #[serde(rename_all = "camelCase")]
    TotalPointsCorrected { old_points: u32, new_points: u32 },
}

/// Everything one reconciliation pass corrected
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub fixed_issues: Vec<FixedIssue>,
    /// True when any level's completion flag was newly flipped
    pub level_progress_updated: bool,
}

impl ReconcileReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, issue: FixedIssue) {
        self.fixed_issues.push(issue);
    }

    pub fn is_clean(&self) -> bool {
        self.fixed_issues.is_empty()
    }

    /// Human-readable summary shown to the learner
    pub fn summary(&self) -> String {
        format!("Fixed {} issues", self.fixed_issues.len())
    }
}
