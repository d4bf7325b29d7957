//! Curriculum progress engine with SQLite storage
//!
//! Two write paths share one recompute: recording a single activity
//! submission and the batch reconciliation pass. Both derive a level's
//! aggregate from the full set of completed activity rows, so neither can
//! drift from the other.

mod error;
mod migrations;
mod policy;
mod reconcile;
mod service;
mod store;
mod types;

pub use error::ProgressError;
pub use policy::ProgressPolicy;
pub use reconcile::{FixedIssue, LevelTotals, ReconcileReport, recompute_level};
pub use service::ProgressService;
pub use store::{ProgressStore, SqliteProgressStore};
pub use types::{
    Activity, ActivityProgress, ActivitySubmission, ActivityType, Level, LevelDetail, NewActivity,
    NewLevel, NewUser, SubmissionOutcome, User, UserProgress,
};
