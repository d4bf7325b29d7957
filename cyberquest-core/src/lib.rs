//! cyberquest-core: Core library for the cyberquest learning backend
//!
//! This crate provides the foundational components for cyberquest:
//!
//! - **Progress engine** - [`ProgressService`] for recording activity
//!   submissions and reconciling a learner's per-level and lifetime totals
//! - **Storage** - [`ProgressStore`] trait and [`SqliteProgressStore`] for
//!   persisting users, the level/activity catalog, and progress rows
//! - **Auth types** - [`AuthContext`] carrying the identity resolved by an
//!   upstream identity-aware proxy
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use cyberquest_core::{ActivitySubmission, ProgressService, SqliteProgressStore};
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(SqliteProgressStore::open("progress.db")?);
//!     let service = ProgressService::new(store);
//!
//!     let submission = ActivitySubmission {
//!         is_completed: true,
//!         points_earned: 30,
//!     };
//!     let outcome = service.record_activity(1, 1, &submission)?;
//!     println!("attempts so far: {}", outcome.progress.attempts);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod progress;

// Re-export key types for convenience
pub use auth::{AccessConfig, AccessIdentity, AuthContext};
pub use progress::{
    Activity, ActivityProgress, ActivitySubmission, ActivityType, FixedIssue, Level, LevelDetail,
    NewActivity, NewLevel, NewUser, ProgressError, ProgressPolicy, ProgressService, ProgressStore,
    ReconcileReport, SqliteProgressStore, SubmissionOutcome, User, UserProgress,
};
