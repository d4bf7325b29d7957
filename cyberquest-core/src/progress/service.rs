//! Progress business logic

use std::sync::Arc;

use super::error::ProgressError;
use super::policy::ProgressPolicy;
use super::reconcile::ReconcileReport;
use super::store::ProgressStore;
use super::types::{
    Activity, ActivitySubmission, Level, LevelDetail, NewActivity, NewLevel, NewUser,
    SubmissionOutcome, User, UserProgress,
};

/// Service for recording and reconciling learner progress
pub struct ProgressService<S: ProgressStore> {
    store: Arc<S>,
    policy: ProgressPolicy,
}

impl<S: ProgressStore> ProgressService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            policy: ProgressPolicy::default(),
        }
    }

    pub fn with_policy(store: Arc<S>, policy: ProgressPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &ProgressPolicy {
        &self.policy
    }

    /// Register a learner for an identity-provider subject
    pub fn create_user(&self, new: &NewUser) -> Result<User, ProgressError> {
        self.store.create_user(new)
    }

    pub fn user_by_subject(&self, subject: &str) -> Result<Option<User>, ProgressError> {
        self.store.user_by_subject(subject)
    }

    /// Add a level to the curriculum
    pub fn create_level(&self, new: &NewLevel) -> Result<Level, ProgressError> {
        self.store.create_level(new)
    }

    /// Add an activity to a level
    pub fn create_activity(&self, new: &NewActivity) -> Result<Activity, ProgressError> {
        self.store.create_activity(new)
    }

    /// A level with its activities, ordered by activity order
    pub fn level_detail(&self, level_id: i64) -> Result<Option<LevelDetail>, ProgressError> {
        let Some(level) = self.store.level(level_id)? else {
            return Ok(None);
        };
        let activities = self.store.level_activities(level_id)?;
        Ok(Some(LevelDetail { level, activities }))
    }

    pub fn activity(&self, activity_id: i64) -> Result<Option<Activity>, ProgressError> {
        self.store.activity(activity_id)
    }

    pub fn level_progress(
        &self,
        user_id: i64,
        level_id: i64,
    ) -> Result<Option<UserProgress>, ProgressError> {
        self.store.user_progress(user_id, level_id)
    }

    /// Record one activity submission for a learner
    pub fn record_activity(
        &self,
        user_id: i64,
        activity_id: i64,
        submission: &ActivitySubmission,
    ) -> Result<SubmissionOutcome, ProgressError> {
        self.store
            .record_submission(user_id, activity_id, submission, &self.policy)
    }

    /// Recompute and repair the learner's entire progress history
    pub fn reconcile(&self, user_id: i64) -> Result<ReconcileReport, ProgressError> {
        self.store.reconcile(user_id, &self.policy)
    }
}
