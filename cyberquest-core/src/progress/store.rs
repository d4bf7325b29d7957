//! Progress storage trait and SQLite implementation

use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Mutex;

use super::error::ProgressError;
use super::migrations::Migrator;
use super::policy::ProgressPolicy;
use super::reconcile::{FixedIssue, ReconcileReport, recompute_level};
use super::types::{
    Activity, ActivityProgress, ActivitySubmission, ActivityType, Level, NewActivity, NewLevel,
    NewUser, SubmissionOutcome, User, UserProgress,
};

/// Progress storage trait
pub trait ProgressStore: Send + Sync {
    fn create_user(&self, new: &NewUser) -> Result<User, ProgressError>;
    fn user(&self, id: i64) -> Result<Option<User>, ProgressError>;
    fn user_by_subject(&self, subject: &str) -> Result<Option<User>, ProgressError>;

    fn create_level(&self, new: &NewLevel) -> Result<Level, ProgressError>;
    fn create_activity(&self, new: &NewActivity) -> Result<Activity, ProgressError>;
    fn level(&self, id: i64) -> Result<Option<Level>, ProgressError>;
    fn level_activities(&self, level_id: i64) -> Result<Vec<Activity>, ProgressError>;
    fn activity(&self, id: i64) -> Result<Option<Activity>, ProgressError>;

    fn activity_progress(
        &self,
        user_id: i64,
        activity_id: i64,
    ) -> Result<Option<ActivityProgress>, ProgressError>;
    fn user_progress(
        &self,
        user_id: i64,
        level_id: i64,
    ) -> Result<Option<UserProgress>, ProgressError>;

    /// Record one activity submission: upsert the activity row, recompute
    /// the owning level's aggregate, and update the user's totals, all in
    /// one transaction.
    fn record_submission(
        &self,
        user_id: i64,
        activity_id: i64,
        submission: &ActivitySubmission,
        policy: &ProgressPolicy,
    ) -> Result<SubmissionOutcome, ProgressError>;

    /// Full idempotent repair pass over a user's history.
    fn reconcile(
        &self,
        user_id: i64,
        policy: &ProgressPolicy,
    ) -> Result<ReconcileReport, ProgressError>;
}

fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// SQLite-backed progress store
pub struct SqliteProgressStore {
    conn: Mutex<Connection>,
}

impl SqliteProgressStore {
    /// Open or create database at path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ProgressError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init()?;
        Ok(store)
    }

    /// Open in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, ProgressError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init()?;
        Ok(store)
    }

    /// Run migrations
    fn init(&self) -> Result<(), ProgressError> {
        let conn = self.conn.lock().unwrap();
        let migrator = Migrator::new(&conn);
        migrator.migrate()
    }

    fn row_to_user(row: &rusqlite::Row) -> Result<User, rusqlite::Error> {
        Ok(User {
            id: row.get(0)?,
            subject: row.get(1)?,
            display_name: row.get(2)?,
            current_level: row.get(3)?,
            total_points: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn row_to_level(row: &rusqlite::Row) -> Result<Level, rusqlite::Error> {
        Ok(Level {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            order: row.get(3)?,
            min_points_to_pass: row.get(4)?,
        })
    }

    fn row_to_activity(row: &rusqlite::Row) -> Result<Activity, rusqlite::Error> {
        let type_str: String = row.get(4)?;
        Ok(Activity {
            id: row.get(0)?,
            level_id: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            activity_type: ActivityType::parse(&type_str).unwrap_or(ActivityType::Quiz),
            content: row.get(5)?,
            points: row.get(6)?,
            order: row.get(7)?,
            is_required: row.get(8)?,
        })
    }

    fn row_to_activity_progress(row: &rusqlite::Row) -> Result<ActivityProgress, rusqlite::Error> {
        Ok(ActivityProgress {
            id: row.get(0)?,
            user_id: row.get(1)?,
            activity_id: row.get(2)?,
            is_completed: row.get(3)?,
            points_earned: row.get(4)?,
            attempts: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn row_to_user_progress(row: &rusqlite::Row) -> Result<UserProgress, rusqlite::Error> {
        Ok(UserProgress {
            id: row.get(0)?,
            user_id: row.get(1)?,
            level_id: row.get(2)?,
            points_earned: row.get(3)?,
            activities_completed: row.get(4)?,
            is_completed: row.get(5)?,
            completed_at: row.get(6)?,
        })
    }

    const USER_COLS: &'static str =
        "id, subject, display_name, current_level, total_points, created_at";
    const LEVEL_COLS: &'static str = "id, name, description, position, min_points_to_pass";
    const ACTIVITY_COLS: &'static str =
        "id, level_id, name, description, activity_type, content, points, position, is_required";
    const ACTIVITY_PROGRESS_COLS: &'static str =
        "id, user_id, activity_id, is_completed, points_earned, attempts, updated_at";
    const USER_PROGRESS_COLS: &'static str =
        "id, user_id, level_id, points_earned, activities_completed, is_completed, completed_at";

    fn user_row(conn: &Connection, id: i64) -> Result<Option<User>, rusqlite::Error> {
        conn.query_row(
            &format!("SELECT {} FROM users WHERE id = ?1", Self::USER_COLS),
            [id],
            Self::row_to_user,
        )
        .optional()
    }

    fn level_row(conn: &Connection, id: i64) -> Result<Option<Level>, rusqlite::Error> {
        conn.query_row(
            &format!("SELECT {} FROM levels WHERE id = ?1", Self::LEVEL_COLS),
            [id],
            Self::row_to_level,
        )
        .optional()
    }

    fn activity_row(conn: &Connection, id: i64) -> Result<Option<Activity>, rusqlite::Error> {
        conn.query_row(
            &format!("SELECT {} FROM activities WHERE id = ?1", Self::ACTIVITY_COLS),
            [id],
            Self::row_to_activity,
        )
        .optional()
    }

    fn activity_progress_row(
        conn: &Connection,
        user_id: i64,
        activity_id: i64,
    ) -> Result<Option<ActivityProgress>, rusqlite::Error> {
        conn.query_row(
            &format!(
                "SELECT {} FROM activity_progress WHERE user_id = ?1 AND activity_id = ?2",
                Self::ACTIVITY_PROGRESS_COLS
            ),
            [user_id, activity_id],
            Self::row_to_activity_progress,
        )
        .optional()
    }

    fn user_progress_row(
        conn: &Connection,
        user_id: i64,
        level_id: i64,
    ) -> Result<Option<UserProgress>, rusqlite::Error> {
        conn.query_row(
            &format!(
                "SELECT {} FROM user_progress WHERE user_id = ?1 AND level_id = ?2",
                Self::USER_PROGRESS_COLS
            ),
            [user_id, level_id],
            Self::row_to_user_progress,
        )
        .optional()
    }

    /// A user's activity-progress rows within one level
    fn level_progress_rows(
        conn: &Connection,
        user_id: i64,
        level_id: i64,
    ) -> Result<Vec<ActivityProgress>, rusqlite::Error> {
        let mut stmt = conn.prepare(
            "SELECT ap.id, ap.user_id, ap.activity_id, ap.is_completed, ap.points_earned,
                    ap.attempts, ap.updated_at
             FROM activity_progress ap
             INNER JOIN activities a ON a.id = ap.activity_id
             WHERE ap.user_id = ?1 AND a.level_id = ?2
             ORDER BY a.position ASC",
        )?;
        let rows = stmt.query_map([user_id, level_id], Self::row_to_activity_progress)?;
        rows.collect()
    }

    /// Same as [`Self::level_progress_rows`] but carrying each activity's
    /// static fields, as the reconciler needs points/type for repairs
    fn level_progress_with_activities(
        conn: &Connection,
        user_id: i64,
        level_id: i64,
    ) -> Result<Vec<(ActivityProgress, Activity)>, rusqlite::Error> {
        let mut stmt = conn.prepare(
            "SELECT ap.id, ap.user_id, ap.activity_id, ap.is_completed, ap.points_earned,
                    ap.attempts, ap.updated_at,
                    a.id, a.level_id, a.name, a.description, a.activity_type, a.content,
                    a.points, a.position, a.is_required
             FROM activity_progress ap
             INNER JOIN activities a ON a.id = ap.activity_id
             WHERE ap.user_id = ?1 AND a.level_id = ?2
             ORDER BY a.position ASC",
        )?;
        let rows = stmt.query_map([user_id, level_id], |row| {
            let progress = Self::row_to_activity_progress(row)?;
            let type_str: String = row.get(11)?;
            let activity = Activity {
                id: row.get(7)?,
                level_id: row.get(8)?,
                name: row.get(9)?,
                description: row.get(10)?,
                activity_type: ActivityType::parse(&type_str).unwrap_or(ActivityType::Quiz),
                content: row.get(12)?,
                points: row.get(13)?,
                order: row.get(14)?,
                is_required: row.get(15)?,
            };
            Ok((progress, activity))
        })?;
        rows.collect()
    }

    /// Every level-progress row for a user, with the owning level
    fn user_progress_with_levels(
        conn: &Connection,
        user_id: i64,
    ) -> Result<Vec<(UserProgress, Level)>, rusqlite::Error> {
        let mut stmt = conn.prepare(
            "SELECT up.id, up.user_id, up.level_id, up.points_earned, up.activities_completed,
                    up.is_completed, up.completed_at,
                    l.id, l.name, l.description, l.position, l.min_points_to_pass
             FROM user_progress up
             INNER JOIN levels l ON l.id = up.level_id
             WHERE up.user_id = ?1
             ORDER BY l.position ASC",
        )?;
        let rows = stmt.query_map([user_id], |row| {
            let progress = Self::row_to_user_progress(row)?;
            let level = Level {
                id: row.get(7)?,
                name: row.get(8)?,
                description: row.get(9)?,
                order: row.get(10)?,
                min_points_to_pass: row.get(11)?,
            };
            Ok((progress, level))
        })?;
        rows.collect()
    }

    /// Lifetime total over all completed activity rows
    fn completed_points_total(conn: &Connection, user_id: i64) -> Result<u32, rusqlite::Error> {
        conn.query_row(
            "SELECT COALESCE(SUM(points_earned), 0) FROM activity_progress
             WHERE user_id = ?1 AND is_completed = 1",
            [user_id],
            |row| row.get(0),
        )
    }

    /// Upsert the per-level aggregate from recomputed totals, preserving a
    /// completion that already happened (the flag is one-directional).
    /// Returns (row, newly_completed).
    fn upsert_user_progress(
        conn: &Connection,
        user_id: i64,
        level: &Level,
        now: i64,
    ) -> Result<(UserProgress, bool), rusqlite::Error> {
        let rows = Self::level_progress_rows(conn, user_id, level.id)?;
        let totals = recompute_level(&rows);

        let existing = Self::user_progress_row(conn, user_id, level.id)?;
        let previously_completed = existing.as_ref().is_some_and(|p| p.is_completed);
        let is_completed = previously_completed || totals.points >= level.min_points_to_pass;
        let newly_completed = is_completed && !previously_completed;
        let completed_at = if newly_completed {
            Some(now)
        } else {
            existing.and_then(|p| p.completed_at)
        };

        conn.execute(
            "INSERT INTO user_progress (user_id, level_id, points_earned, activities_completed, is_completed, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (user_id, level_id) DO UPDATE SET
                points_earned = excluded.points_earned,
                activities_completed = excluded.activities_completed,
                is_completed = excluded.is_completed,
                completed_at = excluded.completed_at",
            params![
                user_id,
                level.id,
                totals.points,
                totals.completed,
                is_completed,
                completed_at
            ],
        )?;

        let row = Self::user_progress_row(conn, user_id, level.id)?
            .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        Ok((row, newly_completed))
    }
}

impl ProgressStore for SqliteProgressStore {
    fn create_user(&self, new: &NewUser) -> Result<User, ProgressError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO users (subject, display_name, current_level, total_points, created_at)
             VALUES (?1, ?2, 1, 0, ?3)",
            params![new.subject, new.display_name, unix_now()],
        )?;
        let id = conn.last_insert_rowid();
        Ok(Self::user_row(&conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?)
    }

    fn user(&self, id: i64) -> Result<Option<User>, ProgressError> {
        let conn = self.conn.lock().unwrap();
        Ok(Self::user_row(&conn, id)?)
    }

    fn user_by_subject(&self, subject: &str) -> Result<Option<User>, ProgressError> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                &format!("SELECT {} FROM users WHERE subject = ?1", Self::USER_COLS),
                [subject],
                Self::row_to_user,
            )
            .optional()?)
    }

    fn create_level(&self, new: &NewLevel) -> Result<Level, ProgressError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO levels (name, description, position, min_points_to_pass)
             VALUES (?1, ?2, ?3, ?4)",
            params![new.name, new.description, new.order, new.min_points_to_pass],
        )?;
        let id = conn.last_insert_rowid();
        Ok(Self::level_row(&conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?)
    }

    fn create_activity(&self, new: &NewActivity) -> Result<Activity, ProgressError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO activities (level_id, name, description, activity_type, content, points, position, is_required)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                new.level_id,
                new.name,
                new.description,
                new.activity_type.as_str(),
                new.content,
                new.points,
                new.order,
                new.is_required
            ],
        )?;
        let id = conn.last_insert_rowid();
        Ok(Self::activity_row(&conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?)
    }

    fn level(&self, id: i64) -> Result<Option<Level>, ProgressError> {
        let conn = self.conn.lock().unwrap();
        Ok(Self::level_row(&conn, id)?)
    }

    fn level_activities(&self, level_id: i64) -> Result<Vec<Activity>, ProgressError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM activities WHERE level_id = ?1 ORDER BY position ASC",
            Self::ACTIVITY_COLS
        ))?;
        let rows = stmt.query_map([level_id], Self::row_to_activity)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn activity(&self, id: i64) -> Result<Option<Activity>, ProgressError> {
        let conn = self.conn.lock().unwrap();
        Ok(Self::activity_row(&conn, id)?)
    }

    fn activity_progress(
        &self,
        user_id: i64,
        activity_id: i64,
    ) -> Result<Option<ActivityProgress>, ProgressError> {
        let conn = self.conn.lock().unwrap();
        Ok(Self::activity_progress_row(&conn, user_id, activity_id)?)
    }

    fn user_progress(
        &self,
        user_id: i64,
        level_id: i64,
    ) -> Result<Option<UserProgress>, ProgressError> {
        let conn = self.conn.lock().unwrap();
        Ok(Self::user_progress_row(&conn, user_id, level_id)?)
    }

    fn record_submission(
        &self,
        user_id: i64,
        activity_id: i64,
        submission: &ActivitySubmission,
        policy: &ProgressPolicy,
    ) -> Result<SubmissionOutcome, ProgressError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let user = Self::user_row(&tx, user_id)?
            .ok_or_else(|| ProgressError::UserNotFound(user_id.to_string()))?;
        let activity = Self::activity_row(&tx, activity_id)?
            .ok_or(ProgressError::ActivityNotFound(activity_id))?;
        let level = Self::level_row(&tx, activity.level_id)?
            .ok_or(ProgressError::LevelNotFound(activity.level_id))?;

        if !policy.clamp_submitted_points && submission.points_earned > activity.points {
            return Err(ProgressError::InvalidSubmission(format!(
                "{} points exceeds activity maximum {}",
                submission.points_earned, activity.points
            )));
        }
        let awarded = policy.effective_points(submission.points_earned, activity.points);
        let now = unix_now();

        // attempts increments on every submission, even an identical resubmission
        tx.execute(
            "INSERT INTO activity_progress (user_id, activity_id, is_completed, points_earned, attempts, updated_at)
             VALUES (?1, ?2, ?3, ?4, 1, ?5)
             ON CONFLICT (user_id, activity_id) DO UPDATE SET
                is_completed = excluded.is_completed,
                points_earned = excluded.points_earned,
                attempts = attempts + 1,
                updated_at = excluded.updated_at",
            params![
                user_id,
                activity_id,
                submission.is_completed,
                awarded,
                now
            ],
        )?;

        let (level_progress, newly_completed) =
            Self::upsert_user_progress(&tx, user_id, &level, now)?;

        let total_points = Self::completed_points_total(&tx, user_id)?;
        let current_level = if newly_completed && user.current_level == level.order {
            level.order + 1
        } else {
            user.current_level
        };
        tx.execute(
            "UPDATE users SET total_points = ?2, current_level = ?3 WHERE id = ?1",
            params![user_id, total_points, current_level],
        )?;

        let progress = Self::activity_progress_row(&tx, user_id, activity_id)?
            .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        tx.commit()?;

        tracing::debug!(
            user_id,
            activity_id,
            awarded,
            newly_completed,
            "recorded activity submission"
        );

        Ok(SubmissionOutcome {
            progress,
            level_progress,
            level_newly_completed: newly_completed,
        })
    }

    fn reconcile(
        &self,
        user_id: i64,
        policy: &ProgressPolicy,
    ) -> Result<ReconcileReport, ProgressError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let user = Self::user_row(&tx, user_id)?
            .ok_or_else(|| ProgressError::UserNotFound(user_id.to_string()))?;
        let now = unix_now();
        let mut report = ReconcileReport::new();
        let mut current_level = user.current_level;

        for (progress, level) in Self::user_progress_with_levels(&tx, user_id)? {
            let mut rows = Self::level_progress_with_activities(&tx, user_id, level.id)?;

            // repair completed rows that were recorded with zero points
            for (ap, activity) in rows.iter_mut() {
                if ap.is_completed && ap.points_earned == 0 {
                    let repaired = policy.repair_award(activity);
                    tx.execute(
                        "UPDATE activity_progress SET points_earned = ?2, updated_at = ?3 WHERE id = ?1",
                        params![ap.id, repaired, now],
                    )?;
                    report.record(FixedIssue::ActivityPointsRepaired {
                        activity_id: activity.id,
                        old_points: ap.points_earned,
                        new_points: repaired,
                    });
                    ap.points_earned = repaired;
                }
            }

            let totals = recompute_level(rows.iter().map(|(ap, _)| ap));
            let should_complete = totals.points >= level.min_points_to_pass;

            if should_complete && !progress.is_completed {
                tx.execute(
                    "UPDATE user_progress SET points_earned = ?2, activities_completed = ?3,
                            is_completed = 1, completed_at = ?4
                     WHERE id = ?1",
                    params![progress.id, totals.points, totals.completed, now],
                )?;
                report.level_progress_updated = true;
                report.record(FixedIssue::LevelCompleted {
                    level_id: level.id,
                    level_name: level.name.clone(),
                    points_earned: totals.points,
                    min_points_to_pass: level.min_points_to_pass,
                });

                // advance the pointer only when the user's active level completed
                if current_level == level.order {
                    let advanced = level.order + 1;
                    tx.execute(
                        "UPDATE users SET current_level = ?2 WHERE id = ?1",
                        params![user_id, advanced],
                    )?;
                    report.record(FixedIssue::CurrentLevelAdvanced {
                        from_level: current_level,
                        to_level: advanced,
                    });
                    current_level = advanced;
                }
            } else if totals.points != progress.points_earned
                || totals.completed != progress.activities_completed
            {
                tx.execute(
                    "UPDATE user_progress SET points_earned = ?2, activities_completed = ?3
                     WHERE id = ?1",
                    params![progress.id, totals.points, totals.completed],
                )?;
                report.record(FixedIssue::LevelTotalsCorrected {
                    level_id: level.id,
                    level_name: level.name.clone(),
                    old_points: progress.points_earned,
                    new_points: totals.points,
                    old_activities: progress.activities_completed,
                    new_activities: totals.completed,
                });
            }
        }

        // lifetime total, re-queried fresh so the repairs above are included
        let total_points = Self::completed_points_total(&tx, user_id)?;
        if total_points != user.total_points {
            tx.execute(
                "UPDATE users SET total_points = ?2 WHERE id = ?1",
                params![user_id, total_points],
            )?;
            report.record(FixedIssue::TotalPointsCorrected {
                old_points: user.total_points,
                new_points: total_points,
            });
        }

        tx.commit()?;

        tracing::debug!(
            user_id,
            fixes = report.fixed_issues.len(),
            level_progress_updated = report.level_progress_updated,
            "reconciled user progress"
        );

        Ok(report)
    }
}
