//! Progress engine error types

use thiserror::Error;

/// Errors for progress and catalog operations
#[derive(Error, Debug)]
pub enum ProgressError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Level not found: {0}")]
    LevelNotFound(i64),

    #[error("Activity not found: {0}")]
    ActivityNotFound(i64),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Invalid submission: {0}")]
    InvalidSubmission(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProgressError::ActivityNotFound(17);
        assert_eq!(err.to_string(), "Activity not found: 17");

        let err = ProgressError::UserNotFound("user-9".into());
        assert_eq!(err.to_string(), "User not found: user-9");
    }

    #[test]
    fn test_migration_error_message() {
        let err = ProgressError::Migration("v001_initial: syntax error".into());
        assert!(err.to_string().contains("v001_initial"));
    }
}
