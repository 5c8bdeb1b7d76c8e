//! Application linkage between users and jobs
//!
//! Applying reads three facts in one statement (user exists, job exists,
//! pair already present) and then inserts. The composite primary key on
//! `applications` decides races between concurrent identical calls.

use tracing::warn;

use crate::error::{constraint_violation, map_database_error, AppError, AppResult, ConstraintViolation};

/// Result of the joined existence read
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct ApplicationCheck {
    pub user_exists: bool,
    pub job_exists: bool,
    pub already_applied: bool,
}

/// Shared rules for the apply operation
pub struct ApplicationProcessor;

impl ApplicationProcessor {
    /// Turn the existence read into the first failing condition, if any
    ///
    /// Order: unknown user, unknown job, existing pair.
    pub fn evaluate(check: ApplicationCheck, username: &str, job_id: i32) -> AppResult<()> {
        if !check.user_exists {
            return Err(AppError::NotFound(format!("No user: {}", username)));
        }
        if !check.job_exists {
            return Err(AppError::NotFound(format!("No job: {}", job_id)));
        }
        if check.already_applied {
            return Err(Self::duplicate(username, job_id));
        }
        Ok(())
    }

    /// Map an insert failure that slipped past the existence read
    pub fn map_insert_error(err: sqlx::Error, username: &str, job_id: i32) -> AppError {
        match constraint_violation(&err) {
            Some(ConstraintViolation::Unique) => {
                warn!(
                    "Concurrent application for {} to job {} rejected by primary key",
                    username, job_id
                );
                Self::duplicate(username, job_id)
            }
            Some(ConstraintViolation::ForeignKey) => {
                warn!(
                    "User {} or job {} removed while applying",
                    username, job_id
                );
                AppError::NotFound(format!("No user or job: {} / {}", username, job_id))
            }
            _ => map_database_error(err, "insert application"),
        }
    }

    fn duplicate(username: &str, job_id: i32) -> AppError {
        AppError::Conflict(format!("{} already applied to job {}", username, job_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(user_exists: bool, job_exists: bool, already_applied: bool) -> ApplicationCheck {
        ApplicationCheck {
            user_exists,
            job_exists,
            already_applied,
        }
    }

    #[test]
    fn test_all_clear() {
        assert!(ApplicationProcessor::evaluate(check(true, true, false), "u1", 1).is_ok());
    }

    #[test]
    fn test_unknown_user_wins() {
        match ApplicationProcessor::evaluate(check(false, false, false), "nope", 1) {
            Err(AppError::NotFound(message)) => assert_eq!(message, "No user: nope"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_job() {
        match ApplicationProcessor::evaluate(check(true, false, false), "u1", 0) {
            Err(AppError::NotFound(message)) => assert_eq!(message, "No job: 0"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_is_conflict() {
        match ApplicationProcessor::evaluate(check(true, true, true), "u1", 7) {
            Err(AppError::Conflict(message)) => assert_eq!(message, "u1 already applied to job 7"),
            other => panic!("Expected Conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_non_constraint_insert_error_is_opaque() {
        let err = ApplicationProcessor::map_insert_error(sqlx::Error::PoolTimedOut, "u1", 1);
        assert!(matches!(err, AppError::Database(_)));
    }
}
