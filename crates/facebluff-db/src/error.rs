use std::time::Duration;

use rusqlite::ErrorCode;
use thiserror::Error;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

/// Failure of a repository call.
///
/// "Not found" is not an error here: lookups return `Ok(None)` and
/// mutations report whether a row was affected.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database connection error: {0}")]
    Connection(String),

    #[error("timed out after {0:?} waiting for a pooled connection")]
    AcquireTimeout(Duration),

    #[error("query interrupted after {0:?}")]
    QueryTimeout(Duration),

    #[error("database busy: {0}")]
    Busy(#[source] rusqlite::Error),

    #[error("constraint violated: {0}")]
    Constraint(#[source] rusqlite::Error),

    #[error("query failed: {0}")]
    Query(#[source] rusqlite::Error),

    #[error("credential hashing failed: {0}")]
    Credential(String),

    /// The blocking task running the statement panicked or was cancelled.
    #[error("database worker failed: {0}")]
    Worker(String),
}

impl DbError {
    /// Whether retrying the same call later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DbError::Connection(_)
                | DbError::AcquireTimeout(_)
                | DbError::QueryTimeout(_)
                | DbError::Busy(_)
        )
    }

    pub fn is_constraint(&self) -> bool {
        matches!(self, DbError::Constraint(_))
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => DbError::Constraint(err),
            Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => DbError::Busy(err),
            Some(ErrorCode::CannotOpen | ErrorCode::NotADatabase) => {
                DbError::Connection(err.to_string())
            }
            _ => DbError::Query(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqlite_failure(code: i32) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(code), None)
    }

    #[test]
    fn classifies_driver_errors() {
        let constraint: DbError = sqlite_failure(rusqlite::ffi::SQLITE_CONSTRAINT).into();
        assert!(constraint.is_constraint());
        assert!(!constraint.is_transient());

        let busy: DbError = sqlite_failure(rusqlite::ffi::SQLITE_BUSY).into();
        assert!(matches!(busy, DbError::Busy(_)));
        assert!(busy.is_transient());

        let other: DbError = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(other, DbError::Query(_)));
        assert!(!other.is_transient());
    }

    #[test]
    fn timeouts_are_transient() {
        assert!(DbError::AcquireTimeout(Duration::from_millis(5)).is_transient());
        assert!(DbError::QueryTimeout(Duration::from_millis(5)).is_transient());
        assert!(!DbError::Credential("bad salt".into()).is_transient());
        assert!(!DbError::Worker("panicked".into()).is_transient());
    }
}
