//! Error handling for snapvault-store
//!
//! Wraps snapvault-core ExError with store-specific helpers

use rusqlite::ErrorCode;
use snapvault_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::DataIntegrity)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a data-integrity error for a row that violates a model invariant
pub fn corrupt_row(table: &str, row_id: i64, reason: impl std::fmt::Display) -> ExError {
    ExError::new(ExErrorKind::DataIntegrity)
        .with_message(format!("{} row {}: {}", table, row_id, reason))
}

/// Create a database error from rusqlite::Error
///
/// Unique and primary-key violations become `Conflict`; a busy or locked
/// database becomes `Concurrency`. Both are retriable by the caller.
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    let kind = match &err {
        rusqlite::Error::SqliteFailure(failure, _) => match failure.code {
            ErrorCode::ConstraintViolation
                if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                ExErrorKind::Conflict
            }
            ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => ExErrorKind::Concurrency,
            _ => ExErrorKind::Persistence,
        },
        _ => ExErrorKind::Persistence,
    };
    ExError::new(kind).with_message(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_unique_violation_is_conflict() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (k TEXT UNIQUE); INSERT INTO t VALUES ('a');")
            .unwrap();
        let err = conn
            .execute("INSERT INTO t VALUES ('a')", [])
            .map_err(from_rusqlite)
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Conflict);
        assert!(err.is_retriable());
    }

    #[test]
    fn test_check_violation_is_persistence() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (n INTEGER CHECK (n >= 0));")
            .unwrap();
        let err = conn
            .execute("INSERT INTO t VALUES (-1)", [])
            .map_err(from_rusqlite)
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Persistence);
    }
}
