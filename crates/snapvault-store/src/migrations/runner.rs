//! Migration runner
//!
//! Applies migrations with checksums, unknown-migration detection, and
//! idempotency

use crate::errors::{checksum_mismatch, from_rusqlite, migration_error, Result};
use crate::migrations::checksums::compute_checksum;
use crate::migrations::embedded::{get_migrations, Migration};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior};
use snapvault_core::errors::{ExError, ExErrorKind};

/// Apply all pending migrations to the database
///
/// Fails if an applied migration's SQL changed since it was applied, or if
/// the database records a migration this build does not know about.
pub fn apply_migrations(conn: &mut Connection) -> Result<()> {
    create_schema_version_table(conn)?;

    let migrations = get_migrations();
    reject_unknown_migrations(conn, &migrations)?;

    for migration in &migrations {
        apply_migration(conn, migration)?;
    }

    Ok(())
}

/// Ids of applied migrations, in application order
pub fn applied_migrations(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT migration_id FROM schema_version ORDER BY id")
        .map_err(from_rusqlite)?;
    let ids = stmt
        .query_map([], |row| row.get(0))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<String>, _>>()
        .map_err(from_rusqlite)?;
    Ok(ids)
}

/// Create the schema_version table if it doesn't exist
fn create_schema_version_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY,
            migration_id TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL,
            checksum TEXT
        )",
        [],
    )
    .map_err(from_rusqlite)?;

    Ok(())
}

fn reject_unknown_migrations(conn: &Connection, migrations: &[Migration]) -> Result<()> {
    for applied in applied_migrations(conn)? {
        if !migrations.iter().any(|m| m.id == applied) {
            return Err(ExError::new(ExErrorKind::PreconditionFailed)
                .with_op("migration")
                .with_message(format!(
                    "Database has migration {} which this build does not know; refusing to open",
                    applied
                )));
        }
    }
    Ok(())
}

/// Apply a single migration if not already applied
///
/// The applied check runs inside the write transaction so that two
/// connections migrating the same file cannot both apply it.
fn apply_migration(conn: &mut Connection, migration: &Migration) -> Result<()> {
    let checksum = compute_checksum(migration.sql);

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(from_rusqlite)?;

    let recorded: Option<Option<String>> = tx
        .query_row(
            "SELECT checksum FROM schema_version WHERE migration_id = ?1",
            [migration.id],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)?;

    if let Some(recorded) = recorded {
        return match recorded {
            Some(expected) if expected != checksum => {
                Err(checksum_mismatch(migration.id, &expected, &checksum))
            }
            // Idempotent: already applied
            _ => Ok(()),
        };
    }

    tx.execute_batch(migration.sql)
        .map_err(|e| migration_error(migration.id, &e.to_string()))?;

    let now = chrono::Utc::now().timestamp();
    tx.execute(
        "INSERT INTO schema_version (migration_id, applied_at, checksum) VALUES (?1, ?2, ?3)",
        rusqlite::params![migration.id, now, checksum],
    )
    .map_err(from_rusqlite)?;

    tx.commit().map_err(from_rusqlite)?;

    tracing::debug!(migration_id = migration.id, "Applied migration");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_migrations() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert!(apply_migrations(&mut conn).is_ok());
        assert_eq!(
            applied_migrations(&conn).unwrap(),
            vec![
                "001_initial_schema",
                "002_lookup_indexes",
                "003_archival_date_index"
            ]
        );
    }

    #[test]
    fn test_idempotency() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        assert!(apply_migrations(&mut conn).is_ok());
        assert_eq!(applied_migrations(&conn).unwrap().len(), 3);
    }
}
