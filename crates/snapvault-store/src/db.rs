//! Database connection management
//!
//! A [`Database`] owns one SQLite connection together with the dialect
//! strategy detected for it. Open one handle per thread; handles on the
//! same file coordinate through SQLite's locking.

use crate::config::StoreConfig;
use crate::dialect::{detect_engine_version, select_dialect, Dialect, EngineVersion};
use crate::errors::{from_rusqlite, Result};
use crate::migrations::apply_migrations;
use rusqlite::Connection;
use snapvault_core::{log_op_end, log_op_error, log_op_start};
use std::time::{Duration, Instant};

/// Handle to the snapshot store
#[derive(Debug)]
pub struct Database {
    pub(crate) conn: Connection,
    pub(crate) dialect: Box<dyn Dialect>,
    engine: EngineVersion,
    wal: bool,
}

impl Database {
    /// Open (creating if needed) the database described by `config`
    ///
    /// Applies pending migrations and detects the dialect.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let conn = match &config.path {
            Some(path) => Connection::open(path).map_err(from_rusqlite)?,
            None => Connection::open_in_memory().map_err(from_rusqlite)?,
        };
        Self::from_connection(conn, config)
    }

    /// Open a private in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::open(&StoreConfig::default())
    }

    /// Wrap an existing connection, configuring and migrating it
    pub fn from_connection(mut conn: Connection, config: &StoreConfig) -> Result<Self> {
        let wal = configure(&conn, config)?;
        apply_migrations(&mut conn)?;
        let engine = detect_engine_version(&conn)?;
        let dialect = select_dialect(engine, config.dialect);

        tracing::debug!(
            engine = %engine,
            dialect = dialect.name(),
            wal = wal,
            "Opened snapshot store"
        );

        Ok(Self {
            conn,
            dialect,
            engine,
            wal,
        })
    }

    /// The raw connection, for read-only inspection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub fn engine_version(&self) -> EngineVersion {
        self.engine
    }

    /// Whether the connection runs in write-ahead-log mode
    pub fn is_wal(&self) -> bool {
        self.wal
    }

    /// Run the dialect's maintenance statements
    ///
    /// Runs outside any transaction. In WAL mode the log is also checkpointed
    /// and truncated.
    pub fn run_maintenance(&mut self) -> Result<()> {
        log_op_start!("run_maintenance", dialect = self.dialect.name());
        let start = Instant::now();

        self.run_maintenance_impl().map_err(|e| {
            log_op_error!(
                "run_maintenance",
                &e,
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "run_maintenance",
            duration_ms = start.elapsed().as_millis() as u64
        );
        Ok(())
    }

    fn run_maintenance_impl(&self) -> Result<()> {
        for statement in self.dialect.maintenance_statements() {
            self.conn.execute_batch(statement).map_err(from_rusqlite)?;
        }
        if self.wal {
            // (busy, log frames, checkpointed frames)
            let _: (i64, i64, i64) = self
                .conn
                .query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
                })
                .map_err(from_rusqlite)?;
        }
        Ok(())
    }

    /// Run `PRAGMA integrity_check`; a healthy database reports `["ok"]`
    pub fn integrity_check(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("PRAGMA integrity_check")
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(rows)
    }
}

/// Configure a connection; returns whether WAL mode is active
fn configure(conn: &Connection, config: &StoreConfig) -> Result<bool> {
    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(from_rusqlite)?;

    // Enable foreign keys
    conn.pragma_update(None, "foreign_keys", true)
        .map_err(from_rusqlite)?;

    if !config.wal || config.path.is_none() {
        return Ok(false);
    }

    let mode: String = conn
        .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
        .map_err(from_rusqlite)?;
    Ok(mode.eq_ignore_ascii_case("wal"))
}
