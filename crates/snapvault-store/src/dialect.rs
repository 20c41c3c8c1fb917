//! Engine-specific statement strategies
//!
//! The engine version is detected once per connection and the matching
//! strategy is cached on the [`Database`](crate::Database) handle. Call
//! sites ask the strategy instead of branching on the engine themselves.

use crate::config::DialectChoice;
use crate::errors::{from_rusqlite, Result};
use crate::version_claim::query_last_claimed;
use rusqlite::{Connection, OptionalExtension};
use snapvault_core::errors::{ExError, ExErrorKind};
use snapvault_core::model::Version;

/// Engine version as reported by `sqlite_version()`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EngineVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl EngineVersion {
    /// First release with `RETURNING`
    pub const RETURNING_SUPPORT: EngineVersion = EngineVersion {
        major: 3,
        minor: 35,
        patch: 0,
    };

    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.trim().split('.').map(|p| p.parse::<u32>().ok());
        let major = parts.next()??;
        let minor = parts.next().flatten().unwrap_or(0);
        let patch = parts.next().flatten().unwrap_or(0);
        Some(Self {
            major,
            minor,
            patch,
        })
    }
}

impl std::fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Strategy object for the few statements that differ between engines
pub trait Dialect: std::fmt::Debug + Send {
    fn name(&self) -> &'static str;

    /// Atomically advance the version ledger for one media package.
    ///
    /// Must run inside a write transaction.
    fn claim_next_version(&self, conn: &Connection, media_package_id: &str) -> Result<Version>;

    /// Statements refreshing planner statistics
    fn maintenance_statements(&self) -> &'static [&'static str];
}

/// Engines with `INSERT .. RETURNING`: one statement claims a version
#[derive(Debug, Clone, Copy, Default)]
pub struct ReturningDialect;

impl Dialect for ReturningDialect {
    fn name(&self) -> &'static str {
        "returning"
    }

    fn claim_next_version(&self, conn: &Connection, media_package_id: &str) -> Result<Version> {
        let stored: i64 = conn
            .query_row(
                r#"
                INSERT INTO version_claim (media_package_id, last_claimed)
                VALUES (?1, ?2)
                ON CONFLICT (media_package_id)
                DO UPDATE SET last_claimed = last_claimed + 1
                RETURNING last_claimed
                "#,
                rusqlite::params![media_package_id, Version::FIRST.to_stored()?],
                |row| row.get(0),
            )
            .map_err(from_rusqlite)?;
        Ok(Version::from_stored(stored)?)
    }

    fn maintenance_statements(&self) -> &'static [&'static str] {
        &["PRAGMA optimize"]
    }
}

/// Older engines: read the ledger row, then insert or advance it
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicDialect;

impl Dialect for ClassicDialect {
    fn name(&self) -> &'static str {
        "classic"
    }

    fn claim_next_version(&self, conn: &Connection, media_package_id: &str) -> Result<Version> {
        match query_last_claimed(conn, media_package_id)? {
            None => {
                conn.execute(
                    "INSERT INTO version_claim (media_package_id, last_claimed) VALUES (?1, ?2)",
                    rusqlite::params![media_package_id, Version::FIRST.to_stored()?],
                )
                .map_err(from_rusqlite)?;
                Ok(Version::FIRST)
            }
            Some(last) => {
                let next = last.next();
                // Compare-and-set on the value just read.
                let updated = conn
                    .execute(
                        "UPDATE version_claim SET last_claimed = ?3
                         WHERE media_package_id = ?1 AND last_claimed = ?2",
                        rusqlite::params![
                            media_package_id,
                            last.to_stored()?,
                            next.to_stored()?
                        ],
                    )
                    .map_err(from_rusqlite)?;
                if updated != 1 {
                    return Err(ExError::new(ExErrorKind::Concurrency)
                        .with_media_package_id(media_package_id)
                        .with_message("version claim changed while advancing it"));
                }
                Ok(next)
            }
        }
    }

    fn maintenance_statements(&self) -> &'static [&'static str] {
        &["ANALYZE"]
    }
}

/// Read the engine version of an open connection
pub fn detect_engine_version(conn: &Connection) -> Result<EngineVersion> {
    let raw: Option<String> = conn
        .query_row("SELECT sqlite_version()", [], |row| row.get(0))
        .optional()
        .map_err(from_rusqlite)?;
    raw.as_deref()
        .and_then(EngineVersion::parse)
        .ok_or_else(|| {
            ExError::new(ExErrorKind::Persistence)
                .with_op("detect_engine_version")
                .with_message(format!("Unrecognised engine version: {:?}", raw))
        })
}

/// Pick the strategy for a given engine version and configuration override
pub fn select_dialect(engine: EngineVersion, choice: DialectChoice) -> Box<dyn Dialect> {
    match choice {
        DialectChoice::Returning => Box::new(ReturningDialect),
        DialectChoice::Classic => Box::new(ClassicDialect),
        DialectChoice::Auto if engine >= EngineVersion::RETURNING_SUPPORT => {
            Box::new(ReturningDialect)
        }
        DialectChoice::Auto => Box::new(ClassicDialect),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_engine_version() {
        assert_eq!(
            EngineVersion::parse("3.41.2"),
            Some(EngineVersion {
                major: 3,
                minor: 41,
                patch: 2
            })
        );
        assert_eq!(
            EngineVersion::parse("3.8").map(|v| v.to_string()),
            Some("3.8.0".to_string())
        );
        assert_eq!(EngineVersion::parse("abc"), None);
    }

    #[test]
    fn test_auto_selection_by_version() {
        let old = EngineVersion::parse("3.31.1").unwrap();
        let new = EngineVersion::parse("3.45.0").unwrap();
        assert_eq!(select_dialect(old, DialectChoice::Auto).name(), "classic");
        assert_eq!(select_dialect(new, DialectChoice::Auto).name(), "returning");
    }

    #[test]
    fn test_override_wins() {
        let new = EngineVersion::parse("3.45.0").unwrap();
        assert_eq!(select_dialect(new, DialectChoice::Classic).name(), "classic");
    }

    #[test]
    fn test_detect_on_bundled_engine() {
        let conn = Connection::open_in_memory().unwrap();
        let v = detect_engine_version(&conn).unwrap();
        assert!(v.major >= 3);
    }
}
