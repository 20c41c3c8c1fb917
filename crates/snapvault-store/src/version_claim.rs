//! Version claim ledger
//!
//! One `version_claim` row per media package holds the last version handed
//! out. Claims are serialized by the write transaction, so no two callers
//! can ever receive the same version for one media package.
//!
//! Claimed versions that are never followed by a saved snapshot leave gaps
//! in the sequence. They are not reclaimed.

use crate::db::Database;
use crate::errors::{from_rusqlite, Result};
use rusqlite::{Connection, OptionalExtension};
use snapvault_core::errors::{ExError, ExErrorKind};
use snapvault_core::model::{require_non_blank, Version};

impl Database {
    /// Claim the next version for a media package
    ///
    /// Returns [`Version::FIRST`] on the first claim, then strictly
    /// increasing versions. Conflicts are reported, never retried here.
    pub fn claim_next_version(&mut self, media_package_id: &str) -> Result<Version> {
        require_non_blank("media_package_id", media_package_id)?;
        self.write("claim_next_version", |tx, dialect| {
            dialect
                .claim_next_version(tx, media_package_id)
                .map_err(|e| e.with_media_package_id(media_package_id))
        })
    }

    /// Last version handed out for a media package, without claiming
    pub fn last_claimed_version(&mut self, media_package_id: &str) -> Result<Option<Version>> {
        self.read("last_claimed_version", |tx, _| {
            query_last_claimed(tx, media_package_id)
        })
    }
}

/// Read the ledger row for a media package
pub(crate) fn query_last_claimed(
    conn: &Connection,
    media_package_id: &str,
) -> Result<Option<Version>> {
    let stored: Option<i64> = conn
        .query_row(
            "SELECT last_claimed FROM version_claim WHERE media_package_id = ?1",
            [media_package_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)?;

    stored
        .map(|v| {
            Version::from_stored(v).map_err(|e| {
                ExError::new(ExErrorKind::DataIntegrity)
                    .with_media_package_id(media_package_id)
                    .with_message(format!("version_claim row: {}", e))
            })
        })
        .transpose()
}

/// Fail unless `version` was already handed out for the media package
pub(crate) fn ensure_claimed(
    conn: &Connection,
    media_package_id: &str,
    version: Version,
) -> Result<()> {
    match query_last_claimed(conn, media_package_id)? {
        Some(last) if last >= version => Ok(()),
        Some(last) => Err(ExError::new(ExErrorKind::PreconditionFailed)
            .with_media_package_id(media_package_id)
            .with_version(version.value())
            .with_message(format!(
                "version {} was never claimed (last claimed: {})",
                version, last
            ))),
        None => Err(ExError::new(ExErrorKind::PreconditionFailed)
            .with_media_package_id(media_package_id)
            .with_version(version.value())
            .with_message("no version has been claimed for this media package")),
    }
}
