//! Storage-location relocator
//!
//! Each operation resolves its target snapshot inside the same write unit
//! that mutates it. A target that cannot be resolved is an error, never a
//! silent no-op.

use crate::db::Database;
use crate::errors::{from_rusqlite, Result};
use rusqlite::{Connection, OptionalExtension};
use snapvault_core::errors::{ExError, ExErrorKind};
use snapvault_core::model::{require_non_blank, Availability, Version};

impl Database {
    /// Move a snapshot and every one of its assets to another storage backend.
    ///
    /// Snapshot and assets change in one transaction; readers see either
    /// the old storage id everywhere or the new one everywhere.
    ///
    /// ## Returns
    ///
    /// Number of asset rows updated
    ///
    /// ## Errors
    ///
    /// - `ExErrorKind::NotFound`: no snapshot for (media package, version)
    /// - `ExErrorKind::InvalidInput`: blank storage id
    pub fn set_storage_location(
        &mut self,
        version: Version,
        media_package_id: &str,
        storage_id: &str,
    ) -> Result<usize> {
        require_non_blank("storage_id", storage_id)?;
        self.write("set_storage_location", |tx, _| {
            let snapshot_id = resolve_snapshot_id(tx, media_package_id, version)?;

            tx.execute(
                "UPDATE snapshot SET storage_id = ?2 WHERE id = ?1",
                rusqlite::params![snapshot_id, storage_id],
            )
            .map_err(from_rusqlite)?;

            let moved = tx
                .execute(
                    "UPDATE asset SET storage_id = ?2 WHERE snapshot_id = ?1",
                    rusqlite::params![snapshot_id, storage_id],
                )
                .map_err(from_rusqlite)?;

            tracing::debug!(
                media_package_id,
                version = version.value(),
                storage_id,
                assets = moved,
                "Relocated snapshot"
            );

            Ok(moved)
        })
    }

    /// Move a single asset to another storage backend
    ///
    /// Neither the snapshot nor its other assets change.
    pub fn set_asset_storage_location(
        &mut self,
        version: Version,
        media_package_id: &str,
        element_id: &str,
        storage_id: &str,
    ) -> Result<()> {
        require_non_blank("storage_id", storage_id)?;
        self.write("set_asset_storage_location", |tx, _| {
            let snapshot_id = resolve_snapshot_id(tx, media_package_id, version)?;
            let updated = tx
                .execute(
                    "UPDATE asset SET storage_id = ?3
                     WHERE snapshot_id = ?1 AND media_package_element_id = ?2",
                    rusqlite::params![snapshot_id, element_id, storage_id],
                )
                .map_err(from_rusqlite)?;

            if updated == 0 {
                return Err(ExError::new(ExErrorKind::NotFound)
                    .with_media_package_id(media_package_id)
                    .with_version(version.value())
                    .with_element_id(element_id)
                    .with_message("asset not found"));
            }
            Ok(())
        })
    }

    /// Set the availability of one snapshot; assets are unaffected
    pub fn set_availability(
        &mut self,
        version: Version,
        media_package_id: &str,
        availability: Availability,
    ) -> Result<()> {
        self.write("set_availability", |tx, _| {
            let snapshot_id = resolve_snapshot_id(tx, media_package_id, version)?;
            tx.execute(
                "UPDATE snapshot SET availability = ?2 WHERE id = ?1",
                rusqlite::params![snapshot_id, availability.as_str()],
            )
            .map_err(from_rusqlite)?;
            Ok(())
        })
    }
}

fn resolve_snapshot_id(conn: &Connection, media_package_id: &str, version: Version) -> Result<i64> {
    let found: Option<i64> = match version.to_stored() {
        Ok(stored) => conn
            .query_row(
                "SELECT id FROM snapshot WHERE media_package_id = ?1 AND version = ?2",
                rusqlite::params![media_package_id, stored],
                |row| row.get(0),
            )
            .optional()
            .map_err(from_rusqlite)?,
        Err(_) => None,
    };
    found.ok_or_else(|| {
        ExError::new(ExErrorKind::NotFound)
            .with_media_package_id(media_package_id)
            .with_version(version.value())
            .with_message("snapshot not found")
    })
}
