//! Snapshot query operations.
//!
//! Lookups return `None` or an empty list when nothing matches; only
//! infrastructure and data-integrity failures are errors.

use crate::asset::select_assets;
use crate::db::Database;
use crate::errors::{from_rusqlite, Result};
use crate::snapshot::{SnapshotRow, SNAPSHOT_COLUMNS};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use snapvault_core::model::{Asset, Snapshot, Version};

/// A snapshot together with every asset it owns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotWithAssets {
    pub snapshot: Snapshot,
    pub assets: Vec<Asset>,
}

impl Database {
    /// Get one snapshot of a media package
    ///
    /// With `version` unset, returns the latest version.
    pub fn get_snapshot(
        &mut self,
        media_package_id: &str,
        version: Option<Version>,
    ) -> Result<Option<Snapshot>> {
        self.read("get_snapshot", |tx, _| {
            select_snapshot(tx, media_package_id, version)
        })
    }

    /// Get a snapshot and its assets, read from one consistent view
    pub fn get_snapshot_with_assets(
        &mut self,
        media_package_id: &str,
        version: Option<Version>,
    ) -> Result<Option<SnapshotWithAssets>> {
        self.read("get_snapshot_with_assets", |tx, _| {
            let Some(snapshot) = select_snapshot(tx, media_package_id, version)? else {
                return Ok(None);
            };
            let assets = select_assets(tx, snapshot.id)?;
            Ok(Some(SnapshotWithAssets { snapshot, assets }))
        })
    }

    /// All snapshots of a media package ordered by version
    pub fn list_snapshots(
        &mut self,
        media_package_id: &str,
        ascending: bool,
    ) -> Result<Vec<Snapshot>> {
        self.read("list_snapshots", |tx, _| {
            let order = if ascending { "ASC" } else { "DESC" };
            let sql = format!(
                "SELECT {} FROM snapshot s WHERE s.media_package_id = ?1 ORDER BY s.version {}",
                SNAPSHOT_COLUMNS, order
            );
            let mut stmt = tx.prepare(&sql).map_err(from_rusqlite)?;
            let rows = stmt
                .query_map([media_package_id], SnapshotRow::from_row)
                .map_err(from_rusqlite)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(from_rusqlite)?;
            rows.into_iter().map(SnapshotRow::into_snapshot).collect()
        })
    }

    /// Snapshots archived between `start` and `end`, both inclusive
    ///
    /// With `media_package_id` set only that package is listed. Rows are
    /// ordered by media package id, then by version in the requested
    /// direction. An inverted range lists nothing.
    pub fn list_snapshots_by_date(
        &mut self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        media_package_id: Option<&str>,
        ascending: bool,
    ) -> Result<Vec<Snapshot>> {
        let (start_ms, end_ms) = millis_range(start, end);
        self.read("list_snapshots_by_date", |tx, _| {
            let order = if ascending { "ASC" } else { "DESC" };
            let sql = format!(
                "SELECT {} FROM snapshot s
                 WHERE s.archival_date >= ?1 AND s.archival_date <= ?2
                   AND (?3 IS NULL OR s.media_package_id = ?3)
                 ORDER BY s.media_package_id ASC, s.version {}",
                SNAPSHOT_COLUMNS, order
            );
            let mut stmt = tx.prepare(&sql).map_err(from_rusqlite)?;
            let rows = stmt
                .query_map(
                    rusqlite::params![start_ms, end_ms, media_package_id],
                    SnapshotRow::from_row,
                )
                .map_err(from_rusqlite)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(from_rusqlite)?;
            rows.into_iter().map(SnapshotRow::into_snapshot).collect()
        })
    }

    /// Whether any snapshot exists for a media package
    pub fn snapshot_exists(&mut self, media_package_id: &str) -> Result<bool> {
        self.read("snapshot_exists", |tx, _| {
            exists(tx, media_package_id, None)
        })
    }

    /// Whether any snapshot exists for a media package within an organization
    pub fn snapshot_exists_in_organization(
        &mut self,
        media_package_id: &str,
        organization_id: &str,
    ) -> Result<bool> {
        self.read("snapshot_exists_in_organization", |tx, _| {
            exists(tx, media_package_id, Some(organization_id))
        })
    }

    /// Storage id currently holding one snapshot
    pub fn get_snapshot_storage_location(
        &mut self,
        version: Version,
        media_package_id: &str,
    ) -> Result<Option<String>> {
        self.read("get_snapshot_storage_location", |tx, _| {
            let Ok(version) = version.to_stored() else {
                return Ok(None);
            };
            tx.query_row(
                "SELECT storage_id FROM snapshot WHERE media_package_id = ?1 AND version = ?2",
                rusqlite::params![media_package_id, version],
                |row| row.get(0),
            )
            .optional()
            .map_err(from_rusqlite)
        })
    }

    /// Number of distinct media packages with snapshots in an organization
    pub fn count_media_packages(&mut self, organization_id: &str) -> Result<u64> {
        self.read("count_media_packages", |tx, _| {
            let count: i64 = tx
                .query_row(
                    "SELECT COUNT(DISTINCT media_package_id) FROM snapshot WHERE organization_id = ?1",
                    [organization_id],
                    |row| row.get(0),
                )
                .map_err(from_rusqlite)?;
            Ok(count.max(0) as u64)
        })
    }
}

/// Resolve one snapshot row; the latest version when `version` is unset
///
/// A version beyond the stored integer range matches nothing.
pub(crate) fn select_snapshot(
    conn: &Connection,
    media_package_id: &str,
    version: Option<Version>,
) -> Result<Option<Snapshot>> {
    let version = match version.map(|v| v.to_stored()).transpose() {
        Ok(version) => version,
        Err(_) => return Ok(None),
    };

    let row = match version {
        Some(version) => conn
            .query_row(
                &format!(
                    "SELECT {} FROM snapshot s WHERE s.media_package_id = ?1 AND s.version = ?2",
                    SNAPSHOT_COLUMNS
                ),
                rusqlite::params![media_package_id, version],
                SnapshotRow::from_row,
            )
            .optional(),
        None => conn
            .query_row(
                &format!(
                    "SELECT {} FROM snapshot s WHERE s.media_package_id = ?1 \
                     ORDER BY s.version DESC LIMIT 1",
                    SNAPSHOT_COLUMNS
                ),
                [media_package_id],
                SnapshotRow::from_row,
            )
            .optional(),
    }
    .map_err(from_rusqlite)?;

    row.map(SnapshotRow::into_snapshot).transpose()
}

/// Stored-millisecond bounds covering `[start, end]`
///
/// Archival dates are kept to the millisecond, so a start with a sub-ms
/// remainder rounds up and the end rounds down.
fn millis_range(start: DateTime<Utc>, end: DateTime<Utc>) -> (i64, i64) {
    let mut start_ms = start.timestamp_millis();
    if start.timestamp_subsec_nanos() % 1_000_000 != 0 {
        start_ms += 1;
    }
    (start_ms, end.timestamp_millis())
}

fn exists(conn: &Connection, media_package_id: &str, organization_id: Option<&str>) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS (
            SELECT 1 FROM snapshot
            WHERE media_package_id = ?1 AND (?2 IS NULL OR organization_id = ?2)
        )",
        rusqlite::params![media_package_id, organization_id],
        |row| row.get(0),
    )
    .map_err(from_rusqlite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_millis_range_rounds_inward() {
        let start = Utc.timestamp_nanos(1_000_500_000);
        let end = Utc.timestamp_nanos(2_000_500_000);
        assert_eq!(millis_range(start, end), (1_001, 2_000));

        let exact = Utc.timestamp_millis_opt(1_500).unwrap();
        assert_eq!(millis_range(exact, exact), (1_500, 1_500));
    }
}
