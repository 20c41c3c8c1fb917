//! Snapshot store
//!
//! A snapshot is written together with all of its assets in one write
//! unit, so no reader ever sees a snapshot without its full asset set.

pub mod persist;
pub mod query;

use crate::errors::{corrupt_row, Result};
use chrono::{DateTime, TimeZone, Utc};
use snapvault_core::model::{Availability, Snapshot, Version};

pub use query::SnapshotWithAssets;

/// Column list matching [`SnapshotRow::from_row`]
pub(crate) const SNAPSHOT_COLUMNS: &str = "s.id, s.media_package_id, s.version, \
     s.organization_id, s.series_id, s.owner, s.archival_date, s.availability, \
     s.storage_id, s.media_package_body";

/// Raw snapshot row as stored
pub(crate) struct SnapshotRow {
    id: i64,
    media_package_id: String,
    version: i64,
    organization_id: String,
    series_id: Option<String>,
    owner: String,
    archival_date_ms: i64,
    availability: String,
    storage_id: String,
    package_body: String,
}

impl SnapshotRow {
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            media_package_id: row.get(1)?,
            version: row.get(2)?,
            organization_id: row.get(3)?,
            series_id: row.get(4)?,
            owner: row.get(5)?,
            archival_date_ms: row.get(6)?,
            availability: row.get(7)?,
            storage_id: row.get(8)?,
            package_body: row.get(9)?,
        })
    }

    /// Convert to the domain record, rejecting rows that break model invariants
    pub(crate) fn into_snapshot(self) -> Result<Snapshot> {
        let version = Version::from_stored(self.version)
            .map_err(|e| corrupt_row("snapshot", self.id, e))?;
        let availability = self
            .availability
            .parse::<Availability>()
            .map_err(|e| corrupt_row("snapshot", self.id, e))?;
        let archival_date = date_from_millis(self.archival_date_ms)
            .ok_or_else(|| corrupt_row("snapshot", self.id, "archival_date out of range"))?;

        Ok(Snapshot {
            id: self.id,
            media_package_id: self.media_package_id,
            version,
            organization_id: self.organization_id,
            series_id: self.series_id,
            owner: self.owner,
            archival_date,
            availability,
            storage_id: self.storage_id,
            package_body: self.package_body,
        })
    }
}

/// Convert stored milliseconds since the epoch
pub(crate) fn date_from_millis(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single()
}
