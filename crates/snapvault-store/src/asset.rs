//! Asset store
//!
//! Assets are only written as part of a snapshot save. Reads resolve one
//! asset by owning identifiers or by content checksum.

use crate::db::Database;
use crate::errors::{corrupt_row, from_rusqlite, Result};
use rusqlite::{Connection, OptionalExtension};
use snapvault_core::errors::{ExError, ValueError};
use snapvault_core::model::{
    Asset, AssetMatch, Availability, Checksum, ElementDescriptor, MimeType, Version,
};

const ASSET_COLUMNS: &str = "a.id, a.snapshot_id, a.media_package_element_id, a.checksum, \
     a.mime_type, a.size, a.storage_id";

/// Insert one asset row; runs inside the snapshot's write unit
pub(crate) fn insert_asset(
    conn: &Connection,
    snapshot_id: i64,
    element: &ElementDescriptor,
    storage_id: &str,
) -> Result<Asset> {
    let size = i64::try_from(element.size).map_err(|_| {
        ExError::from(ValueError::SizeOutOfRange { size: element.size })
            .with_element_id(&element.element_id)
    })?;

    conn.execute(
        r#"
        INSERT INTO asset (
            snapshot_id,
            media_package_element_id,
            checksum,
            mime_type,
            size,
            storage_id
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        rusqlite::params![
            snapshot_id,
            element.element_id,
            element.checksum.as_str(),
            element.mime_type.as_ref().map(|m| m.to_string()),
            size,
            storage_id,
        ],
    )
    .map_err(|e| from_rusqlite(e).with_element_id(&element.element_id))?;

    Ok(Asset {
        id: conn.last_insert_rowid(),
        snapshot_id,
        element_id: element.element_id.clone(),
        checksum: element.checksum.clone(),
        mime_type: element.mime_type.clone(),
        size: element.size,
        storage_id: storage_id.to_string(),
    })
}

/// All assets of one snapshot in insertion order
pub(crate) fn select_assets(conn: &Connection, snapshot_id: i64) -> Result<Vec<Asset>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {} FROM asset a WHERE a.snapshot_id = ?1 ORDER BY a.id",
            ASSET_COLUMNS
        ))
        .map_err(from_rusqlite)?;
    let rows = stmt
        .query_map([snapshot_id], AssetRow::from_row)
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;
    rows.into_iter().map(AssetRow::into_asset).collect()
}

impl Database {
    /// Get one asset of a media package
    ///
    /// With `version` unset, the asset is taken from the latest version that
    /// contains the element.
    pub fn get_asset(
        &mut self,
        media_package_id: &str,
        element_id: &str,
        version: Option<Version>,
    ) -> Result<Option<Asset>> {
        self.read("get_asset", |tx, _| {
            let Ok(version) = version.map(|v| v.to_stored()).transpose() else {
                return Ok(None);
            };
            let row = tx
                .query_row(
                    &format!(
                        "SELECT {} FROM asset a JOIN snapshot s ON s.id = a.snapshot_id
                         WHERE s.media_package_id = ?1
                           AND a.media_package_element_id = ?2
                           AND (?3 IS NULL OR s.version = ?3)
                         ORDER BY s.version DESC
                         LIMIT 1",
                        ASSET_COLUMNS
                    ),
                    rusqlite::params![media_package_id, element_id, version],
                    AssetRow::from_row,
                )
                .optional()
                .map_err(from_rusqlite)?;
            row.map(AssetRow::into_asset).transpose()
        })
    }

    /// Find any asset with the given content checksum
    ///
    /// Several snapshots may share a checksum; the earliest stored asset
    /// wins. Text that is not a hex digest matches nothing.
    pub fn find_asset_by_checksum(&mut self, checksum: &str) -> Result<Option<AssetMatch>> {
        self.find_by_checksum("find_asset_by_checksum", checksum, None, None)
    }

    /// Find an asset with the given checksum on one storage backend
    pub fn find_asset_by_checksum_and_store(
        &mut self,
        checksum: &str,
        storage_id: &str,
    ) -> Result<Option<AssetMatch>> {
        self.find_by_checksum(
            "find_asset_by_checksum_and_store",
            checksum,
            Some(storage_id),
            None,
        )
    }

    /// Find an asset with the given checksum on one backend within one organization
    pub fn find_asset_by_checksum_and_store_and_org(
        &mut self,
        checksum: &str,
        storage_id: &str,
        organization_id: &str,
    ) -> Result<Option<AssetMatch>> {
        self.find_by_checksum(
            "find_asset_by_checksum_and_store_and_org",
            checksum,
            Some(storage_id),
            Some(organization_id),
        )
    }

    fn find_by_checksum(
        &mut self,
        op: &'static str,
        checksum: &str,
        storage_id: Option<&str>,
        organization_id: Option<&str>,
    ) -> Result<Option<AssetMatch>> {
        let Ok(checksum) = Checksum::parse(checksum) else {
            return Ok(None);
        };

        self.read(op, |tx, _| {
            let found = tx
                .query_row(
                    &format!(
                        "SELECT {}, s.availability, s.organization_id, s.owner,
                                s.media_package_id, s.version
                         FROM asset a JOIN snapshot s ON s.id = a.snapshot_id
                         WHERE a.checksum = ?1
                           AND (?2 IS NULL OR a.storage_id = ?2)
                           AND (?3 IS NULL OR s.organization_id = ?3)
                         ORDER BY a.id
                         LIMIT 1",
                        ASSET_COLUMNS
                    ),
                    rusqlite::params![checksum.as_str(), storage_id, organization_id],
                    |row| {
                        Ok((
                            AssetRow::from_row(row)?,
                            row.get::<_, String>(7)?,
                            row.get::<_, String>(8)?,
                            row.get::<_, String>(9)?,
                            row.get::<_, String>(10)?,
                            row.get::<_, i64>(11)?,
                        ))
                    },
                )
                .optional()
                .map_err(from_rusqlite)?;

            let Some((asset, availability, organization_id, owner, media_package_id, version)) =
                found
            else {
                return Ok(None);
            };

            let asset = asset.into_asset()?;
            let availability = availability
                .parse::<Availability>()
                .map_err(|e| corrupt_row("snapshot", asset.snapshot_id, e))?;
            let version = Version::from_stored(version)
                .map_err(|e| corrupt_row("snapshot", asset.snapshot_id, e))?;

            Ok(Some(AssetMatch {
                asset,
                availability,
                organization_id,
                owner,
                media_package_id,
                version,
            }))
        })
    }
}

/// Raw asset row as stored
struct AssetRow {
    id: i64,
    snapshot_id: i64,
    element_id: String,
    checksum: String,
    mime_type: Option<String>,
    size: i64,
    storage_id: String,
}

impl AssetRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            snapshot_id: row.get(1)?,
            element_id: row.get(2)?,
            checksum: row.get(3)?,
            mime_type: row.get(4)?,
            size: row.get(5)?,
            storage_id: row.get(6)?,
        })
    }

    fn into_asset(self) -> Result<Asset> {
        let checksum = Checksum::parse(&self.checksum).map_err(|e| corrupt_row("asset", self.id, e))?;
        let mime_type = self
            .mime_type
            .as_deref()
            .map(MimeType::parse)
            .transpose()
            .map_err(|e| corrupt_row("asset", self.id, e))?;
        let size = u64::try_from(self.size)
            .map_err(|_| corrupt_row("asset", self.id, format!("negative size {}", self.size)))?;

        Ok(Asset {
            id: self.id,
            snapshot_id: self.snapshot_id,
            element_id: self.element_id,
            checksum,
            mime_type,
            size,
            storage_id: self.storage_id,
        })
    }
}
