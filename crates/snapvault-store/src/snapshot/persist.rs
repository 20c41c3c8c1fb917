//! Snapshot persistence operations.
//!
//! Inserts one snapshot row and one asset row per element inside a single
//! write unit.

use crate::asset::insert_asset;
use crate::db::Database;
use crate::errors::{from_rusqlite, Result};
use crate::snapshot::date_from_millis;
use crate::version_claim::ensure_claimed;
use rusqlite::Transaction;
use snapvault_core::errors::{ExError, ExErrorKind};
use snapvault_core::model::{NewSnapshot, Snapshot};
use std::collections::HashSet;

impl Database {
    /// Persist a snapshot and all of its assets.
    ///
    /// The version must already have been handed out by
    /// [`claim_next_version`](Database::claim_next_version). Every asset
    /// starts on the snapshot's storage id.
    ///
    /// ## Returns
    ///
    /// The persisted snapshot including its surrogate id. The archival date
    /// is truncated to millisecond precision, as stored.
    ///
    /// ## Errors
    ///
    /// - `ExErrorKind::InvalidInput`: blank identifiers, oversized elements,
    ///   or duplicate element ids
    /// - `ExErrorKind::PreconditionFailed`: version never claimed
    /// - `ExErrorKind::Conflict`: a snapshot already exists for this version
    /// - `ExErrorKind::Persistence`: the write failed; nothing was stored
    pub fn save_snapshot(&mut self, snapshot: &NewSnapshot) -> Result<Snapshot> {
        snapshot.validate().map_err(|e| {
            ExError::from(e)
                .with_op("save_snapshot")
                .with_media_package_id(&snapshot.media_package_id)
        })?;
        reject_duplicate_elements(snapshot)?;

        let saved = self.write("save_snapshot", |tx, _| insert_snapshot(tx, snapshot))?;

        tracing::debug!(
            media_package_id = %saved.media_package_id,
            version = saved.version.value(),
            snapshot_id = saved.id,
            assets = snapshot.elements.len(),
            "Saved snapshot"
        );

        Ok(saved)
    }
}

fn reject_duplicate_elements(snapshot: &NewSnapshot) -> Result<()> {
    let mut seen = HashSet::new();
    for element in &snapshot.elements {
        if !seen.insert(element.element_id.as_str()) {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("save_snapshot")
                .with_media_package_id(&snapshot.media_package_id)
                .with_element_id(&element.element_id)
                .with_message("element id appears more than once"));
        }
    }
    Ok(())
}

fn insert_snapshot(tx: &Transaction<'_>, snapshot: &NewSnapshot) -> Result<Snapshot> {
    let media_package_id = snapshot.media_package_id.as_str();
    let version = snapshot.version;

    ensure_claimed(tx, media_package_id, version)?;

    let archival_date_ms = snapshot.archival_date.timestamp_millis();
    let archival_date = date_from_millis(archival_date_ms).ok_or_else(|| {
        ExError::new(ExErrorKind::InvalidInput)
            .with_media_package_id(media_package_id)
            .with_message("archival date out of range")
    })?;

    tx.execute(
        r#"
        INSERT INTO snapshot (
            media_package_id,
            version,
            organization_id,
            series_id,
            owner,
            archival_date,
            availability,
            storage_id,
            media_package_body
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
        rusqlite::params![
            media_package_id,
            version.to_stored()?,
            snapshot.organization_id,
            snapshot.series_id,
            snapshot.owner,
            archival_date_ms,
            snapshot.availability.as_str(),
            snapshot.storage_id,
            snapshot.package_body,
        ],
    )
    .map_err(|e| {
        let err = from_rusqlite(e)
            .with_media_package_id(media_package_id)
            .with_version(version.value());
        if err.kind() == ExErrorKind::Conflict {
            err.with_message(format!(
                "snapshot version {} of {} already exists",
                version, media_package_id
            ))
        } else {
            err
        }
    })?;

    let snapshot_id = tx.last_insert_rowid();

    for element in &snapshot.elements {
        insert_asset(tx, snapshot_id, element, &snapshot.storage_id).map_err(|e| {
            e.with_media_package_id(media_package_id)
                .with_version(version.value())
        })?;
    }

    Ok(Snapshot {
        id: snapshot_id,
        media_package_id: snapshot.media_package_id.clone(),
        version,
        organization_id: snapshot.organization_id.clone(),
        series_id: snapshot.series_id.clone(),
        owner: snapshot.owner.clone(),
        archival_date,
        availability: snapshot.availability,
        storage_id: snapshot.storage_id.clone(),
        package_body: snapshot.package_body.clone(),
    })
}
