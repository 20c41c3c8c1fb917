//! Move snapshots to another storage backend, by media package or by
//! archival date.

use chrono::{DateTime, Utc};
use snapvault_core::errors::{ExError, ExErrorKind};
use snapvault_core::model::Version;
use snapvault_core::{log_op_end, log_op_error, log_op_start};
use snapvault_store::{Database, Result};
use std::time::Instant;

/// Point every snapshot of a media package (and its assets) at `storage_id`.
///
/// Versions already on the target are skipped. Each version moves in its
/// own write unit, so a failure part way leaves earlier versions moved and
/// the rest untouched; calling again finishes the job.
///
/// ## Returns
///
/// The versions that were moved, ascending
///
/// ## Errors
///
/// - `ExErrorKind::NotFound`: the media package has no snapshots
pub fn relocate_media_package(
    db: &mut Database,
    media_package_id: &str,
    storage_id: &str,
) -> Result<Vec<Version>> {
    log_op_start!("relocate_media_package", media_package_id = media_package_id);
    let start = Instant::now();

    let moved = relocate_impl(db, media_package_id, storage_id).map_err(|e| {
        log_op_error!(
            "relocate_media_package",
            &e,
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "relocate_media_package",
        duration_ms = start.elapsed().as_millis() as u64,
        moved = moved.len()
    );
    Ok(moved)
}

fn relocate_impl(db: &mut Database, media_package_id: &str, storage_id: &str) -> Result<Vec<Version>> {
    let snapshots = db.list_snapshots(media_package_id, true)?;
    if snapshots.is_empty() {
        return Err(ExError::new(ExErrorKind::NotFound)
            .with_op("relocate_media_package")
            .with_media_package_id(media_package_id)
            .with_message("media package has no snapshots"));
    }

    let mut moved = Vec::new();
    for snapshot in snapshots.iter().filter(|s| s.storage_id != storage_id) {
        db.set_storage_location(snapshot.version, media_package_id, storage_id)?;
        moved.push(snapshot.version);
    }
    Ok(moved)
}

/// Point every snapshot archived in `[start, end]` (and its assets) at
/// `storage_id`.
///
/// With `media_package_id` set only that package moves. Snapshots already
/// on the target are skipped, and each one moves in its own write unit.
///
/// ## Returns
///
/// The (media package id, version) pairs that were moved, ordered by
/// package then version
///
/// ## Errors
///
/// - `ExErrorKind::NotFound`: across all packages, nothing in the range
///   needs moving; for one package, it has no snapshot in the range
pub fn relocate_by_date(
    db: &mut Database,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    media_package_id: Option<&str>,
    storage_id: &str,
) -> Result<Vec<(String, Version)>> {
    log_op_start!(
        "relocate_by_date",
        media_package_id = media_package_id.unwrap_or("*"),
        start = %start,
        end = %end
    );
    let timer = Instant::now();

    let moved =
        relocate_by_date_impl(db, start, end, media_package_id, storage_id).map_err(|e| {
            log_op_error!(
                "relocate_by_date",
                &e,
                duration_ms = timer.elapsed().as_millis() as u64
            );
            e
        })?;

    log_op_end!(
        "relocate_by_date",
        duration_ms = timer.elapsed().as_millis() as u64,
        moved = moved.len()
    );
    Ok(moved)
}

fn relocate_by_date_impl(
    db: &mut Database,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    media_package_id: Option<&str>,
    storage_id: &str,
) -> Result<Vec<(String, Version)>> {
    let in_range = db.list_snapshots_by_date(start, end, media_package_id, true)?;
    let pending: Vec<_> = in_range
        .iter()
        .filter(|s| s.storage_id != storage_id)
        .collect();

    let nothing_found = match media_package_id {
        Some(_) => in_range.is_empty(),
        None => pending.is_empty(),
    };
    if nothing_found {
        let mut err = ExError::new(ExErrorKind::NotFound)
            .with_op("relocate_by_date")
            .with_message(format!("no snapshots archived between {} and {}", start, end));
        if let Some(media_package_id) = media_package_id {
            err = err.with_media_package_id(media_package_id);
        }
        return Err(err);
    }

    let mut moved = Vec::with_capacity(pending.len());
    for snapshot in pending {
        db.set_storage_location(snapshot.version, &snapshot.media_package_id, storage_id)?;
        moved.push((snapshot.media_package_id.clone(), snapshot.version));
    }
    Ok(moved)
}
