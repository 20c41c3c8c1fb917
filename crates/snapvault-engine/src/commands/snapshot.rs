//! Take-snapshot orchestration with conflict retry.
//!
//! ## Pipeline (in order):
//! 1. Encode the package and list its elements (no writes on failure)
//! 2. First snapshot of a package: drop leftover properties
//! 3. Resolve the owner (request, then latest snapshot, then policy default)
//! 4. Look up deduplication hints for every element
//! 5. Claim a version and save; a retriable error from either step starts
//!    a new attempt, up to `SnapshotPolicy::max_attempts`

use crate::config::SnapshotPolicy;
use chrono::{DateTime, Utc};
use snapvault_core::errors::ExError;
use snapvault_core::model::{AssetMatch, Availability, NewSnapshot, Snapshot};
use snapvault_core::{log_op_end, log_op_error, log_op_start, PackageCodec};
use snapvault_store::{Database, Result};
use std::time::Instant;

/// Caller-supplied attributes of a new snapshot
#[derive(Debug, Clone)]
pub struct SnapshotRequest {
    pub organization_id: String,
    /// `None` keeps the owner of the latest snapshot
    pub owner: Option<String>,
    pub storage_id: String,
    pub availability: Availability,
    /// `None` stamps the current time
    pub archival_date: Option<DateTime<Utc>>,
}

impl SnapshotRequest {
    pub fn new(organization_id: impl Into<String>, storage_id: impl Into<String>) -> Self {
        Self {
            organization_id: organization_id.into(),
            owner: None,
            storage_id: storage_id.into(),
            availability: Availability::Online,
            archival_date: None,
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }
}

/// An element whose content already exists on the target backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupHint {
    pub element_id: String,
    pub existing: AssetMatch,
}

/// Result of a successful take-snapshot
#[derive(Debug, Clone)]
pub struct SnapshotOutcome {
    pub snapshot: Snapshot,
    /// Claim-and-save attempts used, at least 1
    pub attempts: u32,
    /// Elements the caller does not need to upload again
    pub dedup_hints: Vec<DedupHint>,
}

/// Persist a new version of a media package.
///
/// ## Errors
///
/// - `ExErrorKind::Serialization`: the codec could not encode the package
/// - `ExErrorKind::Conflict` / `ExErrorKind::Concurrency`: still failing
///   after `policy.max_attempts` attempts
/// - Any non-retriable store error, returned on the first occurrence
pub fn take_snapshot<C: PackageCodec>(
    db: &mut Database,
    codec: &C,
    package: &C::Package,
    request: &SnapshotRequest,
    policy: &SnapshotPolicy,
) -> Result<SnapshotOutcome> {
    let media_package_id = codec.media_package_id(package);
    log_op_start!("take_snapshot", media_package_id = %media_package_id);
    let start = Instant::now();

    let outcome = take_snapshot_impl(db, codec, package, request, policy, &media_package_id)
        .map_err(|e| {
            log_op_error!(
                "take_snapshot",
                &e,
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

    log_op_end!(
        "take_snapshot",
        duration_ms = start.elapsed().as_millis() as u64,
        version = outcome.snapshot.version.value(),
        attempts = outcome.attempts
    );
    Ok(outcome)
}

fn take_snapshot_impl<C: PackageCodec>(
    db: &mut Database,
    codec: &C,
    package: &C::Package,
    request: &SnapshotRequest,
    policy: &SnapshotPolicy,
    media_package_id: &str,
) -> Result<SnapshotOutcome> {
    let package_body = codec.encode(package)?;
    let elements = codec.elements(package);

    let latest = db.get_snapshot(media_package_id, None)?;
    if latest.is_none() {
        let removed = db.delete_properties(media_package_id, None)?;
        if removed > 0 {
            tracing::debug!(
                media_package_id,
                removed,
                "Removed properties left from an earlier package"
            );
        }
    }

    let owner = request
        .owner
        .clone()
        .or_else(|| latest.map(|s| s.owner))
        .unwrap_or_else(|| policy.default_owner.clone());

    let mut dedup_hints = Vec::new();
    for element in &elements {
        if let Some(existing) = db.find_asset_by_checksum_and_store_and_org(
            element.checksum.as_str(),
            &request.storage_id,
            &request.organization_id,
        )? {
            dedup_hints.push(DedupHint {
                element_id: element.element_id.clone(),
                existing,
            });
        }
    }

    let max_attempts = policy.max_attempts.max(1);
    let mut attempts = 0;
    loop {
        attempts += 1;
        let saved = db.claim_next_version(media_package_id).and_then(|version| {
            db.save_snapshot(&NewSnapshot {
                media_package_id: media_package_id.to_string(),
                series_id: codec.series_id(package),
                organization_id: request.organization_id.clone(),
                owner: owner.clone(),
                package_body: package_body.clone(),
                elements: elements.clone(),
                archival_date: request.archival_date.unwrap_or_else(Utc::now),
                version,
                availability: request.availability,
                storage_id: request.storage_id.clone(),
            })
        });

        match saved {
            Ok(snapshot) => {
                return Ok(SnapshotOutcome {
                    snapshot,
                    attempts,
                    dedup_hints,
                })
            }
            Err(e) if e.is_retriable() && attempts < max_attempts => {
                tracing::warn!(
                    media_package_id,
                    attempt = attempts,
                    failed_op = e.op().unwrap_or("unknown"),
                    err_code = e.code(),
                    "Snapshot attempt failed, claiming a new version"
                );
            }
            Err(e) if e.is_retriable() => {
                let mut exhausted = ExError::new(e.kind())
                    .with_op("take_snapshot")
                    .with_media_package_id(media_package_id)
                    .with_message(format!(
                        "gave up after {} attempts: {}",
                        attempts,
                        e.message()
                    ));
                if let Some(version) = e.version() {
                    exhausted = exhausted.with_version(version);
                }
                return Err(exhausted);
            }
            Err(e) => return Err(e),
        }
    }
}
