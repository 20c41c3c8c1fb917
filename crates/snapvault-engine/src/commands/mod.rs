//! Command orchestration layer.
//!
//! Provides high-level command functions that coordinate the snapshot store
//! on behalf of a calling service.

pub mod relocate;
pub mod snapshot;

pub use relocate::{relocate_by_date, relocate_media_package};
pub use snapshot::{take_snapshot, DedupHint, SnapshotOutcome, SnapshotRequest};
