//! SnapVault Store - versioned snapshot persistence on SQLite
//!
//! Provides:
//! - Migration framework with checksums and unknown-migration detection
//! - Dialect detection and the transaction coordinator (`Database::read`/`write`)
//! - Version claim ledger
//! - Snapshot and asset persistence with content-addressable lookup
//! - Storage-location relocation and availability updates
//! - Namespaced, typed property store

mod asset;
pub mod config;
pub mod db;
pub mod dialect;
pub mod errors;
pub mod migrations;
mod property;
mod relocation;
pub mod snapshot;
mod tx;
mod version_claim;

// Re-export key types
pub use config::{DialectChoice, StoreConfig};
pub use db::Database;
pub use dialect::Dialect;
pub use errors::Result;
pub use snapshot::SnapshotWithAssets;
