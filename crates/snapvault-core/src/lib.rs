//! SnapVault Core - domain model and shared facilities
//!
//! This crate provides:
//! - Value objects for versions, checksums, MIME types and availability
//! - Snapshot, asset and property records persisted by `snapvault-store`
//! - The canonical `ExError` error facility
//! - The structured logging facility and its operation-boundary macros
//! - The `PackageCodec` seam for opaque media package bodies

pub mod codec;
pub mod errors;
pub mod logging_facility;
pub mod model;

#[doc(hidden)]
pub use snapvault_core_types as core_types;

// Re-export commonly used types
pub use codec::{JsonPackageCodec, PackageCodec, PackageManifest};
pub use errors::{ExError, ExErrorKind, Result, ValueError};
pub use model::{
    Asset, AssetMatch, Availability, Checksum, ElementDescriptor, MimeType, NewSnapshot,
    Property, PropertyId, PropertyValue, Snapshot, Version,
};
