//! Domain model of the snapshot store
//!
//! Value objects (`Version`, `Checksum`, `MimeType`, `Availability`) and the
//! records persisted by the store (`Snapshot`, `Asset`, `Property`).

pub mod asset;
pub mod availability;
pub mod checksum;
pub mod element;
pub mod mime;
pub mod property;
pub mod snapshot;
pub mod version;

pub use asset::{Asset, AssetMatch};
pub use availability::Availability;
pub use checksum::Checksum;
pub use element::ElementDescriptor;
pub use mime::MimeType;
pub use property::{Property, PropertyId, PropertyValue};
pub use snapshot::{NewSnapshot, Snapshot};
pub use version::Version;

use crate::errors::ValueError;

/// Reject empty or whitespace-only identifiers
pub fn require_non_blank(field: &'static str, value: &str) -> Result<(), ValueError> {
    if value.trim().is_empty() {
        return Err(ValueError::BlankIdentifier { field });
    }
    Ok(())
}

/// Sizes are stored as signed 64-bit integers
pub fn require_storable_size(size: u64) -> Result<(), ValueError> {
    if i64::try_from(size).is_err() {
        return Err(ValueError::SizeOutOfRange { size });
    }
    Ok(())
}
