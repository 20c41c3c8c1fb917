use super::{Availability, ElementDescriptor, Version};
use crate::errors::ValueError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An immutable, versioned copy of a media package
///
/// Only `availability` and `storage_id` change after creation, and only
/// through the relocation operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Surrogate key assigned on insert
    pub id: i64,
    pub media_package_id: String,
    pub version: Version,
    pub organization_id: String,
    pub series_id: Option<String>,
    pub owner: String,
    pub archival_date: DateTime<Utc>,
    pub availability: Availability,
    /// Storage backend currently holding this snapshot's assets
    pub storage_id: String,
    /// Serialized media package, opaque to the store
    pub package_body: String,
}

/// Everything needed to persist a new snapshot and its assets
///
/// `version` must already have been claimed for `media_package_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSnapshot {
    pub media_package_id: String,
    pub series_id: Option<String>,
    pub organization_id: String,
    pub owner: String,
    pub package_body: String,
    pub elements: Vec<ElementDescriptor>,
    pub archival_date: DateTime<Utc>,
    pub version: Version,
    pub availability: Availability,
    pub storage_id: String,
}

impl NewSnapshot {
    /// Check identifiers and element sizes before touching storage
    pub fn validate(&self) -> Result<(), ValueError> {
        super::require_non_blank("media_package_id", &self.media_package_id)?;
        super::require_non_blank("organization_id", &self.organization_id)?;
        super::require_non_blank("owner", &self.owner)?;
        super::require_non_blank("storage_id", &self.storage_id)?;
        self.elements.iter().try_for_each(ElementDescriptor::validate)
    }
}
