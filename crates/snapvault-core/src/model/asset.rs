use super::{Availability, Checksum, MimeType, Version};
use serde::{Deserialize, Serialize};

/// One persisted binary element of a snapshot
///
/// `snapshot_id` is a back-reference to the owning snapshot's surrogate key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: i64,
    pub snapshot_id: i64,
    pub element_id: String,
    pub checksum: Checksum,
    pub mime_type: Option<MimeType>,
    pub size: u64,
    pub storage_id: String,
}

/// An asset found by checksum, with the context of the snapshot holding it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMatch {
    pub asset: Asset,
    pub availability: Availability,
    pub organization_id: String,
    pub owner: String,
    pub media_package_id: String,
    pub version: Version,
}
