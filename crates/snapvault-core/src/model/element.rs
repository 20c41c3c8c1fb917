use super::{Checksum, MimeType};
use crate::errors::ValueError;
use serde::{Deserialize, Serialize};

/// One binary element of a media package, as handed to the snapshot store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementDescriptor {
    /// Media package element id, unique within one snapshot
    pub element_id: String,
    pub checksum: Checksum,
    #[serde(default)]
    pub mime_type: Option<MimeType>,
    /// Size in bytes
    pub size: u64,
}

impl ElementDescriptor {
    pub fn new(element_id: impl Into<String>, checksum: Checksum, size: u64) -> Self {
        Self {
            element_id: element_id.into(),
            checksum,
            mime_type: None,
            size,
        }
    }

    pub fn with_mime_type(mut self, mime_type: MimeType) -> Self {
        self.mime_type = Some(mime_type);
        self
    }

    pub fn validate(&self) -> Result<(), ValueError> {
        super::require_non_blank("element_id", &self.element_id)?;
        super::require_storable_size(self.size)
    }
}
