//! Media package serialization seam
//!
//! The store persists a package body as an opaque string. Callers plug in a
//! `PackageCodec` to turn their structured package into that string and
//! back, and to enumerate the elements that become assets.

use crate::errors::{ExError, ExErrorKind, Result};
use crate::model::ElementDescriptor;
use serde::{Deserialize, Serialize};

/// Serializer/deserializer for a structured media package
pub trait PackageCodec {
    type Package;

    fn media_package_id(&self, package: &Self::Package) -> String;

    fn series_id(&self, package: &Self::Package) -> Option<String>;

    /// Binary elements to persist as assets, one per element id
    fn elements(&self, package: &Self::Package) -> Vec<ElementDescriptor>;

    fn encode(&self, package: &Self::Package) -> Result<String>;

    fn decode(&self, body: &str) -> Result<Self::Package>;
}

/// Minimal structured media package description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub elements: Vec<ElementDescriptor>,
}

/// JSON codec for [`PackageManifest`]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPackageCodec;

impl PackageCodec for JsonPackageCodec {
    type Package = PackageManifest;

    fn media_package_id(&self, package: &PackageManifest) -> String {
        package.id.clone()
    }

    fn series_id(&self, package: &PackageManifest) -> Option<String> {
        package.series_id.clone()
    }

    fn elements(&self, package: &PackageManifest) -> Vec<ElementDescriptor> {
        package.elements.clone()
    }

    fn encode(&self, package: &PackageManifest) -> Result<String> {
        serde_json::to_string(package).map_err(|e| {
            ExError::new(ExErrorKind::Serialization)
                .with_op("encode_package")
                .with_media_package_id(package.id.clone())
                .with_message(format!("Failed to serialize package: {}", e))
        })
    }

    fn decode(&self, body: &str) -> Result<PackageManifest> {
        serde_json::from_str(body).map_err(|e| {
            ExError::new(ExErrorKind::Serialization)
                .with_op("decode_package")
                .with_message(format!("Invalid package body: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Checksum;

    #[test]
    fn test_json_codec_round_trip() {
        let package = PackageManifest {
            id: "mp-1".into(),
            series_id: Some("series-9".into()),
            title: Some("Lecture".into()),
            elements: vec![ElementDescriptor::new(
                "track-1",
                Checksum::parse("aa11").unwrap(),
                100,
            )],
        };
        let codec = JsonPackageCodec;
        let body = codec.encode(&package).unwrap();
        assert_eq!(codec.decode(&body).unwrap(), package);
        assert_eq!(codec.media_package_id(&package), "mp-1");
        assert_eq!(codec.elements(&package).len(), 1);
    }

    #[test]
    fn test_decode_garbage_is_serialization_error() {
        let err = JsonPackageCodec.decode("<xml/>").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Serialization);
    }
}
