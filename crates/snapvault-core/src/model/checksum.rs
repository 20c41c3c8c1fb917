use crate::errors::ValueError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Content hash of an asset, as lowercase hexadecimal
///
/// Two assets with equal checksums are treated as having identical content,
/// which is what makes checksum lookups usable for deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Checksum(String);

impl Checksum {
    /// Parse a hex digest, normalising to lowercase
    pub fn parse(value: &str) -> Result<Self, ValueError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueError::EmptyChecksum);
        }
        if !trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValueError::NonHexChecksum {
                value: value.to_string(),
            });
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// SHA-256 digest of the given bytes
    pub fn sha256_of(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Checksum {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Checksum::parse(s)
    }
}

impl TryFrom<String> for Checksum {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Checksum::parse(&value)
    }
}

impl From<Checksum> for String {
    fn from(checksum: Checksum) -> Self {
        checksum.0
    }
}
