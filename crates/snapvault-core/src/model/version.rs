use crate::errors::ValueError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Version number of a media package snapshot
///
/// Versions are unique within a media package, handed out in strictly
/// increasing order by the version claim ledger, and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(u64);

impl Version {
    /// The first version ever claimed for a media package
    pub const FIRST: Version = Version(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// The version following this one
    pub fn next(&self) -> Version {
        Version(self.0 + 1)
    }

    /// Convert from the stored `INTEGER` column
    pub fn from_stored(value: i64) -> Result<Self, ValueError> {
        u64::try_from(value)
            .map(Version)
            .map_err(|_| ValueError::InvalidVersion {
                value: value.to_string(),
            })
    }

    /// Convert to the stored `INTEGER` column
    pub fn to_stored(&self) -> Result<i64, ValueError> {
        i64::try_from(self.0).map_err(|_| ValueError::InvalidVersion {
            value: self.0.to_string(),
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Version {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Version)
            .map_err(|_| ValueError::InvalidVersion {
                value: s.to_string(),
            })
    }
}

impl From<u64> for Version {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
