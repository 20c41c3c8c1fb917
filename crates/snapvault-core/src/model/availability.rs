use crate::errors::ValueError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether a snapshot's content is currently reachable
///
/// The store enforces no transition graph; any state may be written over any
/// other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Availability {
    Online,
    Offline,
}

impl Availability {
    /// Stored column text
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Online => "ONLINE",
            Availability::Offline => "OFFLINE",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Availability {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ONLINE" => Ok(Availability::Online),
            "OFFLINE" => Ok(Availability::Offline),
            other => Err(ValueError::UnknownAvailability {
                value: other.to_string(),
            }),
        }
    }
}
