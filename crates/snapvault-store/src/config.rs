//! Store configuration
//!
//! Plain serde structs; layered loading (bundled defaults, user file,
//! environment) is done by `snapvault-engine`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which dialect strategy to use for a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectChoice {
    /// Pick from the detected engine version
    #[default]
    Auto,
    /// Force single-statement `RETURNING` upserts
    Returning,
    /// Force select-then-write statements
    Classic,
}

/// Connection settings for the snapshot store
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file; `None` opens a private in-memory database
    pub path: Option<PathBuf>,
    /// How long a writer waits for the database lock before failing
    pub busy_timeout_ms: u64,
    /// Use write-ahead logging (ignored for in-memory databases)
    pub wal: bool,
    pub dialect: DialectChoice,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: 5_000,
            wal: true,
            dialect: DialectChoice::Auto,
        }
    }
}

impl StoreConfig {
    /// File-backed configuration with default settings
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn with_dialect(mut self, dialect: DialectChoice) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_busy_timeout_ms(mut self, ms: u64) -> Self {
        self.busy_timeout_ms = ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = StoreConfig::default();
        assert!(c.path.is_none());
        assert!(c.wal);
        assert_eq!(c.dialect, DialectChoice::Auto);
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let c: StoreConfig =
            serde_json::from_str(r#"{"path":"/tmp/x.db","dialect":"classic"}"#).unwrap();
        assert_eq!(c.path, Some(PathBuf::from("/tmp/x.db")));
        assert_eq!(c.dialect, DialectChoice::Classic);
        assert_eq!(c.busy_timeout_ms, 5_000);
    }
}
