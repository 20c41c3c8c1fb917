//! Layered settings
//!
//! Sources, later ones overriding earlier ones:
//! 1. Bundled defaults (`snapvault.toml` compiled into the crate)
//! 2. A user TOML file (optional for [`Settings::load`], required for
//!    [`Settings::load_from`])
//! 3. Environment variables `SNAPVAULT__<SECTION>__<KEY>`

use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;
use snapvault_core::errors::{ExError, ExErrorKind, Result};
use snapvault_core::logging_facility::{self, Profile};
use snapvault_store::StoreConfig;
use std::path::Path;

const DEFAULT_CONFIG: &str = include_str!("../snapvault.toml");

/// Caller-side policy for taking snapshots
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SnapshotPolicy {
    /// Claim-and-save attempts before a retriable error is returned
    pub max_attempts: u32,
    /// Owner recorded when neither the request nor an earlier snapshot names one
    pub default_owner: String,
}

impl Default for SnapshotPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            default_owner: "system".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct LoggingSettings {
    pub profile: Profile,
}

/// Complete settings for a snapvault deployment
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub snapshot: SnapshotPolicy,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Load bundled defaults, `./snapvault.toml` if present, then the environment.
    ///
    /// # Errors
    ///
    /// `ExErrorKind::Config` when a source cannot be parsed or a value has
    /// the wrong type.
    pub fn load() -> Result<Self> {
        let builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::with_name("snapvault").required(false));
        Self::finish(builder)
    }

    /// Load bundled defaults, the given file, then the environment.
    ///
    /// # Errors
    ///
    /// `ExErrorKind::Config` when the file is missing or invalid.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path).required(true));
        Self::finish(builder).map_err(|e| {
            let message = format!("{} ({})", e.message(), path.display());
            e.with_message(message)
        })
    }

    /// Parse settings from TOML text layered over the bundled defaults
    ///
    /// The environment is not consulted.
    ///
    /// # Errors
    ///
    /// `ExErrorKind::Config` when the text is invalid.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(config_error)
    }

    /// Install the global subscriber for the configured profile
    pub fn init_logging(&self) {
        logging_facility::init(self.logging.profile);
    }

    fn finish(builder: ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let settings: Settings = builder
            .add_source(
                Environment::with_prefix("SNAPVAULT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(config_error)?;

        if settings.snapshot.max_attempts == 0 {
            return Err(ExError::new(ExErrorKind::Config)
                .with_op("load_settings")
                .with_message("snapshot.max_attempts must be at least 1"));
        }

        tracing::debug!(
            store_path = ?settings.store.path,
            dialect = ?settings.store.dialect,
            max_attempts = settings.snapshot.max_attempts,
            "Loaded settings"
        );

        Ok(settings)
    }
}

fn config_error(err: config::ConfigError) -> ExError {
    ExError::new(ExErrorKind::Config)
        .with_op("load_settings")
        .with_message(format!("Failed to load settings: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapvault_store::DialectChoice;

    #[test]
    fn test_bundled_defaults_parse() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings.store, StoreConfig::default());
        assert_eq!(settings.snapshot, SnapshotPolicy::default());
        assert_eq!(settings.logging.profile, Profile::Development);
    }

    #[test]
    fn test_overrides_layer_over_defaults() {
        let settings = Settings::from_toml_str(
            r#"
            [store]
            dialect = "classic"

            [snapshot]
            default_owner = "archivist"
            "#,
        )
        .unwrap();
        assert_eq!(settings.store.dialect, DialectChoice::Classic);
        assert_eq!(settings.store.busy_timeout_ms, 5000);
        assert_eq!(settings.snapshot.default_owner, "archivist");
        assert_eq!(settings.snapshot.max_attempts, 3);
    }

    #[test]
    fn test_bad_value_is_config_error() {
        let err = Settings::from_toml_str("[store]\ndialect = \"oracle\"\n").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Config);
    }
}
