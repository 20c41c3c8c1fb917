//! Logging initialization module
//!
//! Provides a single initialization point for the logging facility.

use serde::Deserialize;
use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Human-readable output for development
    #[default]
    Development,
    /// JSON structured output for production
    Production,
    /// Test capture mode for deterministic testing
    Test,
}

static INIT_ONCE: Once = Once::new();

/// Initialize the logging facility
///
/// This function should be called once at application startup. Later calls
/// are ignored, whatever profile they name.
///
/// # Profiles
///
/// - **Development**: Human-readable logs with debug level
/// - **Production**: JSON structured logs with info level
/// - **Test**: Bare registry; use `init_test_capture()` to collect events
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| match profile {
        Profile::Development => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("snapvault=debug")),
                )
                .try_init();
        }
        Profile::Production => {
            let _ = tracing_subscriber::fmt()
                .json()
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("snapvault=info")),
                )
                .try_init();
        }
        Profile::Test => {
            let _ = tracing_subscriber::registry().try_init();
        }
    });
}
