//! SnapVault Engine - Orchestration layer
//!
//! Coordinates the snapshot store on behalf of a calling service: taking
//! snapshots with a conflict retry policy, moving whole media packages
//! between storage backends, and loading layered settings.

pub mod commands;
pub mod config;

pub use config::{LoggingSettings, Settings, SnapshotPolicy};
