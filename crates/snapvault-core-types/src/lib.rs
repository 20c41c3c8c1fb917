//! Core types shared across SnapVault facilities
//!
//! This crate provides the canonical field keys and event names used by
//! the error and logging facilities.

pub mod schema;
