//! medium-common: shared plumbing for the editable medium crates.
//!
//! - `error`: `MediumError` and friends (thiserror + miette)
//! - `cache`: non-expiring cache over mini-moka-wasm
//! - `config`: file-backed host configuration
//! - `telemetry`: tracing subscriber setup (feature `telemetry`)

#[cfg(feature = "cache")]
pub mod cache;
pub mod config;
pub mod error;
#[cfg(feature = "telemetry")]
pub mod telemetry;

pub use crate::config::Config;
pub use crate::error::{MediumError, SchemaError, SerDeError};
