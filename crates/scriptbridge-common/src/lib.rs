//! Common types, errors, and configuration for scriptbridge.
//!
//! This crate provides shared functionality used across the scriptbridge workspace:
//! - Error types using `thiserror` for type-safe error handling
//! - Configuration structures for the embedded runtime

pub mod config;
pub mod error;

pub use config::{BridgeConfig, DEFAULT_HOME, HOME_ENV_VAR};
pub use error::{BridgeError, HostFault};
