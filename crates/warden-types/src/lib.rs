//! Shared error hierarchy for Warden.

pub mod error;

pub use error::{ConfigError, PermissionError, WardenError};
