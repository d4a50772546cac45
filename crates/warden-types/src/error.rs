//! Error hierarchy for Warden.

use thiserror::Error;

/// Top-level error type for all Warden operations.
#[derive(Debug, Error)]
pub enum WardenError {
    #[error("Invalid permission: {0}")]
    Permission(#[from] PermissionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Permission denied: '{subject}' lacks '{required}'")]
    Denied { subject: String, required: String },
}

/// Errors from parsing permission strings and grant patterns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionError {
    #[error("permission string is empty")]
    Empty,

    #[error("'{value}' contains an empty segment")]
    EmptySegment { value: String },

    #[error("'{value}' has a wildcard inside a segment")]
    EmbeddedWildcard { value: String },

    #[error("'{value}' has a wildcard segment before the last position")]
    MisplacedWildcard { value: String },

    #[error("required permission '{value}' must not contain a wildcard")]
    WildcardInRequired { value: String },
}

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file parse error at {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
