//! Core error types for deepwork-core.
//!
//! Nothing in the engines is fatal: these errors surface from the storage
//! backends, configuration loading and completion hooks, and the engines log
//! them and fall back to a documented default.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for deepwork-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Durable store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

}

/// Durable state store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked by another process
    #[error("Store is locked")]
    Locked,

    /// A stored record could not be encoded
    #[error("Failed to encode record '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Backend-specific failure that has no better category
    #[error("{0}")]
    Backend(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Failures reported by completion side effects.
#[derive(Error, Debug)]
pub enum HookError {
    /// IO failure while emitting the side effect
    #[error("{hook} failed: {source}")]
    Io {
        hook: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseLocked
                    || inner.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_wraps_into_core_error() {
        let err: CoreError = StoreError::Locked.into();
        assert_eq!(err.to_string(), "Store error: Store is locked");
    }

    #[test]
    fn config_error_wraps_into_core_error() {
        let err: CoreError = ConfigError::UnknownKey("poll.rate".into()).into();
        assert_eq!(err.to_string(), "Configuration error: Unknown config key: poll.rate");
    }

    #[test]
    fn hook_error_names_the_hook() {
        let err = HookError::Io {
            hook: "alarm".into(),
            source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"),
        };
        assert_eq!(err.to_string(), "alarm failed: closed");
    }

    #[test]
    fn unrelated_sqlite_errors_become_query_failures() {
        let err = StoreError::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(matches!(err, StoreError::QueryFailed(_)));
    }
}
