//! Core error types for flowdeck-core.
//!
//! This module defines the error hierarchy using thiserror. Lifecycle and
//! argument violations are distinct from collaborator failures so callers
//! can map them to different user-visible outcomes.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for flowdeck-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A referenced session or pattern does not exist.
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    /// Operation attempted against a session in the wrong lifecycle state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Out-of-range or malformed input, rejected before any storage call.
    #[error("invalid argument for '{field}': {message}")]
    InvalidArgument { field: &'static str, message: String },

    /// Storage collaborator failure. Fatal for the current operation.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Text-generation collaborator failure or timeout. The pattern
    /// analyzer downgrades this to the empty-aggregate path; it only
    /// escapes when the summarizer is invoked outside analysis.
    #[error("summarizer error: {0}")]
    Summarizer(String),

    /// Configuration-related errors
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Stored row could not be decoded back into a domain value
    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    /// Data directory could not be determined or created
    #[error("Data directory unavailable: {0}")]
    DataDirUnavailable(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
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

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
