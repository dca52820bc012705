//! Core error types for lapwatch-core.
//!
//! Timer engine operations never fail; their preconditions are guarded
//! no-ops. Errors only arise at the edges: persistence I/O and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for lapwatch-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Snapshot persistence errors
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Snapshot persistence errors.
///
/// None of these are fatal: a failed write leaves the in-memory state as it
/// was, and a corrupt read is treated as "no snapshot".
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Writing the snapshot failed (quota, locked database, ...)
    #[error("Failed to save stopwatch state: {message}")]
    WriteFailed { message: String },

    /// The stored snapshot could not be decoded
    #[error("Stored stopwatch state is corrupt: {message}")]
    ReadCorrupt { message: String },

    /// Failed to open the backing database
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Underlying SQLite failure
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
