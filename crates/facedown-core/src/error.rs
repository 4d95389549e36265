//! Core error types for facedown-core.
//!
//! The session state machine itself never fails; these types cover the
//! edges around it: configuration on disk, device adapters and the async
//! runtime handle.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for facedown-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Device adapter errors
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    /// Session runtime errors
    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
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

    /// Key does not exist in the configuration
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Config directory could not be resolved or created
    #[error("Configuration directory unavailable: {0}")]
    DirUnavailable(String),
}

/// Errors reported by sensor, actuator and permission adapters.
///
/// The core never propagates these; they are logged and dropped at the
/// capability boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// Hardware is missing on this device
    #[error("{0} is not available on this device")]
    Unavailable(String),

    /// The user denied access
    #[error("Permission denied for {0}")]
    PermissionDenied(String),

    /// The hardware call itself failed
    #[error("Hardware failure: {0}")]
    Hardware(String),
}

/// Errors from the async session runtime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// The session task has exited and no longer accepts commands
    #[error("Session runtime has stopped")]
    Stopped,
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
