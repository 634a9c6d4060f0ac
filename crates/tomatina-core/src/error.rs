//! Core error types for tomatina-core.
//!
//! Calendar-arithmetic failures are deliberately absent: the timer recovers
//! from them locally by forcing the phase back to idle, so they never
//! surface as errors.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for tomatina-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Periodic-signal errors
    #[error("Signal error: {0}")]
    Signal(#[from] SignalError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Periodic-signal errors.
///
/// Acquisition failure is fatal for the subscription that hit it; there is
/// no degraded mode.
#[derive(Error, Debug)]
pub enum SignalError {
    /// Failed to acquire the platform tick primitive
    #[error("Failed to acquire tick source: {0}")]
    Acquire(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
