//! Error types for loadgate operations.
//!
//! This module defines [`GateError`], the error type used throughout the
//! crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - A missing identifier is a fatal configuration error: it is returned
//!   synchronously from activation and never retried
//! - Unreadiness is not an error; it is handled by polling
//! - A load that never completes raises nothing (see [`crate::poll`])
//! - Use `anyhow::Error` (via `GateError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for loadgate operations.
#[derive(Debug, Error)]
pub enum GateError {
    /// The dependency is not ready and no identifier was supplied to load it.
    #[error("An identifier is required to load the dependency")]
    MissingIdentifier,

    /// Activation needed timers but no tokio runtime was running.
    #[error("Activation requires a running tokio runtime")]
    NoRuntime,

    /// An endpoint or alternate address could not be parsed.
    #[error("Invalid address '{address}': {message}")]
    InvalidAddress { address: String, message: String },

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for loadgate operations.
pub type Result<T> = std::result::Result<T, GateError>;
