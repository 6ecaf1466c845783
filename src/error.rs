//! Custom error types for Beacon.
//!
//! Parsing never fails: every parser is total over its input. Errors only
//! arise at the I/O boundary (configuration, directory enumeration, git), and
//! most of those are degraded to empty output by the scanner rather than
//! propagated.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for Beacon operations
#[derive(Error, Debug)]
pub enum BeaconError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Failed to load configuration
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    /// Root or project directory does not exist
    #[error("Directory does not exist: {path}")]
    MissingDirectory { path: PathBuf },

    // =========================================================================
    // Git Errors
    // =========================================================================
    /// git executable could not be located
    #[error("git executable not found on PATH")]
    GitUnavailable,

    /// Git operation failed
    #[error("Git operation failed: {operation} - {message}")]
    Git { operation: String, message: String },

    /// Git operation exceeded its time budget
    #[error("Git operation timed out after {}ms: {operation}", .timeout.as_millis())]
    GitTimeout { operation: String, timeout: Duration },

    /// Git produced more output than allowed
    #[error("Git output exceeded {limit} bytes: {operation}")]
    GitOutputTooLarge { operation: String, limit: usize },

    // =========================================================================
    // Wrapped Errors
    // =========================================================================
    /// IO error wrapper
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON error wrapper
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BeaconError {
    /// Create a configuration error with path
    pub fn config_with_path(message: impl Into<String>, path: PathBuf) -> Self {
        Self::Config {
            message: message.into(),
            path: Some(path),
        }
    }

    /// Create a git error
    pub fn git(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Git {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Check if the scanner should replace this error with empty output.
    ///
    /// History, commit log and remote lookups are best-effort. Anything else
    /// coming out of the history boundary fails the project's scan.
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            Self::GitUnavailable
                | Self::Git { .. }
                | Self::GitTimeout { .. }
                | Self::GitOutputTooLarge { .. }
        )
    }

    /// Get error code for exit status
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingDirectory { .. } => 6,
            Self::Config { .. } => 7,
            _ => 1,
        }
    }
}

/// Type alias for Beacon results
pub type Result<T> = std::result::Result<T, BeaconError>;
