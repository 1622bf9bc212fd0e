//! Custom error types for trackmark.
//!
//! Only the state store touches disk, so every variant here describes a
//! storage or configuration failure. The progress calculator and the
//! propagation engine are total functions and never produce errors.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for trackmark operations
#[derive(Error, Debug)]
pub enum TrackError {
    // =========================================================================
    // State Errors
    // =========================================================================
    /// State about to be written failed structural validation
    #[error("Invalid tracking state for {source_path}: {reason}")]
    InvalidState { source_path: String, reason: String },

    /// Primary state file and its backup both failed to parse or validate
    #[error("Corrupt tracking state for {source_path} (file: {})", file.display())]
    CorruptState { source_path: String, file: PathBuf },

    /// Two source paths derived the same state filename
    #[error("State file {} belongs to {stored}, not {requested}", file.display())]
    PathCollision {
        requested: String,
        stored: String,
        file: PathBuf,
    },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Failed to load configuration
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    // =========================================================================
    // Wrapped Errors
    // =========================================================================
    /// IO error wrapper
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON error wrapper
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl TrackError {
    // =========================================================================
    // Constructor helpers
    // =========================================================================

    /// Create an invalid state error
    pub fn invalid_state(source_path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidState {
            source_path: source_path.into(),
            reason: reason.into(),
        }
    }

    /// Create a corrupt state error
    pub fn corrupt_state(source_path: impl Into<String>, file: PathBuf) -> Self {
        Self::CorruptState {
            source_path: source_path.into(),
            file,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            path: None,
        }
    }

    /// Create a configuration error with path
    pub fn config_with_path(message: impl Into<String>, path: PathBuf) -> Self {
        Self::Config {
            message: message.into(),
            path: Some(path),
        }
    }

    // =========================================================================
    // Classification helpers
    // =========================================================================

    /// Check if this error means tracking data may have been lost or
    /// would be clobbered. These must be surfaced, never retried.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidState { .. } | Self::CorruptState { .. } | Self::PathCollision { .. }
        )
    }

    /// Get error code for exit status
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidState { .. } => 2,
            Self::CorruptState { .. } => 3,
            Self::PathCollision { .. } => 4,
            Self::Config { .. } => 7,
            _ => 1,
        }
    }
}

/// Type alias for trackmark results
pub type Result<T> = std::result::Result<T, TrackError>;
