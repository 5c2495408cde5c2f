//! Error types for sentinel probe infrastructure.
//!
//! All errors implement `std::error::Error` via `thiserror`. Probe code
//! treats most of these as degraded-input conditions rather than failures:
//! the affected summary field stays zero and the probe continues.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for sentinel operations.
pub type SentinelResult<T> = Result<T, SentinelError>;

/// Errors that can occur while gathering or persisting probe data.
#[derive(Debug, Error)]
pub enum SentinelError {
    /// Failed to spawn an external collector process.
    #[error("Failed to spawn '{command}': {source}")]
    CommandSpawn {
        /// The command that failed to start.
        command: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Baseline file could not be read or written.
    #[error("Baseline I/O failed for {path}: {source}")]
    BaselineIo {
        /// The baseline file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Baseline file exists but does not carry a usable record.
    #[error("Baseline at {path} is not usable: {reason}")]
    BaselineFormat {
        /// The baseline file path.
        path: PathBuf,
        /// Short reason (short read, bad magic, unknown version).
        reason: String,
    },

    /// Internal error (unexpected state).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl SentinelError {
    /// Creates a baseline format error.
    pub fn baseline_format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::BaselineFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true when the error means an input is simply absent
    /// (collector binary missing, baseline not created yet). Absent input
    /// degrades to an empty result rather than aborting a probe.
    pub fn is_absent_input(&self) -> bool {
        match self {
            SentinelError::CommandSpawn { source, .. } => {
                source.kind() == io::ErrorKind::NotFound
            }
            SentinelError::BaselineIo { source, .. } => {
                source.kind() == io::ErrorKind::NotFound
            }
            _ => false,
        }
    }
}
