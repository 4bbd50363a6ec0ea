//! Error types for invsync-exec

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while running a local program
#[derive(Error, Debug, Clone)]
pub enum ExecError {
    /// Program does not exist
    #[error("program not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Program exists but its owner cannot execute it
    #[error("file {} is not executable for the owner", .0.display())]
    NotExecutable(PathBuf),

    /// Command timed out
    #[error("command timed out after {timeout:?}")]
    Timeout {
        /// Timeout duration that was exceeded
        timeout: Duration,
    },

    /// Process spawn error
    #[error("failed to spawn process: {0}")]
    SpawnError(String),

    /// I/O error during execution
    #[error("I/O error: {0}")]
    IoError(String),
}
