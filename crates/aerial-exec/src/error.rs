//! Error types for the execution layer.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while running an external tool.
#[derive(Error, Debug)]
pub enum ExecError {
    /// The binary could not be found.
    #[error("{binary} not found")]
    NotFound { binary: String },

    /// The process exited unsuccessfully.
    #[error("{binary} exited with {status}: {stderr}")]
    Failed {
        binary: String,
        status: String,
        stderr: String,
    },

    /// The process did not finish before the deadline and was killed.
    #[error("{binary} timed out after {after:?}")]
    Timeout { binary: String, after: Duration },

    /// Standard output was not valid UTF-8.
    #[error("{binary} produced non UTF-8 output")]
    InvalidOutput { binary: String },

    /// I/O error while spawning or waiting on the process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExecError {
    /// Whether this error was produced by the deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
