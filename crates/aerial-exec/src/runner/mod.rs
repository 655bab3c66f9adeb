//! Command runner implementations.

pub mod system;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::{Flags, Result};

/// A fully described external tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Path or name of the binary.
    pub binary: PathBuf,
    /// Flags passed to the binary.
    pub flags: Flags,
    /// Working directory, if different from the current one.
    pub current_dir: Option<PathBuf>,
}

impl Invocation {
    /// Create an invocation of `binary` with the given flags.
    pub fn new(binary: impl Into<PathBuf>, flags: Flags) -> Self {
        Self {
            binary: binary.into(),
            flags,
            current_dir: None,
        }
    }

    /// Run the tool from a specific directory.
    pub fn in_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Rendered arguments.
    pub fn args(&self) -> Vec<OsString> {
        self.flags.to_args()
    }

    /// File name of the binary, used for logging and error messages.
    pub fn program(&self) -> String {
        self.binary
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.binary.display().to_string())
    }
}

/// Trait for executing external tools.
///
/// Implementations must suspend the calling task rather than block an OS
/// thread. The returned string is the tool's standard output.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the invocation to completion and return its standard output.
    async fn run(&self, invocation: &Invocation) -> Result<String>;
}
