//! External process execution layer for aerial.
//!
//! This crate provides a uniform way to drive the command-line tools the
//! pipeline depends on:
//! - `Flags` renders an ordered flag map into command-line arguments
//! - `CommandRunner` abstracts over how an `Invocation` is executed
//! - `SystemRunner` runs it through `tokio::process` under a deadline

mod error;
mod flags;
mod runner;

pub use error::ExecError;
pub use flags::{DashStyle, Flag, Flags};
pub use runner::system::SystemRunner;
pub use runner::{CommandRunner, Invocation};

/// Result type for process execution.
pub type Result<T> = std::result::Result<T, ExecError>;
