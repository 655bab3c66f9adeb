//! Runner backed by `tokio::process`.

use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, trace, warn};

use super::{CommandRunner, Invocation};
use crate::{ExecError, Result};

/// Runs tools as child processes.
///
/// With a deadline set, a child that outlives it is killed and the call
/// fails with [`ExecError::Timeout`].
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

impl SystemRunner {
    /// Create a runner without a deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the deadline applied to every invocation.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The configured deadline.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> Result<String> {
        let program = invocation.program();
        let args = invocation.args();
        trace!("Running {} {:?}", invocation.binary.display(), args);

        let mut cmd = Command::new(&invocation.binary);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &invocation.current_dir {
            cmd.current_dir(dir);
        }

        let start = Instant::now();
        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, cmd.output()).await {
                Ok(output) => output,
                Err(_) => {
                    warn!("{} did not finish within {:?}, killed", program, limit);
                    return Err(ExecError::Timeout {
                        binary: program,
                        after: limit,
                    });
                }
            },
            None => cmd.output().await,
        };

        let output = match output {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ExecError::NotFound { binary: program });
            }
            Err(e) => return Err(ExecError::Io(e)),
        };

        debug!(
            "{} exited with {} in {}ms",
            program,
            output.status,
            start.elapsed().as_millis()
        );

        if !output.status.success() {
            return Err(ExecError::Failed {
                binary: program,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| ExecError::InvalidOutput { binary: program })
    }
}
