//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` is the production implementation that uses tokio
//! for async process execution with guaranteed timeout and kill.

use std::process::{ExitStatus, Output, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;

use crate::application::ports::CommandRunner;

/// Default timeout for provisioning commands (package installs, mounts, etc.).
pub const DEFAULT_CMD_TIMEOUT: Duration = Duration::from_secs(1_800);

/// Production `CommandRunner`: uses tokio for async process execution
/// with guaranteed timeout and kill.
///
/// `tokio::time::timeout` around `.output().await` only drops the future
/// when it fires; the child keeps running. This implementation uses
/// `tokio::select!` with an explicit `child.kill()` instead.
///
/// Only the timeout kills. A dropped future (an interrupt) leaves the child
/// running: it got the same SIGINT from the terminal and finishes or exits
/// on its own.
pub struct TokioCommandRunner {
    timeout: Duration,
    foreground_stdout_to_stderr: bool,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            foreground_stdout_to_stderr: false,
        }
    }

    /// Send the foreground child's stdout to our stderr, keeping stdout free
    /// for a machine-readable document.
    #[must_use]
    pub fn with_foreground_stdout_on_stderr(mut self) -> Self {
        self.foreground_stdout_to_stderr = true;
        self
    }
}

impl Default for TokioCommandRunner {
    fn default() -> Self {
        Self::new(DEFAULT_CMD_TIMEOUT)
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        let mut stdout_handle = child.stdout.take();
        let mut stderr_handle = child.stderr.take();

        // Drain both pipes while waiting, or a chatty child (yum) blocks on
        // a full pipe and wait() never resolves.
        tokio::select! {
            result = async {
                let (status, stdout, stderr) = tokio::join!(
                    child.wait(),
                    async {
                        let mut buf = Vec::new();
                        if let Some(ref mut h) = stdout_handle {
                            let _ = h.read_to_end(&mut buf).await;
                        }
                        buf
                    },
                    async {
                        let mut buf = Vec::new();
                        if let Some(ref mut h) = stderr_handle {
                            let _ = h.read_to_end(&mut buf).await;
                        }
                        buf
                    },
                );
                Ok(Output {
                    status: status.with_context(|| format!("waiting for {program}"))?,
                    stdout,
                    stderr,
                })
            } => result,
            () = tokio::time::sleep(self.timeout) => {
                let _ = child.kill().await;
                anyhow::bail!("{program} timed out after {}s", self.timeout.as_secs())
            }
        }
    }

    async fn run_foreground(&self, program: &str, args: &[&str]) -> Result<ExitStatus> {
        // No kill_on_drop: an interrupt drops this future, and the loader
        // must survive that to run its own shutdown.
        let mut command = tokio::process::Command::new(program);
        command.args(args);
        if self.foreground_stdout_to_stderr {
            command.stdout(std::io::stderr());
        }
        let mut child = command
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        child
            .wait()
            .await
            .with_context(|| format!("waiting for {program}"))
    }
}
