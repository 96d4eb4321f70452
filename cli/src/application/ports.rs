//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};

use anyhow::Result;

use crate::domain::BootstrapConfig;

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program to completion and capture its output.
    ///
    /// Implementations apply their configured timeout and must kill the
    /// child when it fires.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or times out. A
    /// non-zero exit is *not* an error; inspect `Output::status`.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;

    /// Run a program in the foreground with inherited stdio and no timeout.
    ///
    /// The child is not killed if the returned future is dropped: it shares
    /// the terminal's process group and handles interrupts on its own.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or waited on.
    async fn run_foreground(&self, program: &str, args: &[&str]) -> Result<ExitStatus>;
}

// ── Object Storage Port ───────────────────────────────────────────────────────

/// Read-only access to an object-storage service.
#[allow(async_fn_in_trait)]
pub trait ObjectStore {
    /// Confirm the bucket exists and the credentials can reach it.
    async fn resolve_bucket(&self, bucket: &str) -> Result<()>;

    /// Fetch `key` into `dest`, replacing any existing file.
    /// Returns the number of bytes written.
    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> Result<u64>;
}

// ── Filesystem Port ───────────────────────────────────────────────────────────

/// Local filesystem mutations performed by the routine.
#[allow(async_fn_in_trait)]
pub trait LocalFs {
    /// Create a directory and its parents. Succeeds if it already exists.
    async fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Create or truncate `path` and write `contents`.
    async fn write_file(&self, path: &Path, contents: &[u8]) -> Result<()>;
}

// ── Configuration Port ────────────────────────────────────────────────────────

/// Source of the bootstrap configuration document.
pub trait ConfigSource {
    /// Load the configuration, falling back to defaults when none exists.
    fn load(&self) -> Result<BootstrapConfig>;
    /// Location the configuration is read from.
    fn path(&self) -> PathBuf;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait: no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
