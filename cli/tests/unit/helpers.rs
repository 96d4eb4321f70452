//! Shared test helpers: recording port fakes and output constructors.

#![allow(dead_code, clippy::expect_used)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Result, bail};
use loader_bootstrap::application::ports::{CommandRunner, LocalFs, ObjectStore, ProgressReporter};
use loader_bootstrap::domain::BootstrapConfig;

// ── ExitStatus construction ──────────────────────────────────────────────────

/// Build an `ExitStatus` from a logical exit code (0 = success, non-zero = failure).
///
/// The raw wait-status encodes the exit code in bits 8–15, so we shift.
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

pub fn output(code: i32, stderr: &[u8]) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

// ── Journal ──────────────────────────────────────────────────────────────────

/// One observable side effect, in the order the routine performed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ResolveBucket(String),
    Download { key: String, dest: PathBuf },
    CreateDir(PathBuf),
    WriteFile { path: PathBuf, contents: String },
    /// Best-effort command, as `program arg1 arg2 …`.
    Run(String),
    Foreground { program: String, args: Vec<String> },
}

/// Ordered event log shared by every fake of one test.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Event>>>);

impl Journal {
    pub fn push(&self, event: Event) {
        self.0.lock().expect("mutex poisoned").push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().expect("mutex poisoned").clone()
    }

    /// Best-effort commands only, as command lines.
    pub fn commands(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Run(line) => Some(line),
                _ => None,
            })
            .collect()
    }

    pub fn downloads(&self) -> Vec<(String, PathBuf)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Download { key, dest } => Some((key, dest)),
                _ => None,
            })
            .collect()
    }

    /// Index of the first event matching `pred`.
    pub fn position(&self, pred: impl Fn(&Event) -> bool) -> Option<usize> {
        self.events().iter().position(pred)
    }
}

// ── CommandRunner fake ───────────────────────────────────────────────────────

/// Records every call; programs in `failing` exit 1, programs in `missing`
/// fail to spawn.
pub struct RecordingRunner {
    pub journal: Journal,
    pub failing: HashSet<String>,
    pub missing: HashSet<String>,
    pub loader_exit_code: i32,
    /// Simulated loader runtime.
    pub loader_runtime: Duration,
}

impl RecordingRunner {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            failing: HashSet::new(),
            missing: HashSet::new(),
            loader_exit_code: 0,
            loader_runtime: Duration::ZERO,
        }
    }

    pub fn failing(mut self, program: &str) -> Self {
        self.failing.insert(program.to_string());
        self
    }

    pub fn missing(mut self, program: &str) -> Self {
        self.missing.insert(program.to_string());
        self
    }
}

impl CommandRunner for RecordingRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        let mut line = program.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        self.journal.push(Event::Run(line));
        if self.missing.contains(program) {
            bail!("failed to spawn {program}");
        }
        if self.failing.contains(program) {
            return Ok(output(1, format!("{program}: simulated failure\n").as_bytes()));
        }
        Ok(output(0, b""))
    }

    async fn run_foreground(&self, program: &str, args: &[&str]) -> Result<ExitStatus> {
        self.journal.push(Event::Foreground {
            program: program.to_string(),
            args: args.iter().map(ToString::to_string).collect(),
        });
        if self.missing.contains(program) {
            bail!("failed to spawn {program}");
        }
        tokio::time::sleep(self.loader_runtime).await;
        Ok(exit_status(self.loader_exit_code))
    }
}

// ── ObjectStore fake ─────────────────────────────────────────────────────────

/// Serves every key of the buckets it knows, except `missing_keys`.
/// A download of `hang_on` never completes.
pub struct FakeStore {
    pub journal: Journal,
    pub buckets: Vec<String>,
    pub missing_keys: Vec<String>,
    pub hang_on: Option<String>,
}

impl FakeStore {
    pub fn with_bucket(journal: &Journal, bucket: &str) -> Self {
        Self {
            journal: journal.clone(),
            buckets: vec![bucket.to_string()],
            missing_keys: Vec::new(),
            hang_on: None,
        }
    }
}

impl ObjectStore for FakeStore {
    async fn resolve_bucket(&self, bucket: &str) -> Result<()> {
        self.journal.push(Event::ResolveBucket(bucket.to_string()));
        if !self.buckets.iter().any(|b| b == bucket) {
            bail!("NoSuchBucket: The specified bucket does not exist");
        }
        Ok(())
    }

    async fn download(&self, _bucket: &str, key: &str, dest: &Path) -> Result<u64> {
        self.journal.push(Event::Download {
            key: key.to_string(),
            dest: dest.to_path_buf(),
        });
        if self.hang_on.as_deref() == Some(key) {
            std::future::pending::<()>().await;
        }
        if self.missing_keys.iter().any(|k| k == key) {
            bail!("NoSuchKey: {key}");
        }
        Ok(1024)
    }
}

// ── LocalFs fake ─────────────────────────────────────────────────────────────

/// Records directory creation and file writes without touching disk.
pub struct RecordingFs {
    pub journal: Journal,
    pub fail_writes: bool,
}

impl RecordingFs {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            fail_writes: false,
        }
    }
}

impl LocalFs for RecordingFs {
    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.journal.push(Event::CreateDir(path.to_path_buf()));
        Ok(())
    }

    async fn write_file(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.journal.push(Event::WriteFile {
            path: path.to_path_buf(),
            contents: String::from_utf8_lossy(contents).into_owned(),
        });
        if self.fail_writes {
            bail!("Permission denied (os error 13)");
        }
        Ok(())
    }
}

// ── ProgressReporter fake ────────────────────────────────────────────────────

/// Collects warnings; ignores everything else.
#[derive(Default)]
pub struct CollectingReporter {
    pub warnings: Mutex<Vec<String>>,
}

impl CollectingReporter {
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().expect("mutex poisoned").clone()
    }
}

impl ProgressReporter for CollectingReporter {
    fn step(&self, _message: &str) {}
    fn success(&self, _message: &str) {}
    fn warn(&self, message: &str) {
        self.warnings.lock().expect("mutex poisoned").push(message.to_string());
    }
}

// ── Config ───────────────────────────────────────────────────────────────────

pub const TEST_BUCKET: &str = "worker-artifacts";

/// A valid configuration rooted at `/opt/loader`.
pub fn test_config() -> BootstrapConfig {
    let mut cfg = BootstrapConfig::default();
    cfg.storage.bucket = TEST_BUCKET.to_string();
    cfg.apply_credentials(Some("AKIDEXAMPLE".into()), Some("secret".into()));
    cfg.paths.install_root = PathBuf::from("/opt/loader");
    cfg.paths.s3_mount_root = PathBuf::from("/mnt/s3");
    cfg.paths.nfs_mount_root = PathBuf::from("/mnt/nfs");
    cfg.nfs.export = "files.internal:/srv/source".to_string();
    cfg.system.interrupt_grace_secs = 30_000;
    cfg
}
