//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Config errors ─────────────────────────────────────────────────────────────

/// A single configuration validation failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must not be empty")]
    Missing { field: &'static str },

    #[error("{field} must be an absolute path, got '{path}'")]
    RelativePath { field: &'static str, path: String },

    #[error("{field} must be a plain file name, got '{name}'")]
    InvalidFileName { field: &'static str, name: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("nfs.export must look like 'host:/exported/path', got '{0}'")]
    InvalidNfsExport(String),
}

/// All validation failures of one configuration document.
#[derive(Debug, Error)]
#[error("invalid configuration:\n{}", format_config_errors(.0))]
pub struct InvalidConfig(pub Vec<ConfigError>);

fn format_config_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Bootstrap errors ──────────────────────────────────────────────────────────

/// Fatal failures of the provisioning routine.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("bucket '{bucket}' is not accessible: {reason}")]
    BucketUnavailable { bucket: String, reason: String },

    #[error("failed to download '{key}' to {dest}: {reason}")]
    Download {
        key: String,
        dest: String,
        reason: String,
    },

    #[error("step '{step}' failed in strict mode: {detail}")]
    StepFailed { step: String, detail: String },

    #[error("failed to write {path}: {reason}")]
    FuseConf { path: String, reason: String },

    #[error("failed to launch loader '{program}': {reason}")]
    LoaderLaunch { program: String, reason: String },
}
