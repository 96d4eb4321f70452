//! Domain types and validators for the bootstrap configuration.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

/// Directive written to the system FUSE configuration file.
pub const FUSE_CONF_DIRECTIVE: &str = "user_allow_other";

/// Permission mode applied recursively to the install root and FUSE state dir.
pub const SHARED_DIR_MODE: &str = "770";

/// Runlevels on which the FUSE service is disabled.
pub const DISABLED_RUNLEVELS: &str = "0,1,2,3,4,5,6";

/// Repository enabled for package installs.
pub const PACKAGE_REPO: &str = "epel";

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration, usually stored at `/etc/loader-bootstrap/config.yaml`.
///
/// Every section defaults to the values a stock worker image expects, so a
/// document only has to name what differs.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct BootstrapConfig {
    pub storage: StorageConfig,
    pub paths: PathsConfig,
    pub artifacts: ArtifactsConfig,
    pub nfs: NfsConfig,
    pub identity: IdentityConfig,
    pub packages: PackagesConfig,
    pub system: SystemConfig,
}

/// Object-storage connection settings.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    /// Host name of the storage service, without scheme.
    pub endpoint: String,
    pub region: String,
    /// Address buckets as `endpoint/bucket` instead of `bucket.endpoint`.
    pub path_style: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            access_key: String::new(),
            secret_key: String::new(),
            bucket: "nameOf.S3Bucket.2DownloadInstall.ResourcesFrom".to_string(),
            endpoint: "s3.amazonaws.com".to_string(),
            region: "us-east-1".to_string(),
            path_style: true,
        }
    }
}

// Keep secrets out of logs and `{:?}` output.
impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("access_key", &redact(&self.access_key))
            .field("secret_key", &redact(&self.secret_key))
            .field("bucket", &self.bucket)
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("path_style", &self.path_style)
            .finish()
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() { "<unset>" } else { "<redacted>" }
}

/// Local directory roots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    /// Where artifacts are downloaded and the loader runs from.
    pub install_root: PathBuf,
    /// Mount point root for the FUSE-backed bucket.
    pub s3_mount_root: PathBuf,
    /// Local mount point of the NFS source share.
    pub nfs_mount_root: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            install_root: PathBuf::from("/mydir/s3BucketLoader"),
            s3_mount_root: PathBuf::from("/mydir/s3mount"),
            nfs_mount_root: PathBuf::from("/mydir/nfs"),
        }
    }
}

/// Object keys fetched from the bucket. Each key is also the local file name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ArtifactsConfig {
    pub loader_jar: String,
    pub worker_properties: String,
    pub fusepy_package: String,
    pub yas3fs_package: String,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            loader_jar: "s3-bucket-loader-0.0.1-SNAPSHOT.jar".to_string(),
            worker_properties: "s3BucketLoader.worker.properties".to_string(),
            fusepy_package: "python-fusepy-version.rpm".to_string(),
            yas3fs_package: "python-yas3fs-version.rpm".to_string(),
        }
    }
}

impl ArtifactsConfig {
    /// All artifact keys in download order.
    #[must_use]
    pub fn keys(&self) -> [&str; 4] {
        [
            &self.loader_jar,
            &self.worker_properties,
            &self.fusepy_package,
            &self.yas3fs_package,
        ]
    }
}

/// Remote NFS share.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NfsConfig {
    /// Export in `host:/path` form, passed verbatim to `mount`.
    pub export: String,
}

impl Default for NfsConfig {
    fn default() -> Self {
        Self {
            export: "your.nfs.server.com:/exported/path".to_string(),
        }
    }
}

/// Local user and group created so copied files keep their ownership.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IdentityConfig {
    pub username: String,
    pub uid: u32,
    pub groupname: String,
    pub gid: u32,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            username: "whatever".to_string(),
            uid: 400,
            groupname: "whatever".to_string(),
            gid: 400,
        }
    }
}

/// Package sources and the FUSE service they install.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PackagesConfig {
    /// Release package that adds the third-party repository.
    pub repo_release_url: String,
    pub dependency_package: String,
    pub nfs_packages: Vec<String>,
    /// Service (and system user) installed by the yas3fs package.
    pub fuse_service: String,
    /// Runtime state directory of the FUSE service.
    pub fuse_state_dir: PathBuf,
}

impl Default for PackagesConfig {
    fn default() -> Self {
        Self {
            repo_release_url:
                "https://dl.fedoraproject.org/pub/epel/6/x86_64/epel-release-6-8.noarch.rpm"
                    .to_string(),
            dependency_package: "python-argparse".to_string(),
            nfs_packages: vec!["nfs-utils".to_string(), "nfs-utils-lib".to_string()],
            fuse_service: "yas3fs".to_string(),
            fuse_state_dir: PathBuf::from("/var/lib/yas3fs/s3BucketLoader"),
        }
    }
}

/// Host-level settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SystemConfig {
    pub fuse_conf_path: PathBuf,
    pub java_bin: String,
    /// Seconds to wait after an interrupt before exiting.
    pub interrupt_grace_secs: u64,
    /// Timeout for each provisioning command, in seconds.
    pub command_timeout_secs: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            fuse_conf_path: PathBuf::from("/etc/fuse.conf"),
            java_bin: "java".to_string(),
            interrupt_grace_secs: 30_000,
            command_timeout_secs: 1_800,
        }
    }
}

// ── Derived paths ────────────────────────────────────────────────────────────

impl BootstrapConfig {
    /// Local destination of an artifact: `install_root/<file_name>`.
    #[must_use]
    pub fn artifact_path(&self, file_name: &str) -> PathBuf {
        self.paths.install_root.join(file_name)
    }

    /// Downloaded loader JAR.
    #[must_use]
    pub fn loader_jar_path(&self) -> PathBuf {
        self.artifact_path(&self.artifacts.loader_jar)
    }

    /// Downloaded worker properties file.
    #[must_use]
    pub fn worker_properties_path(&self) -> PathBuf {
        self.artifact_path(&self.artifacts.worker_properties)
    }

    /// Directories created before any download, in creation order.
    #[must_use]
    pub fn local_dirs(&self) -> [&Path; 3] {
        [
            &self.paths.nfs_mount_root,
            &self.paths.s3_mount_root,
            &self.paths.install_root,
        ]
    }

    /// Replace credentials with the given overrides, when present.
    pub fn apply_credentials(&mut self, access_key: Option<String>, secret_key: Option<String>) {
        if let Some(key) = access_key {
            self.storage.access_key = key;
        }
        if let Some(secret) = secret_key {
            self.storage.secret_key = secret;
        }
    }

    /// Check every field the routine relies on.
    ///
    /// Collects all problems instead of stopping at the first one, so an
    /// operator can fix a config in a single pass.
    ///
    /// # Errors
    ///
    /// Returns the list of validation failures.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();

        require_non_empty(&mut errors, "storage.bucket", &self.storage.bucket);
        require_non_empty(&mut errors, "storage.endpoint", &self.storage.endpoint);
        require_non_empty(&mut errors, "storage.access_key", &self.storage.access_key);
        require_non_empty(&mut errors, "storage.secret_key", &self.storage.secret_key);

        for (field, path) in [
            ("paths.install_root", &self.paths.install_root),
            ("paths.s3_mount_root", &self.paths.s3_mount_root),
            ("paths.nfs_mount_root", &self.paths.nfs_mount_root),
            ("packages.fuse_state_dir", &self.packages.fuse_state_dir),
            ("system.fuse_conf_path", &self.system.fuse_conf_path),
        ] {
            if !path.is_absolute() {
                errors.push(ConfigError::RelativePath {
                    field,
                    path: path.display().to_string(),
                });
            }
        }

        for (field, name) in [
            ("artifacts.loader_jar", &self.artifacts.loader_jar),
            ("artifacts.worker_properties", &self.artifacts.worker_properties),
            ("artifacts.fusepy_package", &self.artifacts.fusepy_package),
            ("artifacts.yas3fs_package", &self.artifacts.yas3fs_package),
        ] {
            if let Err(e) = validate_file_name(field, name) {
                errors.push(e);
            }
        }

        if let Err(e) = validate_nfs_export(&self.nfs.export) {
            errors.push(e);
        }

        require_non_empty(&mut errors, "identity.username", &self.identity.username);
        require_non_empty(&mut errors, "identity.groupname", &self.identity.groupname);
        require_non_empty(&mut errors, "packages.fuse_service", &self.packages.fuse_service);
        require_non_empty(&mut errors, "system.java_bin", &self.system.java_bin);
        if self.system.command_timeout_secs == 0 {
            errors.push(ConfigError::Zero {
                field: "system.command_timeout_secs",
            });
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

fn require_non_empty(errors: &mut Vec<ConfigError>, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.push(ConfigError::Missing { field });
    }
}

/// Validates that an artifact key can be used as a bare local file name.
///
/// # Errors
///
/// Returns an error if the name is empty, contains `/`, or is `.`/`..`.
pub fn validate_file_name(field: &'static str, name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::Missing { field });
    }
    if name.contains('/') || name == "." || name == ".." {
        return Err(ConfigError::InvalidFileName {
            field,
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Validates an NFS export of the form `host:/absolute/path`.
///
/// # Errors
///
/// Returns an error if the host or the absolute export path is missing.
pub fn validate_nfs_export(export: &str) -> Result<(), ConfigError> {
    let valid = export
        .split_once(':')
        .is_some_and(|(host, path)| !host.is_empty() && path.starts_with('/'));
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidNfsExport(export.to_string()))
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
