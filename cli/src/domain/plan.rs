//! The provisioning plan: every action of the routine as plain data.
//!
//! Pure functions only. The bootstrap service walks these values and hands
//! each one to the matching port; the `plan` command prints them unchanged.

use std::path::PathBuf;

use serde::Serialize;

use crate::domain::config::{
    BootstrapConfig, DISABLED_RUNLEVELS, FUSE_CONF_DIRECTIVE, PACKAGE_REPO, SHARED_DIR_MODE,
};

/// An external program invocation with a fixed argument vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Borrowed argument slice for `CommandRunner` calls.
    #[must_use]
    pub fn arg_refs(&self) -> Vec<&str> {
        self.args.iter().map(String::as_str).collect()
    }
}

impl std::fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// One object fetched from the bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Download {
    pub key: String,
    pub dest: PathBuf,
}

/// A single action of the routine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// `mkdir -p`; best-effort.
    CreateDir { path: PathBuf },
    /// Object download; fatal on failure.
    Download(Download),
    /// Provisioning command; best-effort.
    Run(CommandSpec),
    /// Overwrite a file; fatal on failure.
    WriteFile { path: PathBuf, contents: String },
}

/// A named group of actions, reported as one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Phase {
    pub name: &'static str,
    pub actions: Vec<Action>,
}

/// The complete routine after bucket resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    /// Provisioning phases in execution order.
    pub phases: Vec<Phase>,
    /// Foreground loader launch, run once every phase is done.
    pub launch: CommandSpec,
}

/// Build the plan for a configuration.
#[must_use]
pub fn build_plan(cfg: &BootstrapConfig) -> Plan {
    Plan {
        phases: build_phases(cfg),
        launch: loader_command(cfg),
    }
}

fn build_phases(cfg: &BootstrapConfig) -> Vec<Phase> {
    vec![
        Phase {
            name: "identity",
            actions: identity_commands(cfg).into_iter().map(Action::Run).collect(),
        },
        Phase {
            name: "directories",
            actions: cfg
                .local_dirs()
                .into_iter()
                .map(|p| Action::CreateDir { path: p.to_path_buf() })
                .collect(),
        },
        Phase {
            name: "downloads",
            actions: downloads(cfg).into_iter().map(Action::Download).collect(),
        },
        Phase {
            name: "permissions",
            actions: permission_commands(cfg).into_iter().map(Action::Run).collect(),
        },
        Phase {
            name: "packages",
            actions: package_commands(cfg).into_iter().map(Action::Run).collect(),
        },
        Phase {
            name: "fuse-service",
            actions: fuse_service_actions(cfg),
        },
        Phase {
            name: "nfs",
            actions: nfs_commands(cfg).into_iter().map(Action::Run).collect(),
        },
        Phase {
            name: "fuse-conf",
            actions: vec![Action::WriteFile {
                path: cfg.system.fuse_conf_path.clone(),
                contents: FUSE_CONF_DIRECTIVE.to_string(),
            }],
        },
    ]
}

/// `groupadd` then `useradd` with the configured numeric ids.
#[must_use]
pub fn identity_commands(cfg: &BootstrapConfig) -> Vec<CommandSpec> {
    let id = &cfg.identity;
    let gid = id.gid.to_string();
    let uid = id.uid.to_string();
    vec![
        CommandSpec::new("groupadd", ["-g", gid.as_str(), id.groupname.as_str()]),
        CommandSpec::new(
            "useradd",
            ["-M", "-u", uid.as_str(), "-g", gid.as_str(), id.username.as_str()],
        ),
    ]
}

/// One download per artifact key, into the install root.
#[must_use]
pub fn downloads(cfg: &BootstrapConfig) -> Vec<Download> {
    cfg.artifacts
        .keys()
        .into_iter()
        .map(|key| Download {
            key: key.to_string(),
            dest: cfg.artifact_path(key),
        })
        .collect()
}

/// Recursive ownership and mode fix-up of the install root.
#[must_use]
pub fn permission_commands(cfg: &BootstrapConfig) -> Vec<CommandSpec> {
    let root = cfg.paths.install_root.display().to_string();
    let owner = format!("root:{}", cfg.identity.groupname);
    vec![
        CommandSpec::new("chown", ["-R", owner.as_str(), root.as_str()]),
        CommandSpec::new("chmod", ["-R", SHARED_DIR_MODE, root.as_str()]),
    ]
}

/// Third-party repository, dependency package, then both downloaded packages.
#[must_use]
pub fn package_commands(cfg: &BootstrapConfig) -> Vec<CommandSpec> {
    let pkgs = &cfg.packages;
    let enable = format!("--enablerepo={PACKAGE_REPO}");
    let local_install = |file_name: &str| {
        let path = cfg.artifact_path(file_name).display().to_string();
        CommandSpec::new("yum", ["-y", enable.as_str(), "localinstall", path.as_str()])
    };
    vec![
        CommandSpec::new("rpm", ["-ivh", pkgs.repo_release_url.as_str()]),
        CommandSpec::new(
            "yum",
            ["-y", enable.as_str(), "install", pkgs.dependency_package.as_str()],
        ),
        local_install(&cfg.artifacts.fusepy_package),
        local_install(&cfg.artifacts.yas3fs_package),
    ]
}

/// State directory, group membership and boot-time disable of the FUSE service.
#[must_use]
pub fn fuse_service_actions(cfg: &BootstrapConfig) -> Vec<Action> {
    let pkgs = &cfg.packages;
    let state_dir = pkgs.fuse_state_dir.display().to_string();
    let owner = format!("root:{}", pkgs.fuse_service);
    vec![
        Action::CreateDir { path: pkgs.fuse_state_dir.clone() },
        Action::Run(CommandSpec::new("chown", ["-R", owner.as_str(), state_dir.as_str()])),
        Action::Run(CommandSpec::new(
            "chmod",
            ["-R", SHARED_DIR_MODE, state_dir.as_str()],
        )),
        Action::Run(CommandSpec::new(
            "usermod",
            ["-a", "-G", cfg.identity.groupname.as_str(), pkgs.fuse_service.as_str()],
        )),
        Action::Run(CommandSpec::new(
            "chkconfig",
            [pkgs.fuse_service.as_str(), "off", DISABLED_RUNLEVELS],
        )),
    ]
}

/// NFS client utilities, then a single mount attempt.
#[must_use]
pub fn nfs_commands(cfg: &BootstrapConfig) -> Vec<CommandSpec> {
    let mut install = vec!["-y".to_string(), "install".to_string()];
    install.extend(cfg.packages.nfs_packages.iter().cloned());
    let mount_point = cfg.paths.nfs_mount_root.display().to_string();
    vec![
        CommandSpec::new("yum", install),
        CommandSpec::new("mount", [cfg.nfs.export.as_str(), mount_point.as_str()]),
    ]
}

/// The worker-mode loader invocation.
#[must_use]
pub fn loader_command(cfg: &BootstrapConfig) -> CommandSpec {
    let install_root = cfg.paths.install_root.display();
    let props = cfg.worker_properties_path();
    let jar = cfg.loader_jar_path();
    CommandSpec::new(
        &cfg.system.java_bin,
        [
            "-DisMaster=false".to_string(),
            format!("-DconfigFilePath={}", props.display()),
            format!("-Ds3BucketLoaderHome={install_root}"),
            "-jar".to_string(),
            jar.display().to_string(),
        ],
    )
}
