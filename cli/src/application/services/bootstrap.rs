//! Application service: worker node bootstrap use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use std::future::Future;
use std::path::Path;
use std::process::{ExitStatus, Output};
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;

use crate::application::ports::{CommandRunner, LocalFs, ObjectStore, ProgressReporter};
use crate::domain::{
    Action, BootstrapConfig, BootstrapError, CommandSpec, Download, ProvisionReport, StepOutcome,
    build_plan,
};

/// Options for a bootstrap run.
pub struct BootstrapOptions<'a, R: ProgressReporter> {
    pub reporter: &'a R,
    /// Abort on the first best-effort failure instead of recording it.
    pub strict: bool,
}

/// How the routine ended.
#[derive(Debug)]
pub enum BootstrapOutcome {
    /// Provisioning finished and the loader ran to completion.
    LoaderExited {
        status: ExitStatus,
        report: ProvisionReport,
    },
    /// An interrupt arrived; the grace period has elapsed.
    Interrupted,
}

/// Provision the node and run the loader, racing the whole routine against
/// `interrupt`.
///
/// When `interrupt` resolves first, forward progress stops, the service
/// sleeps for `system.interrupt_grace_secs` and returns
/// [`BootstrapOutcome::Interrupted`]. No other cleanup happens here; the
/// loader is expected to shut itself down within the grace period.
///
/// # Errors
///
/// Returns an error if bucket resolution, a download, the FUSE config write
/// or the loader launch fails, or on any best-effort failure in strict mode.
pub async fn run_worker(
    runner: &impl CommandRunner,
    store: &impl ObjectStore,
    fs: &impl LocalFs,
    cfg: &BootstrapConfig,
    opts: BootstrapOptions<'_, impl ProgressReporter>,
    interrupt: impl Future<Output = ()>,
) -> Result<BootstrapOutcome> {
    let reporter = opts.reporter;
    let grace = Duration::from_secs(cfg.system.interrupt_grace_secs);

    let work = async {
        let report = provision(runner, store, fs, cfg, reporter, opts.strict).await?;
        let status = launch_loader(runner, cfg, reporter).await?;
        Ok::<_, anyhow::Error>(BootstrapOutcome::LoaderExited { status, report })
    };

    tokio::select! {
        biased;
        () = interrupt => {
            tracing::warn!(grace_secs = grace.as_secs(), "interrupt received, waiting for loader cleanup");
            reporter.warn(&format!(
                "interrupted; sleeping {}s to let the loader clean up",
                grace.as_secs()
            ));
            tokio::time::sleep(grace).await;
            Ok(BootstrapOutcome::Interrupted)
        }
        result = work => result,
    }
}

/// Run every provisioning phase, stopping short of the loader launch.
///
/// Bucket resolution happens first, so an unreachable bucket leaves the
/// node untouched.
///
/// # Errors
///
/// See [`run_worker`].
pub async fn provision(
    runner: &impl CommandRunner,
    store: &impl ObjectStore,
    fs: &impl LocalFs,
    cfg: &BootstrapConfig,
    reporter: &impl ProgressReporter,
    strict: bool,
) -> Result<ProvisionReport> {
    let bucket = cfg.storage.bucket.as_str();
    reporter.step(&format!("resolving bucket {bucket}..."));
    store
        .resolve_bucket(bucket)
        .await
        .map_err(|e| BootstrapError::BucketUnavailable {
            bucket: bucket.to_string(),
            reason: format!("{e:#}"),
        })?;
    tracing::info!(bucket, endpoint = %cfg.storage.endpoint, "bucket resolved");

    let mut report = ProvisionReport::new(Utc::now());
    for phase in build_plan(cfg).phases {
        reporter.step(&format!("{}...", phase.name));
        for action in &phase.actions {
            match action {
                Action::CreateDir { path } => {
                    let outcome = match fs.create_dir_all(path).await {
                        Ok(()) => StepOutcome::Succeeded,
                        Err(e) => StepOutcome::Errored { error: format!("{e:#}") },
                    };
                    let label = format!("mkdir -p {}", path.display());
                    record(&mut report, reporter, phase.name, label, outcome, strict)?;
                }
                Action::Download(dl) => {
                    download(store, bucket, dl).await?;
                    let label = format!("get s3://{bucket}/{} -> {}", dl.key, dl.dest.display());
                    report.record(phase.name, label, StepOutcome::Succeeded);
                }
                Action::Run(cmd) => {
                    let outcome = run_best_effort(runner, cmd).await;
                    record(&mut report, reporter, phase.name, cmd.to_string(), outcome, strict)?;
                }
                Action::WriteFile { path, contents } => {
                    write_file(fs, path, contents).await?;
                    report.record(
                        phase.name,
                        format!("write {}", path.display()),
                        StepOutcome::Succeeded,
                    );
                }
            }
        }
    }

    let failed = report.failures().count();
    if failed == 0 {
        reporter.success("node provisioned");
    } else {
        reporter.warn(&format!("node provisioned with {failed} failed step(s)"));
    }
    Ok(report)
}

/// Launch the loader in worker mode and block until it exits.
///
/// # Errors
///
/// Returns an error if the loader cannot be started.
pub async fn launch_loader(
    runner: &impl CommandRunner,
    cfg: &BootstrapConfig,
    reporter: &impl ProgressReporter,
) -> Result<ExitStatus> {
    let CommandSpec { program, args } = build_plan(cfg).launch;
    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
    reporter.step(&format!("starting loader: {program} {}", args.join(" ")));
    tracing::info!(%program, ?args, "launching loader in worker mode");

    let status = runner
        .run_foreground(&program, &arg_refs)
        .await
        .map_err(|e| BootstrapError::LoaderLaunch {
            program: program.clone(),
            reason: format!("{e:#}"),
        })?;
    tracing::info!(code = ?status.code(), "loader exited");
    Ok(status)
}

// ── Helpers ──────────────────────────────────────────────────────────────────

async fn download(store: &impl ObjectStore, bucket: &str, dl: &Download) -> Result<()> {
    let bytes = store
        .download(bucket, &dl.key, &dl.dest)
        .await
        .map_err(|e| BootstrapError::Download {
            key: dl.key.clone(),
            dest: dl.dest.display().to_string(),
            reason: format!("{e:#}"),
        })?;
    tracing::info!(key = %dl.key, dest = %dl.dest.display(), bytes, "downloaded");
    Ok(())
}

async fn write_file(fs: &impl LocalFs, path: &Path, contents: &str) -> Result<()> {
    fs.write_file(path, contents.as_bytes())
        .await
        .map_err(|e| BootstrapError::FuseConf {
            path: path.display().to_string(),
            reason: format!("{e:#}"),
        })?;
    Ok(())
}

async fn run_best_effort(runner: &impl CommandRunner, cmd: &CommandSpec) -> StepOutcome {
    tracing::debug!(command = %cmd, "running");
    match runner.run(&cmd.program, &cmd.arg_refs()).await {
        Ok(output) if output.status.success() => StepOutcome::Succeeded,
        Ok(output) => StepOutcome::Failed {
            code: output.status.code(),
            stderr: last_stderr_line(&output),
        },
        Err(e) => StepOutcome::Errored { error: format!("{e:#}") },
    }
}

fn last_stderr_line(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr)
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn record(
    report: &mut ProvisionReport,
    reporter: &impl ProgressReporter,
    phase: &str,
    action: String,
    outcome: StepOutcome,
    strict: bool,
) -> Result<()> {
    if !outcome.is_success() {
        let detail = outcome.detail();
        tracing::warn!(phase, %action, %detail, "step failed");
        if strict {
            return Err(BootstrapError::StepFailed { step: action, detail }.into());
        }
        reporter.warn(&format!("{action}: {detail} (continuing)"));
    }
    report.record(phase, action, outcome);
    Ok(())
}
