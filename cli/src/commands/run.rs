//! Run command: provision this node and hand off to the loader.

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use serde_json::json;

use crate::application::ports::ConfigSource;
use crate::application::services::bootstrap::{BootstrapOptions, BootstrapOutcome, run_worker};
use crate::application::services::config_service::load_validated;
use crate::commands::CredentialArgs;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::fs::TokioFs;
use crate::infra::object_store::S3ObjectStore;
use crate::infra::signal;
use crate::output::{OutputContext, TerminalReporter, json as json_out};

/// Arguments for the run command.
#[derive(Args, Default)]
pub struct RunArgs {
    /// Abort on the first failed provisioning step instead of continuing
    #[arg(long)]
    pub strict: bool,

    #[command(flatten)]
    pub credentials: CredentialArgs,
}

/// Run the bootstrap routine. Returns the process exit code.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the routine fails
/// fatally (bucket, download, FUSE config, loader launch, strict mode).
pub async fn run(
    ctx: &OutputContext,
    source: &impl ConfigSource,
    args: RunArgs,
    json: bool,
) -> Result<i32> {
    let interrupt = signal::interrupt()?;
    let cfg = load_validated(source, args.credentials.into())?;

    let mut runner = TokioCommandRunner::new(Duration::from_secs(cfg.system.command_timeout_secs));
    if json {
        // The JSON document must be the only thing on stdout.
        runner = runner.with_foreground_stdout_on_stderr();
    }
    let store = S3ObjectStore::connect(&cfg.storage);
    let reporter = TerminalReporter::new(ctx);
    let opts = BootstrapOptions {
        reporter: &reporter,
        strict: args.strict,
    };

    let outcome = run_worker(&runner, &store, &TokioFs, &cfg, opts, interrupt).await?;
    let code = exit_code(&outcome);
    match outcome {
        BootstrapOutcome::Interrupted => {
            if json {
                println!("{}", json_out::to_pretty(&json!({ "outcome": "interrupted" }))?);
            }
        }
        BootstrapOutcome::LoaderExited { report, .. } => {
            if json {
                let body = json!({
                    "outcome": "loader_exited",
                    "exit_code": code,
                    "report": report,
                });
                println!("{}", json_out::to_pretty(&body)?);
            } else {
                ctx.kv("loader exit code", &code.to_string());
                ctx.kv("failed steps", &report.failures().count().to_string());
            }
        }
    }
    Ok(code)
}

/// Process exit code for a finished routine.
///
/// An interrupted run exits 0. Otherwise the loader's code is passed
/// through; a loader killed by a signal has none and maps to 1.
#[must_use]
pub fn exit_code(outcome: &BootstrapOutcome) -> i32 {
    match outcome {
        BootstrapOutcome::Interrupted => 0,
        BootstrapOutcome::LoaderExited { status, .. } => status.code().unwrap_or(1),
    }
}
