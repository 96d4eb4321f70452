//! Plan command: print what `run` would do, without doing it.

use anyhow::Result;

use crate::application::ports::ConfigSource;
use crate::application::services::config_service::{CredentialOverrides, load_config};
use crate::domain::{Action, Plan, build_plan};
use crate::output::{OutputContext, json as json_out};

/// Run the plan command.
///
/// Credentials are not needed to print a plan, so the configuration is not
/// validated here; use `validate` for that.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded.
pub fn run(ctx: &OutputContext, source: &impl ConfigSource, json: bool) -> Result<()> {
    let cfg = load_config(source, CredentialOverrides::default())?;
    let plan = build_plan(&cfg);

    if json {
        println!("{}", json_out::to_pretty(&plan)?);
        return Ok(());
    }

    ctx.kv("bucket", &cfg.storage.bucket);
    ctx.kv("endpoint", &cfg.storage.endpoint);
    print_plan(ctx, &plan);
    Ok(())
}

fn print_plan(ctx: &OutputContext, plan: &Plan) {
    for phase in &plan.phases {
        ctx.header(phase.name);
        for action in &phase.actions {
            ctx.kv(action_kind(action), &describe(action));
        }
    }
    ctx.header("launch");
    ctx.kv("exec", &plan.launch.to_string());
}

fn action_kind(action: &Action) -> &'static str {
    match action {
        Action::CreateDir { .. } => "mkdir",
        Action::Download(_) => "fetch",
        Action::Run(_) => "run",
        Action::WriteFile { .. } => "write",
    }
}

fn describe(action: &Action) -> String {
    match action {
        Action::CreateDir { path } => path.display().to_string(),
        Action::Download(dl) => format!("{} -> {}", dl.key, dl.dest.display()),
        Action::Run(cmd) => cmd.to_string(),
        Action::WriteFile { path, contents } => format!("{} <- {contents:?}", path.display()),
    }
}
