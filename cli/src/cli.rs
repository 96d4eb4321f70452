//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;
use crate::infra::config::{DEFAULT_CONFIG_PATH, YamlConfigLoader};
use crate::output::{OutputContext, json as json_out};

/// First-boot provisioning for bucket-loader worker nodes
#[derive(Parser)]
#[command(
    name = "loader-bootstrap",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Path to the bootstrap configuration file
    #[arg(
        long,
        global = true,
        env = "LOADER_BOOTSTRAP_CONFIG",
        default_value = DEFAULT_CONFIG_PATH
    )]
    pub config: PathBuf,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Provision this node and run the loader in worker mode
    Run(commands::run::RunArgs),

    /// Show every step `run` would perform, without side effects
    Plan,

    /// Check the configuration file
    Validate(commands::CredentialArgs),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command and return the process exit code.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<i32> {
        let Cli { config, json, quiet, no_color, command } = self;
        // JSON goes to stdout, so progress lines must stay out of it.
        let ctx = OutputContext::new(no_color, quiet || json);
        let source = YamlConfigLoader::new(config);
        let result = match command {
            Command::Run(args) => commands::run::run(&ctx, &source, args, json).await,
            Command::Plan => commands::plan::run(&ctx, &source, json).map(|()| 0),
            Command::Validate(creds) => commands::validate::run(&ctx, &source, creds, json),
            Command::Version => {
                commands::version::run(json);
                Ok(0)
            }
        };
        if json && let Err(e) = &result {
            println!("{}", json_out::format_error(&format!("{e:#}"))?);
        }
        result
    }
}
