//! Command implementations

pub mod plan;
pub mod run;
pub mod validate;
pub mod version;

use clap::Args;

use crate::application::services::config_service::CredentialOverrides;

/// Object-storage credentials that override the config file.
#[derive(Args, Default)]
pub struct CredentialArgs {
    /// Access key for the artifact bucket
    #[arg(long, env = "LOADER_BOOTSTRAP_ACCESS_KEY", hide_env_values = true)]
    pub access_key: Option<String>,

    /// Secret key for the artifact bucket
    #[arg(long, env = "LOADER_BOOTSTRAP_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,
}

impl From<CredentialArgs> for CredentialOverrides {
    fn from(args: CredentialArgs) -> Self {
        Self {
            access_key: args.access_key,
            secret_key: args.secret_key,
        }
    }
}
