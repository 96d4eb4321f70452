//! Validate command: check the configuration without touching the node.

use anyhow::Result;
use serde_json::json;

use crate::application::ports::ConfigSource;
use crate::application::services::config_service::load_config;
use crate::commands::CredentialArgs;
use crate::output::{OutputContext, json as json_out};

/// Run the validate command. Returns the process exit code.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or parsed.
pub fn run(
    ctx: &OutputContext,
    source: &impl ConfigSource,
    credentials: CredentialArgs,
    json: bool,
) -> Result<i32> {
    let cfg = load_config(source, credentials.into())?;
    let path = source.path().display().to_string();

    match cfg.validate() {
        Ok(()) => {
            if json {
                println!("{}", json_out::to_pretty(&json!({ "valid": true, "path": path }))?);
            } else {
                ctx.success(&format!("{path} is valid"));
                ctx.kv("bucket", &cfg.storage.bucket);
                ctx.kv("install root", &cfg.paths.install_root.display().to_string());
                ctx.kv("nfs export", &cfg.nfs.export);
            }
            Ok(0)
        }
        Err(errors) => {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            if json {
                let body = json!({ "valid": false, "path": path, "errors": messages });
                println!("{}", json_out::to_pretty(&body)?);
            } else {
                ctx.error(&format!("{path} is invalid"));
                for msg in &messages {
                    ctx.error(msg);
                }
            }
            Ok(1)
        }
    }
}
