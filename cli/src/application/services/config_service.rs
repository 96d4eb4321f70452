//! Application service: configuration use-cases.

use anyhow::Result;

use crate::application::ports::ConfigSource;
use crate::domain::{BootstrapConfig, InvalidConfig};

/// Credential overrides taken from the command line or environment.
#[derive(Debug, Default, Clone)]
pub struct CredentialOverrides {
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

/// Load configuration and apply credential overrides, without validating.
///
/// # Errors
///
/// Returns an error if the source cannot be read or parsed.
pub fn load_config(
    source: &impl ConfigSource,
    overrides: CredentialOverrides,
) -> Result<BootstrapConfig> {
    let mut config = source.load()?;
    config.apply_credentials(overrides.access_key, overrides.secret_key);
    Ok(config)
}

/// Load, override and validate configuration.
///
/// # Errors
///
/// Returns an error if loading fails or the result is invalid; validation
/// failures surface as [`InvalidConfig`] listing every problem.
pub fn load_validated(
    source: &impl ConfigSource,
    overrides: CredentialOverrides,
) -> Result<BootstrapConfig> {
    let config = load_config(source, overrides)?;
    config.validate().map_err(InvalidConfig)?;
    tracing::debug!(path = %source.path().display(), ?config, "configuration loaded");
    Ok(config)
}
