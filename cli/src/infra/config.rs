//! Infrastructure implementation of the `ConfigSource` port.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::ConfigSource;
use crate::domain::config::BootstrapConfig;

/// Location used when neither `--config` nor `LOADER_BOOTSTRAP_CONFIG` is set.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/loader-bootstrap/config.yaml";

/// Reads the bootstrap configuration from a YAML file on disk.
pub struct YamlConfigLoader {
    path: PathBuf,
}

impl YamlConfigLoader {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Default for YamlConfigLoader {
    fn default() -> Self {
        Self::new(PathBuf::from(DEFAULT_CONFIG_PATH))
    }
}

impl ConfigSource for YamlConfigLoader {
    fn load(&self) -> Result<BootstrapConfig> {
        if !self.path.exists() {
            tracing::info!(path = %self.path.display(), "no config file, using built-in defaults");
            return Ok(BootstrapConfig::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("cannot read {}", self.path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("cannot parse {}", self.path.display()))
    }

    fn path(&self) -> PathBuf {
        self.path.clone()
    }
}
