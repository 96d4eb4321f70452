//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod plan;
pub mod report;

pub use config::BootstrapConfig;
pub use error::{BootstrapError, ConfigError, InvalidConfig};
pub use plan::{Action, CommandSpec, Download, Phase, Plan, build_plan};
pub use report::{ProvisionReport, StepOutcome, StepReport};
