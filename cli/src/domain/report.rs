//! Per-step status of a provisioning run.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Result of one best-effort action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Succeeded,
    /// The program ran and exited non-zero (or was killed by a signal).
    Failed { code: Option<i32>, stderr: String },
    /// The program could not be run at all.
    Errored { error: String },
}

impl StepOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Short human-readable reason, empty on success.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Succeeded => String::new(),
            Self::Failed { code: Some(code), stderr } if !stderr.is_empty() => {
                format!("exit code {code}: {stderr}")
            }
            Self::Failed { code: Some(code), .. } => format!("exit code {code}"),
            Self::Failed { code: None, .. } => "terminated by signal".to_string(),
            Self::Errored { error } => error.clone(),
        }
    }
}

/// One recorded action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub phase: String,
    /// The action as it would be typed in a shell.
    pub action: String,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

/// Everything the routine did before launching the loader.
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionReport {
    pub started_at: DateTime<Utc>,
    pub steps: Vec<StepReport>,
}

impl ProvisionReport {
    #[must_use]
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            steps: Vec::new(),
        }
    }

    pub fn record(&mut self, phase: &str, action: String, outcome: StepOutcome) {
        self.steps.push(StepReport {
            phase: phase.to_string(),
            action,
            outcome,
        });
    }

    /// Steps that did not succeed.
    pub fn failures(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|s| !s.outcome.is_success())
    }

    /// `true` when every recorded step succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}
