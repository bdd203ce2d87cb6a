use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_TRIGGER_BUDGET_MS: u64 = 30_000;

fn default_trigger_budget_ms() -> u64 {
    DEFAULT_TRIGGER_BUDGET_MS
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Wall-clock budget for a single trigger evaluation.
    #[serde(default = "default_trigger_budget_ms")]
    pub trigger_budget_ms: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            trigger_budget_ms: DEFAULT_TRIGGER_BUDGET_MS,
        }
    }
}

impl RunnerConfig {
    pub fn from_json_str(s: &str) -> CoreResult<Self> {
        let cfg: RunnerConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let body = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&body)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.trigger_budget_ms == 0 {
            return Err(CoreError::InvalidInput(
                "trigger_budget_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn trigger_budget(&self) -> Duration {
        Duration::from_millis(self.trigger_budget_ms)
    }
}
