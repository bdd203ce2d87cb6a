pub mod csv_export;
pub mod digest;

use crate::error::{CoreError, CoreResult};
use crate::eval::runner::{TriggerRunResult, TriggerStatus};
use crate::trigger::Violation;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use ulid::Ulid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub evaluation_id: String,
    pub image_id: String,
    pub evaluated_at: String,
    pub results: Vec<TriggerRunResult>,
    /// SHA-256 of the canonical JSON of all violations, in result order.
    pub violations_sha256: String,
}

impl EvaluationReport {
    pub fn new(image_id: &str, results: Vec<TriggerRunResult>) -> CoreResult<Self> {
        let evaluated_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(|e| CoreError::InvalidInput(format!("timestamp formatting failed: {}", e)))?;
        let violations_sha256 = digest::canonical_sha256(&collect_violations(&results))?;
        Ok(Self {
            evaluation_id: format!("e_{}", Ulid::new()),
            image_id: image_id.to_string(),
            evaluated_at,
            results,
            violations_sha256,
        })
    }

    pub fn violations(&self) -> Vec<Violation> {
        collect_violations(&self.results)
    }

    /// True when every invocation passed.
    pub fn passed(&self) -> bool {
        self.results.iter().all(|r| r.status == TriggerStatus::PASS)
    }

    pub fn violations_csv(&self) -> CoreResult<String> {
        csv_export::render_violations_csv(&self.image_id, &self.violations())
    }
}

fn collect_violations(results: &[TriggerRunResult]) -> Vec<Violation> {
    results
        .iter()
        .flat_map(|r| r.violations.iter().cloned())
        .collect()
}
