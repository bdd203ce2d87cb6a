use crate::error::{CoreError, CoreResult};
use crate::eval::config::RunnerConfig;
use crate::gate::gate_by_name;
use crate::image::ImageView;
use crate::trigger::{ConfiguredTrigger, EvalContext, TriggerOutcome, Violation};
use crate::version::{DistroVersionComparator, VersionComparator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// One trigger of one gate, with its raw parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TriggerInvocation {
    pub gate: String,
    pub trigger: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TriggerStatus {
    PASS,
    FAIL,
    ERROR,
    TIMED_OUT,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerRunResult {
    pub gate: String,
    pub trigger: String,
    pub status: TriggerStatus,
    pub message: String,
    pub violations: Vec<Violation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl TriggerRunResult {
    fn from_outcome(gate: &str, trigger: &str, outcome: TriggerOutcome) -> Self {
        let (status, message) = if outcome.violations.is_empty() {
            (TriggerStatus::PASS, "ok".to_string())
        } else {
            (
                TriggerStatus::FAIL,
                format!("{} violation(s)", outcome.violations.len()),
            )
        };
        Self {
            gate: gate.to_string(),
            trigger: trigger.to_string(),
            status,
            message,
            violations: outcome.violations,
            notes: outcome.notes,
        }
    }

    fn failed(gate: &str, trigger: &str, status: TriggerStatus, message: String) -> Self {
        Self {
            gate: gate.to_string(),
            trigger: trigger.to_string(),
            status,
            message,
            violations: Vec::new(),
            notes: Vec::new(),
        }
    }
}

/// Runs trigger invocations against one image, each on its own thread with a
/// wall-clock budget. An evaluation that overruns its budget is reported as
/// `TIMED_OUT` and abandoned; the other invocations are unaffected.
pub struct GateRunner {
    pub config: RunnerConfig,
    comparator: Arc<dyn VersionComparator>,
}

impl GateRunner {
    pub fn new(config: RunnerConfig) -> CoreResult<Self> {
        Self::with_comparator(config, Arc::new(DistroVersionComparator))
    }

    pub fn with_comparator(
        config: RunnerConfig,
        comparator: Arc<dyn VersionComparator>,
    ) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self { config, comparator })
    }

    pub fn run<I>(&self, image: Arc<I>, invocations: &[TriggerInvocation]) -> Vec<TriggerRunResult>
    where
        I: ImageView + Send + Sync + 'static,
    {
        let started = Instant::now();
        let deadline = started + self.config.trigger_budget();

        // Parameter and lookup errors are reported before anything is spawned.
        let pending: Vec<Result<Spawned, TriggerRunResult>> = invocations
            .iter()
            .map(|inv| match configure(inv) {
                Ok((gate, trigger)) => Ok(Spawned {
                    gate,
                    trigger: trigger.kind().name(),
                    rx: self.spawn(Arc::clone(&image), gate, trigger),
                }),
                Err(e) => Err(TriggerRunResult::failed(
                    &inv.gate,
                    &inv.trigger,
                    TriggerStatus::ERROR,
                    e.to_string(),
                )),
            })
            .collect();

        let mut results = Vec::with_capacity(invocations.len());
        for slot in pending {
            let Spawned { gate, trigger, rx } = match slot {
                Ok(spawned) => spawned,
                Err(result) => {
                    results.push(result);
                    continue;
                }
            };
            let wait = deadline.saturating_duration_since(Instant::now());
            let result = match rx.recv_timeout(wait) {
                Ok(Ok(outcome)) => TriggerRunResult::from_outcome(gate, trigger, outcome),
                Ok(Err(e)) => {
                    TriggerRunResult::failed(gate, trigger, TriggerStatus::ERROR, e.to_string())
                }
                Err(RecvTimeoutError::Timeout) => {
                    tracing::warn!(
                        gate,
                        trigger,
                        budget_ms = self.config.trigger_budget_ms,
                        "trigger evaluation exceeded its budget"
                    );
                    TriggerRunResult::failed(
                        gate,
                        trigger,
                        TriggerStatus::TIMED_OUT,
                        format!(
                            "evaluation exceeded budget of {} ms",
                            self.config.trigger_budget_ms
                        ),
                    )
                }
                Err(RecvTimeoutError::Disconnected) => TriggerRunResult::failed(
                    gate,
                    trigger,
                    TriggerStatus::ERROR,
                    "evaluation aborted before producing a result".to_string(),
                ),
            };
            results.push(result);
        }

        tracing::info!(
            image_id = image.image_id(),
            invocations = invocations.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "gate evaluation finished"
        );
        results
    }

    fn spawn<I>(
        &self,
        image: Arc<I>,
        gate: &'static str,
        trigger: ConfiguredTrigger,
    ) -> mpsc::Receiver<CoreResult<TriggerOutcome>>
    where
        I: ImageView + Send + Sync + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let comparator = Arc::clone(&self.comparator);
        thread::spawn(move || {
            let ctx = EvalContext {
                image: image.as_ref(),
                comparator: comparator.as_ref(),
            };
            // The receiver is gone once the budget expired; nothing to report to.
            let _ = tx.send(trigger.evaluate(gate, &ctx));
        });
        rx
    }
}

/// Evaluation in flight under the canonical gate and trigger names.
struct Spawned {
    gate: &'static str,
    trigger: &'static str,
    rx: mpsc::Receiver<CoreResult<TriggerOutcome>>,
}

fn configure(inv: &TriggerInvocation) -> CoreResult<(&'static str, ConfiguredTrigger)> {
    let gate = gate_by_name(&inv.gate)
        .ok_or_else(|| CoreError::UnknownGate(inv.gate.clone()))?;
    let trigger = gate.trigger(&inv.trigger)?.configure(&inv.params)?;
    Ok((gate.name, trigger))
}
