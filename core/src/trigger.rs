//! The per-rule evaluation unit.
//!
//! Every trigger kind belongs to exactly one gate and declares a fixed
//! parameter schema. Raw parameters are validated once, producing a typed
//! trigger value that can then be evaluated against any number of images.

use crate::error::{CoreError, CoreResult};
use crate::image::ImageView;
use crate::params::{parse_params, ParamSpec, TriggerParams};
use crate::pkgcheck::not_present::PkgNotPresentTrigger;
use crate::pkgcheck::verify::VerifyTrigger;
use crate::version::VersionComparator;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One fired rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Violation {
    pub gate: String,
    pub trigger: String,
    pub message: String,
}

/// Everything a trigger may read during evaluation.
pub struct EvalContext<'a> {
    pub image: &'a dyn ImageView,
    pub comparator: &'a dyn VersionComparator,
}

/// Collects the violations fired by one evaluation, plus notes about
/// comparisons that could not be completed.
#[derive(Debug)]
pub struct Firings {
    gate: &'static str,
    trigger: &'static str,
    violations: Vec<Violation>,
    notes: Vec<String>,
}

impl Firings {
    pub fn new(gate: &'static str, trigger: &'static str) -> Self {
        Self {
            gate,
            trigger,
            violations: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn fire(&mut self, message: impl Into<String>) {
        self.violations.push(Violation {
            gate: self.gate.to_string(),
            trigger: self.trigger.to_string(),
            message: message.into(),
        });
    }

    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_parts(self) -> (Vec<Violation>, Vec<String>) {
        (self.violations, self.notes)
    }
}

pub trait Trigger: Sized {
    const NAME: &'static str;
    const DESCRIPTION: &'static str;
    const PARAMS: &'static [ParamSpec];

    fn from_params(params: &TriggerParams) -> Self;

    fn evaluate(&self, ctx: &EvalContext<'_>, out: &mut Firings) -> CoreResult<()>;
}

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TriggerKind {
    PKGNOTPRESENT,
    VERIFY,
}

impl TriggerKind {
    pub const ALL: [TriggerKind; 2] = [TriggerKind::PKGNOTPRESENT, TriggerKind::VERIFY];

    pub fn name(self) -> &'static str {
        match self {
            TriggerKind::PKGNOTPRESENT => PkgNotPresentTrigger::NAME,
            TriggerKind::VERIFY => VerifyTrigger::NAME,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            TriggerKind::PKGNOTPRESENT => PkgNotPresentTrigger::DESCRIPTION,
            TriggerKind::VERIFY => VerifyTrigger::DESCRIPTION,
        }
    }

    pub fn params(self) -> &'static [ParamSpec] {
        match self {
            TriggerKind::PKGNOTPRESENT => PkgNotPresentTrigger::PARAMS,
            TriggerKind::VERIFY => VerifyTrigger::PARAMS,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|k| k.name() == upper)
    }

    /// Validates `raw` against this kind's schema and builds the trigger.
    pub fn configure(self, raw: &BTreeMap<String, String>) -> CoreResult<ConfiguredTrigger> {
        let params = parse_params(self.params(), raw)?;
        Ok(match self {
            TriggerKind::PKGNOTPRESENT => {
                ConfiguredTrigger::PkgNotPresent(PkgNotPresentTrigger::from_params(&params))
            }
            TriggerKind::VERIFY => ConfiguredTrigger::Verify(VerifyTrigger::from_params(&params)),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfiguredTrigger {
    PkgNotPresent(PkgNotPresentTrigger),
    Verify(VerifyTrigger),
}

/// Output of one trigger evaluation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TriggerOutcome {
    pub violations: Vec<Violation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl ConfiguredTrigger {
    pub fn kind(&self) -> TriggerKind {
        match self {
            ConfiguredTrigger::PkgNotPresent(_) => TriggerKind::PKGNOTPRESENT,
            ConfiguredTrigger::Verify(_) => TriggerKind::VERIFY,
        }
    }

    pub fn evaluate(&self, gate: &'static str, ctx: &EvalContext<'_>) -> CoreResult<TriggerOutcome> {
        let mut out = Firings::new(gate, self.kind().name());
        match self {
            ConfiguredTrigger::PkgNotPresent(t) => t.evaluate(ctx, &mut out)?,
            ConfiguredTrigger::Verify(t) => t.evaluate(ctx, &mut out)?,
        }
        tracing::debug!(
            gate,
            trigger = self.kind().name(),
            image_id = ctx.image.image_id(),
            fired = out.violations().len(),
            "trigger evaluated"
        );
        let (violations, notes) = out.into_parts();
        Ok(TriggerOutcome { violations, notes })
    }
}

/// Parses `raw` for `trigger` of `gate` and evaluates it in one step.
pub fn evaluate_trigger(
    gate: &str,
    trigger: &str,
    raw: &BTreeMap<String, String>,
    ctx: &EvalContext<'_>,
) -> CoreResult<TriggerOutcome> {
    let g = crate::gate::gate_by_name(gate)
        .ok_or_else(|| CoreError::UnknownGate(gate.to_string()))?;
    let kind = g.trigger(trigger)?;
    kind.configure(raw)?.evaluate(g.name, ctx)
}
