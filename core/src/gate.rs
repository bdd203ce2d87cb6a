use crate::error::{CoreError, CoreResult};
use crate::trigger::TriggerKind;

/// Named, fixed grouping of trigger kinds. Gates carry no evaluation logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gate {
    pub name: &'static str,
    pub description: &'static str,
    pub triggers: &'static [TriggerKind],
}

pub const PKGCHECK: Gate = Gate {
    name: "PKGCHECK",
    description: "Checks installed packages for presence, version and file integrity",
    triggers: &[TriggerKind::PKGNOTPRESENT, TriggerKind::VERIFY],
};

pub static GATES: &[Gate] = &[PKGCHECK];

pub fn gate_by_name(name: &str) -> Option<&'static Gate> {
    let upper = name.trim().to_ascii_uppercase();
    GATES.iter().find(|g| g.name == upper)
}

impl Gate {
    pub fn trigger(&self, name: &str) -> CoreResult<TriggerKind> {
        TriggerKind::from_name(name)
            .filter(|k| self.triggers.contains(k))
            .ok_or_else(|| CoreError::UnknownTrigger {
                gate: self.name.to_string(),
                trigger: name.to_string(),
            })
    }

    pub fn trigger_names(&self) -> Vec<&'static str> {
        self.triggers.iter().map(|k| k.name()).collect()
    }
}
