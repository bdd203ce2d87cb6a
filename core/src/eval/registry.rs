use crate::gate::{Gate, GATES};
use crate::params::Validator;
use serde::{Deserialize, Serialize};

pub const REGISTRY_VERSION: &str = "gates_registry_v1";

/// Serializable catalog of every registered gate, trigger and parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateRegistry {
    pub registry_version: String,
    pub gates: Vec<GateDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateDef {
    pub gate: String,
    pub description: String,
    pub triggers: Vec<TriggerDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerDef {
    pub trigger: String,
    pub description: String,
    pub params: Vec<ParamDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDef {
    pub name: String,
    pub format: String, // LIST|NAME_VERSION_LIST
    pub description: String,
}

fn gate_def(g: &Gate) -> GateDef {
    GateDef {
        gate: g.name.to_string(),
        description: g.description.to_string(),
        triggers: g
            .triggers
            .iter()
            .map(|k| TriggerDef {
                trigger: k.name().to_string(),
                description: k.description().to_string(),
                params: k
                    .params()
                    .iter()
                    .map(|p| ParamDef {
                        name: p.name.to_string(),
                        format: match p.validator {
                            Validator::DelimitedList => "LIST",
                            Validator::NameVersionList => "NAME_VERSION_LIST",
                        }
                        .to_string(),
                        description: p.description.to_string(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

pub fn registry() -> GateRegistry {
    GateRegistry {
        registry_version: REGISTRY_VERSION.to_string(),
        gates: GATES.iter().map(gate_def).collect(),
    }
}
