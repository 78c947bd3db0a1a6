//! Reference records joined onto raw logs.

use crate::serde_helpers::id;
use crate::{MachineId, OperatorId, SupervisorId};
use serde::{Deserialize, Serialize};

/// Badge recorded for operators missing from the metadata snapshot.
pub const UNKNOWN_BADGE: &str = "UNKNOWN";

/// A machine on the floor (`machines.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    /// Numeric id, matches the `machine_<id>` directory
    #[serde(with = "id")]
    pub machine_id: MachineId,
    /// Human-facing machine code
    #[serde(default)]
    pub code: String,
    /// Unmodelled fields
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// An operator (`operators.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operator {
    /// Numeric id
    #[serde(with = "id")]
    pub operator_id: OperatorId,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Badge number
    #[serde(default)]
    pub badge: Option<String>,
    /// Unmodelled fields
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A supervisor (`supervisors.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supervisor {
    /// Numeric id
    #[serde(with = "id")]
    pub supervisor_id: SupervisorId,
    /// Display name
    #[serde(default)]
    pub supervisor_name: String,
    /// Badge number
    #[serde(default)]
    pub badge: Option<String>,
    /// Unmodelled fields
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Machine {
    /// Create a machine record.
    pub fn new(machine_id: MachineId, code: impl Into<String>) -> Self {
        Self {
            machine_id,
            code: code.into(),
            extra: serde_json::Map::new(),
        }
    }
}

impl Operator {
    /// Create an operator record.
    pub fn new(operator_id: OperatorId, name: impl Into<String>, badge: Option<String>) -> Self {
        Self {
            operator_id,
            name: name.into(),
            badge,
            extra: serde_json::Map::new(),
        }
    }
}

impl Supervisor {
    /// Create a supervisor record.
    pub fn new(
        supervisor_id: SupervisorId,
        supervisor_name: impl Into<String>,
        badge: Option<String>,
    ) -> Self {
        Self {
            supervisor_id,
            supervisor_name: supervisor_name.into(),
            badge,
            extra: serde_json::Map::new(),
        }
    }
}

/// Point-in-time copy of the three reference tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataSnapshot {
    /// Known machines
    pub machines: Vec<Machine>,
    /// Known operators
    pub operators: Vec<Operator>,
    /// Known supervisors
    pub supervisors: Vec<Supervisor>,
}

impl MetadataSnapshot {
    /// Look up an operator by id.
    pub fn operator(&self, operator_id: OperatorId) -> Option<&Operator> {
        self.operators.iter().find(|o| o.operator_id == operator_id)
    }

    /// Look up a supervisor by id.
    pub fn supervisor(&self, supervisor_id: SupervisorId) -> Option<&Supervisor> {
        self.supervisors
            .iter()
            .find(|s| s.supervisor_id == supervisor_id)
    }

    /// Badge for an operator, or [`UNKNOWN_BADGE`] when the operator or badge is missing.
    pub fn operator_badge(&self, operator_id: OperatorId) -> &str {
        self.operator(operator_id)
            .and_then(|o| o.badge.as_deref())
            .filter(|badge| !badge.is_empty())
            .unwrap_or(UNKNOWN_BADGE)
    }

    /// Ids of every known machine, in table order.
    pub fn machine_ids(&self) -> Vec<MachineId> {
        self.machines.iter().map(|m| m.machine_id).collect()
    }
}
