//! Logs joined with human-readable metadata.

use crate::serde_helpers::timestamp_opt;
use crate::{
    Confirmation, CycleLog, CycleTimes, MachineId, MetadataSnapshot, OperatorId, Status,
    SupervisorId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name and badge of a person referenced by a log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRef {
    /// Display name
    pub name: String,
    /// Badge number, if recorded
    pub badge: Option<String>,
}

/// A cycle log with operator and supervisor names resolved.
///
/// `operator` / `supervisor` are `None` when the id is null or unknown to the
/// metadata snapshot; the raw ids are kept either way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogView {
    /// Sequence number within the machine-day file
    pub log_id: Option<u64>,
    /// Machine the cycle ran on
    pub machine_id: Option<MachineId>,
    /// Raw operator id
    pub operator_id: Option<OperatorId>,
    /// Raw supervisor id
    pub supervisor_id: Option<SupervisorId>,
    /// Resolved operator
    pub operator: Option<PersonRef>,
    /// Resolved supervisor
    pub supervisor: Option<PersonRef>,
    /// Needle/thread color
    pub color: Option<String>,
    /// Operator-reported outcome
    pub status: Option<Status>,
    /// When the operator signalled completion
    #[serde(default, with = "timestamp_opt")]
    pub operator_press_time: Option<DateTime<Utc>>,
    /// Supervisor review outcome
    pub supervisor_confirmation: Option<Confirmation>,
    /// When the supervisor confirmed
    #[serde(default, with = "timestamp_opt")]
    pub supervisor_scan_time: Option<DateTime<Utc>>,
    /// Cycle window start
    #[serde(default, with = "timestamp_opt")]
    pub cycle_start_time: Option<DateTime<Utc>>,
    /// Cycle window end
    #[serde(default, with = "timestamp_opt")]
    pub cycle_end_time: Option<DateTime<Utc>>,
}

impl LogView {
    /// Join one raw log against a metadata snapshot.
    pub fn join(log: CycleLog, metadata: &MetadataSnapshot) -> Self {
        let operator = log
            .operator_id
            .and_then(|id| metadata.operator(id))
            .map(|o| PersonRef {
                name: o.name.clone(),
                badge: o.badge.clone(),
            });
        let supervisor = log
            .supervisor_id
            .and_then(|id| metadata.supervisor(id))
            .map(|s| PersonRef {
                name: s.supervisor_name.clone(),
                badge: s.badge.clone(),
            });

        Self {
            log_id: log.log_id,
            machine_id: log.machine_id,
            operator_id: log.operator_id,
            supervisor_id: log.supervisor_id,
            operator,
            supervisor,
            color: log.color,
            status: log.status,
            operator_press_time: log.operator_press_time,
            supervisor_confirmation: log.supervisor_confirmation,
            supervisor_scan_time: log.supervisor_scan_time,
            cycle_start_time: log.cycle_start_time,
            cycle_end_time: log.cycle_end_time,
        }
    }

    /// Response latency: scan minus press, only when the scan strictly follows the press.
    pub fn response_latency(&self) -> Option<chrono::Duration> {
        let press = self.operator_press_time?;
        let scan = self.supervisor_scan_time?;
        (scan > press).then(|| scan - press)
    }
}

impl CycleTimes for LogView {
    fn cycle_start(&self) -> Option<DateTime<Utc>> {
        self.cycle_start_time
    }

    fn operator_press(&self) -> Option<DateTime<Utc>> {
        self.operator_press_time
    }
}
