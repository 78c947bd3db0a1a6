//! The KPI dashboard report.

use crate::{
    LogMetrics, OperatorRollup, SessionMetrics, SupervisorRank, UtilizationConfig,
    operator_rollups, supervisor_ranking,
};
use cyclelog_core::{LogView, OperatorSession};
use derive_getters::Getters;
use serde::Serialize;

/// Everything the KPI view shows for one window.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
pub struct KpiReport {
    /// Log-level counts and rates
    logs: LogMetrics,
    /// Session-level staffing and utilization
    sessions: SessionMetrics,
    /// Operators, most active first
    operators: Vec<OperatorRollup>,
    /// Supervisors, most reviews first
    supervisors: Vec<SupervisorRank>,
}

impl KpiReport {
    /// Operator with the most cycles.
    pub fn top_operator(&self) -> Option<&OperatorRollup> {
        self.operators.first()
    }

    /// Supervisor with the most reviews.
    pub fn top_supervisor(&self) -> Option<&SupervisorRank> {
        self.supervisors.first()
    }
}

/// Build the KPI report for one set of logs and the sessions of the same window.
pub fn kpi_report(
    logs: &[LogView],
    sessions: &[OperatorSession],
    config: &UtilizationConfig,
) -> KpiReport {
    KpiReport {
        logs: LogMetrics::compute(logs),
        sessions: SessionMetrics::compute(sessions, config),
        operators: operator_rollups(logs, sessions),
        supervisors: supervisor_ranking(logs),
    }
}
