//! Per-day buckets for trend views.

use crate::{LogMetrics, SessionMetrics, UtilizationConfig};
use chrono::NaiveDate;
use cyclelog_core::{LogView, OperatorSession};
use derive_getters::Getters;
use serde::Serialize;
use std::collections::BTreeMap;

/// Metrics for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
pub struct DailyRollup {
    /// UTC day
    day: NaiveDate,
    /// Cycles that started on this day
    cycles: usize,
    /// Log metrics for the day's cycles
    logs: LogMetrics,
    /// Session metrics for sessions that started on this day
    sessions: SessionMetrics,
}

/// One rollup per day that has any logs or sessions, ascending by day.
///
/// Logs are bucketed by `cycle_start_time` and sessions by `started_at`, both
/// truncated to the UTC day. Logs without a start time belong to no day.
pub fn daily_rollups(
    logs: &[LogView],
    sessions: &[OperatorSession],
    config: &UtilizationConfig,
) -> Vec<DailyRollup> {
    let mut days: BTreeMap<NaiveDate, (Vec<LogView>, Vec<OperatorSession>)> = BTreeMap::new();

    for log in logs {
        if let Some(start) = log.cycle_start_time {
            days.entry(start.date_naive()).or_default().0.push(log.clone());
        }
    }
    for session in sessions {
        days.entry(session.started_at.date_naive())
            .or_default()
            .1
            .push(session.clone());
    }

    days.into_iter()
        .map(|(day, (logs, sessions))| DailyRollup {
            day,
            cycles: logs.len(),
            logs: LogMetrics::compute(&logs),
            sessions: SessionMetrics::compute(&sessions, config),
        })
        .collect()
}
