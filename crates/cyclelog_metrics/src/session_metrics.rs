//! Aggregates over operator sessions.

use crate::UtilizationConfig;
use chrono::Duration;
use cyclelog_core::OperatorSession;
use derive_getters::Getters;
use serde::Serialize;
use std::collections::HashSet;

/// Staffing and utilization derived from sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
pub struct SessionMetrics {
    /// Distinct operators with at least one session
    active_operators: usize,
    /// Summed session time in milliseconds
    #[getter(skip)]
    total_duration_ms: i64,
    /// `total / active_operators` in milliseconds, `0` with no operators
    #[getter(skip)]
    avg_work_time_ms: i64,
    /// Session time as a percentage of `machine_count × shift_hours`
    utilization: f64,
}

impl SessionMetrics {
    /// Compute over `sessions` against the capacity in `config`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{Duration, TimeZone, Utc};
    /// use cyclelog_core::OperatorSession;
    /// use cyclelog_metrics::{SessionMetrics, UtilizationConfig};
    ///
    /// let start = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
    /// let session = OperatorSession {
    ///     session_id: 1,
    ///     machine_id: 1,
    ///     operator_id: 7,
    ///     badge: "B-7".to_string(),
    ///     started_at: start,
    ///     last_heartbeat: start + Duration::hours(4),
    ///     ended_at: start + Duration::hours(4),
    /// };
    ///
    /// let metrics = SessionMetrics::compute(&[session], &UtilizationConfig::default());
    /// assert_eq!(*metrics.utilization(), 6.25);
    /// ```
    pub fn compute(sessions: &[OperatorSession], config: &UtilizationConfig) -> Self {
        let active_operators = sessions
            .iter()
            .map(|s| s.operator_id)
            .collect::<HashSet<_>>()
            .len();
        let total_duration_ms: i64 = sessions
            .iter()
            .map(|s| s.duration().num_milliseconds())
            .sum();

        let avg_work_time_ms = match i64::try_from(active_operators) {
            Ok(n) if n > 0 => total_duration_ms / n,
            _ => 0,
        };

        let capacity_ms = config.capacity_ms();
        let utilization = if capacity_ms > 0 {
            total_duration_ms as f64 / capacity_ms as f64 * 100.0
        } else {
            0.0
        };

        Self {
            active_operators,
            total_duration_ms,
            avg_work_time_ms,
            utilization,
        }
    }

    /// Summed session time.
    pub fn total_duration(&self) -> Duration {
        Duration::milliseconds(self.total_duration_ms)
    }

    /// Average session time per active operator.
    pub fn avg_work_time(&self) -> Duration {
        Duration::milliseconds(self.avg_work_time_ms)
    }
}
