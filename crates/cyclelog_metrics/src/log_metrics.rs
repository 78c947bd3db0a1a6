//! Aggregates over a log collection.

use crate::score::{Score, percent};
use chrono::Duration;
use cyclelog_core::{Confirmation, LogView, Status};
use derive_getters::Getters;
use serde::Serialize;

/// Counts and rates over a set of logs.
///
/// Rates are percentages. Compliance and review rates are `0` for an empty
/// set; credibility is [`Score::NotApplicable`] until something is reviewed.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
pub struct LogMetrics {
    /// Logs considered
    total: usize,
    /// Logs with status `OK`
    ok: usize,
    /// Logs with status `DELAY`
    delay: usize,
    /// Logs with a `CONFIRMED` or `NOT_CONFIRMED` review
    reviewed: usize,
    /// Logs with a `CONFIRMED` review
    confirmed: usize,
    /// Mean supervisor response in milliseconds, over logs where the scan follows the press
    #[getter(skip)]
    avg_response_ms: Option<i64>,
    /// `reviewed / total`
    review_rate: f64,
    /// `confirmed / reviewed`
    credibility: Score,
    /// `ok / total`
    ok_rate: f64,
    /// `delay / total`
    delay_rate: f64,
}

impl LogMetrics {
    /// Compute over `logs`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{Duration, TimeZone, Utc};
    /// use cyclelog_core::LogView;
    /// use cyclelog_metrics::LogMetrics;
    ///
    /// let t = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
    /// let logs = vec![
    ///     LogView { operator_press_time: Some(t), supervisor_scan_time: Some(t + Duration::minutes(5)), ..Default::default() },
    ///     LogView { operator_press_time: Some(t), supervisor_scan_time: Some(t - Duration::minutes(1)), ..Default::default() },
    /// ];
    ///
    /// assert_eq!(LogMetrics::compute(&logs).avg_response(), Some(Duration::minutes(5)));
    /// ```
    pub fn compute(logs: &[LogView]) -> Self {
        let total = logs.len();
        let mut ok = 0;
        let mut delay = 0;
        let mut reviewed = 0;
        let mut confirmed = 0;
        let mut response_sum_ms: i64 = 0;
        let mut response_count: i64 = 0;

        for log in logs {
            match log.status {
                Some(Status::Ok) => ok += 1,
                Some(Status::Delay) => delay += 1,
                _ => {}
            }

            if let Some(confirmation) = &log.supervisor_confirmation {
                if confirmation.is_review() {
                    reviewed += 1;
                }
                if *confirmation == Confirmation::Confirmed {
                    confirmed += 1;
                }
            }

            if let Some(latency) = log.response_latency() {
                response_sum_ms += latency.num_milliseconds();
                response_count += 1;
            }
        }

        Self {
            total,
            ok,
            delay,
            reviewed,
            confirmed,
            avg_response_ms: (response_count > 0).then(|| response_sum_ms / response_count),
            review_rate: percent(reviewed, total),
            credibility: Score::ratio(confirmed, reviewed),
            ok_rate: percent(ok, total),
            delay_rate: percent(delay, total),
        }
    }

    /// Mean supervisor response time; `None` when no log has a valid press/scan pair.
    pub fn avg_response(&self) -> Option<Duration> {
        self.avg_response_ms.map(Duration::milliseconds)
    }
}
