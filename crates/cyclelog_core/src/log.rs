//! Cycle log records.

use crate::serde_helpers::{id_opt, timestamp_opt};
use crate::{MachineId, OperatorId, SupervisorId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Outcome the operator reported for a cycle.
///
/// Stored as `"OK"` / `"DELAY"`. Any other string is preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    /// Cycle completed on time
    Ok,
    /// Cycle completed late
    Delay,
    /// Unrecognised value carried through unchanged
    Other(String),
}

impl Status {
    /// Convert to the stored string representation.
    pub fn as_str(&self) -> &str {
        match self {
            Status::Ok => "OK",
            Status::Delay => "DELAY",
            Status::Other(raw) => raw,
        }
    }
}

impl From<String> for Status {
    fn from(raw: String) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "OK" => Status::Ok,
            "DELAY" => Status::Delay,
            _ => Status::Other(raw),
        }
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Supervisor review outcome. An absent value means "not yet reviewed".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Confirmation {
    /// Supervisor confirmed the cycle
    Confirmed,
    /// Supervisor rejected the cycle
    NotConfirmed,
    /// Unrecognised value carried through unchanged
    Other(String),
}

impl Confirmation {
    /// Convert to the stored string representation.
    pub fn as_str(&self) -> &str {
        match self {
            Confirmation::Confirmed => "CONFIRMED",
            Confirmation::NotConfirmed => "NOT_CONFIRMED",
            Confirmation::Other(raw) => raw,
        }
    }

    /// Whether this value counts as a completed review.
    pub fn is_review(&self) -> bool {
        matches!(self, Confirmation::Confirmed | Confirmation::NotConfirmed)
    }
}

impl From<String> for Confirmation {
    fn from(raw: String) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "CONFIRMED" => Confirmation::Confirmed,
            "NOT_CONFIRMED" => Confirmation::NotConfirmed,
            _ => Confirmation::Other(raw),
        }
    }
}

impl From<Confirmation> for String {
    fn from(confirmation: Confirmation) -> Self {
        confirmation.as_str().to_string()
    }
}

impl std::fmt::Display for Confirmation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One operator work-cycle on one machine.
///
/// `log_id` is unique only within the machine-day file that holds the log;
/// identity across the archive is `(machine_id, day, log_id)`. Fields this
/// type does not model are kept in `extra` and written back untouched.
///
/// # Examples
///
/// ```
/// use cyclelog_core::{CycleLog, Status};
///
/// let log = CycleLog::builder()
///     .machine_id(3)
///     .operator_id(7)
///     .status(Status::Ok)
///     .cycle_start_time("2024-01-01T08:00:00Z".parse::<chrono::DateTime<chrono::Utc>>().unwrap())
///     .build()
///     .unwrap();
///
/// assert_eq!(log.log_id, None);
/// assert_eq!(log.machine_id, Some(3));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, derive_builder::Builder)]
#[builder(default, setter(into, strip_option))]
pub struct CycleLog {
    /// Sequence number within the day-file, assigned on append
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_id: Option<u64>,
    /// Machine the cycle ran on
    #[serde(default, with = "id_opt")]
    pub machine_id: Option<MachineId>,
    /// Operator who ran the cycle
    #[serde(default, with = "id_opt")]
    pub operator_id: Option<OperatorId>,
    /// Supervisor who reviewed the cycle
    #[serde(default, with = "id_opt")]
    pub supervisor_id: Option<SupervisorId>,
    /// Needle/thread color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Operator-reported outcome
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    /// When the operator signalled completion
    #[serde(default, with = "timestamp_opt")]
    pub operator_press_time: Option<DateTime<Utc>>,
    /// Cycle window start; selects the day-file
    #[serde(default, with = "timestamp_opt")]
    pub cycle_start_time: Option<DateTime<Utc>>,
    /// Cycle window end
    #[serde(default, with = "timestamp_opt")]
    pub cycle_end_time: Option<DateTime<Utc>>,
    /// Supervisor review outcome (`None` = unreviewed)
    #[serde(default)]
    pub supervisor_confirmation: Option<Confirmation>,
    /// When the supervisor badge-scanned to confirm
    #[serde(default, with = "timestamp_opt")]
    pub supervisor_scan_time: Option<DateTime<Utc>>,
    /// Last write time, stamped by the log store
    #[serde(default, with = "timestamp_opt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Unmodelled fields, passed through unvalidated
    #[serde(flatten)]
    #[builder(setter(custom))]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CycleLog {
    /// Creates a new cycle log builder.
    pub fn builder() -> CycleLogBuilder {
        CycleLogBuilder::default()
    }
}

impl CycleLogBuilder {
    /// Adds one pass-through field.
    pub fn extra_field(&mut self, key: impl Into<String>, value: serde_json::Value) -> &mut Self {
        self.extra
            .get_or_insert_with(serde_json::Map::new)
            .insert(key.into(), value);
        self
    }
}

/// Access to the two timestamps that order logs for presentation.
pub trait CycleTimes {
    /// Cycle window start
    fn cycle_start(&self) -> Option<DateTime<Utc>>;
    /// Operator completion signal
    fn operator_press(&self) -> Option<DateTime<Utc>>;
}

impl CycleTimes for CycleLog {
    fn cycle_start(&self) -> Option<DateTime<Utc>> {
        self.cycle_start_time
    }

    fn operator_press(&self) -> Option<DateTime<Utc>> {
        self.operator_press_time
    }
}

// Later timestamps first, missing timestamps last.
fn newest_first(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Order by `cycle_start_time` descending, then `operator_press_time`
/// descending. The sort is stable, so full ties keep their scan order.
pub fn sort_most_recent_first<T: CycleTimes>(logs: &mut [T]) {
    logs.sort_by(|a, b| {
        newest_first(a.cycle_start(), b.cycle_start())
            .then_with(|| newest_first(a.operator_press(), b.operator_press()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap()
    }

    #[test]
    fn unknown_fields_survive_a_round_trip() {
        let raw = r#"{"log_id":4,"machine_id":2,"cycle_start_time":"2024-01-01T08:00:00.000Z","supervisor_badge":"100100100"}"#;
        let log: CycleLog = serde_json::from_str(raw).unwrap();
        assert_eq!(log.extra.get("supervisor_badge").unwrap(), "100100100");

        let back = serde_json::to_value(&log).unwrap();
        assert_eq!(back["supervisor_badge"], "100100100");
        assert_eq!(back["log_id"], 4);
    }

    #[test]
    fn status_and_confirmation_parse_leniently() {
        let log: CycleLog =
            serde_json::from_str(r#"{"status":"delay","supervisor_confirmation":"NOT_CONFIRMED"}"#)
                .unwrap();
        assert_eq!(log.status, Some(Status::Delay));
        assert_eq!(log.supervisor_confirmation, Some(Confirmation::NotConfirmed));

        let log: CycleLog = serde_json::from_str(r#"{"status":"none"}"#).unwrap();
        assert_eq!(log.status, Some(Status::Other("none".to_string())));
    }

    #[test]
    fn sorts_newest_start_then_newest_press() {
        let log = |id: u64, start: Option<DateTime<Utc>>, press: Option<DateTime<Utc>>| CycleLog {
            log_id: Some(id),
            cycle_start_time: start,
            operator_press_time: press,
            ..Default::default()
        };
        let mut logs = vec![
            log(1, Some(at(8, 0)), Some(at(8, 5))),
            log(2, None, None),
            log(3, Some(at(9, 0)), None),
            log(4, Some(at(8, 0)), Some(at(8, 9))),
            log(5, Some(at(8, 0)), Some(at(8, 5))),
        ];
        sort_most_recent_first(&mut logs);
        let order: Vec<u64> = logs.iter().filter_map(|l| l.log_id).collect();
        assert_eq!(order, vec![3, 4, 1, 5, 2]);
    }
}
