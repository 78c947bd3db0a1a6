//! Per-operator rollups and supervisor ranking.

use chrono::Duration;
use cyclelog_core::{Confirmation, LogView, OperatorId, OperatorSession, Status, SupervisorId};
use derive_getters::Getters;
use serde::Serialize;
use std::collections::HashMap;

/// Identity an operator rollup is keyed by.
///
/// The numeric id wins whenever a log carries one, so one operator never
/// shows up under both their id and their name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum OperatorKey {
    /// Keyed by `operator_id`
    Id(OperatorId),
    /// Log had a resolved name but no id
    Name(String),
}

impl OperatorKey {
    fn for_log(log: &LogView) -> Option<Self> {
        match (log.operator_id, &log.operator) {
            (Some(id), _) => Some(OperatorKey::Id(id)),
            (None, Some(person)) if !person.name.is_empty() => {
                Some(OperatorKey::Name(person.name.clone()))
            }
            _ => None,
        }
    }
}

/// Activity of one operator.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
pub struct OperatorRollup {
    /// Identity
    key: OperatorKey,
    /// Display name, `ID <id>` when the operator is not in metadata
    name: String,
    /// Cycles run
    total: usize,
    /// Cycles with status `OK`
    ok: usize,
    /// Cycles with status `DELAY`
    delay: usize,
    /// Cycles a supervisor confirmed
    confirmed: usize,
    /// Summed session time in milliseconds
    #[getter(skip)]
    working_time_ms: i64,
}

impl OperatorRollup {
    /// Summed duration of this operator's sessions.
    pub fn working_time(&self) -> Duration {
        Duration::milliseconds(self.working_time_ms)
    }
}

/// One rollup per operator, most active first.
///
/// Logs with neither an operator id nor a resolved operator name are left
/// out. Working time sums the sessions whose `operator_id` matches an
/// id-keyed rollup. Ties keep first-seen order.
pub fn operator_rollups(logs: &[LogView], sessions: &[OperatorSession]) -> Vec<OperatorRollup> {
    let mut index: HashMap<OperatorKey, usize> = HashMap::new();
    let mut rollups: Vec<OperatorRollup> = Vec::new();

    for log in logs {
        let Some(key) = OperatorKey::for_log(log) else {
            continue;
        };
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            let name = match (&log.operator, &key) {
                (Some(person), _) if !person.name.is_empty() => person.name.clone(),
                (_, OperatorKey::Id(id)) => format!("ID {}", id),
                (_, OperatorKey::Name(name)) => name.clone(),
            };
            rollups.push(OperatorRollup {
                key,
                name,
                total: 0,
                ok: 0,
                delay: 0,
                confirmed: 0,
                working_time_ms: 0,
            });
            rollups.len() - 1
        });

        let rollup = &mut rollups[slot];
        rollup.total += 1;
        match log.status {
            Some(Status::Ok) => rollup.ok += 1,
            Some(Status::Delay) => rollup.delay += 1,
            _ => {}
        }
        if log.supervisor_confirmation == Some(Confirmation::Confirmed) {
            rollup.confirmed += 1;
        }
    }

    for session in sessions {
        if let Some(&slot) = index.get(&OperatorKey::Id(session.operator_id)) {
            rollups[slot].working_time_ms += session.duration().num_milliseconds();
        }
    }

    rollups.sort_by(|a, b| b.total.cmp(&a.total));
    rollups
}

/// Reviews performed by one supervisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct SupervisorRank {
    /// Supervisor id
    supervisor_id: SupervisorId,
    /// Display name, `ID <id>` when the supervisor is not in metadata
    name: String,
    /// Logs reviewed (`CONFIRMED` or `NOT_CONFIRMED`)
    reviewed: usize,
}

/// Supervisors by number of reviewed logs, descending. Ties keep first-seen order.
pub fn supervisor_ranking(logs: &[LogView]) -> Vec<SupervisorRank> {
    let mut index: HashMap<SupervisorId, usize> = HashMap::new();
    let mut ranks: Vec<SupervisorRank> = Vec::new();

    let reviewed = logs.iter().filter(|log| {
        log.supervisor_confirmation
            .as_ref()
            .is_some_and(Confirmation::is_review)
    });

    for log in reviewed {
        let Some(supervisor_id) = log.supervisor_id else {
            continue;
        };
        let slot = *index.entry(supervisor_id).or_insert_with(|| {
            let name = log
                .supervisor
                .as_ref()
                .map(|p| p.name.clone())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| format!("ID {}", supervisor_id));
            ranks.push(SupervisorRank {
                supervisor_id,
                name,
                reviewed: 0,
            });
            ranks.len() - 1
        });
        ranks[slot].reviewed += 1;
    }

    ranks.sort_by(|a, b| b.reviewed.cmp(&a.reviewed));
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use cyclelog_core::PersonRef;

    fn person(name: &str) -> Option<PersonRef> {
        Some(PersonRef {
            name: name.to_string(),
            badge: None,
        })
    }

    fn by(operator_id: Option<i64>, name: Option<&str>, status: Status) -> LogView {
        LogView {
            operator_id,
            operator: name.and_then(person),
            status: Some(status),
            ..Default::default()
        }
    }

    #[test]
    fn one_rollup_per_operator_even_with_name() {
        let logs = vec![
            by(Some(7), Some("Ana"), Status::Ok),
            by(Some(7), Some("Ana"), Status::Delay),
            by(Some(8), None, Status::Ok),
            by(None, Some("Walk-in"), Status::Ok),
            by(None, None, Status::Ok),
        ];
        let rollups = operator_rollups(&logs, &[]);
        assert_eq!(rollups.len(), 3);
        assert_eq!(rollups[0].key, OperatorKey::Id(7));
        assert_eq!(rollups[0].name, "Ana");
        assert_eq!((rollups[0].total, rollups[0].ok, rollups[0].delay), (2, 1, 1));
        assert_eq!(rollups[1].name, "ID 8");
        assert_eq!(rollups[2].key, OperatorKey::Name("Walk-in".to_string()));
    }

    #[test]
    fn working_time_sums_matching_sessions() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let session = |operator_id, minutes| OperatorSession {
            session_id: 1,
            machine_id: 1,
            operator_id,
            badge: "B".to_string(),
            started_at: start,
            last_heartbeat: start + Duration::minutes(minutes),
            ended_at: start + Duration::minutes(minutes),
        };
        let logs = vec![by(Some(7), Some("Ana"), Status::Ok)];
        let sessions = vec![session(7, 30), session(7, 45), session(9, 600)];

        let rollups = operator_rollups(&logs, &sessions);
        assert_eq!(rollups[0].working_time(), Duration::minutes(75));
    }

    #[test]
    fn supervisors_ranked_by_reviews() {
        let review = |id, name: Option<&str>, c| LogView {
            supervisor_id: Some(id),
            supervisor: name.and_then(person),
            supervisor_confirmation: Some(c),
            ..Default::default()
        };
        let logs = vec![
            review(1, Some("Lee"), Confirmation::Confirmed),
            review(2, None, Confirmation::Confirmed),
            review(2, None, Confirmation::NotConfirmed),
            review(1, Some("Lee"), Confirmation::Other("LATER".to_string())),
        ];
        let ranks = supervisor_ranking(&logs);
        assert_eq!(ranks.len(), 2);
        assert_eq!((ranks[0].supervisor_id, ranks[0].reviewed), (2, 2));
        assert_eq!(ranks[0].name, "ID 2");
        assert_eq!((ranks[1].name.as_str(), ranks[1].reviewed), ("Lee", 1));
    }
}
