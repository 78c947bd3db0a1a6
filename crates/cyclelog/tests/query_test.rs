//! Tests for the LogQuery service over a temporary data root.

use chrono::{DateTime, Duration, TimeZone, Utc};
use cyclelog::{
    Confirmation, CycleLog, CyclelogConfig, LogQuery, Machine, ManualClock, Operator,
    OperatorSession, RangeRequest, SessionFile, Status, Supervisor,
};
use std::sync::Arc;
use tempfile::TempDir;

fn at(day: u32, h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, h, m, 0).unwrap()
}

fn open(dir: &TempDir) -> (LogQuery, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(at(10, 12, 0)));
    let config = CyclelogConfig::default().with_data_root(dir.path());
    let query = LogQuery::open(config, clock.clone()).unwrap();
    (query, clock)
}

fn cycle(machine: i64, operator: i64, start: DateTime<Utc>) -> CycleLog {
    CycleLog {
        machine_id: Some(machine),
        operator_id: Some(operator),
        status: Some(Status::Ok),
        cycle_start_time: Some(start),
        cycle_end_time: Some(start + Duration::minutes(10)),
        ..Default::default()
    }
}

fn session(id: u64, operator: i64, start: DateTime<Utc>, minutes: i64) -> OperatorSession {
    let end = start + Duration::minutes(minutes);
    OperatorSession {
        session_id: id,
        machine_id: 1,
        operator_id: operator,
        badge: "B".to_string(),
        started_at: start,
        last_heartbeat: end,
        ended_at: end,
    }
}

async fn seed_people(query: &LogQuery) {
    query.add_metadata(Machine::new(1, "M-01")).await.unwrap();
    query
        .add_metadata(Operator::new(7, "Alice", Some("B7".to_string())))
        .await
        .unwrap();
    query
        .add_metadata(Supervisor::new(3, "Sam", None))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_empty_data_root_reads_nothing() {
    let dir = TempDir::new().unwrap();
    let (query, _clock) = open(&dir);

    assert!(query.logs(&RangeRequest::recent()).await.unwrap().is_empty());
    assert!(query.sessions(&RangeRequest::recent()).await.unwrap().is_empty());
    assert!(
        query
            .logs(&RangeRequest::between("2024-01-01", "2024-01-31"))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_invalid_range_reads_nothing() {
    let dir = TempDir::new().unwrap();
    let (query, _clock) = open(&dir);
    seed_people(&query).await;
    query.append(cycle(1, 7, at(5, 8, 0))).await.unwrap();

    let inverted = RangeRequest::between("2024-01-06", "2024-01-04");
    assert!(query.window(&inverted).is_none());
    assert!(query.logs(&inverted).await.unwrap().is_empty());

    let garbage = RangeRequest::between("yesterday", "2024-01-04");
    assert!(query.logs(&garbage).await.unwrap().is_empty());
    assert!(query.kpi(&garbage).await.unwrap().operators().is_empty());
}

#[tokio::test]
async fn test_append_assigns_ids_and_joins_names() {
    let dir = TempDir::new().unwrap();
    let (query, _clock) = open(&dir);
    seed_people(&query).await;

    let first = query.append(cycle(1, 7, at(5, 8, 0))).await.unwrap();
    let mut reviewed = cycle(1, 7, at(5, 9, 0));
    reviewed.supervisor_id = Some(3);
    let second = query.append(reviewed).await.unwrap();
    assert_eq!((first, second), (1, 2));

    let logs = query
        .logs(&RangeRequest::between("2024-01-05", "2024-01-05"))
        .await
        .unwrap();
    assert_eq!(logs.len(), 2);

    // Most recent first
    assert_eq!(logs[0].log_id, Some(2));
    assert_eq!(logs[1].log_id, Some(1));

    let operator = logs[0].operator.as_ref().unwrap();
    assert_eq!(operator.name, "Alice");
    assert_eq!(operator.badge.as_deref(), Some("B7"));
    assert_eq!(logs[0].supervisor.as_ref().unwrap().name, "Sam");
    assert!(logs[1].supervisor.is_none());
}

#[tokio::test]
async fn test_unknown_people_join_as_none() {
    let dir = TempDir::new().unwrap();
    let (query, _clock) = open(&dir);
    query.add_metadata(Machine::new(1, "M-01")).await.unwrap();

    let mut log = cycle(1, 99, at(5, 8, 0));
    log.supervisor_id = Some(42);
    query.append(log).await.unwrap();

    let logs = query
        .logs(&RangeRequest::between("2024-01-05", "2024-01-05"))
        .await
        .unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].operator_id, Some(99));
    assert!(logs[0].operator.is_none());
    assert!(logs[0].supervisor.is_none());
}

#[tokio::test]
async fn test_default_window_follows_clock() {
    let dir = TempDir::new().unwrap();
    let (query, clock) = open(&dir);
    seed_people(&query).await;

    // Clock is at 2024-01-10; default window is 01-03 ..= 01-10.
    query.append(cycle(1, 7, at(1, 8, 0))).await.unwrap();
    query.append(cycle(1, 7, at(3, 8, 0))).await.unwrap();
    query.append(cycle(1, 7, at(10, 8, 0))).await.unwrap();

    let recent = query.logs(&RangeRequest::recent()).await.unwrap();
    assert_eq!(recent.len(), 2);

    // Only the end given: start still defaults to today - 7.
    let capped = RangeRequest {
        start: None,
        end: Some("2024-01-05".to_string()),
    };
    assert_eq!(query.logs(&capped).await.unwrap().len(), 1);

    clock.set(at(20, 12, 0));
    assert!(query.logs(&RangeRequest::recent()).await.unwrap().is_empty());

    let explicit = RangeRequest::between("2024-01-01", "2024-01-10");
    assert_eq!(query.logs(&explicit).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_new_machine_visible_after_add() {
    let dir = TempDir::new().unwrap();
    let (query, _clock) = open(&dir);
    let range = RangeRequest::between("2024-01-05", "2024-01-05");

    query.append(cycle(2, 7, at(5, 8, 0))).await.unwrap();

    // Machine 2 is not in machines.json yet, so its directory is not scanned.
    assert!(query.logs(&range).await.unwrap().is_empty());

    query.add_metadata(Machine::new(2, "M-02")).await.unwrap();
    assert_eq!(query.logs(&range).await.unwrap().len(), 1);

    query.delete_metadata::<Machine>(2).await.unwrap();
    assert!(query.logs(&range).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_metadata_changes_joined_name() {
    let dir = TempDir::new().unwrap();
    let (query, _clock) = open(&dir);
    seed_people(&query).await;
    query.append(cycle(1, 7, at(5, 8, 0))).await.unwrap();
    let range = RangeRequest::between("2024-01-05", "2024-01-05");

    let before = query.logs(&range).await.unwrap();
    assert_eq!(before[0].operator.as_ref().unwrap().name, "Alice");

    let updated: Operator = query
        .update_metadata(7, |o: &mut Operator| o.name = "Alicia".to_string())
        .await
        .unwrap();
    assert_eq!(updated.name, "Alicia");

    let after = query.logs(&range).await.unwrap();
    assert_eq!(after[0].operator.as_ref().unwrap().name, "Alicia");
}

#[tokio::test]
async fn test_sessions_filtered_only_with_both_dates() {
    let dir = TempDir::new().unwrap();
    let (query, _clock) = open(&dir);

    SessionFile::new(query.layout().sessions_file())
        .replace(&[
            session(1, 7, at(2, 8, 0), 60),
            session(2, 7, at(5, 8, 0), 60),
            session(3, 8, at(5, 23, 30), 60),
        ])
        .await
        .unwrap();

    let day = query
        .sessions(&RangeRequest::between("2024-01-05", "2024-01-05"))
        .await
        .unwrap();
    let ids: Vec<u64> = day.iter().map(|s| s.session_id).collect();
    assert_eq!(ids, vec![2, 3]);

    let half = RangeRequest {
        start: Some("2024-01-05".to_string()),
        end: None,
    };
    assert_eq!(query.sessions(&half).await.unwrap().len(), 3);
    assert_eq!(query.sessions(&RangeRequest::recent()).await.unwrap().len(), 3);

    let inverted = RangeRequest::between("2024-01-05", "2024-01-01");
    assert!(query.sessions(&inverted).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_kpi_over_window() {
    let dir = TempDir::new().unwrap();
    let (query, _clock) = open(&dir);
    seed_people(&query).await;

    let mut confirmed = cycle(1, 7, at(5, 8, 0));
    confirmed.supervisor_id = Some(3);
    confirmed.operator_press_time = Some(at(5, 8, 10));
    confirmed.supervisor_scan_time = Some(at(5, 8, 15));
    confirmed.supervisor_confirmation = Some(Confirmation::Confirmed);
    query.append(confirmed).await.unwrap();

    let mut late = cycle(1, 7, at(5, 9, 0));
    late.status = Some(Status::Delay);
    query.append(late).await.unwrap();

    SessionFile::new(query.layout().sessions_file())
        .replace(&[session(1, 7, at(5, 8, 0), 120)])
        .await
        .unwrap();

    let report = query
        .kpi(&RangeRequest::between("2024-01-05", "2024-01-05"))
        .await
        .unwrap();

    assert_eq!(*report.logs().total(), 2);
    assert_eq!(*report.logs().ok_rate(), 50.0);
    assert_eq!(*report.logs().delay_rate(), 50.0);
    assert_eq!(*report.logs().review_rate(), 50.0);
    assert_eq!(report.logs().credibility().value(), Some(100.0));
    assert_eq!(report.logs().avg_response(), Some(Duration::minutes(5)));
    assert_eq!(*report.sessions().active_operators(), 1);

    let top = report.top_operator().unwrap();
    assert_eq!(top.name(), "Alice");
    assert_eq!(*top.total(), 2);
    assert_eq!(top.working_time(), Duration::minutes(120));

    let sup = report.top_supervisor().unwrap();
    assert_eq!(sup.name(), "Sam");
    assert_eq!(*sup.reviewed(), 1);
}

#[tokio::test]
async fn test_trend_is_ascending_by_day() {
    let dir = TempDir::new().unwrap();
    let (query, _clock) = open(&dir);
    seed_people(&query).await;

    query.append(cycle(1, 7, at(6, 8, 0))).await.unwrap();
    query.append(cycle(1, 7, at(4, 8, 0))).await.unwrap();
    query.append(cycle(1, 7, at(4, 9, 0))).await.unwrap();

    let days = query
        .trend(&RangeRequest::between("2024-01-01", "2024-01-07"))
        .await
        .unwrap();

    let summary: Vec<(String, usize)> = days
        .iter()
        .map(|d| (d.day().to_string(), *d.cycles()))
        .collect();
    assert_eq!(
        summary,
        vec![("2024-01-04".to_string(), 2), ("2024-01-06".to_string(), 1)]
    );
}

#[tokio::test]
async fn test_generate_sessions_then_read() {
    let dir = TempDir::new().unwrap();
    let (query, _clock) = open(&dir);
    seed_people(&query).await;

    query.append(cycle(1, 7, at(5, 8, 0))).await.unwrap();
    query.append(cycle(1, 7, at(5, 8, 20))).await.unwrap();

    let report = query.generate_sessions().await.unwrap();
    assert_eq!(*report.sessions_written(), 1);

    let sessions = query.sessions(&RangeRequest::recent()).await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].badge, "B7");
    assert_eq!(sessions[0].started_at, at(5, 8, 0));
    assert_eq!(sessions[0].ended_at, at(5, 8, 30));
}

#[tokio::test]
async fn test_append_rejects_missing_start() {
    let dir = TempDir::new().unwrap();
    let (query, _clock) = open(&dir);

    let mut log = cycle(1, 7, at(5, 8, 0));
    log.cycle_start_time = None;
    assert!(query.append(log).await.is_err());
}
