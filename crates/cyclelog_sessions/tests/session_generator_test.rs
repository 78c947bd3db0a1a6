//! Tests for session generation and maintenance batches over a temp archive.

use cyclelog_core::{MetadataSnapshot, Operator, OperatorSession, Supervisor};
use cyclelog_sessions::{SessionGenerator, backfill_supervisors, migrate_filenames};
use cyclelog_storage::{DataLayout, SessionFile};
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn metadata() -> MetadataSnapshot {
    MetadataSnapshot {
        operators: vec![Operator::new(7, "Ana", Some("B-7".to_string()))],
        supervisors: vec![Supervisor::new(1, "Lee", Some("100100100".to_string()))],
        ..Default::default()
    }
}

fn seed(root: &Path) {
    write(
        root,
        "machine_1/2024-01-01.json",
        r#"[
            {"log_id": 1, "machine_id": 1, "operator_id": 7,
             "cycle_start_time": "2024-01-01T08:00:00Z", "cycle_end_time": "2024-01-01T08:10:00Z"},
            {"log_id": 2, "machine_id": 1, "operator_id": 7,
             "cycle_start_time": "2024-01-01T08:20:00Z", "cycle_end_time": "2024-01-01T08:30:00Z"},
            {"log_id": 3, "machine_id": 1, "operator_id": null,
             "cycle_start_time": "2024-01-01T05:00:00Z", "cycle_end_time": "2024-01-01T23:00:00Z"}
        ]"#,
    );
    write(
        root,
        "machine_2/2024-01-02.json",
        r#"[{"log_id": 1, "machine_id": 2, "operator_id": "8",
             "cycle_start_time": "2024-01-02T09:00:00Z", "cycle_end_time": "2024-01-02T09:45:00Z"}]"#,
    );
    write(root, "machine_2/2024-01-03.json", "{ broken");
}

fn tuples(sessions: &[OperatorSession]) -> Vec<(i64, i64, String, String, String)> {
    sessions
        .iter()
        .map(|s| {
            (
                s.machine_id,
                s.operator_id,
                s.started_at.to_rfc3339(),
                s.ended_at.to_rfc3339(),
                s.badge.clone(),
            )
        })
        .collect()
}

#[tokio::test]
async fn test_generates_one_session_per_operator_per_file() {
    let temp_dir = TempDir::new().unwrap();
    seed(temp_dir.path());
    let layout = DataLayout::new(temp_dir.path());

    let report = SessionGenerator::new(layout.clone()).run(&metadata()).await.unwrap();
    assert_eq!(*report.files_scanned(), 3);
    assert_eq!(*report.files_skipped(), 1);
    assert_eq!(*report.sessions_written(), 2);

    let sessions = SessionFile::new(layout.sessions_file()).read().await.unwrap();
    assert_eq!(
        tuples(&sessions),
        vec![
            (
                2,
                8,
                "2024-01-02T09:00:00+00:00".to_string(),
                "2024-01-02T09:45:00+00:00".to_string(),
                "UNKNOWN".to_string()
            ),
            (
                1,
                7,
                "2024-01-01T08:00:00+00:00".to_string(),
                "2024-01-01T08:30:00+00:00".to_string(),
                "B-7".to_string()
            ),
        ]
    );
    assert!(sessions.iter().all(|s| s.last_heartbeat == s.ended_at));
}

#[tokio::test]
async fn test_regeneration_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    seed(temp_dir.path());
    let layout = DataLayout::new(temp_dir.path());
    let generator = SessionGenerator::new(layout.clone());
    let file = SessionFile::new(layout.sessions_file());

    generator.run(&metadata()).await.unwrap();
    let first = file.read().await.unwrap();
    generator.run(&metadata()).await.unwrap();
    let second = file.read().await.unwrap();

    assert_eq!(tuples(&first), tuples(&second));
}

#[tokio::test]
async fn test_empty_archive_writes_empty_sessions_file() {
    let temp_dir = TempDir::new().unwrap();
    let layout = DataLayout::new(temp_dir.path());

    let report = SessionGenerator::new(layout.clone())
        .run(&MetadataSnapshot::default())
        .await
        .unwrap();
    assert_eq!(*report.sessions_written(), 0);

    let raw = std::fs::read_to_string(layout.sessions_file()).unwrap();
    let parsed: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
    assert!(parsed.is_empty());
}

#[tokio::test]
async fn test_migrate_filenames_renames_legacy_files_once() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "machine_1/05032024.json", "[]");
    write(root, "machine_1/2024-03-06.json", "[]");
    write(root, "machine_2/06032024.json", r#"[{"log_id": 1}]"#);
    write(root, "machine_2/2024-03-06.json", "[]");
    let layout = DataLayout::new(root);

    let report = migrate_filenames(&layout).await.unwrap();
    assert_eq!(*report.files_scanned(), 4);
    assert_eq!(*report.files_changed(), 1);
    assert_eq!(*report.files_skipped(), 1);

    assert!(root.join("machine_1/2024-03-05.json").exists());
    assert!(!root.join("machine_1/05032024.json").exists());
    // Target existed: both files kept
    assert!(root.join("machine_2/06032024.json").exists());
    assert_eq!(
        std::fs::read_to_string(root.join("machine_2/2024-03-06.json")).unwrap(),
        "[]"
    );

    let again = migrate_filenames(&layout).await.unwrap();
    assert_eq!(*again.files_changed(), 0);
}

#[tokio::test]
async fn test_backfill_supervisors_rewrites_only_changed_files() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(
        root,
        "machine_1/2024-01-01.json",
        r#"[
            {"log_id": 1, "machine_id": 1, "supervisor_id": null,
             "supervisor_confirmation": "CONFIRMED", "supervisor_badge": "100100100"},
            {"log_id": 2, "machine_id": 1, "supervisor_id": 1,
             "supervisor_confirmation": "CONFIRMED", "cycle_end_time": "2024-01-01T08:30:00Z"}
        ]"#,
    );
    write(root, "machine_1/2024-01-02.json", "[]");
    write(root, "machine_3/2024-01-02.json", "not json");
    let layout = DataLayout::new(root);

    let report = backfill_supervisors(&layout, &metadata()).await.unwrap();
    assert_eq!(*report.files_scanned(), 3);
    assert_eq!(*report.files_changed(), 1);
    assert_eq!(*report.files_skipped(), 1);

    let raw = std::fs::read_to_string(root.join("machine_1/2024-01-01.json")).unwrap();
    let logs: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
    assert!(logs[0]["supervisor_confirmation"].is_null());
    assert!(logs[0]["supervisor_badge"].is_null());
    assert_eq!(logs[1]["supervisor_badge"], "100100100");
    assert!(logs[1]["supervisor_scan_time"].as_str().unwrap().starts_with("2024-01-01T08:30:00"));

    let again = backfill_supervisors(&layout, &metadata()).await.unwrap();
    assert_eq!(*again.files_changed(), 0);
}

#[tokio::test]
async fn test_backfill_supervisors_keeps_fields_it_does_not_own() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(
        root,
        "machine_1/2024-01-01.json",
        r#"[
            {"log_id": "1", "machine_id": "1", "supervisor_id": 1,
             "cycle_start_time": "2024-01-01T08:00:00", "cycle_end_time": "2024-01-01 08:30:00",
             "status": 3, "supervisor_confirmation": "CONFIRMED"},
            {"log_id": 2, "machine_id": 1, "supervisor_id": null,
             "supervisor_badge": null, "cycle_start_time": "2024-01-01T09:00:00"}
        ]"#,
    );
    let layout = DataLayout::new(root);

    let report = backfill_supervisors(&layout, &metadata()).await.unwrap();
    assert_eq!(*report.files_changed(), 1);

    let raw = std::fs::read_to_string(root.join("machine_1/2024-01-01.json")).unwrap();
    let logs: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
    assert_eq!(logs[0]["log_id"], "1");
    assert_eq!(logs[0]["machine_id"], "1");
    assert_eq!(logs[0]["cycle_start_time"], "2024-01-01T08:00:00");
    assert_eq!(logs[0]["status"], 3);
    assert_eq!(logs[0]["supervisor_badge"], "100100100");
    assert_eq!(logs[0]["supervisor_scan_time"], "2024-01-01 08:30:00");

    assert_eq!(logs[1]["log_id"], 2);
    assert!(logs[1]["supervisor_badge"].is_null());
    assert_eq!(logs[1]["cycle_start_time"], "2024-01-01T09:00:00");
}

#[tokio::test]
async fn test_generator_skips_only_records_that_do_not_decode() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(
        root,
        "machine_1/2024-01-01.json",
        r#"[
            {"log_id": 1, "machine_id": 1, "operator_id": 7,
             "cycle_start_time": "2024-01-01T08:00:00Z", "cycle_end_time": "2024-01-01T08:10:00Z"},
            {"log_id": 2, "machine_id": 1, "operator_id": 7, "color": 5,
             "cycle_start_time": "2024-01-01T08:15:00Z", "cycle_end_time": "2024-01-01T08:20:00Z"},
            {"log_id": 3, "machine_id": 1, "operator_id": 7,
             "cycle_start_time": "2024-01-01T08:20:00Z", "cycle_end_time": "2024-01-01T08:30:00Z"}
        ]"#,
    );
    let layout = DataLayout::new(root);

    let report = SessionGenerator::new(layout.clone()).run(&metadata()).await.unwrap();
    assert_eq!(*report.files_skipped(), 0);
    assert_eq!(*report.sessions_written(), 1);

    let sessions = SessionFile::new(layout.sessions_file()).read().await.unwrap();
    assert_eq!(
        tuples(&sessions),
        vec![(
            1,
            7,
            "2024-01-01T08:00:00+00:00".to_string(),
            "2024-01-01T08:30:00+00:00".to_string(),
            "B-7".to_string()
        )]
    );
}
