//! Tests for file-based configuration loading.

use cyclelog::{CyclelogConfig, UtilizationConfig};
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("cyclelog.toml");
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_from_file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        r#"
data_root = "/srv/cyclelog"
default_range_days = 14

[cache]
ttl_secs = 60

[utilization]
machine_count = 12
"#,
    );

    let config = CyclelogConfig::from_file(&path).unwrap();
    assert_eq!(config.data_root(), Path::new("/srv/cyclelog"));
    assert_eq!(*config.default_range_days(), 14);
    assert_eq!(*config.cache().ttl_secs(), 60);
    assert!(*config.cache().enabled());
    assert_eq!(*config.utilization().machine_count(), 12);
    assert_eq!(*config.utilization().shift_hours(), 8);
}

#[test]
fn test_from_file_empty_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "");

    let config = CyclelogConfig::from_file(&path).unwrap();
    assert_eq!(config, CyclelogConfig::default());
}

#[test]
fn test_from_file_rejects_zero_capacity() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "[utilization]\nshift_hours = 0\n");

    let err = CyclelogConfig::from_file(&path).unwrap_err();
    assert!(err.to_string().contains("shift_hours"));
}

#[test]
fn test_from_file_missing_file_is_error() {
    let dir = TempDir::new().unwrap();
    assert!(CyclelogConfig::from_file(dir.path().join("absent.toml")).is_err());
}

#[test]
fn test_with_setters_chain() {
    let config = CyclelogConfig::default()
        .with_data_root("/tmp/floor")
        .with_default_range_days(3)
        .with_utilization(UtilizationConfig::default().with_machine_count(4));

    assert_eq!(config.data_root(), Path::new("/tmp/floor"));
    assert_eq!(*config.default_range_days(), 3);
    assert_eq!(config.utilization().capacity_ms(), 4 * 8 * 3_600_000);
    assert!(config.validate().is_ok());
}
