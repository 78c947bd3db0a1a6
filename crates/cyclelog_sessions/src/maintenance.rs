//! One-shot archive maintenance: legacy file names and supervisor fields.
//!
//! Both tools are idempotent. Running either twice in a row changes nothing
//! the second time.

use chrono::NaiveDate;
use cyclelog_core::{Confirmation, DayFile, MetadataSnapshot, SupervisorId};
use cyclelog_error::CyclelogResult;
use cyclelog_storage::{DataLayout, JsonRead, read_json_records, write_json_atomic};
use derive_getters::Getters;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Field on stored logs carrying the confirming supervisor's badge.
pub const SUPERVISOR_BADGE_FIELD: &str = "supervisor_badge";

const SUPERVISOR_ID_FIELD: &str = "supervisor_id";
const CONFIRMATION_FIELD: &str = "supervisor_confirmation";
const SCAN_TIME_FIELD: &str = "supervisor_scan_time";
const CYCLE_END_FIELD: &str = "cycle_end_time";

static LEGACY_DAY_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})(\d{2})(\d{4})\.json$").expect("Valid legacy file name regex"));

/// Outcome of a maintenance run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Getters)]
pub struct MaintenanceReport {
    /// Files inspected
    files_scanned: usize,
    /// Files renamed or rewritten
    files_changed: usize,
    /// Files left alone because they could not be handled
    files_skipped: usize,
}

impl MaintenanceReport {
    fn log_summary(&self, tool: &str) {
        tracing::info!(
            tool,
            scanned = self.files_scanned,
            changed = self.files_changed,
            skipped = self.files_skipped,
            "Maintenance complete"
        );
    }
}

#[derive(Debug, PartialEq, Eq)]
enum FileName {
    Current,
    Legacy(DayFile),
    InvalidLegacy,
}

fn classify(file_name: &str) -> FileName {
    let Some(caps) = LEGACY_DAY_FILE.captures(file_name) else {
        return FileName::Current;
    };
    let date = match (caps[1].parse(), caps[2].parse(), caps[3].parse()) {
        (Ok(day), Ok(month), Ok(year)) => NaiveDate::from_ymd_opt(year, month, day),
        _ => None,
    };
    date.map_or(FileName::InvalidLegacy, |d| FileName::Legacy(DayFile::from(d)))
}

/// Rename every legacy `DDMMYYYY.json` day-file to `YYYY-MM-DD.json`.
///
/// Files already in the new format are untouched. A rename is skipped when
/// the target name exists or the legacy name is not a real date.
///
/// # Errors
///
/// Fails only if the data root or a machine directory cannot be listed.
#[tracing::instrument(skip(layout), fields(root = %layout.root().display()))]
pub async fn migrate_filenames(layout: &DataLayout) -> CyclelogResult<MaintenanceReport> {
    let mut report = MaintenanceReport::default();

    for (machine_id, dir) in layout.machine_dirs().await? {
        for (name, path) in DataLayout::json_files(&dir).await? {
            report.files_scanned += 1;

            let target = match classify(&name) {
                FileName::Current => continue,
                FileName::Legacy(day) => dir.join(day.file_name()),
                FileName::InvalidLegacy => {
                    tracing::warn!(machine_id, file = %name, "Legacy name is not a calendar date");
                    report.files_skipped += 1;
                    continue;
                }
            };

            if tokio::fs::try_exists(&target).await.unwrap_or(true) {
                tracing::warn!(
                    machine_id,
                    file = %name,
                    target = %target.display(),
                    "Target exists, not renaming"
                );
                report.files_skipped += 1;
                continue;
            }

            match tokio::fs::rename(&path, &target).await {
                Ok(()) => {
                    tracing::debug!(machine_id, file = %name, target = %target.display(), "Renamed");
                    report.files_changed += 1;
                }
                Err(e) => {
                    tracing::error!(machine_id, file = %name, error = %e, "Rename failed");
                    report.files_skipped += 1;
                }
            }
        }
    }

    report.log_summary("migrate-filenames");
    Ok(report)
}

#[derive(Debug, PartialEq, Eq)]
enum SupervisorRef {
    Absent,
    Known(SupervisorId),
    Unreadable,
}

fn supervisor_ref(record: &Map<String, Value>) -> SupervisorRef {
    match record.get(SUPERVISOR_ID_FIELD) {
        None | Some(Value::Null) => SupervisorRef::Absent,
        Some(Value::Number(n)) => n.as_i64().map_or(SupervisorRef::Unreadable, SupervisorRef::Known),
        Some(Value::String(s)) if s.trim().is_empty() => SupervisorRef::Absent,
        Some(Value::String(s)) => s.trim().parse().map_or(SupervisorRef::Unreadable, SupervisorRef::Known),
        Some(_) => SupervisorRef::Unreadable,
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Set `key` to `value`, reporting whether the record changed.
fn put(record: &mut Map<String, Value>, key: &str, value: Value) -> bool {
    if record.get(key) == Some(&value) {
        return false;
    }
    record.insert(key.to_string(), value);
    true
}

/// Normalise the supervisor fields of one stored record. Returns whether it
/// changed.
///
/// - No `supervisor_id`: confirmation, scan time and badge become `null`.
/// - Known `supervisor_id`: badge is copied from metadata.
/// - Reviewed with no scan time: the cycle end stands in as scan time.
///
/// Only those keys are touched; every other field keeps its stored value.
/// Records whose `supervisor_id` is not an id are left alone.
pub fn backfill_log(record: &mut Map<String, Value>, metadata: &MetadataSnapshot) -> bool {
    match supervisor_ref(record) {
        SupervisorRef::Unreadable => false,
        SupervisorRef::Absent => {
            let mut changed = false;
            for key in [CONFIRMATION_FIELD, SCAN_TIME_FIELD] {
                if !is_blank(record.get(key)) {
                    changed |= put(record, key, Value::Null);
                }
            }
            if !record.get(SUPERVISOR_BADGE_FIELD).is_some_and(Value::is_null) {
                changed |= put(record, SUPERVISOR_BADGE_FIELD, Value::Null);
            }
            changed
        }
        SupervisorRef::Known(supervisor_id) => {
            let mut changed = false;
            let badge = metadata
                .supervisor(supervisor_id)
                .and_then(|s| s.badge.clone())
                .filter(|b| !b.is_empty());
            if let Some(badge) = badge {
                changed |= put(record, SUPERVISOR_BADGE_FIELD, Value::String(badge));
            }

            let reviewed = match record.get(CONFIRMATION_FIELD) {
                Some(Value::String(raw)) => Confirmation::from(raw.clone()).is_review(),
                _ => false,
            };
            let end = record
                .get(CYCLE_END_FIELD)
                .filter(|v| !is_blank(Some(*v)))
                .cloned();
            if let Some(end) = end.filter(|_| reviewed && is_blank(record.get(SCAN_TIME_FIELD))) {
                changed |= put(record, SCAN_TIME_FIELD, end);
            }
            changed
        }
    }
}

/// Apply [`backfill_log`] to every stored log.
///
/// Records are patched in place as raw JSON, so fields the backfill does not
/// own are written back exactly as they were read. Files are rewritten only
/// when at least one record changed. Unparsable files are logged and skipped.
///
/// # Errors
///
/// Fails only if the data root or a machine directory cannot be listed.
#[tracing::instrument(skip(layout, metadata), fields(root = %layout.root().display()))]
pub async fn backfill_supervisors(
    layout: &DataLayout,
    metadata: &MetadataSnapshot,
) -> CyclelogResult<MaintenanceReport> {
    let mut report = MaintenanceReport::default();

    for (machine_id, dir) in layout.machine_dirs().await? {
        for (name, path) in DataLayout::json_files(&dir).await? {
            report.files_scanned += 1;

            let mut records = match read_json_records(&path).await {
                Ok(JsonRead::Loaded(records)) => records,
                Ok(JsonRead::Missing) => continue,
                Ok(JsonRead::Corrupt(reason)) => {
                    tracing::warn!(machine_id, file = %name, reason = %reason, "Skipping unparsable day-file");
                    report.files_skipped += 1;
                    continue;
                }
                Err(e) => {
                    tracing::error!(machine_id, file = %name, error = %e, "Skipping unreadable day-file");
                    report.files_skipped += 1;
                    continue;
                }
            };

            let changed = records
                .iter_mut()
                .filter_map(Value::as_object_mut)
                .map(|record| backfill_log(record, metadata))
                .fold(0usize, |n, c| n + usize::from(c));
            if changed == 0 {
                continue;
            }

            match write_json_atomic(&path, &records).await {
                Ok(()) => {
                    tracing::debug!(machine_id, file = %name, logs = changed, "Backfilled");
                    report.files_changed += 1;
                }
                Err(e) => {
                    tracing::error!(machine_id, file = %name, error = %e, "Rewrite failed");
                    report.files_skipped += 1;
                }
            }
        }
    }

    report.log_summary("backfill-supervisors");
    Ok(report)
}
