//! Filesystem-backed log store.

use crate::json_file::{JsonRead, read_json_lenient, read_json_records, write_json_atomic};
use crate::{DataLayout, LogRepository};
use cyclelog_core::{Clock, CycleLog, DayFile, MachineId};
use cyclelog_error::{CyclelogError, CyclelogResult, StorageError, StorageErrorKind, ValidationError};
use futures::future::try_join_all;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Log store over `machine_<id>/<YYYY-MM-DD>.json` day-files.
///
/// Appends are read-modify-write at file granularity. Appenders sharing one
/// `FileSystemLogStore` are serialised per file path; separate processes
/// writing the same day-file can still lose updates.
///
/// Existing records are carried through an append as raw JSON, so fields
/// this crate does not understand (or cannot decode) are written back as
/// they were read.
pub struct FileSystemLogStore {
    layout: DataLayout,
    clock: Arc<dyn Clock>,
    write_locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl FileSystemLogStore {
    /// Create a log store rooted at `data_root`.
    ///
    /// Creates the root directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created.
    #[tracing::instrument(skip(data_root, clock))]
    pub fn new(data_root: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> CyclelogResult<Self> {
        let layout = DataLayout::new(data_root);

        std::fs::create_dir_all(layout.root()).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                layout.root().display(),
                e
            )))
        })?;

        tracing::info!(path = %layout.root().display(), "Opened log store");
        Ok(Self {
            layout,
            clock,
            write_locks: Mutex::new(HashMap::new()),
        })
    }

    /// Paths used by this store.
    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    async fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.write_locks.lock().await;
        Arc::clone(locks.entry(path.to_path_buf()).or_default())
    }

    /// Drop the table entry for `path` once no other appender holds it.
    async fn release(&self, path: &Path, file_lock: Arc<Mutex<()>>) {
        let mut locks = self.write_locks.lock().await;
        // Clones are only handed out under the table lock: ours plus the entry.
        if Arc::strong_count(&file_lock) == 2 {
            locks.remove(path);
        }
    }

    async fn read_file(&self, machine: MachineId, day: DayFile) -> CyclelogResult<Vec<CycleLog>> {
        let path = self.layout.day_file(machine, day);
        Ok(read_json_lenient(&path).await?.or_empty())
    }

    async fn append_locked(&self, path: &Path, mut log: CycleLog) -> CyclelogResult<u64> {
        let mut records: Vec<Value> = match read_json_records(path).await? {
            JsonRead::Loaded(records) => records,
            JsonRead::Missing => Vec::new(),
            JsonRead::Corrupt(reason) => {
                tracing::warn!(
                    path = %path.display(),
                    reason = %reason,
                    "Day-file unreadable, starting from an empty list"
                );
                Vec::new()
            }
        };

        let highest = records.iter().filter_map(record_log_id).max().unwrap_or(0);
        let next_id = highest.checked_add(1).ok_or_else(|| {
            StorageError::new(StorageErrorKind::IdsExhausted(format!(
                "{} already holds log_id {}",
                path.display(),
                highest
            )))
        })?;

        log.log_id = Some(next_id);
        log.updated_at = Some(self.clock.now());
        records.push(serde_json::to_value(&log)?);

        write_json_atomic(path, &records).await?;

        tracing::info!(
            path = %path.display(),
            log_id = next_id,
            count = records.len(),
            "Appended cycle log"
        );
        Ok(next_id)
    }
}

/// `log_id` of a raw record, as a number or a numeric string.
fn record_log_id(record: &Value) -> Option<u64> {
    match record.get("log_id")? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[async_trait::async_trait]
impl LogRepository for FileSystemLogStore {
    #[tracing::instrument(skip(self, log), fields(machine_id = ?log.machine_id))]
    async fn append(&self, log: CycleLog) -> CyclelogResult<u64> {
        let machine = log.machine_id.ok_or_else(|| ValidationError::missing("machine_id"))?;
        let start = log
            .cycle_start_time
            .ok_or_else(|| ValidationError::missing("cycle_start_time"))?;

        let day = DayFile::for_timestamp(start);
        let path = self.layout.day_file(machine, day);

        let file_lock = self.lock_for(&path).await;
        let result = {
            let _guard = file_lock.lock().await;
            self.append_locked(&path, log).await
        };
        self.release(&path, file_lock).await;

        result
    }

    #[tracing::instrument(skip(self, machines, days), fields(machines = machines.len(), days = days.len()))]
    async fn scan(&self, machines: &[MachineId], days: &[DayFile]) -> CyclelogResult<Vec<CycleLog>> {
        if machines.is_empty() || days.is_empty() {
            return Ok(Vec::new());
        }

        let per_machine = machines.iter().map(|&machine| async move {
            let per_day = days.iter().map(|&day| self.read_file(machine, day));
            let groups = try_join_all(per_day).await?;
            Ok::<_, CyclelogError>(groups.into_iter().flatten().collect::<Vec<_>>())
        });

        let logs: Vec<CycleLog> = try_join_all(per_machine)
            .await?
            .into_iter()
            .flatten()
            .collect();

        tracing::debug!(count = logs.len(), "Scanned day-files");
        Ok(logs)
    }

    #[tracing::instrument(skip(self))]
    async fn read_day(&self, machine: MachineId, day: DayFile) -> CyclelogResult<Vec<CycleLog>> {
        self.read_file(machine, day).await
    }
}

impl std::fmt::Debug for FileSystemLogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSystemLogStore")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use cyclelog_core::ManualClock;
    use tempfile::TempDir;

    #[test]
    fn log_ids_from_raw_records() {
        assert_eq!(record_log_id(&serde_json::json!({"log_id": 4})), Some(4));
        assert_eq!(record_log_id(&serde_json::json!({"log_id": " 12 "})), Some(12));
        assert_eq!(record_log_id(&serde_json::json!({"log_id": -1})), None);
        assert_eq!(record_log_id(&serde_json::json!({"log_id": null})), None);
        assert_eq!(record_log_id(&serde_json::json!(7)), None);
    }

    #[tokio::test]
    async fn write_locks_are_dropped_after_append() {
        let temp_dir = TempDir::new().unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let store = FileSystemLogStore::new(temp_dir.path(), Arc::new(ManualClock::new(now))).unwrap();

        for day in 1..=5 {
            let start = Utc.with_ymd_and_hms(2024, 3, day, 8, 0, 0).unwrap();
            let log = CycleLog::builder().machine_id(1).cycle_start_time(start).build().unwrap();
            store.append(log).await.unwrap();
        }

        assert!(store.write_locks.lock().await.is_empty());
    }

    #[tokio::test]
    async fn write_locks_are_dropped_after_concurrent_appends() {
        let temp_dir = TempDir::new().unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let store = Arc::new(
            FileSystemLogStore::new(temp_dir.path(), Arc::new(ManualClock::new(now))).unwrap(),
        );
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();

        let tasks: Vec<_> = (0..10)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let log = CycleLog::builder().machine_id(1).cycle_start_time(start).build().unwrap();
                    store.append(log).await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert!(store.write_locks.lock().await.is_empty());
    }
}
