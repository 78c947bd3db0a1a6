//! Date-partitioned JSON file storage for Cyclelog.
//!
//! Cycle logs live in one JSON array per machine per day:
//!
//! ```text
//! <data_root>/
//! ├── machines.json
//! ├── operators.json
//! ├── supervisors.json
//! ├── machine_sessions.json
//! ├── machine_1/
//! │   ├── 2024-01-01.json
//! │   └── 2024-01-02.json
//! └── machine_2/
//!     └── 2024-01-01.json
//! ```
//!
//! # Features
//!
//! - **Bounded reads**: range scans open only the day-files a query resolves to
//! - **Lenient reads**: missing and corrupt files contribute nothing, and records
//!   that do not decode are skipped without hiding the rest of their file
//! - **Atomic writes**: every rewrite goes through a temp file + rename
//!
//! # Example
//!
//! ```rust
//! use cyclelog_core::{CycleLog, DayFile, SystemClock};
//! use cyclelog_storage::{FileSystemLogStore, LogRepository};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FileSystemLogStore::new("/tmp/cyclelog-data", Arc::new(SystemClock))?;
//! let start = chrono::Utc::now();
//! let log = CycleLog::builder().machine_id(1).cycle_start_time(start).build()?;
//!
//! let log_id = store.append(log).await?;
//! let logs = store.scan(&[1], &[DayFile::for_timestamp(start)]).await?;
//! assert!(logs.iter().any(|l| l.log_id == Some(log_id)));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod filesystem;
mod json_file;
mod layout;
mod metadata;
mod sessions;

pub use filesystem::FileSystemLogStore;
pub use json_file::{JsonRead, read_json_lenient, read_json_records, read_json_vec, write_json_atomic};
pub use layout::DataLayout;
pub use metadata::{MetadataRecord, MetadataStore};
pub use sessions::SessionFile;

use cyclelog_core::{CycleLog, DayFile, MachineId};
use cyclelog_error::CyclelogResult;

/// Read/write contract for cycle logs.
///
/// The store owns day-file contents and `log_id` sequencing within each file.
#[async_trait::async_trait]
pub trait LogRepository: Send + Sync {
    /// Append a log to its machine-day file and return the assigned `log_id`.
    ///
    /// The implementation should:
    /// - Reject logs without `machine_id` or `cycle_start_time`
    /// - Pick the file from the date of `cycle_start_time`
    /// - Assign `1 + max(existing log_id)`, or `1` for an empty file
    /// - Stamp `updated_at`
    ///
    /// Ids are advisory: uniqueness holds per file and only while a single
    /// writer touches that file.
    async fn append(&self, log: CycleLog) -> CyclelogResult<u64>;

    /// Read every `(machine, day)` pair and flatten the results.
    ///
    /// Missing or unreadable-as-JSON files contribute zero logs. The result is
    /// unordered; callers sort.
    async fn scan(&self, machines: &[MachineId], days: &[DayFile]) -> CyclelogResult<Vec<CycleLog>>;

    /// Read a single machine-day file.
    async fn read_day(&self, machine: MachineId, day: DayFile) -> CyclelogResult<Vec<CycleLog>>;
}
