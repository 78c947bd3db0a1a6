//! Session generation.

use chrono::{DateTime, Utc};
use cyclelog_core::{CycleLog, MachineId, MetadataSnapshot, OperatorId, OperatorSession};
use cyclelog_error::CyclelogResult;
use cyclelog_storage::{DataLayout, JsonRead, SessionFile, read_json_lenient};
use derive_getters::Getters;
use serde::Serialize;
use std::collections::BTreeMap;

/// First start and last end of one operator's cycles in one day-file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorSpan {
    /// Operator the cycles belong to
    pub operator_id: OperatorId,
    /// Earliest `cycle_start_time`
    pub started_at: DateTime<Utc>,
    /// Latest `cycle_end_time`, or the latest start when no cycle has ended
    pub ended_at: DateTime<Utc>,
}

#[derive(Default)]
struct SpanAcc {
    first_start: Option<DateTime<Utc>>,
    last_start: Option<DateTime<Utc>>,
    last_end: Option<DateTime<Utc>>,
}

/// Group one file's logs by operator.
///
/// Logs without an `operator_id` are ignored. An operator none of whose logs
/// carries a `cycle_start_time` yields no span. Spans come back ordered by
/// operator id.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use cyclelog_core::CycleLog;
/// use cyclelog_sessions::operator_spans;
///
/// let t = |h, m| Utc.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap();
/// let logs = vec![
///     CycleLog::builder().operator_id(7).cycle_start_time(t(8, 0)).cycle_end_time(t(8, 10)).build().unwrap(),
///     CycleLog::builder().operator_id(7).cycle_start_time(t(8, 20)).cycle_end_time(t(8, 30)).build().unwrap(),
/// ];
///
/// let spans = operator_spans(&logs);
/// assert_eq!(spans.len(), 1);
/// assert_eq!(spans[0].started_at, t(8, 0));
/// assert_eq!(spans[0].ended_at, t(8, 30));
/// ```
pub fn operator_spans(logs: &[CycleLog]) -> Vec<OperatorSpan> {
    let mut groups: BTreeMap<OperatorId, SpanAcc> = BTreeMap::new();

    for log in logs {
        let Some(operator_id) = log.operator_id else {
            continue;
        };
        let acc = groups.entry(operator_id).or_default();
        if let Some(start) = log.cycle_start_time {
            acc.first_start = Some(acc.first_start.map_or(start, |s| s.min(start)));
            acc.last_start = Some(acc.last_start.map_or(start, |s| s.max(start)));
        }
        if let Some(end) = log.cycle_end_time {
            acc.last_end = Some(acc.last_end.map_or(end, |e| e.max(end)));
        }
    }

    groups
        .into_iter()
        .filter_map(|(operator_id, acc)| {
            let Some(started_at) = acc.first_start else {
                tracing::warn!(operator_id, "Operator has cycles but no start time, no session");
                return None;
            };
            let ended_at = acc.last_end.or(acc.last_start).unwrap_or(started_at);
            Some(OperatorSpan {
                operator_id,
                started_at,
                ended_at,
            })
        })
        .collect()
}

/// Outcome of a generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Getters)]
pub struct GenerationReport {
    /// Day-files visited
    files_scanned: usize,
    /// Day-files that could not be read or parsed
    files_skipped: usize,
    /// Sessions written
    sessions_written: usize,
}

/// Full rebuild of the sessions file from the log archive.
///
/// Every run walks every machine directory and overwrites
/// `machine_sessions.json`; nothing is merged with the previous contents.
/// `session_id`s are assigned by a counter over the run and are not stable
/// across runs.
#[derive(Debug, Clone)]
pub struct SessionGenerator {
    layout: DataLayout,
}

impl SessionGenerator {
    /// Generator over the archive at `layout`.
    pub fn new(layout: DataLayout) -> Self {
        Self { layout }
    }

    /// Rebuild and write the sessions file.
    ///
    /// Badges come from `metadata`; unknown operators get `"UNKNOWN"`.
    ///
    /// # Errors
    ///
    /// Fails if the data root cannot be listed or the sessions file cannot be
    /// written. Unreadable day-files are skipped, as are individual logs that
    /// do not decode.
    #[tracing::instrument(skip(self, metadata), fields(root = %self.layout.root().display()))]
    pub async fn run(&self, metadata: &MetadataSnapshot) -> CyclelogResult<GenerationReport> {
        tracing::info!("Starting session generation");

        let mut report = GenerationReport::default();
        let mut sessions = Vec::new();
        let mut next_id: u64 = 1;

        for (machine_id, dir) in self.layout.machine_dirs().await? {
            for (name, path) in DataLayout::json_files(&dir).await? {
                report.files_scanned += 1;

                let logs: Vec<CycleLog> = match read_json_lenient(&path).await {
                    Ok(JsonRead::Loaded(logs)) => logs,
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

                for span in operator_spans(&logs) {
                    sessions.push(session_from_span(next_id, machine_id, span, metadata));
                    next_id += 1;
                }
            }
        }

        sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        report.sessions_written = sessions.len();

        SessionFile::new(self.layout.sessions_file())
            .replace(&sessions)
            .await?;

        tracing::info!(
            files_scanned = report.files_scanned,
            files_skipped = report.files_skipped,
            sessions = report.sessions_written,
            "Session generation complete"
        );
        Ok(report)
    }
}

fn session_from_span(
    session_id: u64,
    machine_id: MachineId,
    span: OperatorSpan,
    metadata: &MetadataSnapshot,
) -> OperatorSession {
    OperatorSession {
        session_id,
        machine_id,
        operator_id: span.operator_id,
        badge: metadata.operator_badge(span.operator_id).to_string(),
        started_at: span.started_at,
        last_heartbeat: span.ended_at,
        ended_at: span.ended_at,
    }
}
