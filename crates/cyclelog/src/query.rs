//! Range queries, log creation and reports over one data root.

use crate::CyclelogConfig;
use cyclelog_cache::MetadataCache;
use cyclelog_core::{
    Clock, CycleLog, DateRange, DayFile, LogView, MetadataSnapshot, OperatorSession,
    sort_most_recent_first,
};
use cyclelog_error::CyclelogResult;
use cyclelog_metrics::{DailyRollup, KpiReport, daily_rollups, kpi_report};
use cyclelog_sessions::{
    GenerationReport, MaintenanceReport, SessionGenerator, backfill_supervisors,
    migrate_filenames,
};
use cyclelog_storage::{
    DataLayout, FileSystemLogStore, LogRepository, MetadataRecord, MetadataStore, SessionFile,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Date window as supplied by a caller, `YYYY-MM-DD` on each side.
///
/// For log reads a missing side takes its default (`today - N` for the start,
/// `today` for the end). For session reads the window only applies when both
/// sides are given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeRequest {
    /// First day, inclusive
    pub start: Option<String>,
    /// Last day, inclusive
    pub end: Option<String>,
}

impl RangeRequest {
    /// Window with both sides set.
    pub fn between(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
        }
    }

    /// No dates: the default window.
    pub fn recent() -> Self {
        Self::default()
    }
}

/// Service facade over the log store, metadata and sessions of one data root.
///
/// # Example
///
/// ```no_run
/// use cyclelog::{CyclelogConfig, LogQuery, RangeRequest};
/// use cyclelog_core::SystemClock;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let query = LogQuery::open(CyclelogConfig::load()?, Arc::new(SystemClock))?;
/// let logs = query.logs(&RangeRequest::between("2024-01-01", "2024-01-07")).await?;
/// println!("{} cycles", logs.len());
/// # Ok(())
/// # }
/// ```
pub struct LogQuery {
    config: CyclelogConfig,
    clock: Arc<dyn Clock>,
    layout: DataLayout,
    store: Arc<dyn LogRepository>,
    metadata: Arc<MetadataStore>,
    cache: MetadataCache,
    sessions: SessionFile,
}

impl LogQuery {
    /// Open the data root named by `config`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the data root
    /// cannot be created.
    #[tracing::instrument(skip(config, clock), fields(data_root = %config.data_root().display()))]
    pub fn open(config: CyclelogConfig, clock: Arc<dyn Clock>) -> CyclelogResult<Self> {
        config.validate()?;

        let layout = DataLayout::new(config.data_root());
        let store = Arc::new(FileSystemLogStore::new(layout.root(), Arc::clone(&clock))?);
        let metadata = Arc::new(MetadataStore::new(layout.clone()));
        let cache = MetadataCache::new(metadata.clone(), Arc::clone(&clock), config.cache().clone());
        let sessions = SessionFile::new(layout.sessions_file());

        Ok(Self {
            config,
            clock,
            layout,
            store,
            metadata,
            cache,
            sessions,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &CyclelogConfig {
        &self.config
    }

    /// Paths under the data root.
    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    /// Metadata cache used for machine enumeration and joins.
    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    /// The window a log read covers, `None` for unparsable or inverted input.
    pub fn window(&self, request: &RangeRequest) -> Option<DateRange> {
        let fallback = DateRange::trailing(self.clock.today(), *self.config.default_range_days());
        let start = request
            .start
            .clone()
            .unwrap_or_else(|| DayFile::from(*fallback.start()).name());
        let end = request
            .end
            .clone()
            .unwrap_or_else(|| DayFile::from(*fallback.end()).name());

        match DateRange::parse(&start, &end) {
            Ok(range) => Some(range),
            Err(e) => {
                tracing::warn!(error = %e, "Invalid date range, reading nothing");
                None
            }
        }
    }

    /// Joined logs for the window, most recent first.
    ///
    /// An invalid window or one without any day-files yields an empty list.
    #[tracing::instrument(skip(self))]
    pub async fn logs(&self, request: &RangeRequest) -> CyclelogResult<Vec<LogView>> {
        let Some(range) = self.window(request) else {
            return Ok(Vec::new());
        };
        self.logs_in(&range).await
    }

    async fn logs_in(&self, range: &DateRange) -> CyclelogResult<Vec<LogView>> {
        let days: Vec<DayFile> = range.days().collect();
        let snapshot = self.cache.snapshot().await;
        let machines = snapshot.machine_ids();

        let raw = self.store.scan(&machines, &days).await?;
        let mut views: Vec<LogView> = raw
            .into_iter()
            .map(|log| LogView::join(log, &snapshot))
            .collect();
        sort_most_recent_first(&mut views);

        tracing::debug!(
            machines = machines.len(),
            days = days.len(),
            count = views.len(),
            "Range query complete"
        );
        Ok(views)
    }

    /// Sessions from `machine_sessions.json`.
    ///
    /// With both dates set, keeps sessions whose `started_at` falls on a day
    /// in the window; an invalid window keeps nothing. Otherwise returns
    /// every session.
    #[tracing::instrument(skip(self))]
    pub async fn sessions(&self, request: &RangeRequest) -> CyclelogResult<Vec<OperatorSession>> {
        match (&request.start, &request.end) {
            (Some(start), Some(end)) => match DateRange::parse(start, end) {
                Ok(range) => self.sessions_in(&range).await,
                Err(e) => {
                    tracing::warn!(error = %e, "Invalid session range, reading nothing");
                    Ok(Vec::new())
                }
            },
            _ => self.sessions.read().await,
        }
    }

    async fn sessions_in(&self, range: &DateRange) -> CyclelogResult<Vec<OperatorSession>> {
        let mut sessions = self.sessions.read().await?;
        sessions.retain(|s| range.contains(s.started_at));
        Ok(sessions)
    }

    /// Store a new log and return its `log_id`.
    ///
    /// # Errors
    ///
    /// Rejects logs without `machine_id` or `cycle_start_time`.
    pub async fn append(&self, log: CycleLog) -> CyclelogResult<u64> {
        self.store.append(log).await
    }

    /// KPI report over the window's logs and sessions.
    #[tracing::instrument(skip(self))]
    pub async fn kpi(&self, request: &RangeRequest) -> CyclelogResult<KpiReport> {
        let (logs, sessions) = self.window_inputs(request).await?;
        Ok(kpi_report(&logs, &sessions, self.config.utilization()))
    }

    /// Per-day metrics over the window, ascending.
    #[tracing::instrument(skip(self))]
    pub async fn trend(&self, request: &RangeRequest) -> CyclelogResult<Vec<DailyRollup>> {
        let (logs, sessions) = self.window_inputs(request).await?;
        Ok(daily_rollups(&logs, &sessions, self.config.utilization()))
    }

    async fn window_inputs(
        &self,
        request: &RangeRequest,
    ) -> CyclelogResult<(Vec<LogView>, Vec<OperatorSession>)> {
        let Some(range) = self.window(request) else {
            return Ok((Vec::new(), Vec::new()));
        };
        tokio::try_join!(self.logs_in(&range), self.sessions_in(&range))
    }

    /// Current metadata snapshot (cached).
    pub async fn metadata(&self) -> Arc<MetadataSnapshot> {
        self.cache.snapshot().await
    }

    /// Every row of one metadata table, read from disk.
    pub async fn list_metadata<R: MetadataRecord>(&self) -> CyclelogResult<Vec<R>> {
        self.metadata.list().await
    }

    /// Insert a metadata row and invalidate the cache.
    pub async fn add_metadata<R: MetadataRecord>(&self, record: R) -> CyclelogResult<()> {
        self.metadata.add(record).await?;
        self.cache.invalidate().await;
        Ok(())
    }

    /// Edit a metadata row in place and invalidate the cache.
    pub async fn update_metadata<R, F>(&self, id: i64, edit: F) -> CyclelogResult<R>
    where
        R: MetadataRecord,
        F: FnOnce(&mut R) + Send,
    {
        let updated = self.metadata.update(id, edit).await?;
        self.cache.invalidate().await;
        Ok(updated)
    }

    /// Remove a metadata row and invalidate the cache.
    pub async fn delete_metadata<R: MetadataRecord>(&self, id: i64) -> CyclelogResult<R> {
        let removed = self.metadata.delete(id).await?;
        self.cache.invalidate().await;
        Ok(removed)
    }

    /// Rebuild `machine_sessions.json` from the whole archive.
    pub async fn generate_sessions(&self) -> CyclelogResult<GenerationReport> {
        let snapshot = self.cache.snapshot().await;
        SessionGenerator::new(self.layout.clone()).run(&snapshot).await
    }

    /// Rename legacy `DDMMYYYY.json` day-files.
    pub async fn migrate_filenames(&self) -> CyclelogResult<MaintenanceReport> {
        migrate_filenames(&self.layout).await
    }

    /// Normalise supervisor fields on every stored log.
    pub async fn backfill_supervisors(&self) -> CyclelogResult<MaintenanceReport> {
        let snapshot = self.cache.snapshot().await;
        backfill_supervisors(&self.layout, &snapshot).await
    }
}

impl std::fmt::Debug for LogQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogQuery")
            .field("config", &self.config)
            .field("layout", &self.layout)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
