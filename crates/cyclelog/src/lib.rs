//! Cyclelog - needle-change cycle logging over flat JSON files
//!
//! Operators record needle-change cycles per machine, supervisors confirm
//! them, and dashboards show logs, KPIs and trends. Every log lives in a
//! per-machine, per-day JSON file; small JSON tables hold the machines,
//! operators and supervisors.
//!
//! # Features
//!
//! - **Bounded range reads**: a query touches only the day-files its window resolves to
//! - **Lenient storage**: missing or corrupt day-files read as empty instead of failing
//! - **Session generation**: per-operator work sessions rebuilt from the archive in one pass
//! - **Pure metrics**: latency, review rate, credibility, compliance and utilization
//!
//! # Quick Start
//!
//! ```no_run
//! use cyclelog::{CyclelogConfig, LogQuery, RangeRequest};
//! use cyclelog_core::SystemClock;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let query = LogQuery::open(CyclelogConfig::load()?, Arc::new(SystemClock))?;
//!
//!     let report = query.kpi(&RangeRequest::recent()).await?;
//!     println!("Credibility: {}", report.logs().credibility());
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `cyclelog_error` - Error types
//! - `cyclelog_core` - Data model, clock, date-range resolver
//! - `cyclelog_cache` - Metadata cache with TTL
//! - `cyclelog_storage` - Day-file log store, metadata tables, sessions file
//! - `cyclelog_sessions` - Session generator and maintenance batches
//! - `cyclelog_metrics` - KPI and trend computation
//!
//! This crate (`cyclelog`) adds configuration and the [`LogQuery`] service,
//! and re-exports the rest for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod query;

pub use config::CyclelogConfig;
pub use query::{LogQuery, RangeRequest};

pub use cyclelog_cache::{MetadataCache, MetadataCacheConfig, MetadataSource};
pub use cyclelog_core::*;
pub use cyclelog_error::*;
pub use cyclelog_metrics::*;
pub use cyclelog_sessions::{
    GenerationReport, MaintenanceReport, SessionGenerator, backfill_supervisors, migrate_filenames,
};
pub use cyclelog_storage::{
    DataLayout, FileSystemLogStore, LogRepository, MetadataRecord, MetadataStore, SessionFile,
};
