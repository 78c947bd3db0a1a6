//! Metric engine for Cyclelog.
//!
//! Pure functions from joined logs, sessions and configuration to KPI values.
//! Nothing here does I/O or keeps state: the same inputs always produce the
//! same report, which is what every presentation surface (CLI, dashboard
//! views, trend charts) consumes.
//!
//! # Example
//!
//! ```
//! use cyclelog_metrics::{Score, UtilizationConfig, kpi_report};
//!
//! let report = kpi_report(&[], &[], &UtilizationConfig::default());
//! assert_eq!(*report.logs().total(), 0);
//! assert_eq!(*report.logs().ok_rate(), 0.0);
//! assert_eq!(*report.logs().credibility(), Score::NotApplicable);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod daily;
mod format;
mod kpi;
mod log_metrics;
mod people;
mod score;
mod session_metrics;

pub use config::{UtilizationConfig, UtilizationConfigBuilder};
pub use daily::{DailyRollup, daily_rollups};
pub use format::format_hours_minutes;
pub use kpi::{KpiReport, kpi_report};
pub use log_metrics::LogMetrics;
pub use people::{OperatorKey, OperatorRollup, SupervisorRank, operator_rollups, supervisor_ranking};
pub use score::{Score, percent};
pub use session_metrics::SessionMetrics;
