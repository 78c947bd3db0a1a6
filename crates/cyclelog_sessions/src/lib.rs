//! Offline batches over the log archive.
//!
//! - [`SessionGenerator`] rebuilds `machine_sessions.json` from every day-file
//! - [`migrate_filenames`] renames legacy `DDMMYYYY.json` day-files
//! - [`backfill_supervisors`] normalises supervisor fields on stored logs
//!
//! Each batch walks `machine_<id>` directories, skips files it cannot parse
//! and returns a report instead of aborting.

#![warn(missing_docs)]

mod generator;
mod maintenance;

pub use generator::{GenerationReport, OperatorSpan, SessionGenerator, operator_spans};
pub use maintenance::{
    MaintenanceReport, SUPERVISOR_BADGE_FIELD, backfill_log, backfill_supervisors, migrate_filenames,
};
