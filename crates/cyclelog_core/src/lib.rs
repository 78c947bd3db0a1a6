//! Core data types for the Cyclelog library.
//!
//! This crate provides the records persisted by the log store (cycle logs,
//! operator sessions, metadata tables), the joined presentation view, the
//! injectable [`Clock`] and the date-range resolver that maps a query window
//! onto day-files.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod clock;
mod date_range;
mod log;
mod metadata;
pub mod serde_helpers;
mod session;
mod view;

pub use clock::{Clock, ManualClock, SystemClock};
pub use date_range::{DateRange, DayFile, resolve_files};
pub use log::{Confirmation, CycleLog, CycleLogBuilder, CycleTimes, Status, sort_most_recent_first};
pub use metadata::{Machine, MetadataSnapshot, Operator, Supervisor, UNKNOWN_BADGE};
pub use session::OperatorSession;
pub use view::{LogView, PersonRef};

/// Numeric machine identifier, also used in `machine_<id>` directory names.
pub type MachineId = i64;
/// Numeric operator identifier.
pub type OperatorId = i64;
/// Numeric supervisor identifier.
pub type SupervisorId = i64;
