//! Derived operator sessions.

use crate::serde_helpers::{id, timestamp};
use crate::{MachineId, OperatorId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Earliest-to-latest activity of one operator within one day-file.
///
/// Sessions are a rebuildable cache produced by the session generator.
/// `session_id` is only meaningful within a single generation run, and
/// `last_heartbeat` is the last observed cycle end, not a liveness signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorSession {
    /// Sequence number within the generation run
    pub session_id: u64,
    /// Machine the day-file belongs to
    #[serde(with = "id")]
    pub machine_id: MachineId,
    /// Operator the session belongs to
    #[serde(with = "id")]
    pub operator_id: OperatorId,
    /// Operator badge at generation time, `"UNKNOWN"` if not in metadata
    pub badge: String,
    /// Earliest cycle start
    #[serde(with = "timestamp")]
    pub started_at: DateTime<Utc>,
    /// Mirrors `ended_at`
    #[serde(with = "timestamp")]
    pub last_heartbeat: DateTime<Utc>,
    /// Latest cycle end
    #[serde(with = "timestamp")]
    pub ended_at: DateTime<Utc>,
}

impl OperatorSession {
    /// Session length; zero if the bounds are inverted.
    pub fn duration(&self) -> chrono::Duration {
        (self.ended_at - self.started_at).max(chrono::Duration::zero())
    }
}
