//! Capacity parameters for utilization.

use cyclelog_error::{ConfigError, CyclelogResult};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Floor capacity that session time is measured against.
///
/// # Example
///
/// ```
/// use cyclelog_metrics::UtilizationConfig;
///
/// let config = UtilizationConfig::default().with_machine_count(4);
/// assert_eq!(*config.machine_count(), 4);
/// assert_eq!(config.capacity_ms(), 4 * 8 * 3_600_000);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
pub struct UtilizationConfig {
    /// Machines on the floor
    #[serde(default = "default_machine_count")]
    #[builder(default = "default_machine_count()")]
    machine_count: u32,

    /// Hours in one shift
    #[serde(default = "default_shift_hours")]
    #[builder(default = "default_shift_hours()")]
    shift_hours: u32,
}

fn default_machine_count() -> u32 {
    8
}

fn default_shift_hours() -> u32 {
    8
}

impl Default for UtilizationConfig {
    fn default() -> Self {
        Self {
            machine_count: default_machine_count(),
            shift_hours: default_shift_hours(),
        }
    }
}

impl UtilizationConfig {
    /// `machine_count × shift_hours` in milliseconds.
    pub fn capacity_ms(&self) -> i64 {
        i64::from(self.machine_count) * i64::from(self.shift_hours) * 3_600_000
    }

    /// Reject a zero capacity.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the offending key.
    pub fn validate(&self) -> CyclelogResult<()> {
        if self.machine_count == 0 {
            return Err(ConfigError::invalid("utilization.machine_count", "must be positive").into());
        }
        if self.shift_hours == 0 {
            return Err(ConfigError::invalid("utilization.shift_hours", "must be positive").into());
        }
        Ok(())
    }
}
