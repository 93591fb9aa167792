//! Runtime configuration of the production line.

use serde::{Deserialize, Serialize};

use crate::catalog::ConfigError;
use crate::consts::{
    DEFAULT_ORDER_SECS, DEFAULT_STATIONS, DEFAULT_STEP_SECS, MAX_QUEUE, MAX_STATIONS,
};

/// Everything the producer needs to size and pace the line.
///
/// Tick durations are stored in milliseconds so test setups may run with
/// zero-length steps; the CLI accepts whole seconds and converts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineConfig {
    /// Number of assembly stations, `1..=MAX_STATIONS`.
    pub stations: u32,
    /// Milliseconds spent on each recipe step.
    pub step_millis: u64,
    /// Milliseconds between generated orders.
    pub order_millis: u64,
    /// Backlog bound, `1..=MAX_QUEUE`.
    pub queue_capacity: u32,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            stations: DEFAULT_STATIONS,
            step_millis: DEFAULT_STEP_SECS * 1_000,
            order_millis: DEFAULT_ORDER_SECS * 1_000,
            queue_capacity: MAX_QUEUE as u32,
        }
    }
}

impl LineConfig {
    /// Check ranges before the region is sized from this config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stations == 0 || self.stations as usize > MAX_STATIONS {
            return Err(ConfigError::Validation(format!(
                "stations must be in 1..={MAX_STATIONS}, got {}",
                self.stations
            )));
        }
        if self.queue_capacity == 0 || self.queue_capacity as usize > MAX_QUEUE {
            return Err(ConfigError::Validation(format!(
                "queue capacity must be in 1..={MAX_QUEUE}, got {}",
                self.queue_capacity
            )));
        }
        Ok(())
    }
}
