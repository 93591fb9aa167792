//! System-wide constants for the grill workspace.
//!
//! Single source of truth for all numeric limits and default paths.
//! Imported by all crates — no duplication permitted.

/// Maximum number of assembly stations in the shared region.
pub const MAX_STATIONS: usize = 10;

/// Maximum number of dispenser slots per station.
pub const MAX_INGREDIENTS: usize = 15;

/// Ring capacity of the order backlog.
pub const MAX_QUEUE: usize = 100;

/// Maximum ingredient steps in a single recipe.
pub const MAX_RECIPE_STEPS: usize = 10;

/// Units a full dispenser holds.
pub const DISPENSER_CAPACITY: u32 = 20;

/// A dispenser at or below this level counts as running low.
pub const LOW_THRESHOLD: u32 = 2;

/// Number of low dispensers that flags a station for refill.
pub const LOW_SLOTS_FOR_REFILL: usize = 3;

/// Rolling log entries kept per station.
pub const LOG_CAPACITY: usize = 10;

/// Bytes reserved for one log message (UTF-8, nul-padded).
pub const LOG_MSG_BYTES: usize = 100;

/// Bytes reserved for an ingredient name.
pub const INGREDIENT_NAME_BYTES: usize = 24;

/// Bytes reserved for a recipe name.
pub const RECIPE_NAME_BYTES: usize = 32;

/// Bytes reserved for a station status line.
pub const STATUS_BYTES: usize = 64;

/// Assignment attempts before an order is dropped with a timeout notice.
pub const MAX_ASSIGN_ATTEMPTS: u32 = 20;

/// Seconds between inventory monitor scans.
pub const MONITOR_PERIOD_SECS: u64 = 15;

/// Minimum seconds between alert log entries for the same station.
pub const ALERT_COOLDOWN_SECS: u64 = 30;

/// Dispatcher idle poll interval when the backlog is empty [ms].
pub const DISPATCH_IDLE_MILLIS: u64 = 200;

/// Dispatcher backoff after a failed assignment round [ms].
pub const DISPATCH_RETRY_MILLIS: u64 = 3_000;

/// Station worker wait bound while idle [ms].
pub const WORKER_POLL_MILLIS: u64 = 100;

/// Default region name published under `/dev/shm`.
pub const REGION_NAME: &str = "burger_line";

/// Default number of stations.
pub const DEFAULT_STATIONS: u32 = 3;

/// Default seconds spent on each recipe step.
pub const DEFAULT_STEP_SECS: u64 = 2;

/// Default seconds between generated orders.
pub const DEFAULT_ORDER_SECS: u64 = 7;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_are_consistent() {
        assert!(MAX_STATIONS >= 1);
        assert!(MAX_INGREDIENTS >= MAX_RECIPE_STEPS);
        assert!(MAX_QUEUE >= 1);
        assert!(DISPENSER_CAPACITY > LOW_THRESHOLD);
        assert!(LOW_SLOTS_FOR_REFILL <= MAX_INGREDIENTS);
        assert!(LOG_CAPACITY >= 1);
        assert!((DEFAULT_STATIONS as usize) <= MAX_STATIONS);
    }
}
