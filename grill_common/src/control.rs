//! Operator control surface.
//!
//! Mutation entry points usable by any process that has the region
//! mapped — the producer's signal adapter and the operator console both
//! route through here. Every operation takes only the station and/or
//! dispenser lock (levels 3–4), never the global lock; invalid station
//! or dispenser indices are silent no-ops.

use tracing::debug;

use crate::layout::{LineShared, StationState};

/// Hold a station. The worker parks at the top of its wait loop; a
/// running assembly finishes first. Returns whether the id was valid.
pub fn pause(state: &LineShared, station_id: usize, now: u64) -> bool {
    let Some(station) = state.station(station_id) else {
        return false;
    };
    let mut core = station.core.lock();
    if core.paused == 0 {
        core.paused = 1;
        core.push_log("PAUSED by operator", false, now);
        debug!(station = station_id, "station paused");
    }
    true
}

/// Release a held station and wake its worker. A resume on a station
/// that is not paused is a no-op.
pub fn resume(state: &LineShared, station_id: usize, now: u64) -> bool {
    let Some(station) = state.station(station_id) else {
        return false;
    };
    let mut core = station.core.lock();
    if core.paused == 0 {
        return false;
    }
    core.paused = 0;
    core.push_log("RESUMED by operator", false, now);
    drop(core);
    station.cond.notify_one();
    debug!(station = station_id, "station resumed");
    true
}

/// Set every dispenser of a station back to capacity and clear its
/// refill flag.
pub fn refill_station(state: &LineShared, station_id: usize, now: u64) -> bool {
    let Some(station) = state.station(station_id) else {
        return false;
    };
    let mut core = station.core.lock();
    for slot in station.dispensers() {
        slot.refill();
    }
    core.needs_refill = 0;
    core.push_log("REFILLED all dispensers", false, now);
    debug!(station = station_id, "station refilled");
    true
}

/// Set one dispenser back to capacity.
pub fn refill_ingredient(state: &LineShared, station_id: usize, dispenser: usize) -> bool {
    let Some(slot) = state
        .station(station_id)
        .and_then(|s| s.dispenser(dispenser))
    else {
        return false;
    };
    slot.refill();
    true
}

/// Add or remove units from one dispenser, clamped to
/// `[0, DISPENSER_CAPACITY]`. Returns the resulting count, or `None`
/// for an invalid index.
pub fn adjust_ingredient(
    state: &LineShared,
    station_id: usize,
    dispenser: usize,
    delta: i32,
) -> Option<u32> {
    state
        .station(station_id)
        .and_then(|s| s.dispenser(dispenser))
        .map(|slot| slot.adjust(delta))
}

/// Refill every station. Returns how many were refilled.
pub fn refill_all_stations(state: &LineShared, now: u64) -> usize {
    refill_matching(state, now, |_| true)
}

/// Refill stations with any dispenser at or below the low threshold.
pub fn refill_critical(state: &LineShared, now: u64) -> usize {
    refill_matching(state, now, |station| {
        station.dispensers_at_or_below(crate::consts::LOW_THRESHOLD) > 0
    })
}

/// Refill stations with any empty dispenser.
pub fn refill_exhausted(state: &LineShared, now: u64) -> usize {
    refill_matching(state, now, |station| station.any_dispenser_exhausted())
}

/// Refill stations the monitor has flagged with `needs_refill`.
pub fn refill_flagged(state: &LineShared, now: u64) -> usize {
    refill_matching(state, now, |station| station.core.lock().needs_refill != 0)
}

fn refill_matching(
    state: &LineShared,
    now: u64,
    predicate: impl Fn(&crate::layout::Station) -> bool,
) -> usize {
    let mut refilled = 0;
    for id in 0..state.num_stations() as usize {
        let matches = state.station(id).map(&predicate).unwrap_or(false);
        if matches && refill_station(state, id, now) {
            refilled += 1;
        }
    }
    refilled
}

// ─── Read path ──────────────────────────────────────────────────────

/// One dispenser level in a snapshot.
#[derive(Debug, Clone)]
pub struct DispenserLevel {
    /// Ingredient name.
    pub name: String,
    /// Units remaining.
    pub quantity: u32,
}

/// One log record in a snapshot.
#[derive(Debug, Clone)]
pub struct LogLine {
    /// Wall-clock time, epoch seconds.
    pub timestamp: u64,
    /// Message text.
    pub message: String,
    /// Whether this was an inventory alert.
    pub is_alert: bool,
}

/// A consistent copy of one station's observable state.
#[derive(Debug, Clone)]
pub struct StationSnapshot {
    /// Station id.
    pub id: u32,
    /// Worker state.
    pub state: StationState,
    /// Operator hold flag.
    pub paused: bool,
    /// Whether an order is being worked.
    pub busy: bool,
    /// Monitor refill flag.
    pub needs_refill: bool,
    /// Orders completed here.
    pub processed_count: u32,
    /// `(id, recipe, current_step, total_steps)` of the slot order.
    pub current_order: Option<(u64, String, u32, u32)>,
    /// Status line.
    pub status: String,
    /// Ingredient being added right now.
    pub current_ingredient: String,
    /// Dispenser levels.
    pub dispensers: Vec<DispenserLevel>,
    /// Log records, oldest → newest.
    pub log: Vec<LogLine>,
}

/// Snapshot a station under its lock. `None` for out-of-range ids.
pub fn station_snapshot(state: &LineShared, station_id: usize) -> Option<StationSnapshot> {
    let station = state.station(station_id)?;
    let core = station.core.lock();
    let current_order = (core.has_order != 0).then(|| {
        (
            core.order.id,
            core.order.recipe().to_string(),
            core.order.current_step,
            core.order.ingredient_count,
        )
    });
    let log = core
        .log
        .iter()
        .map(|e| LogLine {
            timestamp: e.timestamp,
            message: e.message().to_string(),
            is_alert: e.is_alert != 0,
        })
        .collect();
    let state_byte = core.station_state();
    let paused = core.paused != 0;
    let busy = core.busy != 0;
    let needs_refill = core.needs_refill != 0;
    let processed_count = core.processed_count;
    let status = core.status_text().to_string();
    let current_ingredient = crate::layout::fixed_str(&core.current_ingredient).to_string();
    drop(core);

    // Dispenser levels are read per slot after the station lock is gone;
    // the panel needs levels, not a cross-slot consistent cut.
    let dispensers = station
        .dispensers()
        .iter()
        .map(|d| DispenserLevel {
            name: d.name().to_string(),
            quantity: d.quantity(),
        })
        .collect();

    Some(StationSnapshot {
        id: station.id(),
        state: state_byte,
        paused,
        busy,
        needs_refill,
        processed_count,
        current_order,
        status,
        current_ingredient,
        dispensers,
        log,
    })
}

/// Line-wide counters for the status readout.
#[derive(Debug, Clone, Copy)]
pub struct LineStatus {
    /// False once shutdown began.
    pub active: bool,
    /// Active station count.
    pub stations: u32,
    /// Orders generated so far.
    pub generated: u64,
    /// Orders completed so far.
    pub processed: u64,
    /// Orders waiting in the backlog.
    pub queued: u32,
    /// Milliseconds per recipe step.
    pub step_millis: u64,
    /// Milliseconds between orders.
    pub order_millis: u64,
}

/// Read the line counters (global lock, then backlog lock, in hierarchy
/// order).
pub fn line_status(state: &LineShared) -> LineStatus {
    let (generated, processed) = {
        let globals = state.globals.lock();
        (globals.total_generated, globals.total_processed)
    };
    LineStatus {
        active: state.is_active(),
        stations: state.num_stations(),
        generated,
        processed,
        queued: state.backlog_len(),
        step_millis: state.step_millis(),
        order_millis: state.order_millis(),
    }
}
