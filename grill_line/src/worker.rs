//! Station worker: executes one assigned order at a time.
//!
//! Per-station state machine, transitions only under the station lock:
//!
//! ```text
//! Idle ──paused──► Paused ──resume──► Idle
//! Idle ──no order──► Waiting ──assignment──► Processing
//! Processing ──last step──► Finalizing ──► Idle
//! ```
//!
//! The pause gate sits at the top of the wait loop, before an order is
//! picked up; it never interrupts a running assembly. Inventory is
//! consumed up-front in one pass, then the visible step loop is pure
//! pacing — a refill arriving mid-step does not roll anything back.

use std::time::Duration;

use tracing::{debug, info};

use grill_common::consts::WORKER_POLL_MILLIS;
use grill_common::layout::{wall_clock_secs, LineShared, StationState};

use crate::{monitor, sleep_while_active};

/// Wrap-up pause after the last step, skipped entirely in zero-tick
/// (test) configurations.
const FINALIZE_MILLIS: u64 = 1_000;

/// Worker thread body for one station. Returns once shutdown is
/// observed from any wait point.
pub fn run(state: &LineShared, station_id: usize) {
    let Some(station) = state.station(station_id) else {
        return;
    };

    while state.is_active() {
        let mut core = station.core.lock();

        // Pause gate: park on the condition until resumed or shut down.
        while core.paused != 0 && state.is_active() {
            core.set_state(StationState::Paused);
            core.set_status("paused");
            core = station.cond.wait(core);
        }
        if !state.is_active() {
            break;
        }

        if core.busy == 0 {
            core.set_state(StationState::Waiting);
            core.set_status("waiting for orders");
            let (reacquired, _timed_out) =
                station.cond.wait_timeout(core, Duration::from_millis(WORKER_POLL_MILLIS));
            core = reacquired;
            if core.busy == 0 || core.paused != 0 {
                // Nothing arrived, or a pause snuck in: restart the loop
                // so the gates run again.
                continue;
            }
        }

        core.set_state(StationState::Processing);
        let order = core.order;
        drop(core);

        info!(
            station = station_id,
            order = order.id,
            recipe = order.recipe(),
            steps = order.ingredient_count,
            "processing order"
        );

        // Reserve the whole order's inventory before the step loop.
        let consumed = station.consume_for(&order);
        debug!(station = station_id, order = order.id, consumed, "ingredients taken");

        let step_pause = Duration::from_millis(state.step_millis());
        for step in 0..order.steps() {
            let name = order.ingredient(step).unwrap_or("");
            {
                let mut core = station.core.lock();
                core.order.current_step = step as u32 + 1;
                core.set_current_ingredient(name);
                core.set_status(&format!("adding {name}"));
                core.push_log(
                    &format!("ADDING {name} ({}/{})", step + 1, order.ingredient_count),
                    false,
                    wall_clock_secs(),
                );
            }
            sleep_while_active(state, step_pause);
        }

        {
            let mut core = station.core.lock();
            core.set_state(StationState::Finalizing);
            core.order.completed = 1;
            core.set_status(&format!("finalizing order #{}", order.id));
            core.push_log(
                &format!("FINISHED assembly of order #{}", order.id),
                false,
                wall_clock_secs(),
            );
        }
        if state.step_millis() > 0 {
            sleep_while_active(state, Duration::from_millis(FINALIZE_MILLIS));
        }

        {
            let mut core = station.core.lock();
            core.clear_order();
            core.processed_count += 1;
            core.set_state(StationState::Idle);
            core.set_status("idle");
            core.push_log(&format!("COMPLETED order #{}", order.id), false, wall_clock_secs());
        }

        // Global counter strictly after the station cleared busy, so a
        // viewer never observes total_processed ahead of the per-station
        // sums.
        state.globals.lock().total_processed += 1;

        info!(station = station_id, order = order.id, "order completed");

        // Completing an order is the natural moment to re-check stock.
        monitor::rescan_station(state, station_id, wall_clock_secs());
    }

    let mut core = station.core.lock();
    core.set_state(StationState::Idle);
    core.set_status("stopped");
    debug!(station = station_id, "worker stopped");
}
