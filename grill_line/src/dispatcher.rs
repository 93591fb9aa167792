//! Dispatcher: pairs queued orders with stations that can take them.
//!
//! Selection policy: stations are scanned in id order and the first
//! eligible one wins (eligible = active, not paused, not busy, all
//! requested ingredients in stock). Assignment is therefore NOT strictly
//! FIFO across stations — a later order may land on a free station while
//! an earlier one keeps getting deferred; ingredient availability is the
//! admission control.
//!
//! The dispatcher never blocks on an empty backlog (it polls on a short
//! sleep to stay responsive to shutdown) and never blocks on `not_full`
//! either: it is the only consumer, so a wait there could only be
//! satisfied by itself. When a deferred order cannot be requeued because
//! the ring refilled meanwhile, it is carried locally and retried after
//! the backoff.

use std::time::Duration;

use tracing::{debug, info, warn};

use grill_common::consts::{DISPATCH_IDLE_MILLIS, DISPATCH_RETRY_MILLIS, MAX_ASSIGN_ATTEMPTS};
use grill_common::layout::{wall_clock_secs, LineShared, OrderRecord};

use crate::sleep_while_active;

/// What one assignment round did with an order.
#[derive(Debug, Clone, Copy)]
pub enum DispatchOutcome {
    /// The order landed on a station.
    Assigned {
        /// Order id.
        order: u64,
        /// Receiving station id.
        station: u32,
    },
    /// No station was eligible; the order goes back to the tail with its
    /// attempt counter bumped.
    Deferred(OrderRecord),
    /// The retry bound was hit; the order is dropped.
    TimedOut(u64),
}

/// Run one assignment round for `order` against the station array.
pub fn dispatch_order(state: &LineShared, order: OrderRecord, now: u64) -> DispatchOutcome {
    for id in 0..state.num_stations() as usize {
        if let Some(station) = state.station(id) {
            if station.try_assign(&order, now) {
                return DispatchOutcome::Assigned {
                    order: order.id,
                    station: id as u32,
                };
            }
        }
    }
    let mut deferred = order;
    deferred.attempts += 1;
    if deferred.attempts >= MAX_ASSIGN_ATTEMPTS {
        DispatchOutcome::TimedOut(deferred.id)
    } else {
        DispatchOutcome::Deferred(deferred)
    }
}

/// Dispatcher thread body.
pub fn run(state: &LineShared) {
    let mut carried: Option<OrderRecord> = None;

    while state.is_active() {
        let next = carried.take().or_else(|| state.try_dequeue_order());
        let Some(order) = next else {
            sleep_while_active(state, Duration::from_millis(DISPATCH_IDLE_MILLIS));
            continue;
        };

        match dispatch_order(state, order, wall_clock_secs()) {
            DispatchOutcome::Assigned { order, station } => {
                info!(order, station, "order assigned");
            }
            DispatchOutcome::TimedOut(order) => {
                warn!(
                    order,
                    attempts = MAX_ASSIGN_ATTEMPTS,
                    "TIMEOUT: no station could take the order, dropping it"
                );
            }
            DispatchOutcome::Deferred(deferred) => {
                debug!(
                    order = deferred.id,
                    attempts = deferred.attempts,
                    "no eligible station, requeueing"
                );
                if !state.try_enqueue_order(deferred) {
                    carried = Some(deferred);
                }
                sleep_while_active(state, Duration::from_millis(DISPATCH_RETRY_MILLIS));
            }
        }
    }
    info!("dispatcher stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use grill_common::{Catalog, LineConfig, RegionOwner};

    fn test_region(tag: &str) -> RegionOwner {
        let name = format!("test_dispatch_{tag}_{}", std::process::id());
        let config = LineConfig {
            stations: 2,
            ..LineConfig::default()
        };
        RegionOwner::create(&name, &config, &Catalog::builtin()).expect("create region")
    }

    fn order_of(id: u64, ingredients: &[&str]) -> OrderRecord {
        let owned: Vec<String> = ingredients.iter().map(|s| s.to_string()).collect();
        OrderRecord::new(id, "test", &owned, 0)
    }

    #[test]
    fn first_eligible_station_wins() {
        let region = test_region("firstfit");
        let state = region.state();

        let outcome = dispatch_order(state, order_of(1, &["patty"]), 0);
        assert!(matches!(
            outcome,
            DispatchOutcome::Assigned { order: 1, station: 0 }
        ));

        // Station 0 is now busy; the next order falls through to 1.
        let outcome = dispatch_order(state, order_of(2, &["patty"]), 0);
        assert!(matches!(
            outcome,
            DispatchOutcome::Assigned { order: 2, station: 1 }
        ));
    }

    #[test]
    fn ineligible_everywhere_defers_with_attempt_bump() {
        let region = test_region("defer");
        let state = region.state();
        for id in 0..2 {
            let station = state.station(id).unwrap();
            station.dispenser_by_name("bun_top").unwrap().adjust(-20);
        }

        let outcome = dispatch_order(state, order_of(1, &["bun_top"]), 0);
        match outcome {
            DispatchOutcome::Deferred(o) => {
                assert_eq!(o.attempts, 1);
                assert_eq!(o.id, 1);
            }
            other => panic!("expected Deferred, got {other:?}"),
        }
    }

    #[test]
    fn attempts_accumulate_to_a_timeout() {
        let region = test_region("timeout");
        let state = region.state();
        for id in 0..2 {
            let station = state.station(id).unwrap();
            station.dispenser_by_name("bun_top").unwrap().adjust(-20);
        }

        let mut order = order_of(9, &["bun_top"]);
        let mut rounds = 0;
        loop {
            rounds += 1;
            match dispatch_order(state, order, 0) {
                DispatchOutcome::Deferred(o) => order = o,
                DispatchOutcome::TimedOut(id) => {
                    assert_eq!(id, 9);
                    break;
                }
                DispatchOutcome::Assigned { .. } => panic!("nothing was eligible"),
            }
        }
        assert_eq!(rounds, MAX_ASSIGN_ATTEMPTS);
        // Nothing was processed on account of the dropped order.
        assert_eq!(state.globals.lock().total_processed, 0);
    }

    #[test]
    fn paused_station_is_skipped() {
        let region = test_region("skippaused");
        let state = region.state();
        state.station(0).unwrap().core.lock().paused = 1;

        let outcome = dispatch_order(state, order_of(1, &["patty"]), 0);
        assert!(matches!(
            outcome,
            DispatchOutcome::Assigned { station: 1, .. }
        ));
    }
}
