//! Order generator.
//!
//! Picks a recipe uniformly at random, stamps a fresh id and pushes the
//! order onto the backlog at the configured cadence. The only blocking
//! call is the enqueue itself — a full backlog is the backpressure
//! signal, and the generator simply parks there until a slot frees or
//! shutdown begins.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use grill_common::catalog::Catalog;
use grill_common::layout::{wall_clock_secs, LineShared, OrderRecord};
use grill_common::queue::EnqueueOutcome;

use crate::sleep_while_active;

/// Generator thread body. Returns when shutdown is observed between
/// emissions or inside a blocked enqueue.
pub fn run(state: &LineShared, catalog: &Catalog, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let pace = Duration::from_millis(state.order_millis());

    while state.is_active() {
        let recipe = &catalog.recipes[rng.gen_range(0..catalog.recipes.len())];
        let order = {
            let mut globals = state.globals.lock();
            let id = globals.next_order_id;
            globals.next_order_id += 1;
            globals.total_generated += 1;
            OrderRecord::new(id, &recipe.name, &recipe.ingredients, wall_clock_secs())
        };
        let id = order.id;

        match state.enqueue_order(order) {
            EnqueueOutcome::ShuttingDown => break,
            EnqueueOutcome::Queued => {
                info!(order = id, recipe = %recipe.name, "order queued");
            }
        }

        // Announce under the global lock so a waiter cannot miss it.
        {
            let _globals = state.globals.lock();
            state.new_order.notify_all();
        }

        sleep_while_active(state, pace);
    }
    info!("generator stopped");
}
