//! Blocking semantics of the order backlog.
//!
//! The ring itself lives in [`crate::layout::OrderRing`]; this module
//! implements the producer/consumer contract on top of it:
//!
//! - `enqueue_order` blocks while the ring is full — that block IS the
//!   backpressure signal for the generator. A waiter re-checks the
//!   lifecycle flag on every wakeup and bails out without enqueuing once
//!   shutdown has begun.
//! - `try_dequeue_order` never blocks; the dispatcher stays responsive
//!   to shutdown by polling.
//! - `drain_backlog` broadcasts both conditions under the ring lock so a
//!   shutdown wakeup cannot be lost.

use crate::layout::{LineShared, OrderRecord};

/// Result of a blocking enqueue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// The order is in the ring.
    Queued,
    /// Shutdown began while waiting; nothing was enqueued.
    ShuttingDown,
}

impl LineShared {
    /// Append an order at the tail, blocking while the ring is full.
    ///
    /// FIFO order between enqueues is preserved. When several consumers
    /// race, the ring mutex guarantees each order is handed out once.
    pub fn enqueue_order(&self, order: OrderRecord) -> EnqueueOutcome {
        let mut ring = self.backlog.slots.lock();
        while ring.size == ring.capacity {
            if !self.is_active() {
                return EnqueueOutcome::ShuttingDown;
            }
            ring = self.backlog.not_full.wait(ring);
        }
        let tail = ring.tail as usize;
        ring.orders[tail] = order;
        ring.tail = (ring.tail + 1) % ring.capacity;
        ring.size += 1;
        drop(ring);
        self.backlog.not_empty.notify_one();
        EnqueueOutcome::Queued
    }

    /// Append at the tail only if there is room right now.
    ///
    /// Used by the dispatcher to requeue a deferred order without risking
    /// a wait on `not_full` that only the dispatcher itself could satisfy.
    pub fn try_enqueue_order(&self, order: OrderRecord) -> bool {
        let mut ring = self.backlog.slots.lock();
        if ring.size == ring.capacity {
            return false;
        }
        let tail = ring.tail as usize;
        ring.orders[tail] = order;
        ring.tail = (ring.tail + 1) % ring.capacity;
        ring.size += 1;
        drop(ring);
        self.backlog.not_empty.notify_one();
        true
    }

    /// Pop the head order, or `None` immediately when the ring is empty.
    pub fn try_dequeue_order(&self) -> Option<OrderRecord> {
        let mut ring = self.backlog.slots.lock();
        if ring.size == 0 {
            return None;
        }
        let order = ring.orders[ring.head as usize];
        ring.head = (ring.head + 1) % ring.capacity;
        ring.size -= 1;
        drop(ring);
        self.backlog.not_full.notify_one();
        Some(order)
    }

    /// Current queued order count.
    pub fn backlog_len(&self) -> u32 {
        self.backlog.slots.lock().size
    }

    /// Wake every backlog waiter. Called once at shutdown, after the
    /// lifecycle flag is cleared; holding the ring lock across the
    /// broadcast closes the lost-wakeup window.
    pub fn drain_backlog(&self) {
        let ring = self.backlog.slots.lock();
        self.backlog.not_empty.notify_all();
        self.backlog.not_full.notify_all();
        drop(ring);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use crate::catalog::Catalog;
    use crate::config::LineConfig;
    use crate::region::RegionOwner;

    fn region_with_capacity(tag: &str, capacity: u32) -> RegionOwner {
        let name = format!("test_queue_{tag}_{}", std::process::id());
        let config = LineConfig {
            queue_capacity: capacity,
            ..LineConfig::default()
        };
        RegionOwner::create(&name, &config, &Catalog::builtin()).expect("create region")
    }

    fn order(id: u64) -> OrderRecord {
        OrderRecord::new(id, "plain", &["patty".to_string()], 0)
    }

    fn ring_invariant_holds(state: &LineShared) -> bool {
        let ring = state.backlog.slots.lock();
        ring.size <= ring.capacity && ring.tail == (ring.head + ring.size) % ring.capacity
    }

    #[test]
    fn fifo_order_is_preserved() {
        let region = region_with_capacity("fifo", 8);
        let state = region.state();
        for id in 1..=5 {
            assert_eq!(state.enqueue_order(order(id)), EnqueueOutcome::Queued);
            assert!(ring_invariant_holds(state));
        }
        for id in 1..=5 {
            assert_eq!(state.try_dequeue_order().map(|o| o.id), Some(id));
            assert!(ring_invariant_holds(state));
        }
        assert!(state.try_dequeue_order().is_none());
    }

    #[test]
    fn ring_wraps_around_its_capacity() {
        let region = region_with_capacity("wrap", 3);
        let state = region.state();
        // Fill, half-drain and refill across the wrap point, twice.
        for round in 0..2u64 {
            let base = round * 10;
            for id in 0..3 {
                assert!(state.try_enqueue_order(order(base + id)));
            }
            assert!(!state.try_enqueue_order(order(base + 99)));
            assert_eq!(state.try_dequeue_order().map(|o| o.id), Some(base));
            assert!(state.try_enqueue_order(order(base + 3)));
            assert!(ring_invariant_holds(state));
            for id in 1..=3 {
                assert_eq!(state.try_dequeue_order().map(|o| o.id), Some(base + id));
            }
            assert!(ring_invariant_holds(state));
        }
    }

    #[test]
    fn enqueue_blocks_at_capacity_until_one_dequeue() {
        let region = region_with_capacity("backpressure", 4);
        let state = region.state();
        for id in 0..4 {
            assert_eq!(state.enqueue_order(order(id)), EnqueueOutcome::Queued);
        }
        assert_eq!(state.backlog_len(), 4);

        let unblocked = AtomicU32::new(0);
        std::thread::scope(|scope| {
            scope.spawn(|| {
                assert_eq!(state.enqueue_order(order(100)), EnqueueOutcome::Queued);
                unblocked.store(1, Ordering::SeqCst);
            });

            // The producer is parked, not busy-looping.
            std::thread::sleep(Duration::from_millis(100));
            assert_eq!(unblocked.load(Ordering::SeqCst), 0);
            assert_eq!(state.backlog_len(), 4);

            // One dequeue frees exactly one slot and wakes the waiter.
            assert_eq!(state.try_dequeue_order().map(|o| o.id), Some(0));
            for _ in 0..200 {
                if unblocked.load(Ordering::SeqCst) == 1 {
                    break;
                }
                std::thread::sleep(Duration::from_millis(5));
            }
            assert_eq!(unblocked.load(Ordering::SeqCst), 1);
        });
        assert_eq!(state.backlog_len(), 4);
        assert!(ring_invariant_holds(state));
    }

    #[test]
    fn racing_consumers_each_get_distinct_orders() {
        let region = region_with_capacity("mpmc", 64);
        let state = region.state();
        for id in 0..40 {
            assert!(state.try_enqueue_order(order(id)));
        }

        let seen: std::sync::Mutex<Vec<u64>> = std::sync::Mutex::new(Vec::new());
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    while let Some(o) = state.try_dequeue_order() {
                        seen.lock().unwrap().push(o.id);
                    }
                });
            }
        });

        let mut ids = seen.into_inner().unwrap();
        ids.sort_unstable();
        assert_eq!(ids, (0..40).collect::<Vec<u64>>());
    }

    #[test]
    fn drain_releases_full_queue_waiters_on_shutdown() {
        let region = region_with_capacity("drain", 2);
        let state = region.state();
        for id in 0..2 {
            assert_eq!(state.enqueue_order(order(id)), EnqueueOutcome::Queued);
        }

        std::thread::scope(|scope| {
            let parked = scope.spawn(|| state.enqueue_order(order(50)));
            std::thread::sleep(Duration::from_millis(50));

            state.set_active(false);
            state.drain_backlog();
            assert_eq!(parked.join().unwrap(), EnqueueOutcome::ShuttingDown);
        });
        // The abandoned order never entered the ring.
        assert_eq!(state.backlog_len(), 2);
    }
}

