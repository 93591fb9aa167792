//! Assignment and inventory operations on a station.
//!
//! The eligibility check and the slot handoff happen under one station
//! lock acquisition, so two dispatchers can never assign to the same
//! station at once. Dispenser sufficiency takes each touched dispenser
//! lock briefly while the station lock is held (level 3 → level 4 in the
//! hierarchy on [`crate::layout::LineShared`]). Sufficiency and
//! consumption are deliberately not one transaction: a refill landing
//! between them only ever adds inventory.

use crate::consts::MAX_RECIPE_STEPS;
use crate::layout::{OrderRecord, Station};

impl Station {
    /// Try to hand `order` to this station.
    ///
    /// Succeeds iff the station is active, not paused, not busy and every
    /// requested ingredient is in stock (duplicates counted cumulatively).
    /// On success the order lands in the slot, the station goes busy and
    /// the worker is signaled.
    pub fn try_assign(&self, order: &OrderRecord, now: u64) -> bool {
        let mut core = self.core.lock();
        if core.active == 0 || core.paused != 0 || core.busy != 0 {
            return false;
        }
        if !self.holds_ingredients_for(order) {
            return false;
        }

        let mut accepted = *order;
        accepted.assigned_station = self.id() as i32;
        accepted.current_step = 0;
        core.order = accepted;
        core.has_order = 1;
        core.busy = 1;
        core.set_status(&format!("preparing {}", accepted.recipe()));
        core.push_log(
            &format!("ASSIGNED order #{} ({})", accepted.id, accepted.recipe()),
            false,
            now,
        );
        drop(core);
        self.cond.notify_one();
        true
    }

    /// Whether every ingredient the order needs is available here.
    ///
    /// An order listing the same ingredient twice needs two units of it.
    pub fn holds_ingredients_for(&self, order: &OrderRecord) -> bool {
        let steps = order.steps();
        let mut counted = [false; MAX_RECIPE_STEPS];
        for i in 0..steps {
            if counted[i] {
                continue;
            }
            let name = match order.ingredient(i) {
                Some(name) => name,
                None => continue,
            };
            let mut needed: u32 = 0;
            for j in i..steps {
                if order.ingredient(j) == Some(name) {
                    counted[j] = true;
                    needed += 1;
                }
            }
            match self.dispenser_by_name(name) {
                Some(slot) if slot.quantity() >= needed => {}
                _ => return false,
            }
        }
        true
    }

    /// Decrement one unit per requested ingredient.
    ///
    /// A slot that is missing or already empty is skipped — the quantity
    /// never goes negative and the order's visible progress is unaffected.
    /// Returns how many units were actually consumed.
    pub fn consume_for(&self, order: &OrderRecord) -> u32 {
        let mut consumed = 0;
        for name in order.ingredient_names() {
            if let Some(slot) = self.dispenser_by_name(name) {
                if slot.take_one() {
                    consumed += 1;
                }
            }
        }
        consumed
    }

    /// Whether any dispenser on this station is empty.
    pub fn any_dispenser_exhausted(&self) -> bool {
        self.dispensers().iter().any(|d| d.quantity() == 0)
    }

    /// Number of dispensers at or below `threshold`.
    pub fn dispensers_at_or_below(&self, threshold: u32) -> usize {
        self.dispensers()
            .iter()
            .filter(|d| d.quantity() <= threshold)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::LineConfig;
    use crate::layout::OrderRecord;
    use crate::region::RegionOwner;

    fn test_region(tag: &str) -> RegionOwner {
        let name = format!("test_station_{tag}_{}", std::process::id());
        RegionOwner::create(&name, &LineConfig::default(), &Catalog::builtin())
            .expect("create region")
    }

    fn order_of(id: u64, ingredients: &[&str]) -> OrderRecord {
        let owned: Vec<String> = ingredients.iter().map(|s| s.to_string()).collect();
        OrderRecord::new(id, "test", &owned, 0)
    }

    #[test]
    fn assign_moves_order_into_slot() {
        let region = test_region("assign");
        let station = region.state().station(0).unwrap();
        let order = order_of(7, &["bun_bottom", "patty", "bun_top"]);

        assert!(station.try_assign(&order, 100));
        let core = station.core.lock();
        assert_eq!(core.busy, 1);
        assert_eq!(core.has_order, 1);
        assert_eq!(core.order.id, 7);
        assert_eq!(core.order.assigned_station, 0);
        assert_eq!(core.status_text(), "preparing test");
        assert!(core.log.iter().any(|e| e.message().contains("ASSIGNED")));
    }

    #[test]
    fn busy_station_rejects_assignment() {
        let region = test_region("busy");
        let station = region.state().station(0).unwrap();
        assert!(station.try_assign(&order_of(1, &["patty"]), 0));
        assert!(!station.try_assign(&order_of(2, &["patty"]), 0));
    }

    #[test]
    fn paused_station_rejects_assignment() {
        let region = test_region("paused");
        let station = region.state().station(0).unwrap();
        station.core.lock().paused = 1;
        assert!(!station.try_assign(&order_of(1, &["patty"]), 0));
    }

    #[test]
    fn exhausted_ingredient_blocks_assignment() {
        let region = test_region("stockout");
        let station = region.state().station(0).unwrap();
        station.dispenser_by_name("bun_top").unwrap().adjust(-20);
        assert!(!station.try_assign(&order_of(1, &["bun_bottom", "bun_top"]), 0));
        // Other recipes remain assignable.
        assert!(station.try_assign(&order_of(2, &["bun_bottom", "patty"]), 0));
    }

    #[test]
    fn duplicate_ingredients_count_cumulatively() {
        let region = test_region("dupes");
        let station = region.state().station(0).unwrap();
        let slot = station.dispenser_by_name("patty").unwrap();
        // Leave exactly one patty.
        slot.adjust(-19);
        assert_eq!(slot.quantity(), 1);

        let double = order_of(1, &["bun_bottom", "patty", "patty", "bun_top"]);
        assert!(!station.holds_ingredients_for(&double));

        let single = order_of(2, &["bun_bottom", "patty", "bun_top"]);
        assert!(station.holds_ingredients_for(&single));
    }

    #[test]
    fn consume_decrements_each_requested_slot() {
        let region = test_region("consume");
        let station = region.state().station(0).unwrap();
        let order = order_of(1, &["bun_bottom", "patty", "patty", "bun_top"]);

        let consumed = station.consume_for(&order);
        assert_eq!(consumed, 4);
        assert_eq!(station.dispenser_by_name("patty").unwrap().quantity(), 18);
        assert_eq!(station.dispenser_by_name("bun_top").unwrap().quantity(), 19);
    }

    #[test]
    fn consume_skips_missing_and_empty_slots() {
        let region = test_region("defensive");
        let station = region.state().station(0).unwrap();
        station.dispenser_by_name("patty").unwrap().adjust(-20);

        let order = order_of(1, &["patty", "no_such_ingredient", "bun_top"]);
        let consumed = station.consume_for(&order);
        assert_eq!(consumed, 1);
        assert_eq!(station.dispenser_by_name("patty").unwrap().quantity(), 0);
    }

    #[test]
    fn inventory_classification_helpers() {
        let region = test_region("classify");
        let station = region.state().station(0).unwrap();
        assert!(!station.any_dispenser_exhausted());
        assert_eq!(station.dispensers_at_or_below(2), 0);

        station.dispenser(0).unwrap().adjust(-20);
        assert!(station.any_dispenser_exhausted());
        assert_eq!(station.dispensers_at_or_below(2), 1);
    }
}
