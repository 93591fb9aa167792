//! Fixed-layout structures of the shared data region.
//!
//! Everything here is `#[repr(C)]` plain data: fixed-width integers,
//! nul-padded byte strings and the process-shared primitives from
//! [`crate::sync`]. No pointers, no heap — cross-references are integer
//! indices (station id, dispenser index), so the whole [`LineShared`]
//! block can be mapped verbatim into a second address space.
//!
//! The producer creates and initializes the region; the operator console
//! attaches and validates `magic` and `layout_hash` before touching it.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use nix::errno::Errno;
use static_assertions::const_assert_eq;

use crate::catalog::Catalog;
use crate::config::LineConfig;
use crate::consts::{
    DISPENSER_CAPACITY, INGREDIENT_NAME_BYTES, LOG_CAPACITY, LOG_MSG_BYTES, MAX_INGREDIENTS,
    MAX_QUEUE, MAX_RECIPE_STEPS, MAX_STATIONS, RECIPE_NAME_BYTES, STATUS_BYTES,
};
use crate::sync::{ShmCondvar, ShmMutex};

/// Magic bytes at the start of every grill region: `"GRILLSM\0"`.
pub const LINE_MAGIC: [u8; 8] = *b"GRILLSM\0";

/// Compile-time hash for struct layout compatibility detection.
///
/// Computed from `size_of::<T>()` and `align_of::<T>()`. If the region
/// layout changes between builds, the hash changes and attach refuses to
/// connect. Field reordering within the same size/alignment is not
/// detected; `#[repr(C)]` with explicit padding keeps field order fixed.
pub const fn struct_version_hash<T>() -> u32 {
    let size = core::mem::size_of::<T>() as u32;
    let align = core::mem::align_of::<T>() as u32;
    size.wrapping_mul(0x9E37_79B9) ^ align.wrapping_mul(0x517C_C1B7)
}

/// Current wall-clock time as whole seconds since the Unix epoch.
pub fn wall_clock_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Copy `src` into a nul-padded fixed field, truncating on a character
/// boundary if it does not fit.
pub fn write_fixed(dst: &mut [u8], src: &str) {
    let mut end = src.len().min(dst.len());
    while !src.is_char_boundary(end) {
        end -= 1;
    }
    dst[..end].copy_from_slice(&src.as_bytes()[..end]);
    dst[end..].fill(0);
}

/// Read a nul-padded fixed field back as `&str`. Undecodable bytes yield
/// the empty string rather than a panic.
pub fn fixed_str(src: &[u8]) -> &str {
    let end = src.iter().position(|&b| b == 0).unwrap_or(src.len());
    std::str::from_utf8(&src[..end]).unwrap_or("")
}

// ─── Station state machine ──────────────────────────────────────────

/// Worker-observed station state.
///
/// Transitions happen only under the station lock. `Paused` is entered
/// from the wait loop, never mid-order: a running assembly always
/// finishes its steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StationState {
    /// Between orders, pause/shutdown checks pending.
    Idle = 0,
    /// Parked on the station condition, no assignment.
    Waiting = 1,
    /// Held by the operator; resumes via the station condition.
    Paused = 2,
    /// Stepping through an assigned order.
    Processing = 3,
    /// Last step done, wrapping up before the slot clears.
    Finalizing = 4,
}

impl StationState {
    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Idle),
            1 => Some(Self::Waiting),
            2 => Some(Self::Paused),
            3 => Some(Self::Processing),
            4 => Some(Self::Finalizing),
            _ => None,
        }
    }

    /// Human-readable label for status output.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Waiting => "waiting",
            Self::Paused => "paused",
            Self::Processing => "processing",
            Self::Finalizing => "finalizing",
        }
    }
}

impl Default for StationState {
    fn default() -> Self {
        Self::Idle
    }
}

// ─── Orders ─────────────────────────────────────────────────────────

/// One order as it travels generator → backlog → station slot (312 bytes).
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct OrderRecord {
    /// Unique, monotonically increasing id.
    pub id: u64,
    /// Creation time, epoch seconds.
    pub created_at: u64,
    /// Recipe name, nul-padded.
    pub recipe_name: [u8; RECIPE_NAME_BYTES],
    /// Ordered ingredient sequence, nul-padded names.
    pub ingredients: [[u8; INGREDIENT_NAME_BYTES]; MAX_RECIPE_STEPS],
    /// Number of valid entries in `ingredients`.
    pub ingredient_count: u32,
    /// 1-based step the worker is on; 0 before assembly starts.
    pub current_step: u32,
    /// Failed assignment rounds so far.
    pub attempts: u32,
    /// Station id holding this order, or -1 while unassigned.
    pub assigned_station: i32,
    /// Set by the worker after the finalizing step.
    pub completed: u8,
    /// Padding to 312 bytes.
    pub _pad: [u8; 7],
}

const_assert_eq!(core::mem::size_of::<OrderRecord>(), 312);

impl OrderRecord {
    /// Build a fresh, unassigned order for a recipe.
    ///
    /// Ingredients beyond [`MAX_RECIPE_STEPS`] are dropped; the catalog
    /// validator rejects such recipes before they get here.
    pub fn new(id: u64, recipe_name: &str, ingredients: &[String], created_at: u64) -> Self {
        let mut order = Self::vacant();
        order.id = id;
        order.created_at = created_at;
        write_fixed(&mut order.recipe_name, recipe_name);
        for (slot, name) in order.ingredients.iter_mut().zip(ingredients) {
            write_fixed(slot, name);
        }
        order.ingredient_count = ingredients.len().min(MAX_RECIPE_STEPS) as u32;
        order
    }

    /// The all-zero slot value with no station assigned.
    pub fn vacant() -> Self {
        let mut order: Self = unsafe { core::mem::zeroed() };
        order.assigned_station = -1;
        order
    }

    /// Recipe name as `&str`.
    pub fn recipe(&self) -> &str {
        fixed_str(&self.recipe_name)
    }

    /// Number of valid steps, bounded by the array even if the record
    /// was corrupted in the region.
    pub fn steps(&self) -> usize {
        (self.ingredient_count as usize).min(MAX_RECIPE_STEPS)
    }

    /// Ingredient name for 0-based step `index`, if in range.
    pub fn ingredient(&self, index: usize) -> Option<&str> {
        if index < self.steps() {
            Some(fixed_str(&self.ingredients[index]))
        } else {
            None
        }
    }

    /// Iterate the requested ingredient names in assembly order.
    pub fn ingredient_names(&self) -> impl Iterator<Item = &str> {
        self.ingredients[..self.steps()].iter().map(|slot| fixed_str(slot))
    }
}

// ─── Per-station log ring ───────────────────────────────────────────

/// One rolling log record (112 bytes).
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct LogEntry {
    /// Wall-clock time, epoch seconds.
    pub timestamp: u64,
    /// UTF-8 message, nul-padded.
    pub message: [u8; LOG_MSG_BYTES],
    /// Nonzero for inventory alerts.
    pub is_alert: u8,
    /// Padding to 112 bytes.
    pub _pad: [u8; 3],
}

const_assert_eq!(core::mem::size_of::<LogEntry>(), 112);

impl LogEntry {
    /// Message text as `&str`.
    pub fn message(&self) -> &str {
        fixed_str(&self.message)
    }
}

/// Fixed-size rolling log, oldest entries overwritten first.
///
/// Lives inside [`StationCore`], so every access already holds the
/// station lock.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct LogRing {
    entries: [LogEntry; LOG_CAPACITY],
    next: u32,
    len: u32,
}

const_assert_eq!(core::mem::size_of::<LogRing>(), LOG_CAPACITY * 112 + 8);

impl LogRing {
    /// Append a record, overwriting the oldest once full.
    pub fn push(&mut self, message: &str, is_alert: bool, timestamp: u64) {
        let slot = &mut self.entries[self.next as usize];
        slot.timestamp = timestamp;
        slot.is_alert = u8::from(is_alert);
        write_fixed(&mut slot.message, message);
        self.next = (self.next + 1) % LOG_CAPACITY as u32;
        self.len = (self.len + 1).min(LOG_CAPACITY as u32);
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// True if nothing has been logged yet.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate live records oldest → newest.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        let len = self.len as usize;
        let start = (self.next as usize + LOG_CAPACITY - len) % LOG_CAPACITY;
        (0..len).map(move |i| &self.entries[(start + i) % LOG_CAPACITY])
    }
}

// ─── Dispensers ─────────────────────────────────────────────────────

/// One per-station inventory slot with its own lock.
///
/// The name is fixed at init time and read without the lock; only the
/// quantity is mutable.
#[repr(C)]
pub struct Dispenser {
    name: [u8; INGREDIENT_NAME_BYTES],
    quantity: ShmMutex<u32>,
}

impl Dispenser {
    pub(crate) unsafe fn init(&mut self, name: &str, quantity: u32) -> Result<(), Errno> {
        write_fixed(&mut self.name, name);
        self.quantity.init()?;
        *self.quantity.lock() = quantity;
        Ok(())
    }

    /// Ingredient this slot holds.
    pub fn name(&self) -> &str {
        fixed_str(&self.name)
    }

    /// Current unit count.
    pub fn quantity(&self) -> u32 {
        *self.quantity.lock()
    }

    /// Take one unit if any remain. Returns whether a unit was consumed.
    pub fn take_one(&self) -> bool {
        let mut qty = self.quantity.lock();
        if *qty > 0 {
            *qty -= 1;
            true
        } else {
            false
        }
    }

    /// Set the slot back to full capacity.
    pub fn refill(&self) {
        *self.quantity.lock() = DISPENSER_CAPACITY;
    }

    /// Add `delta` units, clamped to `[0, DISPENSER_CAPACITY]`.
    /// Returns the resulting count.
    pub fn adjust(&self, delta: i32) -> u32 {
        let mut qty = self.quantity.lock();
        let adjusted = (*qty as i64 + i64::from(delta)).clamp(0, i64::from(DISPENSER_CAPACITY));
        *qty = adjusted as u32;
        *qty
    }
}

// ─── Stations ───────────────────────────────────────────────────────

/// Everything a station worker mutates, guarded by the station lock.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct StationCore {
    /// Current [`StationState`] as `u8`.
    pub state: u8,
    /// Cleared only at shutdown.
    pub active: u8,
    /// Operator hold flag; the worker parks while set.
    pub paused: u8,
    /// Set while an order occupies the slot and is being worked.
    pub busy: u8,
    /// Raised by the inventory monitor, cleared by refills.
    pub needs_refill: u8,
    /// Whether `order` holds a live record.
    pub has_order: u8,
    _pad: [u8; 2],
    /// Orders completed by this station.
    pub processed_count: u32,
    _pad2: [u8; 4],
    /// Epoch seconds of the last alert log, for rate limiting.
    pub last_alert_at: u64,
    /// The assigned order slot; valid iff `has_order` is set.
    pub order: OrderRecord,
    /// Operator-visible status line.
    pub status: [u8; STATUS_BYTES],
    /// Ingredient currently being added.
    pub current_ingredient: [u8; INGREDIENT_NAME_BYTES],
    /// Rolling event log.
    pub log: LogRing,
}

const_assert_eq!(core::mem::size_of::<StationCore>(), 24 + 312 + 64 + 24 + 1128);

impl StationCore {
    /// Decode the state byte; a corrupt value reads as `Idle`.
    pub fn station_state(&self) -> StationState {
        StationState::from_u8(self.state).unwrap_or_default()
    }

    /// Store a new state. Caller holds the station lock by construction.
    pub fn set_state(&mut self, state: StationState) {
        self.state = state as u8;
    }

    /// Replace the status line.
    pub fn set_status(&mut self, status: &str) {
        write_fixed(&mut self.status, status);
    }

    /// Status line as `&str`.
    pub fn status_text(&self) -> &str {
        fixed_str(&self.status)
    }

    /// Replace the current-ingredient readout.
    pub fn set_current_ingredient(&mut self, name: &str) {
        write_fixed(&mut self.current_ingredient, name);
    }

    /// Append to the rolling log.
    pub fn push_log(&mut self, message: &str, is_alert: bool, timestamp: u64) {
        self.log.push(message, is_alert, timestamp);
    }

    /// Empty the order slot after completion or at shutdown.
    pub fn clear_order(&mut self) {
        self.order = OrderRecord::vacant();
        self.has_order = 0;
        self.busy = 0;
        self.current_ingredient.fill(0);
    }
}

/// One assembly station: identity, wait condition, locked core and the
/// per-slot dispensers.
///
/// The dispenser array sits outside the core so a dispenser lock can be
/// taken while the station lock is held (see the hierarchy on
/// [`LineShared`]) or independently by refill paths.
#[repr(C)]
pub struct Station {
    id: u32,
    dispenser_count: u32,
    /// Wakes the worker on assignment, resume and shutdown.
    pub cond: ShmCondvar,
    /// Mutable station state.
    pub core: ShmMutex<StationCore>,
    dispensers: [Dispenser; MAX_INGREDIENTS],
}

impl Station {
    pub(crate) unsafe fn init(
        &mut self,
        id: u32,
        ingredients: &[String],
        active: bool,
        now: u64,
    ) -> Result<(), Errno> {
        self.id = id;
        self.dispenser_count = ingredients.len().min(MAX_INGREDIENTS) as u32;
        self.cond.init()?;
        self.core.init()?;
        for (slot, name) in self.dispensers.iter_mut().zip(ingredients) {
            slot.init(name, DISPENSER_CAPACITY)?;
        }
        for slot in self.dispensers.iter_mut().skip(ingredients.len()) {
            slot.init("", 0)?;
        }

        let mut core = self.core.lock();
        core.active = u8::from(active);
        core.set_state(StationState::Idle);
        core.order = OrderRecord::vacant();
        if active {
            core.set_status("idle");
            core.push_log(&format!("station {id} initialized"), false, now);
        }
        Ok(())
    }

    /// Station id (index into the region's station array).
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Live dispenser slots.
    pub fn dispensers(&self) -> &[Dispenser] {
        &self.dispensers[..self.dispenser_count as usize]
    }

    /// Dispenser holding `name`, if the station has one.
    ///
    /// Linear scan — the array is bounded by [`MAX_INGREDIENTS`].
    pub fn dispenser_by_name(&self, name: &str) -> Option<&Dispenser> {
        self.dispensers().iter().find(|d| d.name() == name)
    }

    /// Dispenser at `index`, if in range.
    pub fn dispenser(&self, index: usize) -> Option<&Dispenser> {
        self.dispensers().get(index)
    }
}

// ─── Order backlog ──────────────────────────────────────────────────

/// Ring storage behind the backlog mutex.
#[derive(Clone, Copy)]
#[repr(C)]
pub struct RingCore {
    /// Index of the oldest queued order.
    pub head: u32,
    /// Index one past the newest queued order:
    /// `tail == (head + size) % capacity`.
    pub tail: u32,
    /// Queued order count, `0..=capacity`.
    pub size: u32,
    /// Effective bound, `1..=MAX_QUEUE`. Fixed at init.
    pub capacity: u32,
    /// Backing storage.
    pub orders: [OrderRecord; MAX_QUEUE],
}

const_assert_eq!(core::mem::size_of::<RingCore>(), 16 + MAX_QUEUE * 312);

/// Bounded multi-producer / multi-consumer FIFO of orders.
///
/// Blocking semantics live in [`crate::queue`]; this is just the shared
/// storage plus its two conditions.
#[repr(C)]
pub struct OrderRing {
    /// Ring storage and indices.
    pub slots: ShmMutex<RingCore>,
    /// Signaled on enqueue.
    pub not_empty: ShmCondvar,
    /// Signaled on dequeue.
    pub not_full: ShmCondvar,
}

impl OrderRing {
    pub(crate) unsafe fn init(&mut self, capacity: u32) -> Result<(), Errno> {
        self.slots.init()?;
        self.not_empty.init()?;
        self.not_full.init()?;
        self.slots.lock().capacity = capacity.clamp(1, MAX_QUEUE as u32);
        Ok(())
    }
}

// ─── Global counters ────────────────────────────────────────────────

/// Line-wide counters behind the global lock.
#[derive(Debug, Clone, Copy, Default)]
#[repr(C)]
pub struct Globals {
    /// Orders the generator has created.
    pub total_generated: u64,
    /// Orders completed across all stations.
    pub total_processed: u64,
    /// Next order id to hand out.
    pub next_order_id: u64,
}

// ─── The region ─────────────────────────────────────────────────────

/// The entire shared state of the production line, mapped by both the
/// producer and the operator console.
///
/// # Lock hierarchy
///
/// Locks are acquired strictly in this order and released in reverse:
///
/// 1. global lock (`globals`, only for counters and `new_order`)
/// 2. backlog lock (`backlog.slots`)
/// 3. station lock (`stations[i].core`)
/// 4. dispenser lock (`stations[i].dispensers[j]`)
///
/// No thread holds two locks of the same level; a scan releases one
/// station before locking the next.
#[repr(C)]
pub struct LineShared {
    magic: [u8; 8],
    layout_hash: u32,
    num_stations: u32,
    num_ingredients: u32,
    _pad: [u8; 4],
    step_millis: u64,
    order_millis: u64,
    system_active: AtomicU32,
    _pad2: [u8; 4],
    /// Counters, paired with `new_order`.
    pub globals: ShmMutex<Globals>,
    /// Broadcast by the generator after each enqueue and at shutdown.
    pub new_order: ShmCondvar,
    /// The order backlog.
    pub backlog: OrderRing,
    /// All station slots; only the first `num_stations` are active.
    pub stations: [Station; MAX_STATIONS],
}

impl LineShared {
    /// Bytes to map for one region, rounded up to whole pages.
    pub const fn region_size() -> usize {
        let raw = core::mem::size_of::<LineShared>();
        let page = 4096;
        raw.div_ceil(page) * page
    }

    /// Initialize a zeroed mapping in place. Producer only, before the
    /// region becomes visible to anything else.
    pub(crate) unsafe fn init_in_place(
        &mut self,
        config: &LineConfig,
        catalog: &Catalog,
        now: u64,
    ) -> Result<(), Errno> {
        self.magic = LINE_MAGIC;
        self.layout_hash = struct_version_hash::<LineShared>();
        self.num_stations = config.stations.min(MAX_STATIONS as u32);
        self.num_ingredients = catalog.ingredients.len().min(MAX_INGREDIENTS) as u32;
        self.step_millis = config.step_millis;
        self.order_millis = config.order_millis;
        self.system_active = AtomicU32::new(1);

        self.globals.init()?;
        self.globals.lock().next_order_id = 1;
        self.new_order.init()?;
        self.backlog.init(config.queue_capacity)?;

        let stations = self.num_stations;
        for (id, station) in self.stations.iter_mut().enumerate() {
            station.init(id as u32, &catalog.ingredients, (id as u32) < stations, now)?;
        }
        Ok(())
    }

    /// Whether the header magic matches a grill region.
    pub fn magic_valid(&self) -> bool {
        self.magic == LINE_MAGIC
    }

    /// Layout hash written at creation.
    pub fn layout_hash(&self) -> u32 {
        self.layout_hash
    }

    /// Number of active stations.
    pub fn num_stations(&self) -> u32 {
        self.num_stations
    }

    /// Number of dispenser slots per station.
    pub fn num_ingredients(&self) -> u32 {
        self.num_ingredients
    }

    /// Milliseconds spent on each recipe step.
    pub fn step_millis(&self) -> u64 {
        self.step_millis
    }

    /// Milliseconds between generated orders.
    pub fn order_millis(&self) -> u64 {
        self.order_millis
    }

    /// True until shutdown begins. Lock-free so wait loops can check it
    /// while holding any lock in the hierarchy.
    pub fn is_active(&self) -> bool {
        self.system_active.load(Ordering::Acquire) != 0
    }

    /// Flip the lifecycle flag. Shutdown stores `false` and then
    /// broadcasts every condition so waiters observe it.
    pub fn set_active(&self, active: bool) {
        self.system_active.store(u32::from(active), Ordering::Release);
    }

    /// The active station slots.
    pub fn active_stations(&self) -> &[Station] {
        &self.stations[..self.num_stations as usize]
    }

    /// Active station by id, `None` for out-of-range ids.
    pub fn station(&self, id: usize) -> Option<&Station> {
        self.active_stations().get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_strings_roundtrip() {
        let mut buf = [0u8; 16];
        write_fixed(&mut buf, "patty");
        assert_eq!(fixed_str(&buf), "patty");

        write_fixed(&mut buf, "a-name-longer-than-the-field");
        assert_eq!(fixed_str(&buf), "a-name-longer-th");

        // Truncation must not split a multi-byte character.
        write_fixed(&mut buf, "jalapeños-jalapeños");
        assert!(std::str::from_utf8(fixed_str(buf.as_slice()).as_bytes()).is_ok());
    }

    #[test]
    fn write_fixed_clears_previous_tail() {
        let mut buf = [0u8; 16];
        write_fixed(&mut buf, "mushrooms");
        write_fixed(&mut buf, "mayo");
        assert_eq!(fixed_str(&buf), "mayo");
    }

    #[test]
    fn station_state_roundtrip() {
        for v in 0..=4u8 {
            let state = StationState::from_u8(v).unwrap();
            assert_eq!(state as u8, v);
        }
        assert!(StationState::from_u8(5).is_none());
        assert_eq!(StationState::default(), StationState::Idle);
    }

    #[test]
    fn order_record_carries_recipe() {
        let ingredients = vec![
            "bun_bottom".to_string(),
            "patty".to_string(),
            "bun_top".to_string(),
        ];
        let order = OrderRecord::new(42, "classic", &ingredients, 1_000);
        assert_eq!(order.id, 42);
        assert_eq!(order.recipe(), "classic");
        assert_eq!(order.ingredient_count, 3);
        assert_eq!(order.ingredient(1), Some("patty"));
        assert_eq!(order.ingredient(3), None);
        assert_eq!(order.assigned_station, -1);
        assert_eq!(
            order.ingredient_names().collect::<Vec<_>>(),
            ["bun_bottom", "patty", "bun_top"]
        );
    }

    #[test]
    fn log_ring_overwrites_oldest() {
        let mut ring: LogRing = unsafe { core::mem::zeroed() };
        assert!(ring.is_empty());
        for i in 0..(LOG_CAPACITY + 3) {
            ring.push(&format!("event {i}"), false, i as u64);
        }
        assert_eq!(ring.len(), LOG_CAPACITY);
        let messages: Vec<String> = ring.iter().map(|e| e.message().to_string()).collect();
        assert_eq!(messages.first().map(String::as_str), Some("event 3"));
        assert_eq!(
            messages.last().map(String::as_str),
            Some(format!("event {}", LOG_CAPACITY + 2).as_str())
        );
    }

    #[test]
    fn log_ring_iterates_in_append_order_before_wrap() {
        let mut ring: LogRing = unsafe { core::mem::zeroed() };
        ring.push("first", false, 1);
        ring.push("second", true, 2);
        let entries: Vec<_> = ring.iter().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message(), "first");
        assert_eq!(entries[1].message(), "second");
        assert_eq!(entries[1].is_alert, 1);
    }

    #[test]
    fn layout_hash_is_deterministic_and_type_sensitive() {
        assert_eq!(
            struct_version_hash::<LineShared>(),
            struct_version_hash::<LineShared>()
        );
        assert_ne!(
            struct_version_hash::<LineShared>(),
            struct_version_hash::<OrderRecord>()
        );
    }

    #[test]
    fn region_occupies_whole_pages() {
        assert!(core::mem::size_of::<LineShared>() <= LineShared::region_size());
        assert_eq!(LineShared::region_size() % 4096, 0);
        // Everything in the region is 8-byte aligned plain data.
        assert_eq!(core::mem::align_of::<LineShared>() % 8, 0);
        assert_eq!(core::mem::size_of::<Station>() % 8, 0);
    }
}
