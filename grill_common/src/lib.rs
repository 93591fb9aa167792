//! # Grill production line — shared core
//!
//! The data region, synchronization primitives and control surface
//! shared by the producer (`grill_line`) and the operator console
//! (`grill_panel`).
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐     /dev/shm/grill_<name>      ┌──────────────────┐
//! │ grill_line       │    ┌──────────────────────┐    │ grill_panel      │
//! │  generator       ├───►│ LineShared           │◄───┤  control surface │
//! │  dispatcher      │    │  backlog ring        │    │  status snapshot │
//! │  N workers       │    │  stations[N]         │    └──────────────────┘
//! │  monitor         │    │  counters + flags    │
//! └──────────────────┘    └──────────────────────┘
//! ```
//!
//! The region is one fixed `#[repr(C)]` block ([`layout::LineShared`])
//! created and unlinked by the producer; the console only attaches. All
//! locks inside are process-shared pthread primitives ([`sync`]), ordered
//! global → backlog → station → dispenser (documented on `LineShared`).

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod config;
pub mod consts;
pub mod control;
pub mod error;
pub mod layout;
pub mod queue;
pub mod region;
pub mod station;
pub mod sync;

pub use catalog::{Catalog, ConfigError, Recipe};
pub use config::LineConfig;
pub use error::{RegionError, RegionResult};
pub use layout::{
    wall_clock_secs, Dispenser, Globals, LineShared, LogEntry, LogRing, OrderRecord, OrderRing,
    Station, StationCore, StationState,
};
pub use queue::EnqueueOutcome;
pub use region::{RegionClient, RegionOwner};
pub use sync::{ShmCondvar, ShmMutex, ShmMutexGuard};
