//! # Grill production line — producer runtime
//!
//! The long-lived threads of the producer process: order generator,
//! dispatcher, one worker per station and the inventory monitor, plus
//! the lifecycle control that creates the shared region, spawns them
//! and tears everything down on shutdown.
//!
//! Thread count is `3 + N`: generator, dispatcher, monitor, and one
//! worker per station. All of them communicate exclusively through the
//! [`grill_common::LineShared`] region.

#![warn(clippy::all)]

pub mod dispatcher;
pub mod generator;
pub mod line;
pub mod monitor;
pub mod signals;
pub mod worker;

pub use line::{LineError, ProductionLine, Summary};

use std::time::{Duration, Instant};

use grill_common::LineShared;

/// Sleep up to `total`, waking early once shutdown begins.
///
/// Sliced so no runtime thread ever sits in a plain sleep longer than
/// one slice while the line is coming down.
pub fn sleep_while_active(state: &LineShared, total: Duration) {
    const SLICE: Duration = Duration::from_millis(50);
    let deadline = Instant::now() + total;
    while state.is_active() {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        std::thread::sleep((deadline - now).min(SLICE));
    }
}
