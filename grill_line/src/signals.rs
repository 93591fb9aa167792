//! Signal adapter for the producer.
//!
//! Signals are a convenience binding onto the control surface, nothing
//! more: the async-signal-safe handlers only flip static flags, and the
//! main thread translates them into [`grill_common::control`] calls.
//!
//! Mapping: TERM/INT → shutdown, USR1 → pause one random station,
//! USR2 → resume every paused station, CONT → refill the flagged
//! stations (or one random station when none are flagged).

use std::os::raw::c_int;
use std::sync::atomic::{AtomicBool, Ordering};

use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use rand::rngs::StdRng;
use rand::Rng;
use tracing::info;

use grill_common::control;
use grill_common::layout::{wall_clock_secs, LineShared};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);
static PAUSE_ONE: AtomicBool = AtomicBool::new(false);
static RESUME_ALL: AtomicBool = AtomicBool::new(false);
static REFILL: AtomicBool = AtomicBool::new(false);

extern "C" fn on_signal(signum: c_int) {
    match Signal::try_from(signum) {
        Ok(Signal::SIGTERM) | Ok(Signal::SIGINT) => SHUTDOWN.store(true, Ordering::SeqCst),
        Ok(Signal::SIGUSR1) => PAUSE_ONE.store(true, Ordering::SeqCst),
        Ok(Signal::SIGUSR2) => RESUME_ALL.store(true, Ordering::SeqCst),
        Ok(Signal::SIGCONT) => REFILL.store(true, Ordering::SeqCst),
        _ => {}
    }
}

/// Install handlers for the producer's signal map.
pub fn install() -> Result<(), nix::Error> {
    let action = SigAction::new(SigHandler::Handler(on_signal), SaFlags::empty(), SigSet::empty());
    for sig in [
        Signal::SIGTERM,
        Signal::SIGINT,
        Signal::SIGUSR1,
        Signal::SIGUSR2,
        Signal::SIGCONT,
    ] {
        unsafe {
            signal::sigaction(sig, &action)?;
        }
    }
    Ok(())
}

/// Whether TERM or INT has arrived.
pub fn shutdown_requested() -> bool {
    SHUTDOWN.load(Ordering::SeqCst)
}

/// Translate any pending non-shutdown signals into control-surface
/// calls. Runs on the main thread's poll loop.
pub fn dispatch_pending(state: &LineShared, rng: &mut StdRng) {
    let now = wall_clock_secs();
    let stations = state.num_stations() as usize;

    if RESUME_ALL.swap(false, Ordering::SeqCst) {
        let mut resumed = 0;
        for id in 0..stations {
            if control::resume(state, id, now) {
                resumed += 1;
            }
        }
        info!(resumed, "USR2: resumed paused stations");
    }

    if PAUSE_ONE.swap(false, Ordering::SeqCst) && stations > 0 {
        let id = rng.gen_range(0..stations);
        control::pause(state, id, now);
        info!(station = id, "USR1: paused station");
    }

    if REFILL.swap(false, Ordering::SeqCst) && stations > 0 {
        let refilled = control::refill_flagged(state, now);
        if refilled > 0 {
            info!(refilled, "CONT: refilled flagged stations");
        } else {
            let id = rng.gen_range(0..stations);
            control::refill_station(state, id, now);
            info!(station = id, "CONT: nothing flagged, refilled one station");
        }
    }
}
