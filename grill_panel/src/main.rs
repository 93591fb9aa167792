//! # Grill operator console
//!
//! Attaches to the producer's shared region and drives the control
//! surface: pause/resume stations, refill or adjust dispensers, and
//! print a plain status readout.
//!
//! ```bash
//! grill_panel status
//! grill_panel pause 1
//! grill_panel refill-ingredient 0 3
//! grill_panel adjust 0 3 -- -5
//! ```
//!
//! The console never owns the region: it only attaches, mutates through
//! the control surface and detaches. If the producer is not running the
//! attach fails with a clear error.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use grill_common::consts::REGION_NAME;
use grill_common::control;
use grill_common::layout::wall_clock_secs;
use grill_common::region::RegionClient;

/// Operator console for a running grill production line.
#[derive(Parser, Debug)]
#[command(name = "grill_panel")]
#[command(version)]
#[command(about = "Operator console for the grill production line")]
struct Args {
    /// Region name the producer published
    #[arg(long, default_value = REGION_NAME)]
    region: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print line counters and one block per station
    Status,
    /// Hold a station before its next order
    Pause {
        /// Station id
        station: usize,
    },
    /// Release a held station
    Resume {
        /// Station id
        station: usize,
    },
    /// Refill every dispenser of one station
    Refill {
        /// Station id
        station: usize,
    },
    /// Refill a single dispenser
    RefillIngredient {
        /// Station id
        station: usize,
        /// Dispenser index
        dispenser: usize,
    },
    /// Add or remove units from a dispenser (clamped to capacity)
    Adjust {
        /// Station id
        station: usize,
        /// Dispenser index
        dispenser: usize,
        /// Units to add (negative removes)
        delta: i32,
    },
    /// Refill every station
    RefillAll,
    /// Refill stations with any dispenser at or below the low threshold
    RefillCritical,
    /// Refill stations with any empty dispenser
    RefillExhausted,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_target(false)
        .init();

    if let Err(e) = run(args) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let client = RegionClient::attach(&args.region)?;
    let state = client.state();
    let now = wall_clock_secs();

    match args.command {
        Command::Status => print_status(state),
        Command::Pause { station } => {
            report(control::pause(state, station, now), "paused", station)
        }
        Command::Resume { station } => {
            report(control::resume(state, station, now), "resumed", station)
        }
        Command::Refill { station } => {
            report(control::refill_station(state, station, now), "refilled", station)
        }
        Command::RefillIngredient { station, dispenser } => report(
            control::refill_ingredient(state, station, dispenser),
            "refilled dispenser on",
            station,
        ),
        Command::Adjust {
            station,
            dispenser,
            delta,
        } => match control::adjust_ingredient(state, station, dispenser, delta) {
            Some(quantity) => println!("station {station} dispenser {dispenser}: {quantity} units"),
            None => println!("no such station/dispenser, nothing changed"),
        },
        Command::RefillAll => println!("refilled {} stations", control::refill_all_stations(state, now)),
        Command::RefillCritical => {
            println!("refilled {} critical stations", control::refill_critical(state, now))
        }
        Command::RefillExhausted => {
            println!("refilled {} exhausted stations", control::refill_exhausted(state, now))
        }
    }
    Ok(())
}

fn report(applied: bool, verb: &str, station: usize) {
    if applied {
        println!("{verb} station {station}");
    } else {
        println!("station {station}: no change");
    }
}

fn print_status(state: &grill_common::LineShared) {
    let status = control::line_status(state);
    println!(
        "line: {} | stations: {} | generated: {} | processed: {} | queued: {}",
        if status.active { "running" } else { "stopping" },
        status.stations,
        status.generated,
        status.processed,
        status.queued,
    );
    println!(
        "pace: {} ms/step, {} ms between orders",
        status.step_millis, status.order_millis
    );

    for id in 0..status.stations as usize {
        let Some(snap) = control::station_snapshot(state, id) else {
            continue;
        };
        let order = match &snap.current_order {
            Some((order_id, recipe, step, total)) => {
                format!("order #{order_id} {recipe} ({step}/{total})")
            }
            None => "-".to_string(),
        };
        println!(
            "\nstation {} [{}]{}{} processed: {} | {} | {}",
            snap.id,
            snap.state.label(),
            if snap.paused { " PAUSED" } else { "" },
            if snap.needs_refill { " NEEDS-REFILL" } else { "" },
            snap.processed_count,
            order,
            snap.status,
        );
        let levels: Vec<String> = snap
            .dispensers
            .iter()
            .map(|d| format!("{}:{}", d.name, d.quantity))
            .collect();
        println!("  inventory: {}", levels.join(" "));
        for line in &snap.log {
            println!(
                "  [{}]{} {}",
                line.timestamp,
                if line.is_alert { " !" } else { "" },
                line.message
            );
        }
    }
}
