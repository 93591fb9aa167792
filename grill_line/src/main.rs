//! # Grill production line — producer binary
//!
//! Creates the shared region, runs the generator / dispatcher / monitor
//! and one worker per station, and translates signals into control
//! surface calls until TERM or INT stops the line.
//!
//! ```bash
//! # Three stations, defaults
//! grill_line
//!
//! # Five stations, fast steps, one order per 3 s
//! grill_line -n 5 -t 1 -o 3
//!
//! # Print the menu and exit
//! grill_line --menu
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use grill_common::catalog::Catalog;
use grill_common::config::LineConfig;
use grill_common::consts::{MAX_STATIONS, REGION_NAME};
use grill_line::{signals, ProductionLine};

/// Multi-station burger production line.
#[derive(Parser, Debug)]
#[command(name = "grill_line")]
#[command(version)]
#[command(about = "Multi-station burger production line with a shared-memory operator surface")]
struct Args {
    /// Number of assembly stations (1-10)
    #[arg(short = 'n', long = "stations", alias = "bandas", default_value_t = 3)]
    stations: u32,

    /// Seconds per recipe step (1-60)
    #[arg(
        short = 't',
        long = "step-seconds",
        alias = "tiempo-ingrediente",
        default_value_t = 2
    )]
    step_seconds: u64,

    /// Seconds between generated orders (1-300)
    #[arg(
        short = 'o',
        long = "order-seconds",
        alias = "tiempo-orden",
        default_value_t = 7
    )]
    order_seconds: u64,

    /// Print the recipe catalog and exit
    #[arg(short = 'm', long = "menu")]
    menu: bool,

    /// Replace the built-in catalog with a TOML file
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Seed for order generation (wall clock when omitted)
    #[arg(long)]
    seed: Option<u64>,
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    if let Err(e) = run(args) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    if args.stations == 0 || args.stations as usize > MAX_STATIONS {
        return Err(format!("--stations must be in 1..={MAX_STATIONS}").into());
    }
    if !(1..=60).contains(&args.step_seconds) {
        return Err("--step-seconds must be in 1..=60".into());
    }
    if !(1..=300).contains(&args.order_seconds) {
        return Err("--order-seconds must be in 1..=300".into());
    }

    let catalog = match &args.catalog {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin(),
    };

    if args.menu {
        print!("{}", catalog.render_menu());
        return Ok(());
    }

    let config = LineConfig {
        stations: args.stations,
        step_millis: args.step_seconds * 1_000,
        order_millis: args.order_seconds * 1_000,
        ..LineConfig::default()
    };

    let seed = args.seed.unwrap_or_else(grill_common::wall_clock_secs);

    signals::install()?;
    let line = ProductionLine::start(REGION_NAME, config, catalog, seed)?;
    info!(
        pid = std::process::id(),
        "line running — TERM/INT stops, USR1 pauses a station, USR2 resumes all, CONT refills"
    );

    let mut rng = StdRng::seed_from_u64(seed);
    while !signals::shutdown_requested() {
        signals::dispatch_pending(line.state(), &mut rng);
        std::thread::sleep(Duration::from_millis(200));
    }

    info!("shutdown signal received");
    let summary = line.shutdown();
    info!(
        generated = summary.generated,
        processed = summary.processed,
        discarded_in_queue = summary.queued,
        stations = summary.stations,
        step_millis = summary.step_millis,
        order_millis = summary.order_millis,
        "production line stopped"
    );
    Ok(())
}
