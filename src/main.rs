//=========================================================================
// Bridge Control - Command Line Entry Point
//
// Runs a schedule of vehicle groups over the bridge and prints a summary.
// Without `--group` arguments the schedule is read interactively.
//
// Example:
//   RUST_LOG=debug bridge_control -g 10:0.7:2 -g 6:0.2:0 --seed 7
//
//=========================================================================

use std::io;
use std::time::Duration;

use clap::builder::RangedU64ValueParser;
use clap::Parser;
use log::info;

use bridge_control::core::{BridgeBuilder, BridgeError};
use bridge_control::simulation::{Schedule, SimulationBuilder, VehicleGroup};

/// Simulate vehicles crossing a weight-limited single-lane bridge.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Vehicle group as COUNT:PROB:DELAY (northbound probability, delay in
    /// seconds before the next group). Repeatable.
    #[arg(short, long = "group", value_name = "COUNT:PROB:DELAY")]
    groups: Vec<VehicleGroup>,

    /// Seed for reproducible vehicle attributes and arrival times.
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum combined weight on the bridge.
    #[arg(long, default_value_t = 1200)]
    capacity: u32,

    /// Admitted vehicles allowed to queue per direction.
    #[arg(
        long,
        default_value_t = 100,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    queue_capacity: usize,

    /// Time each vehicle spends on the bridge, in milliseconds.
    #[arg(long, default_value_t = 3000)]
    crossing_ms: u64,

    /// Upper bound of the random delay before each arrival, in milliseconds.
    #[arg(long, default_value_t = 4000)]
    max_jitter_ms: u64,

    /// Additionally run the fairness policy every N milliseconds.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    rebalance_ms: Option<u64>,
}

fn main() -> Result<(), BridgeError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let schedule = if cli.groups.is_empty() {
        Schedule::read_interactive(io::stdin().lock(), io::stdout())?
    } else {
        Schedule::new(cli.groups)?
    };

    let bridge = BridgeBuilder::new()
        .with_capacity(cli.capacity)
        .with_queue_capacity(cli.queue_capacity)
        .with_crossing_time(Duration::from_millis(cli.crossing_ms));

    let mut builder = SimulationBuilder::new(schedule)
        .with_bridge(bridge)
        .with_max_arrival_jitter(Duration::from_millis(cli.max_jitter_ms));
    if let Some(seed) = cli.seed {
        builder = builder.with_seed(seed);
    }
    if let Some(ms) = cli.rebalance_ms {
        builder = builder.with_rebalance_interval(Duration::from_millis(ms));
    }

    let report = builder.build()?.run()?;

    info!("Run finished");
    println!("\n{}", report);
    Ok(())
}

//=========================================================================
// Unit Tests
//=========================================================================
