#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless tower defence combat simulation.

mod arsenal;
mod scenario;
mod simulation;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::{scenario::Scenario, simulation::Simulation};

/// Headless tower combat simulation
#[derive(Debug, Parser)]
#[command(name = "tower-defence", version, about, long_about = None)]
struct CliArgs {
    /// Scenario file to load; a seeded scenario is generated when omitted.
    #[arg(long, value_name = "PATH")]
    scenario: Option<PathBuf>,

    /// Maximum number of frames to simulate.
    #[arg(long, default_value_t = 3_600)]
    ticks: u32,

    /// Simulated milliseconds per frame.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,

    /// Seed for the generated scenario.
    #[arg(long, default_value_t = 0x5eed)]
    seed: u64,

    /// Run every tower at double speed.
    #[arg(long)]
    double_speed: bool,

    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Entry point for the tower defence command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::generated(args.seed),
    };

    let mut simulation = Simulation::new(&scenario, args.double_speed)?;
    let report = simulation.run(args.ticks, Duration::from_millis(args.tick_ms));
    println!("{report}");
    Ok(())
}
