//! airlock-sim: drives the airlock service against an in-memory grid.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  script line ──▶ run(argument, source) ──▶ LogEventSink  │
//! │                        │                                 │
//! │                        ▼                                 │
//! │                  SimulatedGrid ──advance_physics()──┐    │
//! │                        ▲                            │    │
//! │                        └────────── next tick ◀──────┘    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! One script line is fed per tick (a blank line means no argument).  The
//! loop keeps ticking after the script ends while the service still asks
//! for a resume.
#![deny(unused_must_use)]

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use airlock::adapters::log_sink::LogEventSink;
use airlock::adapters::simulated::{
    DEFAULT_DOOR_SPEED, DEFAULT_VENT_RATE, SimulatedGrid, parse_rate,
};
use airlock::app::commands::UpdateSource;
use airlock::app::service::AirlockService;

#[derive(Parser)]
#[command(
    name = "airlock-sim",
    about = "Run the airlock sequencer against a simulated grid",
    version
)]
struct Cli {
    /// Airlock configuration (TOML with an [Airlock] table)
    #[arg(long)]
    config: PathBuf,

    /// Command script, one argument per tick
    #[arg(long)]
    script: Option<PathBuf>,

    /// Door travel per tick, as a fraction of full open, in (0, 1]
    #[arg(long, default_value_t = DEFAULT_DOOR_SPEED, value_parser = parse_rate)]
    door_speed: f32,

    /// Oxygen change per tick while the vent works, in (0, 1]
    #[arg(long, default_value_t = DEFAULT_VENT_RATE, value_parser = parse_rate)]
    vent_rate: f32,

    /// Stop after this many ticks even if a task is still pending
    #[arg(long, default_value_t = 1000)]
    max_ticks: u64,

    /// Print the final status as JSON
    #[arg(long)]
    status_json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── 1. Logging ────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(LevelFilter::INFO.into()))
        .with_target(false)
        .init();

    info!("airlock-sim v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration + script ─────────────────────────────
    let config_text = fs::read_to_string(&cli.config)
        .with_context(|| format!("reading config {}", cli.config.display()))?;
    let script = match &cli.script {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?,
        None => String::new(),
    };

    // ── 3. Grid + service ─────────────────────────────────────
    let mut grid = SimulatedGrid::standard(cli.door_speed, cli.vent_rate);
    let mut sink = LogEventSink::new();
    let mut service =
        AirlockService::new(config_text, &grid, &mut sink).context("initial reset failed")?;

    // ── 4. Tick loop ──────────────────────────────────────────
    let mut lines = script.lines();
    let mut ticks = 0u64;
    loop {
        let line = lines.next();
        if line.is_none() && !service.update_requested() {
            break;
        }
        if ticks >= cli.max_ticks {
            warn!("Stopping after {} ticks with work pending", ticks);
            break;
        }

        let argument = line.unwrap_or_default();
        let mut source = UpdateSource::NONE;
        if service.update_requested() {
            source = source | UpdateSource::ONCE;
        }
        if !argument.trim().is_empty() {
            source = source | UpdateSource::TRIGGER;
        }

        if let Err(e) = service.run(argument, source, &mut grid, &mut sink) {
            warn!("Tick {}: {}", ticks, e);
        }
        grid.advance_physics();
        ticks += 1;
    }

    // ── 5. Report ─────────────────────────────────────────────
    let status = service.status(&grid);
    if cli.status_json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("{}", status.render());
    }
    Ok(())
}
