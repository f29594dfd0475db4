//! Hive Temple viewer
//!
//! Run with: cargo run -p temple-viz
//!
//! Examples:
//!   cargo run -p temple-viz -- --seed 7 --time-scale 4
//!   cargo run -p temple-viz -- --offline daji --error xiaosen --paused

use std::error::Error;
use std::path::PathBuf;

use bevy::prelude::*;
use clap::Parser;

use temple_core::config::DEFAULT_TUNING_PATH;
use temple_core::setup::{create_zone_catalog, default_roster, load_roster};
use temple_core::{TempleConfig, TempleSession};
use temple_events::{AgentId, AgentStatus};
use temple_viz::scene::SceneFrame;
use temple_viz::session::SessionClock;
use temple_viz::{TempleDriver, TemplePlugin};

/// Hive Temple viewer
#[derive(Parser, Debug)]
#[command(name = "hive_viewer")]
#[command(about = "Animated view of the hive temple agents")]
struct Args {
    /// Random seed for the session
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Tuning file (defaults are used when it does not exist)
    #[arg(long, default_value = DEFAULT_TUNING_PATH)]
    config: PathBuf,

    /// Roster JSON file replacing the built-in agents
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Playback speed multiplier
    #[arg(long, default_value_t = 1.0)]
    time_scale: f32,

    /// Agents pinned offline from the start
    #[arg(long)]
    offline: Vec<String>,

    /// Agents pinned in error from the start
    #[arg(long)]
    error: Vec<String>,

    /// Start with the clock paused
    #[arg(long)]
    paused: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let config = TempleConfig::load_or_default(&args.config)?;
    let frame = SceneFrame {
        width: config.scene.width,
        height: config.scene.height,
    };
    let catalog = create_zone_catalog(config.movement.zone_padding)?;
    let roster = match &args.roster {
        Some(path) => load_roster(path)?,
        None => default_roster(),
    };

    let mut driver = TempleDriver::new(TempleSession::new(config, catalog, args.seed)?);
    let added = driver.session.populate(&roster)?;
    for id in &args.offline {
        driver.session.pin_status(&AgentId::new(id.as_str()), AgentStatus::Offline)?;
    }
    for id in &args.error {
        driver.session.pin_status(&AgentId::new(id.as_str()), AgentStatus::Error)?;
    }

    println!("Hive Temple viewer");
    println!("  Seed: {}", args.seed);
    println!("  Agents: {}", added);

    let mut clock = SessionClock::with_time_scale(args.time_scale);
    clock.paused = args.paused;

    App::new()
        .insert_resource(frame)
        .insert_resource(clock)
        .insert_resource(driver)
        .add_plugins(TemplePlugin)
        .run();

    Ok(())
}
