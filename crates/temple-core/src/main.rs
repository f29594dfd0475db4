//! Hive Temple headless runner
//!
//! Drives a session on the virtual clock without a window and reports what
//! the agents did.
//!
//! Examples:
//!   cargo run -p temple-core -- --duration-secs 120 --snapshot out/snapshot.json
//!   cargo run -p temple-core -- --realtime --offline daji --error xiaosen

use std::error::Error;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use temple_core::config::{default_config_toml, DEFAULT_TUNING_PATH};
use temple_core::setup::{create_zone_catalog, default_roster, load_roster};
use temple_core::{TempleConfig, TempleSession};
use temple_events::{AgentId, AgentStatus, PresentationUpdate};

/// Command line arguments for the headless runner
#[derive(Parser, Debug)]
#[command(name = "hive_temple")]
#[command(about = "Headless run of the hive temple agent controller")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Simulated seconds to run
    #[arg(long, default_value_t = 60)]
    duration_secs: u64,

    /// Clock step in milliseconds
    #[arg(long, default_value_t = 16)]
    step_ms: u64,

    /// Tuning file (defaults are used when it does not exist)
    #[arg(long, default_value = DEFAULT_TUNING_PATH)]
    config: PathBuf,

    /// Roster JSON file replacing the built-in agents
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Pace the clock against wall time
    #[arg(long)]
    realtime: bool,

    /// Agents pinned offline from the start
    #[arg(long)]
    offline: Vec<String>,

    /// Agents pinned in error from the start
    #[arg(long)]
    error: Vec<String>,

    /// Write the final scene snapshot as JSON
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Write every presentation update as JSON lines
    #[arg(long)]
    updates: Option<PathBuf>,

    /// Print the default tuning file and exit
    #[arg(long)]
    print_default_config: bool,
}

/// Simulated time between progress lines.
const REPORT_INTERVAL_MS: u64 = 10_000;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", default_config_toml());
        return Ok(());
    }

    init_tracing();

    println!("Hive Temple");
    println!("===========");
    println!("Seed: {}", args.seed);
    println!("Duration: {} s", args.duration_secs);
    println!();

    let config = TempleConfig::load_or_default(&args.config)?;
    let catalog = create_zone_catalog(config.movement.zone_padding)?;
    let roster = match &args.roster {
        Some(path) => load_roster(path)?,
        None => default_roster(),
    };

    let mut session = TempleSession::new(config, catalog, args.seed)?;

    let pending: Arc<Mutex<Vec<PresentationUpdate>>> = Arc::new(Mutex::new(Vec::new()));
    let mut updates_out = match &args.updates {
        Some(path) => {
            let sink = Arc::clone(&pending);
            session.on_presentation_change(move |update| {
                if let Ok(mut buffer) = sink.lock() {
                    buffer.push(update.clone());
                }
            });
            Some(BufWriter::new(create_file(path)?))
        }
        None => None,
    };

    let added = session.populate(&roster)?;
    println!("  Placed {} agents in {} zones", added, session.catalog().zones().len());

    for id in &args.offline {
        session.pin_status(&AgentId::new(id.as_str()), AgentStatus::Offline)?;
    }
    for id in &args.error {
        session.pin_status(&AgentId::new(id.as_str()), AgentStatus::Error)?;
    }

    let end_ms = args.duration_secs * 1_000;
    let step_ms = args.step_ms.max(1);
    let mut next_report = REPORT_INTERVAL_MS;

    let mut ticker = tokio::time::interval(Duration::from_millis(step_ms));
    while session.now_ms() < end_ms {
        if args.realtime {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::warn!("Interrupted at {} ms", session.now_ms());
                    break;
                }
            }
        }

        session.advance(step_ms.min(end_ms - session.now_ms()));

        if let Some(out) = updates_out.as_mut() {
            let drained = match pending.lock() {
                Ok(mut buffer) => std::mem::take(&mut *buffer),
                Err(_) => Vec::new(),
            };
            for update in &drained {
                serde_json::to_writer(&mut *out, update)?;
                out.write_all(b"\n")?;
            }
        }

        if session.now_ms() >= next_report {
            report(&mut session);
            next_report += REPORT_INTERVAL_MS;
        }
    }

    if let Some(mut out) = updates_out {
        out.flush()?;
    }

    let snapshot = session.snapshot();
    println!();
    println!("Finished at {} ms", snapshot.at_ms);
    println!("  Presentation updates: {}", session.updates_emitted());
    for (status, count) in snapshot.count_by_status() {
        println!("  {:<9} {}", status, count);
    }

    if let Some(path) = &args.snapshot {
        let json = serde_json::to_string_pretty(&snapshot)?;
        let mut file = create_file(path)?;
        file.write_all(json.as_bytes())?;
        println!("  Snapshot written to {}", path.display());
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn create_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    File::create(path)
}

fn report(session: &mut TempleSession) {
    let snapshot = session.snapshot();
    let tallies: Vec<String> = snapshot
        .count_by_status()
        .into_iter()
        .map(|(status, count)| format!("{}={}", status, count))
        .collect();
    tracing::info!(
        "[{:>7} ms] {} agents, {} moving, {}",
        snapshot.at_ms,
        snapshot.agents.len(),
        snapshot.moving_count(),
        tallies.join(" ")
    );
}
