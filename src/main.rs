//! Championship driver
//!
//! Persists the store to a JSON snapshot between invocations, so each
//! subcommand picks up where the previous one left off.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::runtime::Runtime;

use championship::championship::{Orchestrator, TickReport};
use championship::core::config::{EngineConfig, TickMode};
use championship::core::error::Result;
use championship::roster::{generate_roster, Entrant};
use championship::store::{EntrantCriteria, InMemoryStore, Store};

/// Round-robin championship driver
#[derive(Parser, Debug)]
#[command(name = "championship")]
#[command(about = "Register entrants, run a round-robin championship and print standings")]
struct Args {
    /// JSON snapshot holding entrants, matches and championship state
    #[arg(long, global = true, default_value = "championship_state.json")]
    state: PathBuf,

    /// TOML engine config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register entrants with generated rosters
    RegisterDemo {
        #[arg(long, default_value_t = 4)]
        entrants: usize,

        /// Seed for roster generation
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Start a championship with every entered entrant
    Start,
    /// Advance every open match
    Tick {
        #[arg(long, value_enum)]
        mode: Option<Mode>,

        #[arg(long, default_value_t = 1)]
        count: u32,
    },
    /// Tick on a timer until the championship finishes
    Run {
        #[arg(long, default_value_t = 250)]
        interval_ms: u64,

        #[arg(long, value_enum)]
        mode: Option<Mode>,
    },
    /// Print the current standings
    Standings,
    /// Discard the championship and return to idle
    Reset,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Mode {
    Attempt,
    Round,
}

impl From<Mode> for TickMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Attempt => TickMode::Attempt,
            Mode::Round => TickMode::Round,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("championship=info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::load_from_toml(path)?,
        None => EngineConfig::default(),
    };
    let store = InMemoryStore::load_snapshot(&args.state)?;
    let orchestrator = Orchestrator::from_config(store, config)?;

    match args.command {
        Command::RegisterDemo { entrants, seed } => {
            let seed = seed.unwrap_or_else(rand::random);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let offset = orchestrator.store().entrants()?.len();
            for i in 0..entrants {
                let entrant = Entrant::new(format!("Team {}", offset + i + 1), generate_roster(&mut rng));
                let name = entrant.name.clone();
                let id = orchestrator.store().register_entrant(entrant)?;
                println!("Registered {} ({})", name, id);
            }
        }
        Command::Start => {
            let summary = orchestrator.start_from_store(EntrantCriteria::Entered)?;
            println!(
                "Started: {} entrants, {} stages, {} matches open (seed {})",
                summary.entrants,
                summary.stages,
                summary.opened.len(),
                summary.seed
            );
        }
        Command::Tick { mode, count } => {
            let mode = mode.map(TickMode::from).unwrap_or(orchestrator.config().tick_mode);
            for _ in 0..count {
                let report = orchestrator.tick_with_mode(mode)?;
                print_report(&report);
                if report.finished {
                    break;
                }
            }
        }
        Command::Run { interval_ms, mode } => {
            let mode = mode.map(TickMode::from).unwrap_or(orchestrator.config().tick_mode);
            let rt = Runtime::new()?;
            rt.block_on(run_until_finished(&orchestrator, mode, interval_ms, &args.state))?;
        }
        Command::Standings => {}
        Command::Reset => {
            orchestrator.reset()?;
            println!("Championship reset");
        }
    }

    print_standings(orchestrator.store())?;
    orchestrator.store().save_snapshot(&args.state)?;
    Ok(())
}

async fn run_until_finished(
    orchestrator: &Orchestrator<InMemoryStore>,
    mode: TickMode,
    interval_ms: u64,
    snapshot: &Path,
) -> Result<()> {
    let mut interval = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
    loop {
        interval.tick().await;
        let report = orchestrator.tick_with_mode(mode)?;
        print_report(&report);
        orchestrator.store().save_snapshot(snapshot)?;
        if !orchestrator.state()?.is_active() {
            return Ok(());
        }
    }
}

fn print_report(report: &TickReport) {
    println!(
        "[stage {}] {} attempts, {} matches completed{}{}",
        report.stage,
        report.attempts_resolved,
        report.matches_completed.len(),
        report
            .stage_opened
            .map(|s| format!(", stage {} opened", s))
            .unwrap_or_default(),
        if report.finished { ", championship finished" } else { "" }
    );
    for failure in &report.failures {
        println!("  match {} retried next tick: {}", failure.match_id, failure.error);
    }
}

fn print_standings(store: &InMemoryStore) -> Result<()> {
    let state = store.read_championship_state()?.value;
    if state.standings.is_empty() {
        println!("No championship standings ({:?})", state.phase);
        return Ok(());
    }

    let entrants = store.entrants()?;
    println!("\n=== STANDINGS ({:?}, stage {}) ===", state.phase, state.current_stage);
    for (rank, standing) in state.standings.entries().iter().enumerate() {
        let name = entrants
            .iter()
            .find(|e| e.id == standing.entrant)
            .map(|e| e.name.as_str())
            .unwrap_or("?");
        let stats = store.entrant_stats(standing.entrant)?;
        println!(
            "{:>2}. {:<12} {:>6} pts  ({} wins / {} played)",
            rank + 1,
            name,
            standing.points,
            stats.match_wins,
            stats.matches_played
        );
    }
    Ok(())
}
