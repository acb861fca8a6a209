//! Playout CLI: run many seeded random games in parallel and check that undo
//! always restores the previous state.
//!
//! Usage:
//!   cargo run --release --bin playout -- --games 1000 --seed 42
//!   cargo run --release --bin playout -- --games 200 --layout my_layout.toml --max-actions 600

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use jungle_game_engine::engine::arena::run_playouts;
use jungle_game_engine::engine::plugin::GameFactory;
use jungle_game_engine::engine::simulator::PlayoutParams;
use jungle_game_engine::games::jungle::layout::{load_default_layout, load_layout};
use jungle_game_engine::games::jungle::JungleFactory;

#[derive(Parser)]
#[command(name = "playout", about = "Run random Jungle playouts and report outcomes")]
struct Cli {
    /// Number of games to play
    #[arg(long, default_value = "100")]
    games: usize,

    /// Base random seed; game i uses seed + i
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Moves plus passes before a game is abandoned
    #[arg(long, default_value = "400")]
    max_actions: usize,

    /// Skip the per-move undo check
    #[arg(long)]
    no_undo_check: bool,

    /// Worker threads (default: one per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Path to a layout TOML file
    #[arg(long, env = "JUNGLE_LAYOUT")]
    layout: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .init();

    let cli = Cli::parse();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new().num_threads(threads).build_global()?;
    }

    let layout = match cli.layout {
        Some(ref path) => load_layout(path).map_err(|e| format!("Failed to load layout: {}", e))?,
        None => load_default_layout(),
    };
    let factory = JungleFactory::new(layout);

    let params = PlayoutParams {
        max_actions: cli.max_actions,
        check_undo: !cli.no_undo_check,
    };

    let step = (cli.games / 10).max(1);
    let progress: &(dyn Fn(usize, usize) + Sync) = &|done, total| {
        if done % step == 0 || done == total {
            eprintln!("  {}/{} games", done, total);
        }
    };

    eprintln!(
        "Running {} {} playouts (seed {}, cap {} actions)",
        cli.games,
        factory.display_name(),
        cli.seed,
        cli.max_actions
    );
    let report = run_playouts(&factory, cli.games, cli.seed, params, Some(progress))?;

    println!("{}", report.summary());

    if report.undo_violations > 0 {
        return Err(format!("{} undo violations detected", report.undo_violations).into());
    }
    Ok(())
}
