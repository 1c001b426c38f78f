//! Self-play game generation CLI.
//!
//! Plays computer-versus-computer games and writes one JSON record per game.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- [OPTIONS]

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use phalanx::search::Difficulty;
use phalanx::selfplay::{self, SelfPlayConfig};

/// Plays computer-versus-computer games and records them as JSONL
#[derive(Parser, Debug)]
#[command(name = "selfplay")]
#[command(about = "Generate self-play games between two planners")]
struct Args {
    /// Number of games to play
    #[arg(long, default_value_t = 10)]
    games: usize,

    /// Planner difficulty for the side that moves first
    #[arg(long, default_value = "medium", value_parser = parse_difficulty)]
    player: Difficulty,

    /// Planner difficulty for the side that moves second
    #[arg(long, default_value = "medium", value_parser = parse_difficulty)]
    computer: Difficulty,

    /// Turns after which an undecided game is a draw
    #[arg(long, default_value_t = 200)]
    max_turns: u32,

    /// Number of parallel threads
    #[arg(long, default_value_t = 4)]
    threads: usize,

    /// Random seed, 0 for entropy
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Output file path (default: stdout)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Suppress progress and summary output
    #[arg(long, short = 'q')]
    quiet: bool,
}

fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
    Difficulty::from_name(s).ok_or_else(|| format!("unknown difficulty '{}' (random, easy, medium, hard)", s))
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(if args.quiet { "warn" } else { "info" })),
        )
        .with_writer(io::stderr)
        .init();

    let config = SelfPlayConfig {
        num_games: args.games,
        player_difficulty: args.player,
        computer_difficulty: args.computer,
        max_turns: args.max_turns,
        threads: args.threads,
        seed: args.seed,
        quiet: args.quiet,
    };

    if !config.quiet {
        eprintln!(
            "Self-play: {} games, {} vs {}, max {} turns, {} threads",
            config.num_games, config.player_difficulty, config.computer_difficulty, config.max_turns, config.threads
        );
    }

    let start = Instant::now();
    let games = selfplay::run_self_play(&config);
    let elapsed = start.elapsed();

    if !config.quiet {
        eprintln!("Completed {} games in {:.1}s", games.len(), elapsed.as_secs_f64());
        eprintln!("{}", selfplay::summarize(&games));
    }

    let written = match &args.output {
        Some(path) => File::create(path).and_then(|file| selfplay::write_jsonl(&games, &mut BufWriter::new(file))),
        None => selfplay::write_jsonl(&games, &mut BufWriter::new(io::stdout().lock())),
    };

    match written {
        Ok(()) => {
            if let (Some(path), false) = (&args.output, config.quiet) {
                eprintln!("Wrote {} games to {}", games.len(), path.display());
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("failed to write output: {}", err);
            ExitCode::FAILURE
        }
    }
}
