//! Self-play game generation.
//!
//! Plays full computer-versus-computer games: both sides deploy and pick
//! support lines at random, then each turn is planned for the acting side with
//! its own difficulty. Records the applied actions, evaluations and live unit
//! counts per turn so games can be replayed or analysed.

use std::fmt;
use std::io::Write;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Serialize;

use crate::board::{GameState, Phase, Side, BOARD_SIZE};
use crate::error::RuleError;
use crate::eval::evaluate_all;
use crate::movegen::{random_deployment, random_support_lines};
use crate::protocol::notation::format_actions;
use crate::resolve::{apply_action_list, confirm_support, deploy_unit, toggle_support_line};
use crate::search::{plan_turn, Difficulty};

/// Configuration for self-play game generation.
#[derive(Debug, Clone)]
pub struct SelfPlayConfig {
    /// Number of games to play.
    pub num_games: usize,
    pub player_difficulty: Difficulty,
    pub computer_difficulty: Difficulty,
    /// Turns after which an undecided game is scored as a draw.
    pub max_turns: u32,
    /// Number of parallel threads for concurrent games.
    pub threads: usize,
    /// Random seed (0 = use entropy). Game `i` is seeded with `seed + i`.
    pub seed: u64,
    /// Suppress per-game progress logging.
    pub quiet: bool,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            num_games: 10,
            player_difficulty: Difficulty::Medium,
            computer_difficulty: Difficulty::Medium,
            max_turns: 200,
            threads: 4,
            seed: 0,
            quiet: false,
        }
    }
}

impl SelfPlayConfig {
    pub const fn difficulty_for(&self, side: Side) -> Difficulty {
        match side {
            Side::Player => self.player_difficulty,
            Side::Computer => self.computer_difficulty,
        }
    }
}

/// One played turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnRecord {
    pub turn: u32,
    pub side: Side,
    /// Applied actions in compact notation.
    pub actions: String,
    /// Evaluations at the start of the turn, indexed by `Side::index`.
    pub values: [f32; 2],
    /// Live units at the start of the turn, indexed by `Side::index`.
    pub live: [usize; 2],
    pub combats: usize,
    /// Actions the planner produced that failed re-validation.
    pub rejected: usize,
}

/// A complete self-play game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameRecord {
    pub game_id: usize,
    pub seed: u64,
    pub winner: Option<Side>,
    pub turns: u32,
    /// Whether the game hit the turn cap.
    pub truncated: bool,
    pub final_live: [usize; 2],
    pub records: Vec<TurnRecord>,
}

/// Builds a position ready for the first turn with both sides set up at random.
pub fn random_setup(size: i32, rng: &mut SmallRng) -> Result<GameState, RuleError> {
    let mut state = GameState::new(size);
    for side in Side::ALL {
        for (kind, pos) in random_deployment(side, &state, rng) {
            deploy_unit(&mut state, side, kind, pos)?;
        }
    }
    for side in Side::ALL {
        for line in random_support_lines(side, &state, rng) {
            toggle_support_line(&mut state, side, line.axis, line.index)?;
        }
        confirm_support(&mut state, side)?;
    }
    Ok(state)
}

fn live_counts(state: &GameState) -> [usize; 2] {
    [state.live_count(Side::Player), state.live_count(Side::Computer)]
}

/// Plays a single self-play game and returns the game record.
pub fn play_game(config: &SelfPlayConfig, game_id: usize, seed: u64) -> Result<GameRecord, RuleError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut state = random_setup(BOARD_SIZE, &mut rng)?;
    let mut records = Vec::new();

    while state.turn < config.max_turns {
        let Some(side) = state.phase.active_side() else {
            break;
        };
        let turn = state.turn;
        let values = evaluate_all(&state);
        let live = live_counts(&state);

        let plan = plan_turn(&state, side, config.difficulty_for(side), &mut rng);
        let report = apply_action_list(&mut state, &plan.actions);
        if !report.rejected.is_empty() {
            tracing::warn!(game_id, turn, rejected = report.rejected.len(), "planner produced rejected actions");
        }

        records.push(TurnRecord {
            turn,
            side,
            actions: format_actions(&report.applied),
            values,
            live,
            combats: report.combats.len(),
            rejected: report.rejected.len(),
        });
    }

    Ok(GameRecord {
        game_id,
        seed,
        winner: state.winner,
        turns: state.turn,
        truncated: state.phase != Phase::GameOver,
        final_live: live_counts(&state),
        records,
    })
}

fn game_seed(config: &SelfPlayConfig, game_id: usize) -> u64 {
    if config.seed != 0 {
        config.seed.wrapping_add(game_id as u64)
    } else {
        rand::random()
    }
}

fn play_logged(config: &SelfPlayConfig, game_id: usize) -> Option<GameRecord> {
    let seed = game_seed(config, game_id);
    match play_game(config, game_id, seed) {
        Ok(game) => {
            if !config.quiet {
                let outcome = match game.winner {
                    Some(w) => format!("{} wins", w),
                    None => "draw".to_string(),
                };
                tracing::info!(game_id, seed, turns = game.turns, %outcome, "game finished");
            }
            Some(game)
        }
        Err(err) => {
            tracing::warn!(game_id, seed, %err, "game setup failed");
            None
        }
    }
}

/// Runs self-play generation, returning records in game order.
///
/// When `config.threads > 1`, games are played concurrently on a dedicated
/// rayon pool. Each game draws from its own seed, so the output does not
/// depend on the thread count.
pub fn run_self_play(config: &SelfPlayConfig) -> Vec<GameRecord> {
    if config.threads > 1 {
        match rayon::ThreadPoolBuilder::new().num_threads(config.threads).build() {
            Ok(pool) => {
                return pool.install(|| {
                    (0..config.num_games)
                        .into_par_iter()
                        .filter_map(|i| play_logged(config, i))
                        .collect()
                });
            }
            Err(err) => tracing::warn!(%err, "thread pool unavailable, playing sequentially"),
        }
    }
    (0..config.num_games)
        .filter_map(|i| play_logged(config, i))
        .collect()
}

/// Writes game records as JSONL (one JSON object per game, one per line).
pub fn write_jsonl<W: Write>(games: &[GameRecord], out: &mut W) -> std::io::Result<()> {
    for game in games {
        serde_json::to_writer(&mut *out, game)?;
        writeln!(out)?;
    }
    out.flush()
}

/// Aggregate results over a batch of games.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub games: usize,
    /// Wins indexed by `Side::index`.
    pub wins: [usize; 2],
    pub draws: usize,
    pub avg_turns: f64,
}

pub fn summarize(games: &[GameRecord]) -> Summary {
    let mut summary = Summary { games: games.len(), ..Summary::default() };
    let mut total_turns = 0u64;
    for game in games {
        match game.winner {
            Some(side) => summary.wins[side.index()] += 1,
            None => summary.draws += 1,
        }
        total_turns += u64::from(game.turns);
    }
    if !games.is_empty() {
        summary.avg_turns = total_turns as f64 / games.len() as f64;
    }
    summary
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Self-Play Summary ===")?;
        writeln!(f, "Games: {}", self.games)?;
        for side in Side::ALL {
            writeln!(f, "{} wins: {}", side, self.wins[side.index()])?;
        }
        writeln!(f, "Draws: {}", self.draws)?;
        write!(f, "Average turns: {:.1}", self.avg_turns)
    }
}
