//! Heuristic position evaluation.
//!
//! Scores a position from one side's perspective using material, support-line
//! coverage of own units, and exposure of own archers to melee contact.

use crate::board::{GameState, Side, UnitKind};
use crate::movegen::{is_engaged, support_bonus};

/// Flat credit for every surviving unit, on top of its kind value.
pub const SURVIVAL_CREDIT: f32 = 1.0;

/// Weight of each support point an own unit currently enjoys.
pub const SUPPORT_WEIGHT: f32 = 0.75;

/// Penalty for every own archer left next to an enemy.
pub const EXPOSED_ARCHER_PENALTY: f32 = 4.0;

/// Multiplier applied to a unit's value when it is destroyed.
pub const KILL_REWARD: f32 = 2.0;

/// Score granted to the winner of a finished game.
pub const WIN_SCORE: f32 = 1000.0;

/// Relative worth of a unit kind.
pub const fn unit_value(kind: UnitKind) -> f32 {
    match kind {
        UnitKind::Infantry => 3.0,
        UnitKind::Archer => 4.0,
        UnitKind::Cavalry => 5.0,
    }
}

/// Immediate reward for destroying an enemy unit of `kind`.
pub const fn kill_reward(kind: UnitKind) -> f32 {
    KILL_REWARD * unit_value(kind)
}

/// Sum of kind values plus survival credit over a side's live units.
pub fn material(state: &GameState, side: Side) -> f32 {
    state
        .units_of(side)
        .map(|u| unit_value(u.kind) + SURVIVAL_CREDIT)
        .sum()
}

/// Evaluates the position for `side`. Higher is better.
pub fn evaluate(state: &GameState, side: Side) -> f32 {
    match state.winner {
        Some(w) if w == side => return WIN_SCORE,
        Some(_) => return -WIN_SCORE,
        None => {}
    }

    let mut score = material(state, side) - material(state, side.opponent());

    for u in state.units_of(side) {
        score += SUPPORT_WEIGHT * support_bonus(state, side, u.pos) as f32;
        if u.kind == UnitKind::Archer && is_engaged(state, u) {
            score -= EXPOSED_ARCHER_PENALTY;
        }
    }

    score
}

/// Evaluates the position for both sides, indexed by `Side::index`.
pub fn evaluate_all(state: &GameState) -> [f32; 2] {
    [evaluate(state, Side::Player), evaluate(state, Side::Computer)]
}
