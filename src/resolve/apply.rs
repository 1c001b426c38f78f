//! Action application.
//!
//! `simulate_action` is the single path from an `Action` to a new state. The
//! planner uses it for look-ahead and real play uses it for application, so
//! predictions and outcomes cannot drift apart.

use crate::board::{Action, GameState, Phase, Pos};
use crate::error::RuleError;

use super::combat::CombatOutcome;
use super::turn;

/// What applying an action produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Moved,
    Rotated,
    Fought(CombatOutcome),
    TurnEnded,
}

/// Applies one action in place. On error the state is unchanged.
pub fn apply_action(state: &mut GameState, action: &Action) -> Result<Effect, RuleError> {
    match *action {
        Action::Move { unit, x, y } => turn::move_unit(state, unit, Pos::new(x, y)).map(|()| Effect::Moved),
        Action::Rotate { unit, rotation } => turn::rotate_unit(state, unit, rotation).map(|()| Effect::Rotated),
        Action::Attack { unit, target } => turn::attack(state, unit, target).map(Effect::Fought),
        Action::EndTurn => turn::end_turn(state).map(|()| Effect::TurnEnded),
    }
}

/// Returns the state after `action`, leaving `state` untouched.
pub fn simulate_action(state: &GameState, action: &Action) -> Result<GameState, RuleError> {
    let mut next = state.clone();
    apply_action(&mut next, action)?;
    Ok(next)
}

/// An action that failed validation and was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejected {
    pub index: usize,
    pub action: Action,
    pub reason: RuleError,
}

/// Result of playing a whole action list for one side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnReport {
    pub applied: Vec<Action>,
    pub rejected: Vec<Rejected>,
    pub combats: Vec<CombatOutcome>,
}

/// Plays an untrusted action list for the acting side.
///
/// Every action is re-validated; illegal ones are dropped and play continues
/// with the next. The list stops at the first accepted `EndTurn`, or once the
/// game is over. If the list never ends the turn, the turn is ended anyway so
/// control passes on.
pub fn apply_action_list(state: &mut GameState, actions: &[Action]) -> TurnReport {
    let mut report = TurnReport::default();
    let Some(side) = state.phase.active_side() else {
        return report;
    };

    for (index, action) in actions.iter().enumerate() {
        if state.phase == Phase::GameOver {
            break;
        }
        match apply_action(state, action) {
            Ok(effect) => {
                report.applied.push(*action);
                match effect {
                    Effect::Fought(outcome) => report.combats.push(outcome),
                    Effect::TurnEnded => return report,
                    Effect::Moved | Effect::Rotated => {}
                }
            }
            Err(reason) => {
                tracing::warn!(index, ?action, %reason, "dropping rejected action");
                report.rejected.push(Rejected { index, action: *action, reason });
            }
        }
    }

    if state.phase == Phase::turn_of(side) && turn::end_turn(state).is_ok() {
        report.applied.push(Action::EndTurn);
    }
    report
}
