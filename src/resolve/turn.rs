//! Turn operations.
//!
//! Moves, rotations, attacks, the staged-attack protocol and end of turn.
//! Each operation checks the phase, ownership and budget before touching the
//! state, so a rejected call never leaves a partial change behind.

use crate::board::{Facing, GameState, PendingAttack, Phase, Pos, Rotation, Side, Unit, UnitId};
use crate::error::RuleError;
use crate::movegen::{can_rotate, check_attack, check_move};

use super::combat::{apply_combat, resolve_combat, CombatOutcome};

/// The side allowed to act in the current phase.
pub fn acting_side(state: &GameState) -> Result<Side, RuleError> {
    match state.phase {
        Phase::GameOver => Err(RuleError::GameOver),
        phase => phase.active_side().ok_or(RuleError::WrongPhase(phase)),
    }
}

/// Looks up a live unit owned by `side`.
fn own_unit(state: &GameState, side: Side, id: UnitId) -> Result<Unit, RuleError> {
    let unit = state.unit(id).ok_or(RuleError::UnknownUnit(id))?;
    if unit.side != side {
        return Err(RuleError::NotOwnUnit(id));
    }
    Ok(*unit)
}

/// Looks up a live unit of any side.
fn any_unit(state: &GameState, id: UnitId) -> Result<Unit, RuleError> {
    state.unit(id).copied().ok_or(RuleError::UnknownUnit(id))
}

fn ensure_uncommitted(state: &GameState, id: UnitId) -> Result<(), RuleError> {
    match &state.pending {
        Some(p) if p.contains(id) => Err(RuleError::CommittedToAttack(id)),
        _ => Ok(()),
    }
}

/// Moves a unit, spending move points equal to the distance travelled and
/// turning it toward the direction of travel.
pub fn move_unit(state: &mut GameState, id: UnitId, to: Pos) -> Result<(), RuleError> {
    let side = acting_side(state)?;
    let unit = own_unit(state, side, id)?;
    ensure_uncommitted(state, id)?;
    let cost = check_move(state, &unit, to)?;

    let (dx, dy) = unit.pos.delta_to(to);
    if let Some(u) = state.unit_mut(id) {
        u.pos = to;
        u.moves_left -= cost;
        u.facing = Facing::toward(dx, dy);
    }
    Ok(())
}

/// Turns a unit a quarter turn. Free, but only while it has movement left.
pub fn rotate_unit(state: &mut GameState, id: UnitId, rotation: Rotation) -> Result<(), RuleError> {
    let side = acting_side(state)?;
    let unit = own_unit(state, side, id)?;
    ensure_uncommitted(state, id)?;
    if !can_rotate(&unit) {
        return Err(RuleError::InsufficientMoves(id));
    }
    if let Some(u) = state.unit_mut(id) {
        u.facing = u.facing.rotated(rotation);
    }
    Ok(())
}

/// A single unit attacks and the combat resolves at once.
pub fn attack(state: &mut GameState, attacker: UnitId, target: UnitId) -> Result<CombatOutcome, RuleError> {
    let side = acting_side(state)?;
    let a = own_unit(state, side, attacker)?;
    ensure_uncommitted(state, attacker)?;
    let d = any_unit(state, target)?;
    check_attack(state, &a, &d)?;

    let outcome = resolve_combat(state, &[&a], &d);
    apply_combat(state, &outcome);
    Ok(outcome)
}

/// Stages an attack against `target` with a first attacker.
pub fn begin_attack(state: &mut GameState, attacker: UnitId, target: UnitId) -> Result<(), RuleError> {
    let side = acting_side(state)?;
    if state.pending.is_some() {
        return Err(RuleError::AttackPending);
    }
    let a = own_unit(state, side, attacker)?;
    let d = any_unit(state, target)?;
    check_attack(state, &a, &d)?;

    state.pending = Some(PendingAttack { target, attackers: vec![attacker] });
    Ok(())
}

/// Adds another attacker against the staged target.
pub fn add_attacker(state: &mut GameState, attacker: UnitId) -> Result<(), RuleError> {
    let side = acting_side(state)?;
    let pending = state.pending.as_ref().ok_or(RuleError::NoPendingAttack)?;
    if pending.contains(attacker) {
        return Err(RuleError::CommittedToAttack(attacker));
    }
    let a = own_unit(state, side, attacker)?;
    let d = any_unit(state, pending.target)?;
    check_attack(state, &a, &d)?;

    if let Some(p) = state.pending.as_mut() {
        p.attackers.push(attacker);
    }
    Ok(())
}

/// Withdraws an attacker. Withdrawing the last one discards the staged attack.
pub fn remove_attacker(state: &mut GameState, attacker: UnitId) -> Result<(), RuleError> {
    acting_side(state)?;
    let pending = state.pending.as_mut().ok_or(RuleError::NoPendingAttack)?;
    let idx = pending
        .attackers
        .iter()
        .position(|&a| a == attacker)
        .ok_or(RuleError::NotCommitted(attacker))?;
    pending.attackers.remove(idx);
    if pending.attackers.is_empty() {
        state.pending = None;
    }
    Ok(())
}

/// Resolves the staged attack with every committed attacker.
///
/// Each attacker is re-checked first; if any can no longer attack, nothing
/// happens and the staged attack stays in place.
pub fn resolve_pending(state: &mut GameState) -> Result<CombatOutcome, RuleError> {
    acting_side(state)?;
    let pending = state.pending.as_ref().ok_or(RuleError::NoPendingAttack)?;
    let defender = any_unit(state, pending.target)?;
    let attackers: Vec<Unit> = pending
        .attackers
        .iter()
        .map(|&id| any_unit(state, id))
        .collect::<Result<_, _>>()?;
    for a in &attackers {
        check_attack(state, a, &defender)?;
    }

    let refs: Vec<&Unit> = attackers.iter().collect();
    let outcome = resolve_combat(state, &refs, &defender);
    state.pending = None;
    apply_combat(state, &outcome);
    Ok(outcome)
}

/// Discards the staged attack.
pub fn cancel_attack(state: &mut GameState) -> Result<(), RuleError> {
    acting_side(state)?;
    if state.pending.take().is_none() {
        return Err(RuleError::NoPendingAttack);
    }
    Ok(())
}

/// Ends the acting side's turn.
///
/// The opponent's units get their budget back, any staged attack is dropped,
/// and the opponent becomes the acting side.
pub fn end_turn(state: &mut GameState) -> Result<(), RuleError> {
    let side = acting_side(state)?;
    let next = side.opponent();
    for u in state.units.iter_mut().filter(|u| u.side == next) {
        u.refresh();
    }
    state.pending = None;
    state.phase = Phase::turn_of(next);
    state.turn += 1;
    tracing::debug!(turn = state.turn, side = %next, "turn passed");
    Ok(())
}

/// Enters `GameOver` if a side has no live units left.
///
/// If both sides were wiped out at once, `acting` wins. Returns whether the
/// game ended.
pub fn check_game_over(state: &mut GameState, acting: Option<Side>) -> bool {
    let player_out = state.live_count(Side::Player) == 0;
    let computer_out = state.live_count(Side::Computer) == 0;
    let winner = match (player_out, computer_out) {
        (false, false) => return false,
        (true, false) => Some(Side::Computer),
        (false, true) => Some(Side::Player),
        (true, true) => acting,
    };
    state.phase = Phase::GameOver;
    state.winner = winner;
    state.pending = None;
    tracing::info!(winner = ?winner, "game over");
    true
}
