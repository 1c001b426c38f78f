//! Setup phases: deployment and secret support selection.
//!
//! Deployment ends once both rosters are placed. Support selection ends once
//! both sides have confirmed exactly three lines, and the player moves first.

use crate::board::{Axis, Facing, GameState, Phase, Pos, Side, SupportLine, UnitId, UnitKind, MAX_SUPPORT_LINES};
use crate::error::RuleError;
use crate::movegen::check_placement;

/// Number of rows in each side's deployment zone.
const ZONE_DEPTH: i32 = 2;

/// Tiles a side may deploy onto: its two home rows, three central columns.
pub fn deployment_zone(side: Side, size: i32) -> Vec<Pos> {
    let mid = (size + 1) / 2;
    let rows = match side {
        Side::Player => (size - ZONE_DEPTH + 1)..=size,
        Side::Computer => 1..=ZONE_DEPTH,
    };
    rows.flat_map(|y| (mid - 1..=mid + 1).map(move |x| Pos::new(x, y)))
        .collect()
}

pub fn in_deployment_zone(side: Side, pos: Pos, size: i32) -> bool {
    deployment_zone(side, size).contains(&pos)
}

/// Initial facing of a freshly deployed unit: toward the enemy edge.
pub const fn home_facing(side: Side) -> Facing {
    match side {
        Side::Player => Facing::North,
        Side::Computer => Facing::South,
    }
}

fn require_phase(state: &GameState, phase: Phase) -> Result<(), RuleError> {
    match state.phase {
        Phase::GameOver => Err(RuleError::GameOver),
        p if p == phase => Ok(()),
        p => Err(RuleError::WrongPhase(p)),
    }
}

/// Places one unit of the side's roster inside its zone.
pub fn deploy_unit(state: &mut GameState, side: Side, kind: UnitKind, pos: Pos) -> Result<UnitId, RuleError> {
    require_phase(state, Phase::Deployment)?;
    if !state.in_bounds(pos) {
        return Err(RuleError::OutOfBounds { x: pos.x, y: pos.y });
    }
    if !in_deployment_zone(side, pos, state.size) {
        return Err(RuleError::OutsideDeploymentZone { x: pos.x, y: pos.y });
    }
    if state.is_occupied(pos) {
        return Err(RuleError::Occupied { x: pos.x, y: pos.y });
    }
    if state.reserves[side.index()].remaining(kind) == 0 {
        return Err(RuleError::KindExhausted(kind));
    }

    state.reserves[side.index()].take(kind);
    let id = state
        .place_unit(kind, side, pos, home_facing(side))
        .ok_or(RuleError::Occupied { x: pos.x, y: pos.y })?;

    if state.reserves.iter().all(|r| r.is_empty()) {
        state.phase = Phase::SupportSelection;
        tracing::info!("deployment complete, support selection begins");
    }
    Ok(id)
}

/// Adds the line if the side does not hold it, removes it if it does.
///
/// Returns whether the side holds the line afterwards.
pub fn toggle_support_line(state: &mut GameState, side: Side, axis: Axis, index: i32) -> Result<bool, RuleError> {
    require_phase(state, Phase::SupportSelection)?;
    if state.support_confirmed[side.index()] {
        return Err(RuleError::SupportConfirmed);
    }

    let candidate = SupportLine::new(side, axis, index);
    if let Some(pos) = state
        .support_lines
        .iter()
        .position(|l| l.side == side && l.same_line(&candidate))
    {
        state.support_lines.remove(pos);
        return Ok(false);
    }

    let held: Vec<SupportLine> = state.lines_of(side).copied().collect();
    check_placement(&held, &candidate, state.size)?;
    state.support_lines.push(candidate);
    Ok(true)
}

/// Locks in the side's selection. Requires exactly the maximum number of lines.
pub fn confirm_support(state: &mut GameState, side: Side) -> Result<(), RuleError> {
    require_phase(state, Phase::SupportSelection)?;
    if state.support_confirmed[side.index()] {
        return Err(RuleError::SupportConfirmed);
    }
    let held = state.lines_of(side).count();
    if held != MAX_SUPPORT_LINES {
        return Err(RuleError::SupportSelectionIncomplete { held });
    }

    state.support_confirmed[side.index()] = true;
    if state.support_confirmed.iter().all(|&c| c) {
        state.phase = Phase::PlayerTurn;
        tracing::info!("support selection complete, player moves first");
    }
    Ok(())
}
