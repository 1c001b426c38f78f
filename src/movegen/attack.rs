//! Attack legality.
//!
//! Every attack must land in the attacker's forward cone: the dot product of
//! the displacement to the target with the attacker's facing vector must be
//! strictly positive. Melee units strike adjacent tiles only. Archers shoot
//! diagonally adjacent tiles, or two tiles straight ahead over an empty tile,
//! but never while an enemy stands next to them.

use crate::board::{GameState, Unit, UnitId};
use crate::error::RuleError;

/// Returns true if any enemy stands orthogonally adjacent to the unit.
pub fn is_engaged(state: &GameState, unit: &Unit) -> bool {
    state
        .units
        .iter()
        .any(|u| u.side != unit.side && u.pos.manhattan(unit.pos) == 1)
}

/// Checks whether `attacker` may attack `defender` right now.
pub fn check_attack(state: &GameState, attacker: &Unit, defender: &Unit) -> Result<(), RuleError> {
    if attacker.attacks_left == 0 {
        return Err(RuleError::NoAttacksLeft(attacker.id));
    }
    if attacker.side == defender.side {
        return Err(RuleError::FriendlyTarget);
    }

    let (dx, dy) = attacker.pos.delta_to(defender.pos);
    let (fx, fy) = attacker.facing.vector();
    if dx * fx + dy * fy <= 0 {
        return Err(RuleError::OutsideFacingCone);
    }

    if !attacker.kind.is_ranged() {
        return if dx.abs() + dy.abs() == 1 {
            Ok(())
        } else {
            Err(RuleError::OutOfRange)
        };
    }

    if is_engaged(state, attacker) {
        return Err(RuleError::EngagedArcher(attacker.id));
    }
    match (dx.abs(), dy.abs()) {
        (1, 1) => Ok(()),
        (2, 0) | (0, 2) => {
            let mid = attacker.pos.offset(dx / 2, dy / 2);
            if state.is_occupied(mid) {
                Err(RuleError::ShotBlocked)
            } else {
                Ok(())
            }
        }
        _ => Err(RuleError::OutOfRange),
    }
}

pub fn can_attack(state: &GameState, attacker: &Unit, defender: &Unit) -> bool {
    check_attack(state, attacker, defender).is_ok()
}

/// Enemy units the attacker can hit right now, in id order.
pub fn legal_targets(state: &GameState, attacker: &Unit) -> Vec<UnitId> {
    state
        .units
        .iter()
        .filter(|d| can_attack(state, attacker, d))
        .map(|d| d.id)
        .collect()
}
