//! Movement and rotation legality.
//!
//! A unit steps one tile orthogonally per move point. Cavalry may also charge
//! two tiles straight ahead along its facing when it has both points left and
//! the tile in between is empty.

use crate::board::{GameState, Pos, Unit, UnitKind};
use crate::error::RuleError;

/// Checks a move and returns its cost in move points.
pub fn check_move(state: &GameState, unit: &Unit, to: Pos) -> Result<u8, RuleError> {
    if !state.in_bounds(to) {
        return Err(RuleError::OutOfBounds { x: to.x, y: to.y });
    }
    if state.is_occupied(to) {
        return Err(RuleError::Occupied { x: to.x, y: to.y });
    }

    match unit.pos.manhattan(to) {
        1 => {
            if unit.moves_left < 1 {
                return Err(RuleError::InsufficientMoves(unit.id));
            }
            Ok(1)
        }
        2 if unit.kind == UnitKind::Cavalry => {
            let (fx, fy) = unit.facing.vector();
            if to != unit.pos.offset(2 * fx, 2 * fy) {
                return Err(RuleError::Unreachable);
            }
            if unit.moves_left < 2 {
                return Err(RuleError::InsufficientMoves(unit.id));
            }
            if state.is_occupied(unit.pos.offset(fx, fy)) {
                return Err(RuleError::ChargeBlocked);
            }
            Ok(2)
        }
        _ => Err(RuleError::Unreachable),
    }
}

/// Returns true if `unit` may move to `to` right now.
pub fn is_valid_move(state: &GameState, unit: &Unit, to: Pos) -> bool {
    check_move(state, unit, to).is_ok()
}

/// A unit may only turn while it still has movement left.
pub const fn can_rotate(unit: &Unit) -> bool {
    unit.moves_left > 0
}

/// All tiles the unit can reach with a single move.
///
/// Ordered north, east, south, west, then the charge tile.
pub fn legal_destinations(state: &GameState, unit: &Unit) -> Vec<Pos> {
    let mut out: Vec<Pos> = crate::board::Facing::ALL
        .iter()
        .map(|f| {
            let (dx, dy) = f.vector();
            unit.pos.offset(dx, dy)
        })
        .filter(|&p| is_valid_move(state, unit, p))
        .collect();

    if unit.kind == UnitKind::Cavalry {
        let (fx, fy) = unit.facing.vector();
        let charge = unit.pos.offset(2 * fx, 2 * fy);
        if is_valid_move(state, unit, charge) {
            out.push(charge);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Facing, Phase, Side};

    fn board_with(kind: UnitKind, pos: Pos, facing: Facing) -> (GameState, Unit) {
        let mut state = GameState::empty(Phase::PlayerTurn);
        let id = state.place_unit(kind, Side::Player, pos, facing).unwrap();
        let unit = *state.unit(id).unwrap();
        (state, unit)
    }

    #[test]
    fn single_steps_in_four_directions() {
        let (state, unit) = board_with(UnitKind::Infantry, Pos::new(4, 4), Facing::North);
        let dests = legal_destinations(&state, &unit);
        assert_eq!(
            dests,
            vec![Pos::new(4, 3), Pos::new(5, 4), Pos::new(4, 5), Pos::new(3, 4)]
        );
    }

    #[test]
    fn diagonal_and_long_moves_rejected() {
        let (state, unit) = board_with(UnitKind::Infantry, Pos::new(4, 4), Facing::North);
        assert_eq!(check_move(&state, &unit, Pos::new(5, 5)), Err(RuleError::Unreachable));
        assert_eq!(check_move(&state, &unit, Pos::new(4, 2)), Err(RuleError::Unreachable));
        assert_eq!(check_move(&state, &unit, Pos::new(4, 4)), Err(RuleError::Occupied { x: 4, y: 4 }));
    }

    #[test]
    fn off_board_rejected() {
        let (state, unit) = board_with(UnitKind::Infantry, Pos::new(1, 1), Facing::North);
        assert_eq!(check_move(&state, &unit, Pos::new(1, 0)), Err(RuleError::OutOfBounds { x: 1, y: 0 }));
        assert_eq!(legal_destinations(&state, &unit), vec![Pos::new(2, 1), Pos::new(1, 2)]);
    }

    #[test]
    fn cavalry_charge_along_facing() {
        let (state, unit) = board_with(UnitKind::Cavalry, Pos::new(4, 6), Facing::North);
        assert_eq!(check_move(&state, &unit, Pos::new(4, 4)), Ok(2));
        // Not along the facing.
        assert_eq!(check_move(&state, &unit, Pos::new(6, 6)), Err(RuleError::Unreachable));
        assert_eq!(check_move(&state, &unit, Pos::new(5, 5)), Err(RuleError::Unreachable));
        assert!(legal_destinations(&state, &unit).contains(&Pos::new(4, 4)));
    }

    #[test]
    fn charge_needs_two_points_and_clear_path() {
        let (mut state, mut unit) = board_with(UnitKind::Cavalry, Pos::new(4, 6), Facing::North);
        unit.moves_left = 1;
        assert_eq!(
            check_move(&state, &unit, Pos::new(4, 4)),
            Err(RuleError::InsufficientMoves(unit.id))
        );

        unit.moves_left = 2;
        state.place_unit(UnitKind::Infantry, Side::Computer, Pos::new(4, 5), Facing::South);
        assert_eq!(check_move(&state, &unit, Pos::new(4, 4)), Err(RuleError::ChargeBlocked));
    }

    #[test]
    fn non_cavalry_cannot_charge() {
        let (state, unit) = board_with(UnitKind::Archer, Pos::new(4, 6), Facing::North);
        assert_eq!(check_move(&state, &unit, Pos::new(4, 4)), Err(RuleError::Unreachable));
    }

    #[test]
    fn exhausted_unit_cannot_move_or_rotate() {
        let (state, mut unit) = board_with(UnitKind::Infantry, Pos::new(4, 4), Facing::North);
        assert!(can_rotate(&unit));
        unit.moves_left = 0;
        assert!(!can_rotate(&unit));
        assert!(!is_valid_move(&state, &unit, Pos::new(4, 3)));
        assert!(legal_destinations(&state, &unit).is_empty());
    }
}
