//! Legality rules and legal-action generation.
//!
//! Answers "may this unit do that right now" for movement, rotation, attacks
//! and support-line placement, and enumerates or samples legal choices.

pub mod attack;
pub mod movement;
pub mod support;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::{Action, Axis, GameState, Pos, Rotation, Side, SupportLine, Unit, UnitKind};
use crate::resolve::phase::deployment_zone;

pub use attack::{can_attack, check_attack, is_engaged, legal_targets};
pub use movement::{can_rotate, check_move, is_valid_move, legal_destinations};
pub use support::{check_placement, is_valid_placement, support_bonus};

/// Every single action the unit could legally take right now.
///
/// Does not consider the pending-attack commitment; callers apply actions
/// through `resolve::apply`, which does.
pub fn legal_unit_actions(state: &GameState, unit: &Unit) -> Vec<Action> {
    let mut actions: Vec<Action> = legal_destinations(state, unit)
        .into_iter()
        .map(|p| Action::move_to(unit.id, p))
        .collect();

    if can_rotate(unit) {
        for rotation in [Rotation::Left, Rotation::Right] {
            actions.push(Action::Rotate { unit: unit.id, rotation });
        }
    }

    for target in legal_targets(state, unit) {
        actions.push(Action::Attack { unit: unit.id, target });
    }

    actions
}

/// Picks up to one random legal action per unit of `side`, then ends the turn.
///
/// Each action is chosen against the position left by the previous one.
pub fn random_actions(side: Side, state: &GameState, rng: &mut impl Rng) -> Vec<Action> {
    let mut working = state.clone();
    let mut out = Vec::new();
    let ids: Vec<_> = working.units_of(side).map(|u| u.id).collect();

    for id in ids {
        let Some(unit) = working.unit(id) else {
            continue;
        };
        let legal = legal_unit_actions(&working, unit);
        let Some(&action) = legal.choose(rng) else {
            continue;
        };
        if let Ok(next) = crate::resolve::simulate_action(&working, &action) {
            working = next;
            out.push(action);
        }
    }

    out.push(Action::EndTurn);
    out
}

/// Shuffles a side's remaining roster onto free tiles of its deployment zone.
pub fn random_deployment(side: Side, state: &GameState, rng: &mut impl Rng) -> Vec<(UnitKind, Pos)> {
    let mut free: Vec<Pos> = deployment_zone(side, state.size)
        .into_iter()
        .filter(|&p| !state.is_occupied(p))
        .collect();
    free.shuffle(rng);

    let mut kinds = state.reserves[side.index()].kinds();
    kinds.shuffle(rng);

    kinds.into_iter().zip(free).collect()
}

/// Picks distinct support lines at random until the side holds the maximum.
pub fn random_support_lines(side: Side, state: &GameState, rng: &mut impl Rng) -> Vec<SupportLine> {
    let mut held: Vec<SupportLine> = state.lines_of(side).copied().collect();
    let mut chosen = Vec::new();

    let mut pool: Vec<SupportLine> = [Axis::Row, Axis::Column]
        .iter()
        .flat_map(|&axis| (1..=state.size).map(move |i| SupportLine::new(side, axis, i)))
        .collect();
    pool.shuffle(rng);

    for line in pool {
        if is_valid_placement(&held, &line, state.size) {
            held.push(line);
            chosen.push(line);
        }
    }

    chosen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Facing, Phase, BOARD_SIZE, MAX_SUPPORT_LINES};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded_rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn legal_unit_actions_cover_moves_rotations_and_attacks() {
        let mut state = GameState::empty(Phase::PlayerTurn);
        let id = state
            .place_unit(UnitKind::Infantry, Side::Player, Pos::new(4, 4), Facing::North)
            .unwrap();
        let enemy = state
            .place_unit(UnitKind::Infantry, Side::Computer, Pos::new(4, 3), Facing::South)
            .unwrap();
        let unit = *state.unit(id).unwrap();
        let actions = legal_unit_actions(&state, &unit);
        // Three free neighbours, two rotations, one attack.
        assert_eq!(actions.len(), 6);
        assert!(actions.contains(&Action::Attack { unit: id, target: enemy }));
        assert!(!actions.contains(&Action::move_to(id, Pos::new(4, 3))));
    }

    #[test]
    fn random_actions_end_with_end_turn() {
        let mut state = GameState::empty(Phase::PlayerTurn);
        state.place_unit(UnitKind::Infantry, Side::Player, Pos::new(2, 6), Facing::North);
        state.place_unit(UnitKind::Cavalry, Side::Player, Pos::new(5, 6), Facing::North);
        state.place_unit(UnitKind::Archer, Side::Computer, Pos::new(4, 1), Facing::South);

        let actions = random_actions(Side::Player, &state, &mut seeded_rng());
        assert_eq!(actions.last(), Some(&Action::EndTurn));
        assert_eq!(actions.len(), 3);
        for a in &actions[..2] {
            let unit = a.unit().and_then(|id| state.unit(id)).unwrap();
            assert_eq!(unit.side, Side::Player);
        }
    }

    #[test]
    fn random_actions_deterministic_with_same_seed() {
        let mut state = GameState::empty(Phase::PlayerTurn);
        state.place_unit(UnitKind::Infantry, Side::Player, Pos::new(2, 6), Facing::North);
        state.place_unit(UnitKind::Cavalry, Side::Player, Pos::new(5, 6), Facing::North);
        let a = random_actions(Side::Player, &state, &mut StdRng::seed_from_u64(7));
        let b = random_actions(Side::Player, &state, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn random_deployment_fills_zone() {
        let state = GameState::new(BOARD_SIZE);
        let placements = random_deployment(Side::Computer, &state, &mut seeded_rng());
        assert_eq!(placements.len(), 6);
        let zone = deployment_zone(Side::Computer, BOARD_SIZE);
        for (_, p) in &placements {
            assert!(zone.contains(p));
        }
        let mut tiles: Vec<Pos> = placements.iter().map(|(_, p)| *p).collect();
        tiles.sort();
        tiles.dedup();
        assert_eq!(tiles.len(), 6);
    }

    #[test]
    fn random_support_lines_respect_quota() {
        let state = GameState::new(BOARD_SIZE);
        let lines = random_support_lines(Side::Player, &state, &mut seeded_rng());
        assert_eq!(lines.len(), MAX_SUPPORT_LINES);
        for (i, a) in lines.iter().enumerate() {
            for b in &lines[i + 1..] {
                assert!(!a.same_line(b));
            }
        }
    }
}
