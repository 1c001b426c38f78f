//! Greedy per-unit turn planner.
//!
//! Units are planned one at a time in id order. For each unit every candidate
//! sequence is simulated against the working position and scored; the best
//! one is folded into the working position before the next unit is planned.
//! Candidate scoring runs in parallel, but results are compared in generation
//! order so the earliest candidate wins ties and plans stay reproducible.

use rand::seq::index;
use rand::Rng;
use rayon::prelude::*;

use crate::board::{Action, GameState, Phase, Pos, Rotation, Side, Unit};
use crate::eval::{evaluate, kill_reward};
use crate::movegen::{can_rotate, legal_destinations, legal_targets};
use crate::resolve::combat::removed_units;
use crate::resolve::{apply_action, simulate_action};

use super::Difficulty;

/// Rotations tried before attacking something outside the current cone.
const ROTATION_PREFIXES: [&[Rotation]; 3] = [
    &[Rotation::Left],
    &[Rotation::Right],
    &[Rotation::Right, Rotation::Right],
];

/// Result of planning a turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    /// Actions in application order, terminated by `EndTurn`.
    pub actions: Vec<Action>,
    /// Evaluation of the predicted final position for the planning side.
    pub score: f32,
    /// Number of candidate sequences scored.
    pub nodes: u64,
}

/// Plans a full turn for `side`.
///
/// Returns just `EndTurn` if it is not `side`'s turn.
pub fn plan_turn(state: &GameState, side: Side, difficulty: Difficulty, rng: &mut impl Rng) -> Plan {
    let mut working = state.clone();
    let mut actions = Vec::new();
    let mut nodes = 0u64;

    if working.phase != Phase::turn_of(side) {
        return Plan { actions: vec![Action::EndTurn], score: evaluate(state, side), nodes };
    }

    let ids: Vec<_> = working.units_of(side).map(|u| u.id).collect();
    for id in ids {
        if working.phase == Phase::GameOver {
            break;
        }
        let Some(unit) = working.unit(id).copied() else {
            continue;
        };

        let candidates = candidates_for(&working, &unit, difficulty, rng);
        nodes += candidates.len() as u64;

        let scored: Vec<Option<(f32, GameState)>> = candidates
            .par_iter()
            .map(|seq| score_sequence(&working, side, seq))
            .collect();

        let mut best: Option<(usize, f32, GameState)> = None;
        for (i, entry) in scored.into_iter().enumerate() {
            let Some((score, next)) = entry else {
                continue;
            };
            if best.as_ref().map_or(true, |(_, b, _)| score > *b) {
                best = Some((i, score, next));
            }
        }

        if let Some((i, score, next)) = best {
            tracing::debug!(unit = id, candidate = i, score, actions = ?candidates[i], "unit plan chosen");
            actions.extend_from_slice(&candidates[i]);
            working = next;
        }
    }

    actions.push(Action::EndTurn);
    Plan { actions, score: evaluate(&working, side), nodes }
}

/// Simulates a sequence and scores the result: kill rewards plus evaluation.
///
/// Returns `None` if any action in the sequence is illegal.
fn score_sequence(state: &GameState, side: Side, seq: &[Action]) -> Option<(f32, GameState)> {
    let mut next = state.clone();
    for action in seq {
        apply_action(&mut next, action).ok()?;
    }
    let reward: f32 = removed_units(state, &next, side.opponent())
        .map(|u| kill_reward(u.kind))
        .sum();
    let score = reward + evaluate(&next, side);
    Some((score, next))
}

/// Builds the candidate sequences for one unit, in tie-break order:
/// attacks in place, rotate-then-attack, move-then-attack, move only, stay.
fn candidates_for(state: &GameState, unit: &Unit, difficulty: Difficulty, rng: &mut impl Rng) -> Vec<Vec<Action>> {
    let mut out = Vec::new();
    let in_place = legal_targets(state, unit);

    for &target in &in_place {
        out.push(vec![Action::Attack { unit: unit.id, target }]);
    }

    if can_rotate(unit) {
        for turns in ROTATION_PREFIXES {
            let prefix: Vec<Action> = turns
                .iter()
                .map(|&rotation| Action::Rotate { unit: unit.id, rotation })
                .collect();
            let Some(turned) = simulate_sequence(state, &prefix) else {
                continue;
            };
            let Some(u) = turned.unit(unit.id) else {
                continue;
            };
            for target in legal_targets(&turned, u) {
                if !in_place.contains(&target) {
                    let mut seq = prefix.clone();
                    seq.push(Action::Attack { unit: unit.id, target });
                    out.push(seq);
                }
            }
        }
    }

    let destinations = sample_destinations(legal_destinations(state, unit), difficulty, rng);

    for &dest in &destinations {
        let step = Action::move_to(unit.id, dest);
        let Ok(moved) = simulate_action(state, &step) else {
            continue;
        };
        let Some(u) = moved.unit(unit.id) else {
            continue;
        };
        for target in legal_targets(&moved, u) {
            if !in_place.contains(&target) {
                out.push(vec![step, Action::Attack { unit: unit.id, target }]);
            }
        }
    }

    for &dest in &destinations {
        out.push(vec![Action::move_to(unit.id, dest)]);
    }

    out.push(Vec::new());
    out
}

fn simulate_sequence(state: &GameState, seq: &[Action]) -> Option<GameState> {
    let mut next = state.clone();
    for action in seq {
        apply_action(&mut next, action).ok()?;
    }
    Some(next)
}

/// Keeps a random share of the destinations, preserving their order.
fn sample_destinations(all: Vec<Pos>, difficulty: Difficulty, rng: &mut impl Rng) -> Vec<Pos> {
    let n = all.len();
    let fraction = difficulty.destination_fraction();
    if n == 0 || fraction >= 1.0 {
        return all;
    }
    let k = ((n as f64 * fraction).ceil() as usize).clamp(1, n);
    let mut picked = index::sample(rng, n, k).into_vec();
    picked.sort_unstable();
    picked.into_iter().map(|i| all[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Axis, Facing, SupportLine, UnitKind};
    use crate::resolve::apply_action_list;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded_rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn computer_turn() -> GameState {
        GameState::empty(Phase::ComputerTurn)
    }

    #[test]
    fn plan_ends_with_end_turn_and_uses_own_units() {
        let mut state = computer_turn();
        state.place_unit(UnitKind::Infantry, Side::Computer, Pos::new(3, 1), Facing::South);
        state.place_unit(UnitKind::Cavalry, Side::Computer, Pos::new(5, 2), Facing::South);
        state.place_unit(UnitKind::Archer, Side::Player, Pos::new(4, 7), Facing::North);

        let plan = plan_turn(&state, Side::Computer, Difficulty::Hard, &mut seeded_rng());
        assert_eq!(plan.actions.last(), Some(&Action::EndTurn));
        assert!(plan.nodes > 0);
        for a in &plan.actions[..plan.actions.len() - 1] {
            let owner = a.unit().and_then(|id| state.unit(id)).map(|u| u.side);
            assert_eq!(owner, Some(Side::Computer));
        }
    }

    #[test]
    fn takes_a_free_kill() {
        let mut state = computer_turn();
        let inf = state
            .place_unit(UnitKind::Infantry, Side::Computer, Pos::new(4, 3), Facing::South)
            .unwrap();
        let archer = state
            .place_unit(UnitKind::Archer, Side::Player, Pos::new(4, 4), Facing::North)
            .unwrap();
        state.place_unit(UnitKind::Infantry, Side::Player, Pos::new(1, 7), Facing::North);

        let plan = plan_turn(&state, Side::Computer, Difficulty::Hard, &mut seeded_rng());
        assert_eq!(plan.actions[0], Action::Attack { unit: inf, target: archer });
    }

    #[test]
    fn avoids_a_losing_attack() {
        let mut state = computer_turn();
        state.support_lines.push(SupportLine::new(Side::Player, Axis::Row, 4));
        state.support_lines.push(SupportLine::new(Side::Player, Axis::Column, 4));
        state.place_unit(UnitKind::Infantry, Side::Computer, Pos::new(4, 3), Facing::South);
        state.place_unit(UnitKind::Infantry, Side::Player, Pos::new(4, 4), Facing::North);

        let plan = plan_turn(&state, Side::Computer, Difficulty::Hard, &mut seeded_rng());
        assert!(!plan.actions.iter().any(|a| matches!(a, Action::Attack { .. })));
    }

    #[test]
    fn moves_into_contact_then_attacks() {
        let mut state = computer_turn();
        let cav = state
            .place_unit(UnitKind::Cavalry, Side::Computer, Pos::new(4, 1), Facing::South)
            .unwrap();
        let target = state
            .place_unit(UnitKind::Infantry, Side::Player, Pos::new(4, 3), Facing::North)
            .unwrap();
        state.place_unit(UnitKind::Infantry, Side::Player, Pos::new(1, 7), Facing::North);

        let plan = plan_turn(&state, Side::Computer, Difficulty::Hard, &mut seeded_rng());
        assert!(plan.actions.contains(&Action::Attack { unit: cav, target }));
    }

    #[test]
    fn rotates_to_face_an_enemy_behind() {
        let mut state = computer_turn();
        let inf = state
            .place_unit(UnitKind::Infantry, Side::Computer, Pos::new(4, 4), Facing::South)
            .unwrap();
        let archer = state
            .place_unit(UnitKind::Archer, Side::Player, Pos::new(4, 3), Facing::West)
            .unwrap();
        state.place_unit(UnitKind::Infantry, Side::Player, Pos::new(1, 7), Facing::North);

        let plan = plan_turn(&state, Side::Computer, Difficulty::Hard, &mut seeded_rng());
        assert!(plan.actions.contains(&Action::Attack { unit: inf, target: archer }));
    }

    #[test]
    fn plan_replays_without_rejections() {
        let mut state = computer_turn();
        state.place_unit(UnitKind::Infantry, Side::Computer, Pos::new(3, 2), Facing::South);
        state.place_unit(UnitKind::Archer, Side::Computer, Pos::new(4, 2), Facing::South);
        state.place_unit(UnitKind::Cavalry, Side::Computer, Pos::new(5, 2), Facing::South);
        state.place_unit(UnitKind::Infantry, Side::Player, Pos::new(4, 4), Facing::North);
        state.place_unit(UnitKind::Archer, Side::Player, Pos::new(5, 5), Facing::North);

        for difficulty in Difficulty::ALL {
            let plan = plan_turn(&state, Side::Computer, difficulty, &mut seeded_rng());
            let mut replay = state.clone();
            let report = apply_action_list(&mut replay, &plan.actions);
            assert!(report.rejected.is_empty(), "{:?}: {:?}", difficulty, report.rejected);
            assert_ne!(replay.phase, Phase::ComputerTurn);
        }
    }

    #[test]
    fn same_seed_same_plan() {
        let mut state = computer_turn();
        state.place_unit(UnitKind::Infantry, Side::Computer, Pos::new(3, 2), Facing::South);
        state.place_unit(UnitKind::Cavalry, Side::Computer, Pos::new(5, 2), Facing::South);
        state.place_unit(UnitKind::Infantry, Side::Player, Pos::new(4, 6), Facing::North);

        let a = plan_turn(&state, Side::Computer, Difficulty::Medium, &mut StdRng::seed_from_u64(9));
        let b = plan_turn(&state, Side::Computer, Difficulty::Medium, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn wrong_side_only_ends_turn() {
        let mut state = computer_turn();
        state.place_unit(UnitKind::Infantry, Side::Player, Pos::new(4, 6), Facing::North);
        let plan = plan_turn(&state, Side::Player, Difficulty::Hard, &mut seeded_rng());
        assert_eq!(plan.actions, vec![Action::EndTurn]);
        assert_eq!(plan.nodes, 0);
    }

    #[test]
    fn sampling_keeps_order_and_scales() {
        let all: Vec<Pos> = (1..=5).map(|x| Pos::new(x, 1)).collect();
        let easy = sample_destinations(all.clone(), Difficulty::Easy, &mut seeded_rng());
        assert_eq!(easy.len(), 1);
        let medium = sample_destinations(all.clone(), Difficulty::Medium, &mut seeded_rng());
        assert_eq!(medium.len(), 3);
        assert!(medium.windows(2).all(|w| w[0].x < w[1].x));
        let hard = sample_destinations(all.clone(), Difficulty::Hard, &mut seeded_rng());
        assert_eq!(hard, all);
        assert!(sample_destinations(Vec::new(), Difficulty::Easy, &mut seeded_rng()).is_empty());
    }

    #[test]
    fn equal_kills_go_to_the_first_target_generated() {
        let mut state = computer_turn();
        state.support_lines.push(SupportLine::new(Side::Computer, Axis::Row, 2));
        let archer = state
            .place_unit(UnitKind::Archer, Side::Computer, Pos::new(4, 2), Facing::South)
            .unwrap();
        let right = state
            .place_unit(UnitKind::Archer, Side::Player, Pos::new(5, 3), Facing::North)
            .unwrap();
        let left = state
            .place_unit(UnitKind::Archer, Side::Player, Pos::new(3, 3), Facing::North)
            .unwrap();
        state.place_unit(UnitKind::Infantry, Side::Player, Pos::new(4, 7), Facing::North);

        let unit = *state.unit(archer).unwrap();
        assert_eq!(legal_targets(&state, &unit), vec![right, left]);
        let plan = plan_turn(&state, Side::Computer, Difficulty::Hard, &mut seeded_rng());
        assert_eq!(plan.actions, vec![Action::Attack { unit: archer, target: right }, Action::EndTurn]);
    }

    #[test]
    fn equal_moves_beat_standing_still() {
        let mut state = computer_turn();
        let inf = state
            .place_unit(UnitKind::Infantry, Side::Computer, Pos::new(4, 4), Facing::South)
            .unwrap();
        state.place_unit(UnitKind::Infantry, Side::Player, Pos::new(1, 7), Facing::North);

        let unit = *state.unit(inf).unwrap();
        let candidates = candidates_for(&state, &unit, Difficulty::Hard, &mut seeded_rng());
        assert_eq!(candidates.last(), Some(&Vec::new()));
        let scores: Vec<f32> = candidates
            .iter()
            .filter_map(|seq| score_sequence(&state, Side::Computer, seq).map(|(score, _)| score))
            .collect();
        assert!(scores.windows(2).all(|w| w[0] == w[1]), "{:?}", scores);

        let first = legal_destinations(&state, &unit)[0];
        let plan = plan_turn(&state, Side::Computer, Difficulty::Hard, &mut seeded_rng());
        assert_eq!(plan.actions, vec![Action::move_to(inf, first), Action::EndTurn]);
    }
}
