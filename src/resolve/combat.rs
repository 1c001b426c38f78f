//! Combat resolution.
//!
//! Every unit has base strength 1 plus one per own support line through its
//! tile. Attackers add a flank bonus when they do not strike from the
//! defender's front tile (archers never do), and cavalry adds a charge bonus
//! while it still has movement left. Totals decide who is removed.

use serde::Serialize;

use crate::board::{GameState, Side, Unit, UnitId, UnitKind};
use crate::movegen::support_bonus;

/// Strength every unit starts from.
pub const BASE_STRENGTH: i32 = 1;

/// How a combat ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatResult {
    /// Defender removed.
    AttackerWins,
    /// Defender held against a group with melee; the whole group is removed.
    Repulsed,
    /// Defender held against an all-archer volley; nobody is removed.
    Missed,
    /// Equal totals; nobody is removed.
    Stalemate,
}

impl CombatResult {
    pub const fn name(self) -> &'static str {
        match self {
            CombatResult::AttackerWins => "attacker_wins",
            CombatResult::Repulsed => "repulsed",
            CombatResult::Missed => "missed",
            CombatResult::Stalemate => "stalemate",
        }
    }
}

/// The computed outcome of one combat, before it is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombatOutcome {
    pub defender: UnitId,
    pub attackers: Vec<UnitId>,
    pub attack_total: i32,
    pub defense_total: i32,
    pub result: CombatResult,
    pub removed: Vec<UnitId>,
}

/// Base strength plus support lines of the unit's own side.
pub fn base_strength(state: &GameState, unit: &Unit) -> i32 {
    BASE_STRENGTH + support_bonus(state, unit.side, unit.pos)
}

/// +1 unless the attacker stands exactly on the defender's front tile.
pub fn flank_bonus(attacker: &Unit, defender: &Unit) -> i32 {
    if attacker.kind.is_ranged() {
        return 0;
    }
    if defender.pos.delta_to(attacker.pos) == defender.facing.vector() {
        0
    } else {
        1
    }
}

/// +1 for cavalry that still has movement to commit.
pub const fn charge_bonus(attacker: &Unit) -> i32 {
    if matches!(attacker.kind, UnitKind::Cavalry) && attacker.moves_left > 0 {
        1
    } else {
        0
    }
}

/// Total contribution of one attacker against one defender.
pub fn attack_strength(state: &GameState, attacker: &Unit, defender: &Unit) -> i32 {
    base_strength(state, attacker) + flank_bonus(attacker, defender) + charge_bonus(attacker)
}

/// Computes the outcome of `attackers` striking `defender`.
///
/// Pure: legality is the caller's concern and nothing is mutated.
pub fn resolve_combat(state: &GameState, attackers: &[&Unit], defender: &Unit) -> CombatOutcome {
    let attacker_ids: Vec<UnitId> = attackers.iter().map(|a| a.id).collect();
    let has_melee = attackers.iter().any(|a| !a.kind.is_ranged());

    // Archers never withstand melee contact.
    if defender.kind == UnitKind::Archer && has_melee {
        let attack_total = attackers.iter().map(|a| attack_strength(state, a, defender)).sum();
        return CombatOutcome {
            defender: defender.id,
            attackers: attacker_ids,
            attack_total,
            defense_total: 0,
            result: CombatResult::AttackerWins,
            removed: vec![defender.id],
        };
    }

    let attack_total: i32 = attackers.iter().map(|a| attack_strength(state, a, defender)).sum();
    let defense_total = base_strength(state, defender);

    let (result, removed) = if attack_total > defense_total {
        (CombatResult::AttackerWins, vec![defender.id])
    } else if defense_total > attack_total {
        if has_melee {
            (CombatResult::Repulsed, attacker_ids.clone())
        } else {
            (CombatResult::Missed, Vec::new())
        }
    } else {
        (CombatResult::Stalemate, Vec::new())
    };

    CombatOutcome {
        defender: defender.id,
        attackers: attacker_ids,
        attack_total,
        defense_total,
        result,
        removed,
    }
}

/// Applies a computed outcome: spends every attacker's attack, removes the
/// losers and ends the game if a side was wiped out.
pub fn apply_combat(state: &mut GameState, outcome: &CombatOutcome) {
    for &id in &outcome.attackers {
        if let Some(u) = state.unit_mut(id) {
            u.attacks_left = 0;
        }
    }
    for &id in &outcome.removed {
        state.remove_unit(id);
    }
    if let Some(p) = state.pending.as_mut() {
        p.attackers.retain(|id| !outcome.removed.contains(id));
        if outcome.removed.contains(&p.target) || p.attackers.is_empty() {
            state.pending = None;
        }
    }
    if !outcome.removed.is_empty() {
        let acting = state.phase.active_side();
        super::turn::check_game_over(state, acting);
    }
    tracing::debug!(
        defender = outcome.defender,
        attack = outcome.attack_total,
        defense = outcome.defense_total,
        result = outcome.result.name(),
        removed = ?outcome.removed,
        "combat resolved"
    );
}

/// Live enemies of `side` removed between two states.
pub fn removed_units<'a>(before: &'a GameState, after: &'a GameState, side: Side) -> impl Iterator<Item = &'a Unit> + 'a {
    before
        .units_of(side)
        .filter(move |u| after.unit(u.id).is_none())
}
