//! Game state representation.
//!
//! Holds the single authoritative snapshot of a session: live units, support
//! lines, phase, winner, the staged attack and the setup bookkeeping.

use serde::{Deserialize, Serialize};

use super::geometry::{Facing, Pos, BOARD_SIZE};
use super::support::SupportLine;
use super::unit::{Side, Unit, UnitId, UnitKind};

/// The phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Deployment,
    SupportSelection,
    PlayerTurn,
    ComputerTurn,
    GameOver,
}

impl Phase {
    /// The turn phase belonging to a side.
    pub const fn turn_of(side: Side) -> Phase {
        match side {
            Side::Player => Phase::PlayerTurn,
            Side::Computer => Phase::ComputerTurn,
        }
    }

    /// The side allowed to act, during turn phases only.
    pub const fn active_side(self) -> Option<Side> {
        match self {
            Phase::PlayerTurn => Some(Side::Player),
            Phase::ComputerTurn => Some(Side::Computer),
            _ => None,
        }
    }
}

/// Attackers staged against one target, not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAttack {
    pub target: UnitId,
    pub attackers: Vec<UnitId>,
}

impl PendingAttack {
    pub fn contains(&self, unit: UnitId) -> bool {
        self.attackers.contains(&unit)
    }
}

/// Units of each kind a side still has to deploy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    counts: [u8; 3],
}

impl Roster {
    /// Two of each kind.
    pub const fn standard() -> Self {
        Roster { counts: [2, 2, 2] }
    }

    pub const fn empty() -> Self {
        Roster { counts: [0; 3] }
    }

    pub const fn remaining(&self, kind: UnitKind) -> u8 {
        self.counts[kind.index()]
    }

    /// Removes one unit of `kind`. Returns false if none is left.
    pub fn take(&mut self, kind: UnitKind) -> bool {
        let slot = &mut self.counts[kind.index()];
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|&c| usize::from(c)).sum()
    }

    /// Remaining units expanded into a list, in kind order.
    pub fn kinds(&self) -> Vec<UnitKind> {
        UnitKind::ALL
            .iter()
            .flat_map(|&k| std::iter::repeat(k).take(usize::from(self.remaining(k))))
            .collect()
    }
}

/// Complete session state.
///
/// `units` is kept sorted by id so every scan is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub size: i32,
    pub units: Vec<Unit>,
    pub support_lines: Vec<SupportLine>,
    pub phase: Phase,
    pub winner: Option<Side>,
    pub pending: Option<PendingAttack>,
    pub reserves: [Roster; 2],
    pub support_confirmed: [bool; 2],
    pub next_id: UnitId,
    /// Number of completed turns.
    pub turn: u32,
}

impl GameState {
    /// A fresh session in the deployment phase with standard rosters.
    pub fn new(size: i32) -> Self {
        GameState {
            size,
            units: Vec::new(),
            support_lines: Vec::new(),
            phase: Phase::Deployment,
            winner: None,
            pending: None,
            reserves: [Roster::standard(), Roster::standard()],
            support_confirmed: [false, false],
            next_id: 1,
            turn: 0,
        }
    }

    /// An empty board already in the given phase, with nothing left to deploy.
    ///
    /// Used to build positions directly.
    pub fn empty(phase: Phase) -> Self {
        GameState {
            phase,
            reserves: [Roster::empty(), Roster::empty()],
            support_confirmed: [true, true],
            ..GameState::new(BOARD_SIZE)
        }
    }

    pub const fn in_bounds(&self, pos: Pos) -> bool {
        pos.in_bounds(self.size)
    }

    /// The unit standing on a tile, if any.
    pub fn unit_at(&self, pos: Pos) -> Option<&Unit> {
        self.units.iter().find(|u| u.pos == pos)
    }

    pub fn is_occupied(&self, pos: Pos) -> bool {
        self.unit_at(pos).is_some()
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|u| u.id == id)
    }

    /// Live units of one side, in id order.
    pub fn units_of(&self, side: Side) -> impl Iterator<Item = &Unit> + '_ {
        self.units.iter().filter(move |u| u.side == side)
    }

    pub fn live_count(&self, side: Side) -> usize {
        self.units_of(side).count()
    }

    /// Support lines held by one side.
    pub fn lines_of(&self, side: Side) -> impl Iterator<Item = &SupportLine> + '_ {
        self.support_lines.iter().filter(move |l| l.side == side)
    }

    /// Places a unit with a full budget. Returns `None` if the tile is off the
    /// board or occupied.
    ///
    /// This bypasses phase and roster rules; deployment goes through
    /// `resolve::phase::deploy_unit`.
    pub fn place_unit(&mut self, kind: UnitKind, side: Side, pos: Pos, facing: Facing) -> Option<UnitId> {
        if !self.in_bounds(pos) || self.is_occupied(pos) {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.units.push(Unit::new(id, kind, side, pos, facing));
        Some(id)
    }

    /// Removes a unit. Returns the removed unit, if it was alive.
    pub fn remove_unit(&mut self, id: UnitId) -> Option<Unit> {
        let idx = self.units.iter().position(|u| u.id == id)?;
        Some(self.units.remove(idx))
    }
}
