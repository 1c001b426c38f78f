//! Unit kinds, sides and per-turn budgets.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::geometry::{Facing, Pos};

/// Stable identifier of a unit for the whole session.
pub type UnitId = u32;

/// One of the two seats at the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Player,
    Computer,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Player, Side::Computer];

    pub const fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Computer,
            Side::Computer => Side::Player,
        }
    }

    /// Index into per-side arrays.
    pub const fn index(self) -> usize {
        match self {
            Side::Player => 0,
            Side::Computer => 1,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Side::Player => "player",
            Side::Computer => "computer",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The kind of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Infantry,
    Archer,
    Cavalry,
}

impl UnitKind {
    pub const ALL: [UnitKind; 3] = [UnitKind::Infantry, UnitKind::Archer, UnitKind::Cavalry];

    /// Move points granted at the start of each own turn.
    pub const fn max_moves(self) -> u8 {
        match self {
            UnitKind::Cavalry => 2,
            UnitKind::Infantry | UnitKind::Archer => 1,
        }
    }

    /// Archers fight at range; everything else is melee.
    pub const fn is_ranged(self) -> bool {
        matches!(self, UnitKind::Archer)
    }

    pub const fn index(self) -> usize {
        match self {
            UnitKind::Infantry => 0,
            UnitKind::Archer => 1,
            UnitKind::Cavalry => 2,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            UnitKind::Infantry => "infantry",
            UnitKind::Archer => "archer",
            UnitKind::Cavalry => "cavalry",
        }
    }

    /// Parses a kind from its name or first letter (case-insensitive).
    pub fn from_name(s: &str) -> Option<UnitKind> {
        match s.to_ascii_lowercase().as_str() {
            "infantry" | "i" => Some(UnitKind::Infantry),
            "archer" | "a" => Some(UnitKind::Archer),
            "cavalry" | "c" => Some(UnitKind::Cavalry),
            _ => None,
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A live unit on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub kind: UnitKind,
    pub side: Side,
    pub pos: Pos,
    pub facing: Facing,
    pub moves_left: u8,
    pub attacks_left: u8,
    pub max_moves: u8,
}

impl Unit {
    /// Creates a unit with a full budget.
    pub const fn new(id: UnitId, kind: UnitKind, side: Side, pos: Pos, facing: Facing) -> Self {
        Unit {
            id,
            kind,
            side,
            pos,
            facing,
            moves_left: kind.max_moves(),
            attacks_left: 1,
            max_moves: kind.max_moves(),
        }
    }

    /// Restores the full per-turn budget.
    pub fn refresh(&mut self) {
        self.moves_left = self.max_moves;
        self.attacks_left = 1;
    }
}
