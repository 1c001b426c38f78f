//! Turn actions.
//!
//! The planner and any external move source produce an ordered list of these,
//! terminated by `EndTurn`. Every action is re-validated before it is applied.

use serde::{Deserialize, Serialize};

use super::geometry::{Pos, Rotation};
use super::unit::UnitId;

/// A single step of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Move a unit one tile, or two along its facing for a cavalry charge.
    Move { unit: UnitId, x: i32, y: i32 },

    /// Quarter-turn a unit in place.
    Rotate { unit: UnitId, rotation: Rotation },

    /// Attack a target with a single unit and resolve immediately.
    Attack { unit: UnitId, target: UnitId },

    /// Hand the turn to the opponent.
    EndTurn,
}

impl Action {
    pub const fn move_to(unit: UnitId, pos: Pos) -> Action {
        Action::Move { unit, x: pos.x, y: pos.y }
    }

    /// The acting unit, if any.
    pub const fn unit(&self) -> Option<UnitId> {
        match self {
            Action::Move { unit, .. } | Action::Rotate { unit, .. } | Action::Attack { unit, .. } => {
                Some(*unit)
            }
            Action::EndTurn => None,
        }
    }
}
