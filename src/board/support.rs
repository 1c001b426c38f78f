//! Support lines.
//!
//! A support line is a row or column secretly chosen by one side during
//! setup. Every own unit standing on it fights one point stronger.

use serde::{Deserialize, Serialize};

use super::geometry::Pos;
use super::unit::Side;

/// Maximum number of support lines a side may hold.
pub const MAX_SUPPORT_LINES: usize = 3;

/// Orientation of a support line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Row,
    Column,
}

impl Axis {
    pub const fn name(self) -> &'static str {
        match self {
            Axis::Row => "row",
            Axis::Column => "col",
        }
    }

    /// Parses `row`/`col`/`column` (case-insensitive).
    pub fn from_name(s: &str) -> Option<Axis> {
        match s.to_ascii_lowercase().as_str() {
            "row" | "r" => Some(Axis::Row),
            "col" | "column" | "c" => Some(Axis::Column),
            _ => None,
        }
    }
}

/// A row or column owned by one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SupportLine {
    pub side: Side,
    pub axis: Axis,
    pub index: i32,
}

impl SupportLine {
    pub const fn new(side: Side, axis: Axis, index: i32) -> Self {
        SupportLine { side, axis, index }
    }

    /// Returns true if the tile lies on this line.
    pub const fn covers(&self, pos: Pos) -> bool {
        match self.axis {
            Axis::Row => pos.y == self.index,
            Axis::Column => pos.x == self.index,
        }
    }

    /// Same axis and index, regardless of owner.
    pub fn same_line(&self, other: &SupportLine) -> bool {
        self.axis == other.axis && self.index == other.index
    }
}
