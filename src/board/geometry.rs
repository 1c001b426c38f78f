//! Grid geometry.
//!
//! Tiles are addressed with 1-based `(x, y)` coordinates, `x` growing east and
//! `y` growing south. Facings map to unit displacement vectors.

use serde::{Deserialize, Serialize};

/// Side length of the standard square board.
pub const BOARD_SIZE: i32 = 7;

/// A tile on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Pos { x, y }
    }

    /// Returns this tile shifted by `(dx, dy)`.
    pub const fn offset(self, dx: i32, dy: i32) -> Pos {
        Pos { x: self.x + dx, y: self.y + dy }
    }

    /// Displacement from `self` to `other`.
    pub const fn delta_to(self, other: Pos) -> (i32, i32) {
        (other.x - self.x, other.y - self.y)
    }

    pub const fn manhattan(self, other: Pos) -> i32 {
        (other.x - self.x).abs() + (other.y - self.y).abs()
    }

    /// Returns true if the tile lies within `[1, size] x [1, size]`.
    pub const fn in_bounds(self, size: i32) -> bool {
        self.x >= 1 && self.x <= size && self.y >= 1 && self.y <= size
    }
}

/// One of the four compass directions a unit can face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    North,
    East,
    South,
    West,
}

impl Facing {
    pub const ALL: [Facing; 4] = [Facing::North, Facing::East, Facing::South, Facing::West];

    /// Unit displacement vector for this facing.
    pub const fn vector(self) -> (i32, i32) {
        match self {
            Facing::North => (0, -1),
            Facing::East => (1, 0),
            Facing::South => (0, 1),
            Facing::West => (-1, 0),
        }
    }

    /// Facing after a quarter turn.
    pub const fn rotated(self, rotation: Rotation) -> Facing {
        match (self, rotation) {
            (Facing::North, Rotation::Right) | (Facing::South, Rotation::Left) => Facing::East,
            (Facing::East, Rotation::Right) | (Facing::West, Rotation::Left) => Facing::South,
            (Facing::South, Rotation::Right) | (Facing::North, Rotation::Left) => Facing::West,
            (Facing::West, Rotation::Right) | (Facing::East, Rotation::Left) => Facing::North,
        }
    }

    /// Facing that matches a displacement of travel.
    ///
    /// Checked in a fixed order: north, east, south, west.
    pub const fn toward(dx: i32, dy: i32) -> Facing {
        if dy < 0 {
            Facing::North
        } else if dx > 0 {
            Facing::East
        } else if dy > 0 {
            Facing::South
        } else {
            Facing::West
        }
    }
}

/// A quarter turn in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    Left,
    Right,
}

impl Rotation {
    /// Returns the single-character notation.
    pub const fn notation_char(self) -> char {
        match self {
            Rotation::Left => 'l',
            Rotation::Right => 'r',
        }
    }

    /// Parses a rotation from its notation character.
    pub fn from_notation_char(c: char) -> Option<Rotation> {
        match c {
            'l' => Some(Rotation::Left),
            'r' => Some(Rotation::Right),
            _ => None,
        }
    }

    /// Parses `left`/`right` (case-insensitive) or the short form.
    pub fn from_name(s: &str) -> Option<Rotation> {
        match s.to_ascii_lowercase().as_str() {
            "left" | "l" => Some(Rotation::Left),
            "right" | "r" => Some(Rotation::Right),
            _ => None,
        }
    }
}
