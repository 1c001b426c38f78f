//! Per-viewer state snapshots.
//!
//! A snapshot carries everything a renderer or an external move source needs
//! about the public position, plus the viewer's own support lines. The
//! opponent's support lines are never included.

use serde::{Deserialize, Serialize};

use crate::board::{Axis, Facing, GameState, PendingAttack, Phase, Side, Unit, UnitId, UnitKind};

/// A live unit with its position flattened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitView {
    pub id: UnitId,
    pub kind: UnitKind,
    pub side: Side,
    pub x: i32,
    pub y: i32,
    pub facing: Facing,
    pub moves_left: u8,
    pub attacks_left: u8,
    pub max_moves: u8,
}

impl From<&Unit> for UnitView {
    fn from(u: &Unit) -> Self {
        UnitView {
            id: u.id,
            kind: u.kind,
            side: u.side,
            x: u.pos.x,
            y: u.pos.y,
            facing: u.facing,
            moves_left: u.moves_left,
            attacks_left: u.attacks_left,
            max_moves: u.max_moves,
        }
    }
}

/// One of the viewer's support lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineView {
    pub axis: Axis,
    pub index: i32,
}

/// The position as seen by one side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub size: i32,
    pub phase: Phase,
    pub turn: u32,
    pub viewer: Side,
    pub winner: Option<Side>,
    pub units: Vec<UnitView>,
    pub support_lines: Vec<LineView>,
    pub pending: Option<PendingAttack>,
}

impl Snapshot {
    pub fn for_viewer(state: &GameState, viewer: Side) -> Self {
        Snapshot {
            size: state.size,
            phase: state.phase,
            turn: state.turn,
            viewer,
            winner: state.winner,
            units: state.units.iter().map(UnitView::from).collect(),
            support_lines: state
                .lines_of(viewer)
                .map(|l| LineView { axis: l.axis, index: l.index })
                .collect(),
            pending: state.pending.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
