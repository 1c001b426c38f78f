//! Board representation and game-state types.
//!
//! Contains the core data structures for tiles, units, support lines,
//! actions, and the overall session state.

pub mod action;
pub mod geometry;
pub mod state;
pub mod support;
pub mod unit;

pub use action::Action;
pub use geometry::{Facing, Pos, Rotation, BOARD_SIZE};
pub use state::{GameState, PendingAttack, Phase, Roster};
pub use support::{Axis, SupportLine, MAX_SUPPORT_LINES};
pub use unit::{Side, Unit, UnitId, UnitKind};
