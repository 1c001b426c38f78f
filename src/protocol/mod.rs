//! Driver and move-source protocol handling.
//!
//! This module implements the text driver's command parser, the compact
//! action notation, per-viewer JSON snapshots, and the contract for external
//! move sources that may replace the local planner.

pub mod external;
pub mod notation;
pub mod parser;
pub mod snapshot;

pub use external::{
    parse_action_list, parse_entry, ActionListError, EntryError, MoveSource, MoveSourceError,
    ParsedList, ProcessSource, ScriptedSource,
};
pub use notation::{format_action, format_actions, parse_action, parse_actions, NotationError};
pub use parser::{parse_command, Command};
pub use snapshot::{LineView, Snapshot, UnitView};
