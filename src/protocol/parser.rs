//! Text driver command parser.
//!
//! Parses incoming lines from raw text into structured `Command` variants
//! that the driver main loop can dispatch on.

use crate::board::{Axis, Rotation, UnitId, UnitKind};

/// A parsed driver command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start a fresh session.
    NewGame,

    /// Synchronization ping; the driver must reply `readyok`.
    IsReady,

    /// Print the player's snapshot as JSON.
    Show,

    /// Set an engine option: `setoption name <id> [value <x>]`.
    SetOption { name: String, value: Option<String> },

    /// Deploy a unit from the player's roster.
    Place { kind: UnitKind, x: i32, y: i32 },

    /// Toggle one of the player's support lines.
    Support { axis: Axis, index: i32 },

    /// Lock in the player's support lines.
    Confirm,

    /// Select a unit and list what it can do.
    Select { unit: UnitId },

    Move { unit: UnitId, x: i32, y: i32 },

    Rotate { unit: UnitId, rotation: Rotation },

    /// Begin a pending attack.
    Attack { unit: UnitId, target: UnitId },

    /// Commit another attacker to the pending attack.
    Join { unit: UnitId },

    /// Withdraw an attacker from the pending attack.
    Leave { unit: UnitId },

    /// Resolve the pending attack.
    Resolve,

    /// Discard the pending attack.
    Cancel,

    /// End the player's turn; the computer replies with its own.
    EndTurn,

    /// Terminate the driver.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines, unrecognized commands and malformed
/// arguments. Anything other than an empty line is logged.
pub fn parse_command(line: &str) -> Option<Command> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (&head, args) = tokens.split_first()?;

    let cmd = match head {
        "newgame" => no_args(head, args, Command::NewGame),
        "isready" => no_args(head, args, Command::IsReady),
        "show" => no_args(head, args, Command::Show),
        "confirm" => no_args(head, args, Command::Confirm),
        "resolve" => no_args(head, args, Command::Resolve),
        "cancel" => no_args(head, args, Command::Cancel),
        "endturn" => no_args(head, args, Command::EndTurn),
        "quit" => Some(Command::Quit),

        "setoption" => parse_setoption(args),
        "place" => parse_place(args),
        "support" => parse_support(args),
        "select" => single_id(args).map(|unit| Command::Select { unit }),
        "move" => parse_move(args),
        "rotate" => parse_rotate(args),
        "attack" => parse_attack(args),
        "join" => single_id(args).map(|unit| Command::Join { unit }),
        "leave" => single_id(args).map(|unit| Command::Leave { unit }),

        other => {
            tracing::warn!(command = other, "unknown command");
            return None;
        }
    };

    if cmd.is_none() {
        tracing::warn!(line = line.trim(), "malformed command");
    }
    cmd
}

fn no_args(head: &str, args: &[&str], cmd: Command) -> Option<Command> {
    if args.is_empty() {
        Some(cmd)
    } else {
        tracing::warn!(command = head, "unexpected arguments");
        None
    }
}

fn single_id(args: &[&str]) -> Option<UnitId> {
    match args {
        [id] => id.parse().ok(),
        _ => None,
    }
}

/// Parses `setoption name <id> [value <x>]`.
fn parse_setoption(args: &[&str]) -> Option<Command> {
    if args.len() < 2 || args[0] != "name" {
        return None;
    }

    let value_idx = args.iter().position(|&t| t == "value");
    let (name_parts, value_parts) = match value_idx {
        Some(vi) => (&args[1..vi], &args[vi + 1..]),
        None => (&args[1..], &args[args.len()..]),
    };
    if name_parts.is_empty() {
        return None;
    }

    let value = if value_parts.is_empty() {
        None
    } else {
        Some(value_parts.join(" "))
    };
    Some(Command::SetOption { name: name_parts.join(" "), value })
}

/// Parses `place <kind> <x> <y>`.
fn parse_place(args: &[&str]) -> Option<Command> {
    let [kind, x, y] = args else {
        return None;
    };
    Some(Command::Place {
        kind: UnitKind::from_name(kind)?,
        x: x.parse().ok()?,
        y: y.parse().ok()?,
    })
}

/// Parses `support <row|col> <index>`.
fn parse_support(args: &[&str]) -> Option<Command> {
    let [axis, index] = args else {
        return None;
    };
    Some(Command::Support {
        axis: Axis::from_name(axis)?,
        index: index.parse().ok()?,
    })
}

/// Parses `move <id> <x> <y>`.
fn parse_move(args: &[&str]) -> Option<Command> {
    let [unit, x, y] = args else {
        return None;
    };
    Some(Command::Move {
        unit: unit.parse().ok()?,
        x: x.parse().ok()?,
        y: y.parse().ok()?,
    })
}

/// Parses `rotate <id> <left|right>`.
fn parse_rotate(args: &[&str]) -> Option<Command> {
    let [unit, rotation] = args else {
        return None;
    };
    Some(Command::Rotate {
        unit: unit.parse().ok()?,
        rotation: Rotation::from_name(rotation)?,
    })
}

/// Parses `attack <attacker> <target>`.
fn parse_attack(args: &[&str]) -> Option<Command> {
    let [unit, target] = args else {
        return None;
    };
    Some(Command::Attack {
        unit: unit.parse().ok()?,
        target: target.parse().ok()?,
    })
}
