//! Compact text notation for turn actions.
//!
//! Used for the computer's turn output and self-play records. Tokens are
//! separated by single spaces, actions in a list by ` ; `.
//!
//! ```text
//! m <id> <x> <y>      move
//! r <id> <l|r>        rotate
//! a <id> <target>     attack
//! e                   end turn
//! ```

use thiserror::Error;

use crate::board::{Action, Rotation, UnitId};

/// Errors that can occur when parsing action notation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotationError {
    #[error("empty input")]
    EmptyInput,

    #[error("unknown action '{0}'")]
    UnknownAction(String),

    #[error("expected {expected} arguments for '{action}', found {found}")]
    WrongArity {
        action: String,
        expected: usize,
        found: usize,
    },

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unknown rotation '{0}'")]
    UnknownRotation(String),
}

/// Parses a single action such as `m 3 4 5`.
pub fn parse_action(s: &str) -> Result<Action, NotationError> {
    let tokens: Vec<&str> = s.split_whitespace().collect();
    let Some((&head, args)) = tokens.split_first() else {
        return Err(NotationError::EmptyInput);
    };

    let arity = |expected: usize| {
        if args.len() == expected {
            Ok(())
        } else {
            Err(NotationError::WrongArity {
                action: head.to_string(),
                expected,
                found: args.len(),
            })
        }
    };

    match head {
        "m" => {
            arity(3)?;
            Ok(Action::Move {
                unit: parse_id(args[0])?,
                x: parse_coord(args[1])?,
                y: parse_coord(args[2])?,
            })
        }
        "r" => {
            arity(2)?;
            let rotation = args[1]
                .chars()
                .next()
                .filter(|_| args[1].len() == 1)
                .and_then(Rotation::from_notation_char)
                .ok_or_else(|| NotationError::UnknownRotation(args[1].to_string()))?;
            Ok(Action::Rotate { unit: parse_id(args[0])?, rotation })
        }
        "a" => {
            arity(2)?;
            Ok(Action::Attack {
                unit: parse_id(args[0])?,
                target: parse_id(args[1])?,
            })
        }
        "e" => {
            arity(0)?;
            Ok(Action::EndTurn)
        }
        other => Err(NotationError::UnknownAction(other.to_string())),
    }
}

/// Parses a ` ; `-separated action list. Blank entries are skipped.
pub fn parse_actions(s: &str) -> Result<Vec<Action>, NotationError> {
    s.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(parse_action)
        .collect()
}

pub fn format_action(action: &Action) -> String {
    match *action {
        Action::Move { unit, x, y } => format!("m {} {} {}", unit, x, y),
        Action::Rotate { unit, rotation } => format!("r {} {}", unit, rotation.notation_char()),
        Action::Attack { unit, target } => format!("a {} {}", unit, target),
        Action::EndTurn => "e".to_string(),
    }
}

pub fn format_actions(actions: &[Action]) -> String {
    actions
        .iter()
        .map(format_action)
        .collect::<Vec<_>>()
        .join(" ; ")
}

fn parse_id(s: &str) -> Result<UnitId, NotationError> {
    s.parse().map_err(|_| NotationError::InvalidNumber(s.to_string()))
}

fn parse_coord(s: &str) -> Result<i32, NotationError> {
    s.parse().map_err(|_| NotationError::InvalidNumber(s.to_string()))
}
