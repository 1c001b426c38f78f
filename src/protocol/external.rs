//! External move sources.
//!
//! An external move source replaces the local planner for the computer's
//! turn. It receives a JSON snapshot of the position as seen by the acting
//! side and answers with a JSON action list. The answer is untrusted: the
//! parser here only checks shape, and every surviving action is re-validated
//! against the rules when it is applied.
//!
//! Accepted response shapes are a bare array or an object with an `actions`
//! array. Each entry is an object tagged by `type`:
//!
//! ```json
//! [{"type": "move", "unit": 3, "x": 4, "y": 3},
//!  {"type": "rotate", "unit": 3, "rotation": "left"},
//!  {"type": "attack", "unit": 3, "target": 8},
//!  {"type": "end_turn"}]
//! ```

use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde_json::Value;
use thiserror::Error;

use crate::board::{Action, Rotation, UnitId};

/// Failure to obtain a response from a move source.
#[derive(Debug, Error)]
pub enum MoveSourceError {
    #[error("move source i/o: {0}")]
    Io(#[from] io::Error),

    #[error("move source closed")]
    Closed,
}

/// The response was not an action list at all.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionListError {
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("expected an array of actions or an object with an 'actions' array")]
    NotAList,
}

/// A single entry of an action list was malformed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntryError {
    #[error("entry is not an object")]
    NotAnObject,

    #[error("missing 'type'")]
    MissingType,

    #[error("unknown action type '{0}'")]
    UnknownType(String),

    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("invalid field '{0}'")]
    InvalidField(&'static str),
}

/// Result of parsing an untrusted action list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedList {
    pub actions: Vec<Action>,
    /// Indices of malformed entries that were skipped.
    pub dropped: Vec<usize>,
}

/// A generator of computer turns.
pub trait MoveSource: Send {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Sends a snapshot and returns the raw response text.
    fn request_actions(&mut self, snapshot_json: &str) -> Result<String, MoveSourceError>;
}

/// Parses a response into actions, skipping malformed entries.
pub fn parse_action_list(text: &str) -> Result<ParsedList, ActionListError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ActionListError::InvalidJson(e.to_string()))?;

    let entries = match &value {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("actions") {
            Some(Value::Array(items)) => items,
            _ => return Err(ActionListError::NotAList),
        },
        _ => return Err(ActionListError::NotAList),
    };

    let mut parsed = ParsedList::default();
    for (index, entry) in entries.iter().enumerate() {
        match parse_entry(entry) {
            Ok(action) => parsed.actions.push(action),
            Err(err) => {
                tracing::warn!(index, %err, "skipping malformed action entry");
                parsed.dropped.push(index);
            }
        }
    }
    Ok(parsed)
}

/// Parses one action entry without trusting field presence or ranges.
pub fn parse_entry(entry: &Value) -> Result<Action, EntryError> {
    let obj = entry.as_object().ok_or(EntryError::NotAnObject)?;
    let kind = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or(EntryError::MissingType)?;

    let id = |field: &'static str| -> Result<UnitId, EntryError> {
        let v = obj.get(field).ok_or(EntryError::MissingField(field))?;
        v.as_u64()
            .and_then(|n| UnitId::try_from(n).ok())
            .ok_or(EntryError::InvalidField(field))
    };
    let coord = |field: &'static str| -> Result<i32, EntryError> {
        let v = obj.get(field).ok_or(EntryError::MissingField(field))?;
        v.as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .ok_or(EntryError::InvalidField(field))
    };

    match kind {
        "move" => Ok(Action::Move { unit: id("unit")?, x: coord("x")?, y: coord("y")? }),
        "rotate" => {
            let unit = id("unit")?;
            let rotation = obj
                .get("rotation")
                .ok_or(EntryError::MissingField("rotation"))?
                .as_str()
                .and_then(Rotation::from_name)
                .ok_or(EntryError::InvalidField("rotation"))?;
            Ok(Action::Rotate { unit, rotation })
        }
        "attack" => Ok(Action::Attack { unit: id("unit")?, target: id("target")? }),
        "end_turn" => Ok(Action::EndTurn),
        other => Err(EntryError::UnknownType(other.to_string())),
    }
}

/// A child process speaking one JSON line per request and response.
pub struct ProcessSource {
    label: String,
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl ProcessSource {
    /// Spawns `command_line`, split on whitespace into program and arguments.
    pub fn spawn(command_line: &str) -> Result<Self, MoveSourceError> {
        let mut parts = command_line.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?;
        let mut child = Command::new(program)
            .args(parts)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()?;
        let stdin = child.stdin.take().ok_or(MoveSourceError::Closed)?;
        let stdout = child.stdout.take().ok_or(MoveSourceError::Closed)?;
        Ok(ProcessSource {
            label: command_line.to_string(),
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }
}

impl MoveSource for ProcessSource {
    fn name(&self) -> &str {
        &self.label
    }

    fn request_actions(&mut self, snapshot_json: &str) -> Result<String, MoveSourceError> {
        writeln!(self.stdin, "{}", snapshot_json)?;
        self.stdin.flush()?;
        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(MoveSourceError::Closed);
        }
        Ok(line)
    }
}

impl Drop for ProcessSource {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Replays canned responses in order. Runs dry with `Closed`.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    responses: VecDeque<String>,
    /// Snapshots received, oldest first.
    pub requests: Vec<String>,
}

impl ScriptedSource {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedSource {
            responses: responses.into_iter().map(Into::into).collect(),
            requests: Vec::new(),
        }
    }
}

impl MoveSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    fn request_actions(&mut self, snapshot_json: &str) -> Result<String, MoveSourceError> {
        self.requests.push(snapshot_json.to_string());
        self.responses.pop_front().ok_or(MoveSourceError::Closed)
    }
}
