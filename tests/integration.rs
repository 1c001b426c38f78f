//! Integration tests for the phalanx driver binary.
//!
//! Tests full session flows by spawning the engine process, sending commands
//! via stdin, and verifying stdout responses.

use std::io::{BufRead, Write};
use std::process::{Command, Stdio};

/// Sends a sequence of commands to the engine and collects stdout lines.
fn run_engine(commands: &[&str]) -> Vec<String> {
    let exe = env!("CARGO_BIN_EXE_phalanx");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start phalanx");

    let mut stdin = child.stdin.take().unwrap();
    let stdout = child.stdout.take().unwrap();
    let reader = std::io::BufReader::new(stdout);

    for cmd in commands {
        writeln!(stdin, "{}", cmd).unwrap();
    }
    stdin.flush().unwrap();
    drop(stdin);

    let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
    let status = child.wait().expect("failed to wait on child");
    assert!(status.success());
    lines
}

/// Seeds a new game and deploys the player's roster. The computer deploys
/// first, so player units get ids 7 through 12 in placement order.
const SETUP: &[&str] = &[
    "setoption name Seed value 21",
    "newgame",
    "place infantry 3 6",
    "place infantry 4 6",
    "place archer 3 7",
    "place archer 5 7",
    "place cavalry 5 6",
    "place cavalry 4 7",
    "support row 6",
    "support row 7",
    "support col 4",
    "confirm",
];

fn session(extra: &[&str]) -> Vec<String> {
    let mut commands: Vec<&str> = SETUP.to_vec();
    commands.extend_from_slice(extra);
    commands.push("quit");
    run_engine(&commands)
}

#[test]
fn isready_response() {
    let lines = run_engine(&["isready", "quit"]);
    assert_eq!(lines, vec!["readyok".to_string()]);
}

#[test]
fn unknown_commands_are_ignored() {
    let lines = run_engine(&["foobar", "move 1 x 2", "", "isready", "quit"]);
    assert_eq!(lines, vec!["readyok".to_string()]);
}

#[test]
fn setup_flow_responses() {
    let lines = session(&[]);
    assert_eq!(lines[0], "ok");
    assert_eq!(lines[1], "ok");
    let placed: Vec<&String> = lines.iter().filter(|l| l.starts_with("placed ")).collect();
    assert_eq!(placed.len(), 6);
    assert_eq!(placed[0], "placed 7");
    assert_eq!(placed[5], "placed 12");
    assert!(lines.contains(&"support row 6 on".to_string()));
    assert!(lines.contains(&"support col 4 on".to_string()));
    assert_eq!(lines.last().map(String::as_str), Some("ok"));
}

#[test]
fn support_toggles_off_and_rejects_over_quota() {
    let lines = run_engine(&[
        "setoption name Seed value 21",
        "newgame",
        "place infantry 3 6",
        "place infantry 4 6",
        "place archer 3 7",
        "place archer 5 7",
        "place cavalry 5 6",
        "place cavalry 4 7",
        "support row 2",
        "support row 2",
        "support row 1",
        "support row 3",
        "support row 4",
        "support row 5",
        "confirm",
        "quit",
    ]);
    assert!(lines.contains(&"support row 2 off".to_string()));
    assert!(lines.iter().any(|l| l.starts_with("error support_quota_exceeded")));
    assert_eq!(lines.last().map(String::as_str), Some("ok"));
}

#[test]
fn rule_errors_are_reported_with_codes() {
    let lines = run_engine(&[
        "setoption name Seed value 21",
        "newgame",
        "move 7 4 5",
        "place infantry 1 1",
        "place infantry 4 3",
        "confirm",
        "quit",
    ]);
    assert_eq!(lines[2], "error wrong_phase: not allowed during Deployment");
    assert!(lines[3].starts_with("error outside_deployment_zone"));
    assert!(lines[4].starts_with("error outside_deployment_zone"));
    assert!(lines[5].starts_with("error wrong_phase"));
}

#[test]
fn player_turn_then_computer_reply() {
    let lines = session(&["select 8", "rotate 8 left", "move 8 4 5", "rotate 8 right", "endturn", "show"]);

    let selected = lines.iter().find(|l| l.starts_with("selected 8 ")).unwrap();
    assert!(selected.contains("4,5"), "{}", selected);
    assert!(selected.ends_with("rotate yes"));

    assert!(lines
        .iter()
        .any(|l| l == "error insufficient_moves: unit 8 does not have enough move points"));

    let computer = lines.iter().find(|l| l.starts_with("computer ")).unwrap();
    assert!(computer.ends_with(" e") || computer == "computer e", "{}", computer);

    let snapshot = lines.iter().find(|l| l.starts_with("snapshot ")).unwrap();
    let json: serde_json::Value = serde_json::from_str(snapshot.strip_prefix("snapshot ").unwrap()).unwrap();
    assert_eq!(json["phase"], "player_turn");
    assert_eq!(json["viewer"], "player");
    assert_eq!(json["support_lines"].as_array().map(Vec::len), Some(3));
    let moved = json["units"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["id"] == 8)
        .unwrap();
    assert_eq!(moved["x"], 4);
    assert_eq!(moved["y"], 5);
    assert_eq!(moved["facing"], "north");
}

#[test]
fn player_cannot_command_computer_units() {
    let lines = session(&["move 1 4 3", "select 2"]);
    let n = lines.len();
    assert_eq!(lines[n - 2], "error not_own_unit: unit 1 does not belong to the acting side");
    assert!(lines[n - 1].starts_with("error not_own_unit"));
}

#[test]
fn pending_attack_protocol_errors() {
    let lines = session(&["resolve", "cancel", "leave 7", "join 7"]);
    let tail: Vec<&str> = lines.iter().rev().take(4).rev().map(String::as_str).collect();
    assert!(tail.iter().all(|l| l.starts_with("error no_pending_attack")), "{:?}", tail);
}

#[test]
fn setoption_errors() {
    let lines = run_engine(&[
        "setoption name Difficulty value hard",
        "setoption name Difficulty value brutal",
        "setoption name Threads value 4",
        "quit",
    ]);
    assert_eq!(lines[0], "ok");
    assert!(lines[1].starts_with("error config: invalid value 'brutal'"));
    assert!(lines[2].starts_with("error config: unknown option"));
}
