//! Phalanx -- a tactical skirmish engine driven over a line protocol.
//!
//! This binary reads commands from stdin and writes responses to stdout.
//! Diagnostics go to stderr through `tracing`, filtered by `RUST_LOG`.

use std::io::{self, BufRead, Write};

use tracing_subscriber::EnvFilter;

use phalanx::board::Side;
use phalanx::engine::{ConfigError, Engine, Selection};
use phalanx::error::RuleError;
use phalanx::protocol::notation::format_actions;
use phalanx::protocol::parser::{parse_command, Command};
use phalanx::resolve::CombatOutcome;

/// Runs the main protocol loop, reading commands from stdin
/// and writing responses to stdout.
fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut engine = Engine::default();

    for line in stdin.lock().lines() {
        let line = line?;
        let Some(cmd) = parse_command(&line) else {
            continue;
        };
        if !dispatch(&mut engine, cmd, &mut out)? {
            break;
        }
        out.flush()?;
    }
    out.flush()
}

/// Handles one command. Returns false when the session should end.
fn dispatch<W: Write>(engine: &mut Engine, cmd: Command, out: &mut W) -> io::Result<bool> {
    match cmd {
        Command::Quit => return Ok(false),
        Command::IsReady => writeln!(out, "readyok")?,
        Command::NewGame => {
            engine.new_game();
            writeln!(out, "ok")?;
        }
        Command::Show => match engine.snapshot(Side::Player).to_json() {
            Ok(json) => writeln!(out, "snapshot {}", json)?,
            Err(e) => writeln!(out, "error snapshot: {}", e)?,
        },
        Command::SetOption { name, value } => match engine.set_option(&name, value.as_deref()) {
            Ok(()) => writeln!(out, "ok")?,
            Err(e) => config_error(out, &e)?,
        },
        Command::Place { kind, x, y } => match engine.place_unit(kind, x, y) {
            Ok(id) => writeln!(out, "placed {}", id)?,
            Err(e) => rule_error(out, &e)?,
        },
        Command::Support { axis, index } => match engine.toggle_support_line(axis, index) {
            Ok(held) => writeln!(out, "support {} {} {}", axis.name(), index, if held { "on" } else { "off" })?,
            Err(e) => rule_error(out, &e)?,
        },
        Command::Confirm => respond(out, engine.confirm_support_selection())?,
        Command::Select { unit } => match engine.select_unit(unit) {
            Ok(sel) => write_selection(out, &sel)?,
            Err(e) => rule_error(out, &e)?,
        },
        Command::Move { unit, x, y } => respond(out, engine.move_unit(unit, x, y))?,
        Command::Rotate { unit, rotation } => respond(out, engine.rotate_unit(unit, rotation))?,
        Command::Attack { unit, target } => respond(out, engine.begin_attack(unit, target))?,
        Command::Join { unit } => respond(out, engine.add_attacker(unit))?,
        Command::Leave { unit } => respond(out, engine.remove_attacker(unit))?,
        Command::Cancel => respond(out, engine.cancel_attack())?,
        Command::Resolve => match engine.resolve_attack() {
            Ok(outcome) => {
                write_combat(out, &outcome)?;
                write_game_over(out, engine)?;
            }
            Err(e) => rule_error(out, &e)?,
        },
        Command::EndTurn => match engine.end_turn() {
            Ok(()) => {
                writeln!(out, "ok")?;
                play_computer(out, engine)?;
            }
            Err(e) => rule_error(out, &e)?,
        },
    }
    Ok(true)
}

fn play_computer<W: Write>(out: &mut W, engine: &mut Engine) -> io::Result<()> {
    match engine.play_computer_turn() {
        Ok(report) => {
            for outcome in &report.combats {
                write_combat(out, outcome)?;
            }
            writeln!(out, "computer {}", format_actions(&report.applied))?;
            write_game_over(out, engine)
        }
        Err(e) => rule_error(out, &e),
    }
}

fn respond<W: Write>(out: &mut W, result: Result<(), RuleError>) -> io::Result<()> {
    match result {
        Ok(()) => writeln!(out, "ok"),
        Err(e) => rule_error(out, &e),
    }
}

fn rule_error<W: Write>(out: &mut W, err: &RuleError) -> io::Result<()> {
    writeln!(out, "error {}: {}", err.code(), err)
}

fn config_error<W: Write>(out: &mut W, err: &ConfigError) -> io::Result<()> {
    writeln!(out, "error config: {}", err)
}

fn write_combat<W: Write>(out: &mut W, outcome: &CombatOutcome) -> io::Result<()> {
    let removed: Vec<String> = outcome.removed.iter().map(|id| id.to_string()).collect();
    writeln!(
        out,
        "combat {} {} {} removed {}",
        outcome.result.name(),
        outcome.attack_total,
        outcome.defense_total,
        if removed.is_empty() { "-".to_string() } else { removed.join(",") }
    )
}

fn write_selection<W: Write>(out: &mut W, sel: &Selection) -> io::Result<()> {
    let moves: Vec<String> = sel.destinations.iter().map(|p| format!("{},{}", p.x, p.y)).collect();
    let targets: Vec<String> = sel.targets.iter().map(|id| id.to_string()).collect();
    writeln!(
        out,
        "selected {} moves {} targets {} rotate {}",
        sel.unit,
        if moves.is_empty() { "-".to_string() } else { moves.join(" ") },
        if targets.is_empty() { "-".to_string() } else { targets.join(" ") },
        if sel.can_rotate { "yes" } else { "no" }
    )
}

fn write_game_over<W: Write>(out: &mut W, engine: &Engine) -> io::Result<()> {
    if let Some(winner) = engine.state().winner {
        writeln!(out, "gameover {}", winner)?;
    }
    Ok(())
}
