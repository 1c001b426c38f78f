//! Engine session management.
//!
//! Owns the authoritative game state for one human-versus-computer session,
//! the engine options, and the source of computer turns. Every player
//! operation is checked against the phase before the rule layer sees it, so
//! the human can never act for the computer.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Deserialize;
use thiserror::Error;

use crate::board::{Axis, GameState, Phase, Pos, Rotation, Side, UnitId, UnitKind};
use crate::error::RuleError;
use crate::movegen::{can_rotate, legal_destinations, legal_targets, random_deployment, random_support_lines};
use crate::protocol::external::{parse_action_list, MoveSource, ProcessSource};
use crate::protocol::snapshot::Snapshot;
use crate::resolve::{self, apply_action_list, CombatOutcome, TurnReport};
use crate::search::{plan_turn, Difficulty};

/// Smallest board that still fits both deployment zones with a gap between.
pub const MIN_BOARD_SIZE: i32 = 5;

/// Largest supported board.
pub const MAX_BOARD_SIZE: i32 = 15;

/// Errors from reading or adjusting the engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("board size {0} outside {min}..={max}", min = MIN_BOARD_SIZE, max = MAX_BOARD_SIZE)]
    BoardSize(i32),

    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("invalid value '{value}' for option '{name}'")]
    InvalidValue { name: String, value: String },

    #[error("cannot start move source: {0}")]
    MoveSource(String),
}

/// Tunable engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub difficulty: Difficulty,
    /// RNG seed. Zero draws a fresh seed from the OS each game.
    pub seed: u64,
    pub board_size: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            difficulty: Difficulty::default(),
            seed: 0,
            board_size: crate::board::BOARD_SIZE,
        }
    }
}

impl EngineConfig {
    /// Reads a config from JSON. Missing fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&self.board_size) {
            return Err(ConfigError::BoardSize(self.board_size));
        }
        Ok(())
    }

    fn rng(&self) -> SmallRng {
        if self.seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(self.seed)
        }
    }
}

/// What a selected unit can do right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub unit: UnitId,
    pub destinations: Vec<Pos>,
    pub targets: Vec<UnitId>,
    pub can_rotate: bool,
}

/// Holds one session and the settings it is played with.
pub struct Engine {
    state: GameState,
    config: EngineConfig,
    rng: SmallRng,
    selected: Option<UnitId>,
    source: Option<Box<dyn MoveSource>>,
}

impl Engine {
    /// Creates an engine and starts the first game.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::start(config))
    }

    fn start(config: EngineConfig) -> Self {
        let mut engine = Engine {
            state: GameState::new(config.board_size),
            config,
            rng: config.rng(),
            selected: None,
            source: None,
        };
        engine.new_game();
        engine
    }

    /// Starts a fresh session. The computer deploys at once.
    pub fn new_game(&mut self) {
        self.rng = self.config.rng();
        self.state = GameState::new(self.config.board_size);
        self.selected = None;

        for (kind, pos) in random_deployment(Side::Computer, &self.state, &mut self.rng) {
            if let Err(err) = resolve::deploy_unit(&mut self.state, Side::Computer, kind, pos) {
                tracing::warn!(%err, ?kind, ?pos, "computer deployment rejected");
            }
        }
        tracing::info!(
            seed = self.config.seed,
            difficulty = %self.config.difficulty,
            size = self.config.board_size,
            "new game"
        );
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn selected(&self) -> Option<UnitId> {
        self.selected
    }

    pub fn snapshot(&self, viewer: Side) -> Snapshot {
        Snapshot::for_viewer(&self.state, viewer)
    }

    /// Replaces the computer's move source. `None` restores the local planner.
    pub fn set_move_source(&mut self, source: Option<Box<dyn MoveSource>>) {
        self.source = source;
    }

    /// Sets an engine option by name.
    ///
    /// `Difficulty` and `Seed` take effect immediately; a new seed also
    /// applies to the next game. `MoveSource` spawns an external command,
    /// or without a value falls back to the local planner.
    pub fn set_option(&mut self, name: &str, value: Option<&str>) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            name: name.to_string(),
            value: value.unwrap_or_default().to_string(),
        };

        match name.to_ascii_lowercase().as_str() {
            "difficulty" => {
                self.config.difficulty = value.and_then(Difficulty::from_name).ok_or_else(invalid)?;
            }
            "seed" => {
                self.config.seed = value.and_then(|v| v.parse().ok()).ok_or_else(invalid)?;
                self.rng = self.config.rng();
            }
            "movesource" => match value {
                Some(cmd) => {
                    let source = ProcessSource::spawn(cmd).map_err(|e| ConfigError::MoveSource(e.to_string()))?;
                    self.source = Some(Box::new(source));
                }
                None => self.source = None,
            },
            _ => return Err(ConfigError::UnknownOption(name.to_string())),
        }
        tracing::debug!(name, value = ?value, "option set");
        Ok(())
    }

    fn require_player_turn(&self) -> Result<(), RuleError> {
        match self.state.phase {
            Phase::PlayerTurn => Ok(()),
            Phase::GameOver => Err(RuleError::GameOver),
            phase => Err(RuleError::WrongPhase(phase)),
        }
    }

    /// Deploys one unit from the player's roster.
    ///
    /// When the last unit lands, support selection begins and the computer
    /// picks and confirms its lines before the player can toggle any.
    pub fn place_unit(&mut self, kind: UnitKind, x: i32, y: i32) -> Result<UnitId, RuleError> {
        let id = resolve::deploy_unit(&mut self.state, Side::Player, kind, Pos::new(x, y))?;
        if self.state.phase == Phase::SupportSelection {
            self.choose_computer_support();
        }
        Ok(id)
    }

    fn choose_computer_support(&mut self) {
        for line in random_support_lines(Side::Computer, &self.state, &mut self.rng) {
            if let Err(err) = resolve::toggle_support_line(&mut self.state, Side::Computer, line.axis, line.index) {
                tracing::warn!(%err, ?line, "computer support line rejected");
            }
        }
        if let Err(err) = resolve::confirm_support(&mut self.state, Side::Computer) {
            tracing::warn!(%err, "computer support confirmation rejected");
        }
    }

    /// Toggles one of the player's support lines. Returns whether it is held.
    pub fn toggle_support_line(&mut self, axis: Axis, index: i32) -> Result<bool, RuleError> {
        resolve::toggle_support_line(&mut self.state, Side::Player, axis, index)
    }

    pub fn confirm_support_selection(&mut self) -> Result<(), RuleError> {
        resolve::confirm_support(&mut self.state, Side::Player)
    }

    /// Selects one of the player's units and reports its options.
    pub fn select_unit(&mut self, id: UnitId) -> Result<Selection, RuleError> {
        self.require_player_turn()?;
        let unit = *self.state.unit(id).ok_or(RuleError::UnknownUnit(id))?;
        if unit.side != Side::Player {
            return Err(RuleError::NotOwnUnit(id));
        }
        self.selected = Some(id);
        Ok(Selection {
            unit: id,
            destinations: legal_destinations(&self.state, &unit),
            targets: legal_targets(&self.state, &unit),
            can_rotate: can_rotate(&unit),
        })
    }

    pub fn move_unit(&mut self, id: UnitId, x: i32, y: i32) -> Result<(), RuleError> {
        self.require_player_turn()?;
        resolve::move_unit(&mut self.state, id, Pos::new(x, y))
    }

    pub fn rotate_unit(&mut self, id: UnitId, rotation: Rotation) -> Result<(), RuleError> {
        self.require_player_turn()?;
        resolve::rotate_unit(&mut self.state, id, rotation)
    }

    pub fn begin_attack(&mut self, attacker: UnitId, target: UnitId) -> Result<(), RuleError> {
        self.require_player_turn()?;
        resolve::begin_attack(&mut self.state, attacker, target)
    }

    pub fn add_attacker(&mut self, attacker: UnitId) -> Result<(), RuleError> {
        self.require_player_turn()?;
        resolve::add_attacker(&mut self.state, attacker)
    }

    pub fn remove_attacker(&mut self, attacker: UnitId) -> Result<(), RuleError> {
        self.require_player_turn()?;
        resolve::remove_attacker(&mut self.state, attacker)
    }

    pub fn resolve_attack(&mut self) -> Result<CombatOutcome, RuleError> {
        self.require_player_turn()?;
        let outcome = resolve::resolve_pending(&mut self.state)?;
        self.forget_removed_selection();
        tracing::info!(
            result = outcome.result.name(),
            attack = outcome.attack_total,
            defense = outcome.defense_total,
            "player attack resolved"
        );
        Ok(outcome)
    }

    pub fn cancel_attack(&mut self) -> Result<(), RuleError> {
        self.require_player_turn()?;
        resolve::cancel_attack(&mut self.state)
    }

    /// Ends the player's turn. The computer's turn is played separately.
    pub fn end_turn(&mut self) -> Result<(), RuleError> {
        self.require_player_turn()?;
        resolve::end_turn(&mut self.state)?;
        self.selected = None;
        Ok(())
    }

    fn forget_removed_selection(&mut self) {
        if let Some(id) = self.selected {
            if self.state.unit(id).is_none() {
                self.selected = None;
            }
        }
    }

    /// Plays the computer's whole turn.
    ///
    /// Actions come from the external move source if one is set, otherwise
    /// from the local planner. A failing or malformed source falls back to
    /// the planner. Every action is re-validated as it is applied.
    pub fn play_computer_turn(&mut self) -> Result<TurnReport, RuleError> {
        match self.state.phase {
            Phase::ComputerTurn => {}
            Phase::GameOver => return Err(RuleError::GameOver),
            phase => return Err(RuleError::WrongPhase(phase)),
        }

        let actions = match self.external_actions() {
            Some(actions) => actions,
            None => {
                let plan = plan_turn(&self.state, Side::Computer, self.config.difficulty, &mut self.rng);
                tracing::debug!(score = plan.score, nodes = plan.nodes, "planner finished");
                plan.actions
            }
        };

        let report = apply_action_list(&mut self.state, &actions);
        self.forget_removed_selection();
        tracing::info!(
            applied = report.applied.len(),
            rejected = report.rejected.len(),
            combats = report.combats.len(),
            "computer turn played"
        );
        Ok(report)
    }

    fn external_actions(&mut self) -> Option<Vec<crate::board::Action>> {
        let source = self.source.as_mut()?;
        let snapshot = Snapshot::for_viewer(&self.state, Side::Computer);
        let json = match snapshot.to_json() {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(%err, "snapshot serialization failed, using planner");
                return None;
            }
        };
        let response = match source.request_actions(&json) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(source = source.name(), %err, "move source failed, using planner");
                return None;
            }
        };
        match parse_action_list(&response) {
            Ok(parsed) => Some(parsed.actions),
            Err(err) => {
                tracing::warn!(source = source.name(), %err, "move source response unusable, using planner");
                None
            }
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::start(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Action;
    use crate::protocol::external::ScriptedSource;
    use crate::resolve::deployment_zone;

    fn seeded(seed: u64) -> Engine {
        Engine::new(EngineConfig { seed, ..EngineConfig::default() }).unwrap()
    }

    /// Deploys the player's roster and confirms rows 6, 7 and column 4.
    fn play_setup(engine: &mut Engine) {
        let zone = deployment_zone(Side::Player, engine.state().size);
        let kinds = engine.state().reserves[Side::Player.index()].kinds();
        for (kind, pos) in kinds.into_iter().zip(zone) {
            engine.place_unit(kind, pos.x, pos.y).unwrap();
        }
        engine.toggle_support_line(Axis::Row, 6).unwrap();
        engine.toggle_support_line(Axis::Row, 7).unwrap();
        engine.toggle_support_line(Axis::Column, 4).unwrap();
        engine.confirm_support_selection().unwrap();
    }

    #[test]
    fn new_game_deploys_computer() {
        let engine = seeded(5);
        let state = engine.state();
        assert_eq!(state.phase, Phase::Deployment);
        assert_eq!(state.live_count(Side::Computer), 6);
        assert_eq!(state.live_count(Side::Player), 0);
        let zone = deployment_zone(Side::Computer, state.size);
        assert!(state.units_of(Side::Computer).all(|u| zone.contains(&u.pos)));
    }

    #[test]
    fn same_seed_same_computer_setup() {
        let a = seeded(77);
        let b = seeded(77);
        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn setup_reaches_player_turn() {
        let mut engine = seeded(3);
        play_setup(&mut engine);
        let state = engine.state();
        assert_eq!(state.phase, Phase::PlayerTurn);
        assert_eq!(state.lines_of(Side::Computer).count(), 3);
        assert_eq!(state.lines_of(Side::Player).count(), 3);
        let snap = engine.snapshot(Side::Player);
        assert_eq!(snap.support_lines.len(), 3);
    }

    #[test]
    fn player_cannot_act_outside_own_turn() {
        let mut engine = seeded(3);
        assert_eq!(engine.move_unit(1, 4, 3), Err(RuleError::WrongPhase(Phase::Deployment)));
        play_setup(&mut engine);
        engine.end_turn().unwrap();
        let computer_unit = engine.state().units_of(Side::Computer).map(|u| u.id).next().unwrap();
        assert_eq!(
            engine.rotate_unit(computer_unit, Rotation::Left),
            Err(RuleError::WrongPhase(Phase::ComputerTurn))
        );
        assert_eq!(engine.end_turn(), Err(RuleError::WrongPhase(Phase::ComputerTurn)));
    }

    #[test]
    fn player_cannot_move_computer_units() {
        let mut engine = seeded(3);
        play_setup(&mut engine);
        let theirs = engine.state().units_of(Side::Computer).map(|u| u.id).next().unwrap();
        let before = engine.state().clone();
        assert_eq!(engine.select_unit(theirs), Err(RuleError::NotOwnUnit(theirs)));
        assert!(engine.move_unit(theirs, 4, 3).is_err());
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn selection_lists_options() {
        let mut engine = seeded(3);
        play_setup(&mut engine);
        let front = engine
            .state()
            .units_of(Side::Player)
            .find(|u| u.pos.y == 6)
            .map(|u| u.id)
            .unwrap();
        let sel = engine.select_unit(front).unwrap();
        assert_eq!(engine.selected(), Some(front));
        assert!(sel.can_rotate);
        assert!(!sel.destinations.is_empty());
    }

    #[test]
    fn computer_turn_returns_control() {
        let mut engine = seeded(11);
        play_setup(&mut engine);
        assert_eq!(engine.play_computer_turn(), Err(RuleError::WrongPhase(Phase::PlayerTurn)));
        engine.end_turn().unwrap();
        let report = engine.play_computer_turn().unwrap();
        assert_eq!(report.applied.last(), Some(&Action::EndTurn));
        assert_eq!(engine.state().phase, Phase::PlayerTurn);
    }

    #[test]
    fn external_source_is_revalidated() {
        let mut engine = seeded(11);
        play_setup(&mut engine);
        engine.end_turn().unwrap();
        let mine = engine.state().units_of(Side::Computer).next().copied().unwrap();
        let player = engine.state().units_of(Side::Player).map(|u| u.id).next().unwrap();
        let response = format!(
            r#"[{{"type": "move", "unit": {player}, "x": 1, "y": 1}},
                {{"type": "bogus"}},
                {{"type": "rotate", "unit": {mine}, "rotation": "left"}}]"#,
            player = player,
            mine = mine.id,
        );
        engine.set_move_source(Some(Box::new(ScriptedSource::new([response]))));

        let report = engine.play_computer_turn().unwrap();
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].reason, RuleError::NotOwnUnit(player));
        assert_eq!(
            report.applied,
            vec![Action::Rotate { unit: mine.id, rotation: Rotation::Left }, Action::EndTurn]
        );
        assert_eq!(engine.state().phase, Phase::PlayerTurn);
    }

    #[test]
    fn failing_source_falls_back_to_planner() {
        let mut engine = seeded(11);
        play_setup(&mut engine);
        engine.end_turn().unwrap();
        engine.set_move_source(Some(Box::new(ScriptedSource::new(Vec::<String>::new()))));
        let report = engine.play_computer_turn().unwrap();
        assert_eq!(report.applied.last(), Some(&Action::EndTurn));
        assert!(report.rejected.is_empty());
    }

    #[test]
    fn options_by_name() {
        let mut engine = seeded(1);
        engine.set_option("Difficulty", Some("hard")).unwrap();
        assert_eq!(engine.config().difficulty, Difficulty::Hard);
        engine.set_option("seed", Some("99")).unwrap();
        assert_eq!(engine.config().seed, 99);
        assert!(matches!(
            engine.set_option("Difficulty", Some("brutal")),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(engine.set_option("Seed", None), Err(ConfigError::InvalidValue { .. })));
        assert!(matches!(engine.set_option("Threads", Some("4")), Err(ConfigError::UnknownOption(_))));
        engine.set_option("MoveSource", None).unwrap();
    }

    #[test]
    fn config_from_json() {
        let config = EngineConfig::from_json(r#"{"difficulty": "easy", "seed": 4}"#).unwrap();
        assert_eq!(config.difficulty, Difficulty::Easy);
        assert_eq!(config.seed, 4);
        assert_eq!(config.board_size, 7);
        assert!(matches!(
            EngineConfig::from_json(r#"{"board_size": 3}"#),
            Err(ConfigError::BoardSize(3))
        ));
        assert!(matches!(EngineConfig::from_json("{"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn new_rejects_out_of_range_board() {
        for size in [3, MAX_BOARD_SIZE + 1] {
            let config = EngineConfig { board_size: size, ..EngineConfig::default() };
            assert!(matches!(Engine::new(config), Err(ConfigError::BoardSize(s)) if s == size));
        }
        let engine = Engine::new(EngineConfig { board_size: MIN_BOARD_SIZE, seed: 3, ..EngineConfig::default() }).unwrap();
        assert_eq!(engine.state().size, MIN_BOARD_SIZE);
        assert_eq!(engine.state().live_count(Side::Computer), 6);
    }
}
