//! Rejection reasons for engine operations.
//!
//! Every operation validates fully before mutating, so an `Err` always means
//! the game state is exactly as it was before the call.

use thiserror::Error;

use crate::board::state::Phase;
use crate::board::unit::{UnitId, UnitKind};
use crate::board::support::MAX_SUPPORT_LINES;

/// Broad classification of a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Recoverable: the call broke a rule and was refused.
    IllegalOperation,
    /// The game has ended; only a new session can continue.
    TerminalState,
}

/// Why an operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum RuleError {
    #[error("tile ({x}, {y}) is off the board")]
    OutOfBounds { x: i32, y: i32 },

    #[error("tile ({x}, {y}) is occupied")]
    Occupied { x: i32, y: i32 },

    #[error("unit {0} does not exist")]
    UnknownUnit(UnitId),

    #[error("unit {0} does not belong to the acting side")]
    NotOwnUnit(UnitId),

    #[error("destination is not reachable in a single move")]
    Unreachable,

    #[error("unit {0} does not have enough move points")]
    InsufficientMoves(UnitId),

    #[error("charge path is blocked")]
    ChargeBlocked,

    #[error("unit {0} has no attack left this turn")]
    NoAttacksLeft(UnitId),

    #[error("cannot attack a friendly unit")]
    FriendlyTarget,

    #[error("target is outside the attacker's facing cone")]
    OutsideFacingCone,

    #[error("target is out of range")]
    OutOfRange,

    #[error("line of fire is blocked")]
    ShotBlocked,

    #[error("archer {0} is engaged and cannot fire")]
    EngagedArcher(UnitId),

    #[error("unit {0} is committed to the pending attack")]
    CommittedToAttack(UnitId),

    #[error("an attack is already pending")]
    AttackPending,

    #[error("no attack is pending")]
    NoPendingAttack,

    #[error("unit {0} is not part of the pending attack")]
    NotCommitted(UnitId),

    #[error("tile ({x}, {y}) is outside the deployment zone")]
    OutsideDeploymentZone { x: i32, y: i32 },

    #[error("no {0} left to deploy")]
    KindExhausted(UnitKind),

    #[error("support line index {0} is off the board")]
    LineOutOfBounds(i32),

    #[error("support line is already held")]
    DuplicateSupportLine,

    #[error("side already holds {max} support lines", max = MAX_SUPPORT_LINES)]
    SupportQuotaExceeded,

    #[error("exactly {max} support lines are required, {held} held", max = MAX_SUPPORT_LINES)]
    SupportSelectionIncomplete { held: usize },

    #[error("support selection is already confirmed")]
    SupportConfirmed,

    #[error("not allowed during {0:?}")]
    WrongPhase(Phase),

    #[error("the game is over")]
    GameOver,
}

impl RuleError {
    /// Returns the broad classification of this rejection.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            RuleError::GameOver => ErrorKind::TerminalState,
            _ => ErrorKind::IllegalOperation,
        }
    }

    /// Stable machine-readable reason code.
    pub const fn code(&self) -> &'static str {
        match self {
            RuleError::OutOfBounds { .. } => "out_of_bounds",
            RuleError::Occupied { .. } => "occupied",
            RuleError::UnknownUnit(_) => "unknown_unit",
            RuleError::NotOwnUnit(_) => "not_own_unit",
            RuleError::Unreachable => "unreachable",
            RuleError::InsufficientMoves(_) => "insufficient_moves",
            RuleError::ChargeBlocked => "charge_blocked",
            RuleError::NoAttacksLeft(_) => "no_attacks_left",
            RuleError::FriendlyTarget => "friendly_target",
            RuleError::OutsideFacingCone => "outside_facing_cone",
            RuleError::OutOfRange => "out_of_range",
            RuleError::ShotBlocked => "shot_blocked",
            RuleError::EngagedArcher(_) => "engaged_archer",
            RuleError::CommittedToAttack(_) => "committed_to_attack",
            RuleError::AttackPending => "attack_pending",
            RuleError::NoPendingAttack => "no_pending_attack",
            RuleError::NotCommitted(_) => "not_committed",
            RuleError::OutsideDeploymentZone { .. } => "outside_deployment_zone",
            RuleError::KindExhausted(_) => "kind_exhausted",
            RuleError::LineOutOfBounds(_) => "line_out_of_bounds",
            RuleError::DuplicateSupportLine => "duplicate_support_line",
            RuleError::SupportQuotaExceeded => "support_quota_exceeded",
            RuleError::SupportSelectionIncomplete { .. } => "support_selection_incomplete",
            RuleError::SupportConfirmed => "support_confirmed",
            RuleError::WrongPhase(_) => "wrong_phase",
            RuleError::GameOver => "game_over",
        }
    }
}
