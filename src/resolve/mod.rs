//! Rule application.
//!
//! Turns validated operations into state changes: combat resolution, setup
//! phases, turn operations, and the shared action-application path.

pub mod apply;
pub mod combat;
pub mod phase;
pub mod turn;

pub use apply::{apply_action, apply_action_list, simulate_action, Effect, Rejected, TurnReport};
pub use combat::{
    apply_combat, attack_strength, base_strength, charge_bonus, flank_bonus, resolve_combat,
    CombatOutcome, CombatResult,
};
pub use phase::{confirm_support, deploy_unit, deployment_zone, toggle_support_line};
pub use turn::{
    add_attacker, attack, begin_attack, cancel_attack, check_game_over, end_turn, move_unit,
    remove_attacker, resolve_pending, rotate_unit,
};
