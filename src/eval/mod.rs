//! Position evaluation.
//!
//! Scores a position from a given side's perspective, considering material,
//! support-line coverage and archer exposure.

pub mod heuristic;

pub use heuristic::{evaluate, evaluate_all, kill_reward, material, unit_value};
