//! Phalanx engine library.
//!
//! Exposes the board representation, rule layer, move generation, evaluation,
//! planner and protocol modules for use by integration tests and the binary
//! entry points.

pub mod board;
pub mod engine;
pub mod error;
pub mod eval;
pub mod movegen;
pub mod protocol;
pub mod resolve;
pub mod search;
pub mod selfplay;
