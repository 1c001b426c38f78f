//! Support-line placement and strength lookup.

use crate::board::{GameState, Pos, Side, SupportLine, MAX_SUPPORT_LINES};
use crate::error::RuleError;

/// Checks whether `candidate` may join the side's existing lines.
///
/// `existing` must only contain lines of the candidate's side. Parallel lines
/// on adjacent indices are allowed; only exact duplicates are rejected.
pub fn check_placement(existing: &[SupportLine], candidate: &SupportLine, size: i32) -> Result<(), RuleError> {
    if candidate.index < 1 || candidate.index > size {
        return Err(RuleError::LineOutOfBounds(candidate.index));
    }
    if existing.len() >= MAX_SUPPORT_LINES {
        return Err(RuleError::SupportQuotaExceeded);
    }
    if existing.iter().any(|l| l.same_line(candidate)) {
        return Err(RuleError::DuplicateSupportLine);
    }
    Ok(())
}

pub fn is_valid_placement(existing: &[SupportLine], candidate: &SupportLine, size: i32) -> bool {
    check_placement(existing, candidate, size).is_ok()
}

/// Strength bonus a unit of `side` gets on `pos`: one per own line through it.
pub fn support_bonus(state: &GameState, side: Side, pos: Pos) -> i32 {
    state.lines_of(side).filter(|l| l.covers(pos)).count() as i32
}
