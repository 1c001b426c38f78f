//! Turn planning.
//!
//! Builds the computer's action list for a turn with a greedy per-unit search
//! whose breadth is scaled by a difficulty setting.

pub mod greedy;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use greedy::{plan_turn, Plan};

/// How much of the search space the planner looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Random,
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [Difficulty::Random, Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Share of each unit's legal destinations the planner samples.
    pub const fn destination_fraction(self) -> f64 {
        match self {
            Difficulty::Random => 0.1,
            Difficulty::Easy => 0.2,
            Difficulty::Medium => 0.5,
            Difficulty::Hard => 1.0,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Difficulty::Random => "random",
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_name(s: &str) -> Option<Difficulty> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
