//! Small shared enums for the optimization loop.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The direction of optimization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Minimize the objective value.
    #[default]
    Minimize,
    /// Maximize the objective value.
    Maximize,
}

impl Direction {
    /// Maps an objective value to the minimized one an optimizer sees.
    #[must_use]
    pub fn to_minimized(self, y: f64) -> f64 {
        match self {
            Direction::Minimize => y,
            Direction::Maximize => -y,
        }
    }

    /// Returns `true` if `a` is strictly better than `b`.
    #[must_use]
    pub fn is_better(self, a: f64, b: f64) -> bool {
        match self {
            Direction::Minimize => a < b,
            Direction::Maximize => a > b,
        }
    }
}

/// The state of a search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SearchState {
    /// More evaluations can be proposed.
    Iterating,
    /// The evaluation limit was reached.
    Exhausted,
}
