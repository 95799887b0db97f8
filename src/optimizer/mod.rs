//! The ask/tell contract between the search loop and numerical optimizers.
//!
//! An optimizer proposes points in the internal space of a
//! [`SearchSpace`](crate::SearchSpace): one `f64` per dimension, log-scaled
//! for log ranges, an index for categorical dimensions. It always minimizes.
//!
//! | Optimizer | Algorithm | Feature flag |
//! |-----------|-----------|--------------|
//! | [`RandomSearch`] | Uniform random | none |
//! | [`BayesianOptimizer`] | Gaussian process + Expected Improvement | `gp` (default) |

#[cfg(feature = "gp")]
pub mod gp;
pub mod random;

#[cfg(feature = "gp")]
pub use gp::{BayesianOptimizer, BayesianOptimizerBuilder};
pub use random::RandomSearch;

use crate::error::{Error, Result};
use crate::space::Dimension;

/// Objective value marking a failed evaluation.
pub const OBJECTIVE_VALUE_FAILURE: f64 = f64::NAN;

/// A black-box minimizer driven by the search loop.
///
/// Within one optimizer every vector has the same length and dimension order.
pub trait Optimizer: Send {
    /// Proposes the next point to evaluate.
    ///
    /// # Errors
    ///
    /// Implementation-specific.
    fn ask(&mut self) -> Result<Vec<f64>>;

    /// Reports the objective `y` observed at `x`.
    ///
    /// `y` is [`OBJECTIVE_VALUE_FAILURE`] for failed evaluations. `fit` asks
    /// the optimizer to refit its model now rather than lazily.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if `x` has the wrong length.
    fn tell(&mut self, x: &[f64], y: f64, fit: bool) -> Result<()>;
}

impl<O: Optimizer + ?Sized> Optimizer for Box<O> {
    fn ask(&mut self) -> Result<Vec<f64>> {
        (**self).ask()
    }

    fn tell(&mut self, x: &[f64], y: f64, fit: bool) -> Result<()> {
        (**self).tell(x, y, fit)
    }
}

/// Draws one uniform point in internal space.
pub(crate) fn random_point(dimensions: &[Dimension], rng: &mut fastrand::Rng) -> Result<Vec<f64>> {
    dimensions
        .iter()
        .map(|d| {
            let choice = d.distribution.draw_one(rng);
            d.distribution
                .to_internal(&choice)
                .ok_or(Error::Internal("draw does not match its own distribution"))
        })
        .collect()
}

pub(crate) fn check_len(dimensions: &[Dimension], x: &[f64]) -> Result<()> {
    if x.len() == dimensions.len() {
        Ok(())
    } else {
        Err(Error::DimensionMismatch {
            expected: dimensions.len(),
            got: x.len(),
        })
    }
}
