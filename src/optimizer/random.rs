//! Random search.

use crate::error::Result;
use crate::optimizer::{Optimizer, check_len, random_point};
use crate::space::{Dimension, SearchSpace};

/// Proposes points uniformly at random and keeps every observation.
///
/// # Examples
///
/// ```
/// use metalg::optimizer::{Optimizer, RandomSearch};
/// use metalg::{Expr, Float, SearchSpace};
///
/// let x: Expr = Float::new(-1.0, 1.0).into();
/// let mut opt = RandomSearch::with_seed(&SearchSpace::from_expr(&x).unwrap(), 42);
///
/// let p = opt.ask().unwrap();
/// opt.tell(&p, p[0] * p[0], true).unwrap();
/// assert_eq!(opt.observations().len(), 1);
/// ```
pub struct RandomSearch {
    dimensions: Vec<Dimension>,
    rng: fastrand::Rng,
    observations: Vec<(Vec<f64>, f64)>,
}

impl RandomSearch {
    /// Creates a random search over `space` with a random seed.
    #[must_use]
    pub fn new(space: &SearchSpace) -> Self {
        Self::with_rng(space, fastrand::Rng::new())
    }

    /// Creates a random search with a fixed seed.
    #[must_use]
    pub fn with_seed(space: &SearchSpace, seed: u64) -> Self {
        Self::with_rng(space, fastrand::Rng::with_seed(seed))
    }

    fn with_rng(space: &SearchSpace, rng: fastrand::Rng) -> Self {
        Self {
            dimensions: space.dimensions().to_vec(),
            rng,
            observations: Vec::new(),
        }
    }

    /// All `(x, y)` pairs told so far, failures included.
    #[must_use]
    pub fn observations(&self) -> &[(Vec<f64>, f64)] {
        &self.observations
    }
}

impl Optimizer for RandomSearch {
    fn ask(&mut self) -> Result<Vec<f64>> {
        random_point(&self.dimensions, &mut self.rng)
    }

    fn tell(&mut self, x: &[f64], y: f64, _fit: bool) -> Result<()> {
        check_len(&self.dimensions, x)?;
        self.observations.push((x.to_vec(), y));
        Ok(())
    }
}
