//! Random sampler implementation.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::choice::Bindings;
use crate::distribution::Distribution;
use crate::error::Result;
use crate::expr::Expr;
use crate::sampler::{SampleMemo, Sampler, draw_bindings};
use crate::variable::VarId;

/// Draws hierarchical bindings uniformly at random.
///
/// Each call to [`Sampler::sample`] is one sampling pass with a fresh memo.
/// Distributions can be overridden per variable id for integer, float and
/// single-choice list variables.
///
/// # Examples
///
/// ```
/// use metalg::sampler::{RandomSampler, Sampler};
/// use metalg::{Expr, Float};
///
/// let x: Expr = Float::new(0.0, 1.0).name("x").into();
///
/// let a = RandomSampler::with_seed(x.clone(), 42);
/// let b = RandomSampler::with_seed(x, 42);
/// assert_eq!(a.sample_n(5).unwrap(), b.sample_n(5).unwrap());
/// ```
pub struct RandomSampler {
    expression: Expr,
    rng: Mutex<fastrand::Rng>,
    seed: Option<u64>,
    overrides: Arc<HashMap<VarId, Distribution>>,
}

impl RandomSampler {
    /// Creates a random sampler with a default random seed.
    pub fn new(expression: impl Into<Expr>) -> Self {
        Self {
            expression: expression.into(),
            rng: Mutex::new(fastrand::Rng::new()),
            seed: None,
            overrides: Arc::new(HashMap::new()),
        }
    }

    /// Creates a random sampler with a fixed seed for reproducibility.
    ///
    /// Using the same seed on the same expression produces the same sequence
    /// of bindings.
    pub fn with_seed(expression: impl Into<Expr>, seed: u64) -> Self {
        Self {
            expression: expression.into(),
            rng: Mutex::new(fastrand::Rng::with_seed(seed)),
            seed: Some(seed),
            overrides: Arc::new(HashMap::new()),
        }
    }

    /// Draws the variable `id` from `distribution` instead of its own.
    #[must_use]
    pub fn with_distribution(mut self, id: impl Into<VarId>, distribution: Distribution) -> Self {
        Arc::make_mut(&mut self.overrides).insert(id.into(), distribution);
        self
    }
}

impl Sampler for RandomSampler {
    fn expression(&self) -> &Expr {
        &self.expression
    }

    fn sample(&self) -> Result<Bindings> {
        let mut rng = self.rng.lock();
        let mut memo = SampleMemo::with_overrides(Arc::clone(&self.overrides));
        let bindings = draw_bindings(&self.expression, &mut rng, &mut memo)?;
        trace_debug!(bindings = %bindings, "bindings drawn");
        Ok(bindings)
    }

    fn seed(&self) -> Option<u64> {
        self.seed
    }
}
