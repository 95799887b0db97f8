use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;
use crate::expr::Expr;
use crate::optimizer::Optimizer;
use crate::search::{Search, Shared};
use crate::space::SearchSpace;
use crate::types::{Direction, SearchState};

/// A builder for constructing [`Search`] instances with a fluent API.
///
/// # Defaults
///
/// - Direction: [`Minimize`](Direction::Minimize)
/// - Optimizer: [`BayesianOptimizer`](crate::optimizer::BayesianOptimizer)
///   with the `gp` feature, [`RandomSearch`](crate::optimizer::RandomSearch)
///   otherwise
/// - Limit: none
///
/// # Examples
///
/// ```
/// use metalg::{Direction, Expr, Int, Search, SearchSpace};
/// use metalg::optimizer::RandomSearch;
///
/// let x: Expr = Int::new(0, 9).into();
/// let space = SearchSpace::from_expr(&x).unwrap();
///
/// let search = Search::builder(x)
///     .optimizer(RandomSearch::with_seed(&space, 1))
///     .maximize()
///     .limit(5)
///     .build()
///     .unwrap();
/// assert_eq!(search.direction(), Direction::Maximize);
/// assert_eq!(search.count(), 5);
/// ```
pub struct SearchBuilder {
    expression: Expr,
    optimizer: Option<Box<dyn Optimizer>>,
    direction: Direction,
    limit: Option<usize>,
    seed: Option<u64>,
}

impl SearchBuilder {
    pub(super) fn new(expression: Expr) -> Self {
        Self {
            expression,
            optimizer: None,
            direction: Direction::Minimize,
            limit: None,
            seed: None,
        }
    }

    /// Sets the optimizer. It must have been built over this expression's
    /// [`SearchSpace`].
    #[must_use]
    pub fn optimizer(mut self, optimizer: impl Optimizer + 'static) -> Self {
        self.optimizer = Some(Box::new(optimizer));
        self
    }

    /// Stops after `n` proposals.
    #[must_use]
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Seeds the default optimizer. Ignored when an optimizer is set.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Minimize the objective (the default).
    #[must_use]
    pub fn minimize(mut self) -> Self {
        self.direction = Direction::Minimize;
        self
    }

    /// Maximize the objective.
    #[must_use]
    pub fn maximize(mut self) -> Self {
        self.direction = Direction::Maximize;
        self
    }

    /// Sets the optimization direction explicitly.
    #[must_use]
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Builds the search.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDimension`](crate::Error::UnsupportedDimension)
    /// if a variable cannot be encoded, or the validation error of a
    /// malformed variable.
    pub fn build(self) -> Result<Search> {
        let space = SearchSpace::from_expr(&self.expression)?;

        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!(
            "search",
            dimensions = space.len(),
            limit = ?self.limit,
            direction = ?self.direction
        )
        .entered();

        let optimizer = match self.optimizer {
            Some(o) => o,
            None => default_optimizer(&space, self.seed),
        };
        trace_debug!(dimensions = %space, "search space built");

        Ok(Search {
            expression: self.expression,
            space,
            shared: Arc::new(Shared {
                optimizer: Mutex::new(optimizer),
                history: Mutex::new(Vec::new()),
                direction: self.direction,
            }),
            limit: self.limit,
            next_index: 0,
            state: SearchState::Iterating,
        })
    }
}

#[cfg(feature = "gp")]
fn default_optimizer(space: &SearchSpace, seed: Option<u64>) -> Box<dyn Optimizer> {
    let builder = crate::optimizer::BayesianOptimizer::builder();
    let builder = match seed {
        Some(seed) => builder.seed(seed),
        None => builder,
    };
    Box::new(builder.build(space))
}

#[cfg(not(feature = "gp"))]
fn default_optimizer(space: &SearchSpace, seed: Option<u64>) -> Box<dyn Optimizer> {
    Box::new(match seed {
        Some(seed) => crate::optimizer::RandomSearch::with_seed(space, seed),
        None => crate::optimizer::RandomSearch::new(space),
    })
}
