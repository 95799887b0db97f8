//! The optimization loop.
//!
//! A [`Search`] fixes the variable-to-vector order of its expression once, at
//! construction. Every iteration asks the optimizer for a vector, decodes it
//! into [`Bindings`], freezes a shallow clone of the expression and yields it
//! as an [`Evaluation`]. The caller evaluates the program and reports the
//! objective back.
//!
//! # Examples
//!
//! ```
//! use metalg::{Expr, Float, Search};
//!
//! let x: Expr = Float::new(-2.0, 2.0).name("x").into();
//! let program = &x * &x;
//!
//! let mut search = Search::builder(program).limit(20).seed(42).build().unwrap();
//! for item in search.by_ref() {
//!     let (_, mut evaluation) = item.unwrap();
//!     let y = evaluation.evaluate().unwrap().as_f64().unwrap();
//!     evaluation.report(y).unwrap();
//! }
//!
//! let best = search.best().unwrap();
//! assert!(best.value >= 0.0);
//! assert_eq!(search.history().len(), 20);
//! ```

mod builder;
mod evaluation;

use std::sync::Arc;

pub use builder::SearchBuilder;
pub use evaluation::{Evaluation, Observation};
use parking_lot::Mutex;

use crate::choice::Bindings;
use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::optimizer::{OBJECTIVE_VALUE_FAILURE, Optimizer};
use crate::sampler::Sampler;
use crate::space::SearchSpace;
use crate::types::{Direction, SearchState};

/// Shared between a search and the evaluations it yields.
pub(crate) struct Shared {
    pub(crate) optimizer: Mutex<Box<dyn Optimizer>>,
    pub(crate) history: Mutex<Vec<Observation>>,
    pub(crate) direction: Direction,
}

/// An iterator of evaluations proposed by an optimizer.
///
/// Created via [`Search::new`], [`Search::from_sampler`] or
/// [`Search::builder`]. Without a [`limit`](SearchBuilder::limit) the search
/// never ends on its own; stop iterating to cancel it.
pub struct Search {
    expression: Expr,
    space: SearchSpace,
    shared: Arc<Shared>,
    limit: Option<usize>,
    next_index: usize,
    state: SearchState,
}

impl Search {
    /// Creates an unlimited, minimizing search with the default optimizer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDimension`](crate::Error::UnsupportedDimension)
    /// if a variable cannot be encoded.
    pub fn new(expression: impl Into<Expr>) -> Result<Self> {
        Self::builder(expression).build()
    }

    /// Creates a search over a sampler's expression, seeded like the sampler.
    ///
    /// # Errors
    ///
    /// Same as [`Search::new`].
    pub fn from_sampler(sampler: &dyn Sampler) -> Result<Self> {
        let builder = Self::builder(sampler.expression().clone());
        match sampler.seed() {
            Some(seed) => builder.seed(seed).build(),
            None => builder.build(),
        }
    }

    /// Creates a builder for configuring a search.
    pub fn builder(expression: impl Into<Expr>) -> SearchBuilder {
        SearchBuilder::new(expression.into())
    }

    /// The template expression.
    #[must_use]
    pub fn expression(&self) -> &Expr {
        &self.expression
    }

    /// The dimension layout shared with the optimizer.
    #[must_use]
    pub fn space(&self) -> &SearchSpace {
        &self.space
    }

    /// The optimization direction.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.shared.direction
    }

    /// Whether more evaluations can be proposed.
    #[must_use]
    pub fn state(&self) -> SearchState {
        self.state
    }

    /// Every reported observation, in report order.
    #[must_use]
    pub fn history(&self) -> Vec<Observation> {
        self.shared.history.lock().clone()
    }

    /// The best successful observation, or `None` if nothing succeeded yet.
    ///
    /// Ties keep the earliest observation.
    #[must_use]
    pub fn best(&self) -> Option<Observation> {
        let direction = self.shared.direction;
        self.shared
            .history
            .lock()
            .iter()
            .filter(|o| !o.is_failure())
            .fold(None, |best: Option<&Observation>, o| match best {
                Some(b) if !direction.is_better(o.value, b.value) => Some(b),
                _ => Some(o),
            })
            .cloned()
    }

    fn propose(&mut self) -> Result<Evaluation> {
        let index = self.next_index;
        self.next_index += 1;

        let vector = self.shared.optimizer.lock().ask()?;
        let bindings = match self.space.decode(&vector) {
            Ok(bindings) => bindings,
            Err(e) => return Err(self.record_invalid(index, Bindings::new(), vector, e)),
        };
        let program = match self.expression.clone_shallow().frozen(&bindings) {
            Ok(program) => program,
            Err(e) => return Err(self.record_invalid(index, bindings, vector, e)),
        };
        trace_debug!(index, bindings = %bindings, "iteration proposed");

        Ok(Evaluation::new(index, bindings, vector, program, Arc::clone(&self.shared)))
    }

    /// Tells the optimizer that a proposal it made could not be turned into a
    /// program, and records the iteration as a failure. Returns `error`.
    fn record_invalid(&self, index: usize, bindings: Bindings, vector: Vec<f64>, error: Error) -> Error {
        trace_debug!(index, error = %error, "proposal rejected");
        let told = self
            .shared
            .optimizer
            .lock()
            .tell(&vector, OBJECTIVE_VALUE_FAILURE, false);
        if told.is_err() {
            trace_debug!(index, "failure report rejected by optimizer");
        }
        self.shared.history.lock().push(Observation {
            index,
            bindings,
            vector,
            value: OBJECTIVE_VALUE_FAILURE,
        });
        error
    }
}

impl Iterator for Search {
    type Item = Result<(usize, Evaluation)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == SearchState::Exhausted {
            return None;
        }
        if let Some(limit) = self.limit
            && self.next_index >= limit
        {
            self.state = SearchState::Exhausted;
            trace_info!(iterations = self.next_index, "search exhausted");
            return None;
        }
        Some(self.propose().map(|e| (e.index(), e)))
    }
}

impl core::fmt::Debug for Search {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Search")
            .field("expression", &self.expression)
            .field("dimensions", &self.space.len())
            .field("direction", &self.shared.direction)
            .field("limit", &self.limit)
            .field("next_index", &self.next_index)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
