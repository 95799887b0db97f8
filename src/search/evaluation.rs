use std::sync::Arc;

use crate::choice::Bindings;
use crate::error::Result;
use crate::expr::Expr;
use crate::optimizer::OBJECTIVE_VALUE_FAILURE;
use crate::search::Shared;
use crate::value::Value;

/// One proposed program variant.
///
/// Holds the decoded bindings, the optimizer vector they came from and a
/// frozen copy of the template. Report the objective with
/// [`report`](Self::report) or [`report_failure`](Self::report_failure);
/// only the first report reaches the optimizer.
pub struct Evaluation {
    index: usize,
    bindings: Bindings,
    vector: Vec<f64>,
    program: Expr,
    reported: bool,
    shared: Arc<Shared>,
}

impl Evaluation {
    pub(crate) fn new(index: usize, bindings: Bindings, vector: Vec<f64>, program: Expr, shared: Arc<Shared>) -> Self {
        Self {
            index,
            bindings,
            vector,
            program,
            reported: false,
            shared,
        }
    }

    /// Zero-based iteration index.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The bindings of every variable.
    #[must_use]
    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// The optimizer vector the bindings were decoded from.
    #[must_use]
    pub fn vector(&self) -> &[f64] {
        &self.vector
    }

    /// The frozen program.
    #[must_use]
    pub fn program(&self) -> &Expr {
        &self.program
    }

    /// Evaluates the frozen program.
    ///
    /// # Errors
    ///
    /// Propagates evaluation errors.
    pub fn evaluate(&self) -> Result<Value> {
        self.program.evaluate()
    }

    /// Reports the objective value.
    ///
    /// Returns `Ok(true)` if the value was forwarded to the optimizer and
    /// `Ok(false)` if this evaluation was already reported.
    ///
    /// # Errors
    ///
    /// Propagates the optimizer's `tell` error.
    pub fn report(&mut self, y: f64) -> Result<bool> {
        if self.reported {
            trace_debug!(index = self.index, "repeated report ignored");
            return Ok(false);
        }
        self.shared
            .optimizer
            .lock()
            .tell(&self.vector, self.shared.direction.to_minimized(y), true)?;
        self.reported = true;
        trace_info!(index = self.index, value = y, "objective reported");
        self.shared.history.lock().push(Observation {
            index: self.index,
            bindings: self.bindings.clone(),
            vector: self.vector.clone(),
            value: y,
        });
        Ok(true)
    }

    /// Reports a failed evaluation.
    ///
    /// # Errors
    ///
    /// Same as [`report`](Self::report).
    pub fn report_failure(&mut self) -> Result<bool> {
        self.report(OBJECTIVE_VALUE_FAILURE)
    }

    /// Returns `true` once a report was forwarded.
    #[must_use]
    pub fn is_reported(&self) -> bool {
        self.reported
    }
}

impl core::fmt::Debug for Evaluation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Evaluation")
            .field("index", &self.index)
            .field("bindings", &self.bindings)
            .field("vector", &self.vector)
            .field("program", &self.program)
            .field("reported", &self.reported)
            .finish_non_exhaustive()
    }
}

/// A reported evaluation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Observation {
    /// Iteration index.
    pub index: usize,
    /// The evaluated bindings.
    pub bindings: Bindings,
    /// The optimizer vector.
    pub vector: Vec<f64>,
    /// The reported objective, in the caller's direction.
    pub value: f64,
}

impl Observation {
    /// Returns `true` if this records a failed evaluation.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.value.is_nan()
    }
}

#[cfg(test)]
mod tests {
    use crate::expr::Expr;
    use crate::search::Search;
    use crate::variable::Float;

    #[test]
    fn test_second_report_is_ignored() {
        let x: Expr = Float::new(0.0, 1.0).name("x").into();
        let mut search = Search::builder(x).limit(1).seed(2).build().unwrap();
        let (_, mut e) = search.next().unwrap().unwrap();
        assert!(!e.is_reported());
        assert!(e.report(1.0).unwrap());
        assert!(!e.report(2.0).unwrap());
        assert!(!e.report_failure().unwrap());
        assert!(e.is_reported());

        let history = search.history();
        assert_eq!(history.len(), 1);
        assert!((history[0].value - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_program_matches_bindings() {
        let x: Expr = Float::new(0.0, 1.0).name("x").into();
        let program = &x + 1.0;
        let mut search = Search::builder(program).limit(1).seed(2).build().unwrap();
        let (_, e) = search.next().unwrap().unwrap();
        let bound = e.bindings().get("x").and_then(crate::Choice::as_f64).unwrap();
        let y = e.evaluate().unwrap().as_f64().unwrap();
        assert!((y - (bound + 1.0)).abs() < 1e-12);
        assert!((e.vector()[0] - bound).abs() < 1e-12);
        // The template is left unbound.
        assert!(!x.as_var().unwrap().is_bound());
    }
}
