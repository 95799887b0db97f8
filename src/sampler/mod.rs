//! Hierarchical sampling of complete bindings.
//!
//! [`draw_bindings`] starts from a tree's [`choices`](Expr::choices), draws
//! each variable once per pass and, whenever a list selects branches, descends
//! into the variables those branches activate. Variables in unselected
//! branches are never drawn.

pub mod random;

use std::collections::HashMap;
use std::sync::Arc;

pub use random::RandomSampler;

use crate::choice::{Bindings, Choice};
use crate::distribution::Distribution;
use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::variable::{VarId, VarKind};

/// Per-pass record of draws, keyed by node identity.
///
/// A variable referenced from several places is drawn once per pass. The memo
/// also carries optional per-id distribution overrides.
#[derive(Debug, Default)]
pub struct SampleMemo {
    draws: HashMap<usize, Choice>,
    overrides: Option<Arc<HashMap<VarId, Distribution>>>,
}

impl SampleMemo {
    /// Creates an empty memo.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty memo that draws the given ids from the given
    /// distributions instead of their own.
    #[must_use]
    pub fn with_overrides(overrides: Arc<HashMap<VarId, Distribution>>) -> Self {
        Self {
            draws: HashMap::new(),
            overrides: Some(overrides),
        }
    }

    /// Returns the draw for `var`, drawing it first if this pass has not.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAVariable`] if `var` is not a variable node, or the
    /// variable's own draw error.
    pub fn sample(&mut self, var: &Expr, rng: &mut fastrand::Rng) -> Result<Choice> {
        let key = var.node_addr();
        if let Some(choice) = self.draws.get(&key) {
            return Ok(choice.clone());
        }
        let v = var
            .as_var()
            .ok_or_else(|| Error::NotAVariable(var.to_string()))?;
        let choice = v.draw(rng, self)?;
        self.draws.insert(key, choice.clone());
        Ok(choice)
    }

    pub(crate) fn override_for(&self, id: &VarId) -> Option<&Distribution> {
        self.overrides.as_ref().and_then(|o| o.get(id))
    }

    /// Number of variables drawn in this pass.
    #[must_use]
    pub fn len(&self) -> usize {
        self.draws.len()
    }

    /// Returns `true` if nothing was drawn yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }
}

/// Draws one complete binding for `expr`.
///
/// Every variable reachable under the drawn list choices gets an entry, in
/// the order they are encountered; no inactive-branch variable does.
///
/// # Errors
///
/// Returns an error if a reachable variable is malformed.
pub fn draw_bindings(expr: &Expr, rng: &mut fastrand::Rng, memo: &mut SampleMemo) -> Result<Bindings> {
    let mut out = Bindings::new();
    draw_into(&expr.choices(), rng, memo, &mut out)?;
    Ok(out)
}

fn draw_into(
    vars: &[Expr],
    rng: &mut fastrand::Rng,
    memo: &mut SampleMemo,
    out: &mut Bindings,
) -> Result<()> {
    for var_expr in vars {
        let Some(var) = var_expr.as_var() else {
            continue;
        };
        if out.contains(var.id().as_str()) {
            continue;
        }
        let choice = memo.sample(var_expr, rng)?;
        out.insert(var.id(), choice.clone());

        if let VarKind::List(spec) = var.kind() {
            for term in spec.selected(&choice) {
                draw_into(&term.choices(), rng, memo, out)?;
            }
        }
    }
    Ok(())
}

/// A source of complete bindings for one expression.
pub trait Sampler: Send + Sync {
    /// The expression this sampler draws for.
    fn expression(&self) -> &Expr;

    /// Draws one binding.
    ///
    /// # Errors
    ///
    /// Returns an error if a reachable variable is malformed.
    fn sample(&self) -> Result<Bindings>;

    /// The seed, if the sampler was built with one.
    fn seed(&self) -> Option<u64> {
        None
    }

    /// Draws `n` independent bindings.
    ///
    /// # Errors
    ///
    /// Stops at the first failing draw.
    fn sample_n(&self, n: usize) -> Result<Vec<Bindings>> {
        (0..n).map(|_| self.sample()).collect()
    }

    /// Draws a binding and returns it with a frozen copy of the expression.
    ///
    /// # Errors
    ///
    /// Returns draw or freeze errors.
    fn sample_program(&self) -> Result<(Bindings, Expr)> {
        let bindings = self.sample()?;
        let program = self.expression().clone_shallow().frozen(&bindings)?;
        Ok((bindings, program))
    }
}
