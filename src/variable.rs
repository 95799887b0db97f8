//! Search-space leaves: categorical lists, integer ranges and float ranges.
//!
//! Variables are built with [`List`], [`Int`] and [`Float`] and become
//! [`Expr`] nodes on conversion. Each variable has a [`VarId`] assigned when
//! the builder is created and a bound [`Choice`] that `freeze` sets.
//!
//! Bounds and list selection counts may themselves be variables, which makes
//! the space nested:
//!
//! ```
//! use metalg::{Expr, Int};
//!
//! let units1: Expr = Int::new(32, 512).name("units1").into();
//! let units2: Expr = Int::new(32, &units1).name("units2").into();
//!
//! let names: Vec<_> = units2.variables().iter().map(|v| v.to_string()).collect();
//! assert_eq!(names.len(), 2);
//! ```

use core::borrow::Borrow;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::choice::{Bindings, Choice};
use crate::distribution::Distribution;
use crate::error::{Error, Result};
use crate::expr::{Expr, ExprKind, Term};
use crate::sampler::SampleMemo;

static NEXT_VAR_ID: AtomicU64 = AtomicU64::new(0);

/// Resets the counter used for unnamed variable ids back to zero.
///
/// Intended for tests that assert on generated ids.
pub fn reset_var_ids() {
    NEXT_VAR_ID.store(0, Ordering::SeqCst);
}

/// The stable identifier of a variable.
///
/// Either a user-supplied name or the decimal rendering of a process-wide
/// counter. Clones of a variable keep its id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(Arc<str>);

impl VarId {
    /// Creates an id from a user-supplied name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Allocates the next counter-based id.
    pub(crate) fn next() -> Self {
        let n = NEXT_VAR_ID.fetch_add(1, Ordering::SeqCst);
        Self(Arc::from(n.to_string()))
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for VarId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VarId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for VarId {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl From<&VarId> for VarId {
    fn from(id: &VarId) -> Self {
        id.clone()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for VarId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for VarId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        Ok(VarId::from(s))
    }
}

/// The selection count of a [`List`]: fixed or given by an integer variable.
#[derive(Clone, Debug, PartialEq)]
pub enum Count {
    /// A fixed number of selected items.
    Fixed(usize),
    /// The number of selected items is the value of an integer variable.
    Var(Expr),
}

impl From<usize> for Count {
    fn from(k: usize) -> Self {
        Count::Fixed(k)
    }
}

impl From<Expr> for Count {
    fn from(e: Expr) -> Self {
        Count::Var(e)
    }
}

impl From<&Expr> for Count {
    fn from(e: &Expr) -> Self {
        Count::Var(e.clone())
    }
}

impl From<Int> for Count {
    fn from(v: Int) -> Self {
        Count::Var(v.into())
    }
}

/// A bound of an [`Int`] or [`Float`]: fixed or given by another variable.
#[derive(Clone, Debug, PartialEq)]
pub enum Limit<T> {
    /// A constant bound.
    Fixed(T),
    /// The bound is the value of another variable.
    Var(Expr),
}

impl From<i64> for Limit<i64> {
    fn from(v: i64) -> Self {
        Limit::Fixed(v)
    }
}

impl From<f64> for Limit<f64> {
    fn from(v: f64) -> Self {
        Limit::Fixed(v)
    }
}

impl<T> From<Expr> for Limit<T> {
    fn from(e: Expr) -> Self {
        Limit::Var(e)
    }
}

impl<T> From<&Expr> for Limit<T> {
    fn from(e: &Expr) -> Self {
        Limit::Var(e.clone())
    }
}

impl<T> From<Int> for Limit<T> {
    fn from(v: Int) -> Self {
        Limit::Var(v.into())
    }
}

impl<T> From<Float> for Limit<T> {
    fn from(v: Float) -> Self {
        Limit::Var(v.into())
    }
}

impl<T: fmt::Display> fmt::Display for Limit<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Fixed(v) => write!(f, "{v}"),
            Limit::Var(e) => write!(f, "{e}"),
        }
    }
}

/// Configuration of a categorical list variable.
#[derive(Clone, Debug, PartialEq)]
pub struct ListSpec {
    pub(crate) values: Vec<Term>,
    pub(crate) k: Option<Count>,
    pub(crate) replace: bool,
    pub(crate) invariant: bool,
}

impl ListSpec {
    /// The candidate values.
    #[must_use]
    pub fn values(&self) -> &[Term] {
        &self.values
    }

    /// The selection count, if any.
    #[must_use]
    pub fn k(&self) -> Option<&Count> {
        self.k.as_ref()
    }

    /// Whether indices are drawn with replacement.
    #[must_use]
    pub fn replace(&self) -> bool {
        self.replace
    }

    /// Whether the selection is always a prefix of the values.
    #[must_use]
    pub fn invariant(&self) -> bool {
        self.invariant
    }

    /// The terms selected by `choice`, in selection order.
    ///
    /// Indices outside the list are skipped.
    pub(crate) fn selected<'a>(&'a self, choice: &Choice) -> Vec<&'a Term> {
        match choice {
            Choice::Indices(idx) => idx.iter().filter_map(|&i| self.values.get(i)).collect(),
            other => other
                .as_i64()
                .and_then(|i| usize::try_from(i).ok())
                .and_then(|i| self.values.get(i))
                .into_iter()
                .collect(),
        }
    }
}

/// Configuration of a numeric range variable.
#[derive(Clone, Debug, PartialEq)]
pub struct RangeSpec<T> {
    pub(crate) low: Limit<T>,
    pub(crate) high: Limit<T>,
    pub(crate) log_scale: bool,
    /// Built once when both bounds are fixed and valid.
    pub(crate) distribution: Option<Distribution>,
}

impl<T> RangeSpec<T> {
    /// The lower bound.
    #[must_use]
    pub fn low(&self) -> &Limit<T> {
        &self.low
    }

    /// The upper bound (inclusive).
    #[must_use]
    pub fn high(&self) -> &Limit<T> {
        &self.high
    }

    /// Whether values are drawn in log space.
    #[must_use]
    pub fn log_scale(&self) -> bool {
        self.log_scale
    }

    /// The distribution for fixed bounds.
    #[must_use]
    pub fn distribution(&self) -> Option<&Distribution> {
        self.distribution.as_ref()
    }

    fn limit_exprs(&self) -> impl Iterator<Item = &Expr> {
        [&self.low, &self.high].into_iter().filter_map(|l| match l {
            Limit::Var(e) => Some(e),
            Limit::Fixed(_) => None,
        })
    }
}

/// The concrete kind of a variable.
#[derive(Clone, Debug, PartialEq)]
pub enum VarKind {
    /// A categorical choice among values.
    List(ListSpec),
    /// An integer range `[low, high]`.
    Int(RangeSpec<i64>),
    /// A float range `[low, high]`.
    Float(RangeSpec<f64>),
}

/// A variable node: one dimension of the search space.
#[derive(Debug)]
pub struct Variable {
    pub(crate) id: VarId,
    pub(crate) kind: VarKind,
    pub(crate) bound: RwLock<Option<Choice>>,
}

impl Variable {
    pub(crate) fn new(id: VarId, kind: VarKind) -> Self {
        Self {
            id,
            kind,
            bound: RwLock::new(None),
        }
    }

    /// The variable id.
    #[must_use]
    pub fn id(&self) -> &VarId {
        &self.id
    }

    /// The variable configuration.
    #[must_use]
    pub fn kind(&self) -> &VarKind {
        &self.kind
    }

    /// The currently bound value, if any.
    #[must_use]
    pub fn bound(&self) -> Option<Choice> {
        self.bound.read().clone()
    }

    /// Returns `true` if a value is bound.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.bound.read().is_some()
    }

    /// Clears the bound value.
    pub fn unbind(&self) {
        *self.bound.write() = None;
    }

    /// Variables this one depends on structurally: a list's count variable or
    /// a range's bound variables.
    pub(crate) fn structural_children(&self) -> Vec<&Expr> {
        match &self.kind {
            VarKind::List(spec) => match &spec.k {
                Some(Count::Var(e)) => vec![e],
                _ => Vec::new(),
            },
            VarKind::Int(spec) => spec.limit_exprs().collect(),
            VarKind::Float(spec) => spec.limit_exprs().collect(),
        }
    }

    /// Branch terms of a list, empty for ranges.
    pub(crate) fn branches(&self) -> &[Term] {
        match &self.kind {
            VarKind::List(spec) => &spec.values,
            _ => &[],
        }
    }

    /// Draws a value, resolving count and bound variables through `memo`.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is malformed: empty list, invalid
    /// bounds, or a count larger than the list without replacement.
    #[allow(clippy::cast_possible_wrap)]
    pub(crate) fn draw(&self, rng: &mut fastrand::Rng, memo: &mut SampleMemo) -> Result<Choice> {
        if let Some(d) = memo.override_for(&self.id) {
            let single_choice = !matches!(&self.kind, VarKind::List(spec) if spec.k.is_some());
            if single_choice {
                return Ok(d.draw_one(rng));
            }
        }

        match &self.kind {
            VarKind::Int(spec) => {
                if let Some(d) = &spec.distribution {
                    return Ok(d.draw_one(rng));
                }
                let low = self.resolve_int(&spec.low, rng, memo)?;
                let high = self.resolve_int(&spec.high, rng, memo)?;
                Ok(Distribution::int(low, high, spec.log_scale)?.draw_one(rng))
            }
            VarKind::Float(spec) => {
                if let Some(d) = &spec.distribution {
                    return Ok(d.draw_one(rng));
                }
                let low = self.resolve_float(&spec.low, rng, memo)?;
                let high = self.resolve_float(&spec.high, rng, memo)?;
                Ok(Distribution::float(low, high, spec.log_scale)?.draw_one(rng))
            }
            VarKind::List(spec) => {
                let n = spec.values.len();
                if n == 0 {
                    return Err(Error::EmptyChoices);
                }
                let Some(count) = &spec.k else {
                    if spec.invariant {
                        return Ok(Choice::Int(0));
                    }
                    return Ok(Choice::Int(rng.usize(0..n) as i64));
                };
                let k = match count {
                    Count::Fixed(k) => *k,
                    Count::Var(e) => self.resolve_count(memo.sample(e, rng)?)?,
                };
                if k > n && !(spec.replace && !spec.invariant) {
                    return Err(self.count_out_of_range(k, n));
                }
                let indices = if spec.invariant {
                    (0..k).collect()
                } else if spec.replace {
                    (0..k).map(|_| rng.usize(0..n)).collect()
                } else {
                    // Partial Fisher-Yates: the first k slots end up distinct.
                    let mut pool: Vec<usize> = (0..n).collect();
                    for i in 0..k {
                        let j = rng.usize(i..n);
                        pool.swap(i, j);
                    }
                    pool.truncate(k);
                    pool
                };
                Ok(Choice::Indices(indices))
            }
        }
    }

    fn resolve_int(&self, limit: &Limit<i64>, rng: &mut fastrand::Rng, memo: &mut SampleMemo) -> Result<i64> {
        match limit {
            Limit::Fixed(v) => Ok(*v),
            Limit::Var(e) => {
                let choice = memo.sample(e, rng)?;
                self.integral(&choice, e)
            }
        }
    }

    fn resolve_float(&self, limit: &Limit<f64>, rng: &mut fastrand::Rng, memo: &mut SampleMemo) -> Result<f64> {
        match limit {
            Limit::Fixed(v) => Ok(*v),
            Limit::Var(e) => memo.sample(e, rng)?.as_f64().ok_or_else(|| Error::InvalidChoice {
                id: self.id.clone(),
                reason: format!("bound '{e}' is not numeric"),
            }),
        }
    }

    fn integral(&self, choice: &Choice, source: &Expr) -> Result<i64> {
        choice.as_i64().ok_or_else(|| Error::InvalidChoice {
            id: self.id.clone(),
            reason: format!("value {choice} of '{source}' is not an integer"),
        })
    }

    fn resolve_count(&self, choice: Choice) -> Result<usize> {
        choice
            .as_i64()
            .and_then(|k| usize::try_from(k).ok())
            .ok_or_else(|| Error::InvalidChoice {
                id: self.id.clone(),
                reason: format!("selection count {choice} is not a non-negative integer"),
            })
    }

    fn count_out_of_range(&self, k: usize, n: usize) -> Error {
        Error::OutOfRange {
            id: self.id.clone(),
            value: format!("k={k}"),
            bounds: format!("[0, {n}]"),
        }
    }

    /// Binds this variable from `bindings` and freezes what it activates.
    ///
    /// Count and bound variables are frozen first so that the value can be
    /// checked against them; for a list, the selected branches are frozen with
    /// the same map.
    ///
    /// # Errors
    ///
    /// [`Error::MissingBinding`] if the id (or an active descendant id) is
    /// absent, [`Error::OutOfRange`] if the value violates the declared
    /// bounds, [`Error::InvalidChoice`] for a value of the wrong kind.
    pub fn freeze(&self, bindings: &Bindings) -> Result<()> {
        let choice = bindings
            .get(self.id.as_str())
            .ok_or_else(|| Error::MissingBinding(self.id.clone()))?;

        for child in self.structural_children() {
            // A bound variable absent from the map keeps its current value.
            let keep = child
                .as_var()
                .is_some_and(|v| v.is_bound() && !bindings.contains(v.id.as_str()));
            if !keep {
                child.freeze(bindings)?;
            }
        }

        let normalized = match &self.kind {
            VarKind::Int(spec) => {
                let v = choice.as_i64().ok_or_else(|| self.wrong_kind(choice, "an integer"))?;
                let low = self.current_int(&spec.low)?;
                let high = self.current_int(&spec.high)?;
                check_bounds(low, high)?;
                if v < low || v > high {
                    return Err(self.out_of_range(v, low, high));
                }
                Choice::Int(v)
            }
            VarKind::Float(spec) => {
                let v = choice.as_f64().ok_or_else(|| self.wrong_kind(choice, "a number"))?;
                let low = self.current_float(&spec.low)?;
                let high = self.current_float(&spec.high)?;
                if low > high {
                    return Err(Error::InvalidBounds { low, high });
                }
                if !(low..=high).contains(&v) {
                    return Err(self.out_of_range(v, low, high));
                }
                Choice::Float(v)
            }
            VarKind::List(spec) => self.validate_indices(spec, choice)?,
        };

        *self.bound.write() = Some(normalized.clone());

        if let VarKind::List(spec) = &self.kind {
            for term in spec.selected(&normalized) {
                term.freeze(bindings)?;
            }
        }
        Ok(())
    }

    #[allow(clippy::cast_possible_wrap)]
    fn validate_indices(&self, spec: &ListSpec, choice: &Choice) -> Result<Choice> {
        let n = spec.values.len();
        if n == 0 {
            return Err(Error::EmptyChoices);
        }
        let check = |i: i64| -> Result<usize> {
            usize::try_from(i)
                .ok()
                .filter(|&i| i < n)
                .ok_or_else(|| Error::OutOfRange {
                    id: self.id.clone(),
                    value: i.to_string(),
                    bounds: format!("[0, {n})"),
                })
        };

        let Some(count) = &spec.k else {
            let index = match choice {
                Choice::Indices(idx) if idx.len() == 1 => i64::try_from(idx[0]).unwrap_or(i64::MAX),
                other => other.as_i64().ok_or_else(|| self.wrong_kind(other, "an index"))?,
            };
            let index = check(index)?;
            if spec.invariant && index != 0 {
                return Err(self.invalid(format!("invariant list selects index 0, got {index}")));
            }
            return Ok(Choice::Int(index as i64));
        };

        let indices: Vec<usize> = match choice {
            Choice::Indices(idx) => idx
                .iter()
                .map(|&i| check(i64::try_from(i).unwrap_or(i64::MAX)))
                .collect::<Result<_>>()?,
            other => vec![check(other.as_i64().ok_or_else(|| self.wrong_kind(other, "an index set"))?)?],
        };

        let expected = match count {
            Count::Fixed(k) => Some(*k),
            Count::Var(e) => e
                .as_var()
                .and_then(Variable::bound)
                .and_then(|c| c.as_i64())
                .and_then(|k| usize::try_from(k).ok()),
        };
        if let Some(k) = expected
            && indices.len() != k
        {
            return Err(self.invalid(format!(
                "expected {k} indices, got {}",
                indices.len()
            )));
        }
        if spec.invariant && indices.iter().enumerate().any(|(pos, &i)| pos != i) {
            return Err(self.invalid(format!(
                "invariant list must select a prefix, got {indices:?}"
            )));
        }
        if !spec.replace && !spec.invariant {
            let mut seen = vec![false; n];
            for &i in &indices {
                if core::mem::replace(&mut seen[i], true) {
                    return Err(self.invalid(format!("index {i} selected twice without replacement")));
                }
            }
        }
        Ok(Choice::Indices(indices))
    }

    fn current_int(&self, limit: &Limit<i64>) -> Result<i64> {
        match limit {
            Limit::Fixed(v) => Ok(*v),
            Limit::Var(e) => {
                let choice = self.current(e)?;
                self.integral(&choice, e)
            }
        }
    }

    fn current_float(&self, limit: &Limit<f64>) -> Result<f64> {
        match limit {
            Limit::Fixed(v) => Ok(*v),
            Limit::Var(e) => self.current(e)?.as_f64().ok_or_else(|| Error::InvalidChoice {
                id: self.id.clone(),
                reason: format!("bound '{e}' is not numeric"),
            }),
        }
    }

    fn current(&self, e: &Expr) -> Result<Choice> {
        let var = e.as_var().ok_or_else(|| Error::NotAVariable(e.to_string()))?;
        var.bound().ok_or_else(|| Error::MissingBinding(var.id.clone()))
    }

    fn wrong_kind(&self, choice: &Choice, expected: &str) -> Error {
        self.invalid(format!("expected {expected}, got {choice}"))
    }

    fn invalid(&self, reason: String) -> Error {
        Error::InvalidChoice {
            id: self.id.clone(),
            reason,
        }
    }

    fn out_of_range<T: fmt::Display>(&self, value: T, low: T, high: T) -> Error {
        Error::OutOfRange {
            id: self.id.clone(),
            value: value.to_string(),
            bounds: format!("[{low}, {high}]"),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn check_bounds(low: i64, high: i64) -> Result<()> {
    if low > high {
        return Err(Error::InvalidBounds {
            low: low as f64,
            high: high as f64,
        });
    }
    Ok(())
}

impl PartialEq for Variable {
    /// Same kind, same configuration and same bound value. Ids are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && *self.bound.read_recursive() == *other.bound.read_recursive()
    }
}

/// Builder for a categorical list variable.
///
/// # Examples
///
/// ```
/// use metalg::{Bindings, Expr, List, Value};
///
/// let x: Expr = List::new([1, 2, 3]).name("x").into();
/// x.freeze(&Bindings::from([("x", 2)])).unwrap();
/// assert_eq!(x.evaluate().unwrap(), Value::Int(3));
/// ```
#[derive(Clone, Debug)]
#[must_use]
pub struct List {
    id: VarId,
    values: Vec<Term>,
    k: Option<Count>,
    replace: bool,
    invariant: bool,
}

impl List {
    /// Creates a list variable over `values`.
    pub fn new<T: Into<Term>>(values: impl IntoIterator<Item = T>) -> Self {
        Self {
            id: VarId::next(),
            values: values.into_iter().map(Into::into).collect(),
            k: None,
            replace: false,
            invariant: false,
        }
    }

    /// Selects `k` items instead of one. `k` may be an integer variable.
    pub fn k(mut self, k: impl Into<Count>) -> Self {
        self.k = Some(k.into());
        self
    }

    /// Draws indices with replacement.
    pub fn replace(mut self) -> Self {
        self.replace = true;
        self
    }

    /// Makes the selection order-invariant: the first item (or the first `k`
    /// items) is always selected.
    pub fn invariant(mut self) -> Self {
        self.invariant = true;
        self
    }

    /// Sets a user-facing id.
    pub fn name(mut self, name: impl AsRef<str>) -> Self {
        self.id = VarId::new(name);
        self
    }
}

impl From<List> for Expr {
    fn from(b: List) -> Self {
        Expr::from_kind(ExprKind::Var(Variable::new(
            b.id,
            VarKind::List(ListSpec {
                values: b.values,
                k: b.k,
                replace: b.replace,
                invariant: b.invariant,
            }),
        )))
    }
}

/// Builder for an integer range variable with inclusive bounds.
///
/// # Examples
///
/// ```
/// use metalg::{Bindings, Error, Expr, Int};
///
/// let x: Expr = Int::new(0, 10).name("x").into();
/// let err = x.freeze(&Bindings::from([("x", 11)])).unwrap_err();
/// assert!(matches!(err, Error::OutOfRange { .. }));
/// ```
#[derive(Clone, Debug)]
#[must_use]
pub struct Int {
    id: VarId,
    low: Limit<i64>,
    high: Limit<i64>,
    log_scale: bool,
}

impl Int {
    /// Creates an integer variable over `[low, high]`.
    pub fn new(low: impl Into<Limit<i64>>, high: impl Into<Limit<i64>>) -> Self {
        Self {
            id: VarId::next(),
            low: low.into(),
            high: high.into(),
            log_scale: false,
        }
    }

    /// Enables log-scale sampling.
    pub fn log_scale(mut self) -> Self {
        self.log_scale = true;
        self
    }

    /// Sets a user-facing id.
    pub fn name(mut self, name: impl AsRef<str>) -> Self {
        self.id = VarId::new(name);
        self
    }
}

impl From<Int> for Expr {
    fn from(b: Int) -> Self {
        let distribution = match (&b.low, &b.high) {
            (Limit::Fixed(low), Limit::Fixed(high)) => {
                Distribution::int(*low, *high, b.log_scale).ok()
            }
            _ => None,
        };
        Expr::from_kind(ExprKind::Var(Variable::new(
            b.id,
            VarKind::Int(RangeSpec {
                low: b.low,
                high: b.high,
                log_scale: b.log_scale,
                distribution,
            }),
        )))
    }
}

/// Builder for a float range variable.
#[derive(Clone, Debug)]
#[must_use]
pub struct Float {
    id: VarId,
    low: Limit<f64>,
    high: Limit<f64>,
    log_scale: bool,
}

impl Float {
    /// Creates a float variable over `[low, high]`.
    pub fn new(low: impl Into<Limit<f64>>, high: impl Into<Limit<f64>>) -> Self {
        Self {
            id: VarId::next(),
            low: low.into(),
            high: high.into(),
            log_scale: false,
        }
    }

    /// Enables log-scale sampling.
    pub fn log_scale(mut self) -> Self {
        self.log_scale = true;
        self
    }

    /// Sets a user-facing id.
    pub fn name(mut self, name: impl AsRef<str>) -> Self {
        self.id = VarId::new(name);
        self
    }
}

impl From<Float> for Expr {
    fn from(b: Float) -> Self {
        let distribution = match (&b.low, &b.high) {
            (Limit::Fixed(low), Limit::Fixed(high)) => {
                Distribution::float(*low, *high, b.log_scale).ok()
            }
            _ => None,
        };
        Expr::from_kind(ExprKind::Var(Variable::new(
            b.id,
            VarKind::Float(RangeSpec {
                low: b.low,
                high: b.high,
                log_scale: b.log_scale,
                distribution,
            }),
        )))
    }
}
