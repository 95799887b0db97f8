//! Conversion between a tree's variables and flat optimizer vectors.
//!
//! The dimension order is fixed when the space is built: the order of
//! [`Expr::variables`]. Variables with no freedom of their own (invariant
//! lists) contribute a derived binding but no dimension.

use core::fmt;

use crate::choice::{Bindings, Choice};
use crate::distribution::Distribution;
use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::variable::{Count, Limit, VarId, VarKind};

/// One optimizer dimension.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimension {
    /// Variable id, or `id[i]` for the i-th pick of a multi-selection.
    pub name: String,
    /// The values this dimension ranges over.
    pub distribution: Distribution,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.distribution {
            Distribution::Float(d) => write!(f, "{}: real [{}, {}]", self.name, d.low, d.high),
            Distribution::Int(d) => write!(f, "{}: integer [{}, {}]", self.name, d.low, d.high),
            Distribution::Categorical(d) => {
                write!(f, "{}: categorical({})", self.name, d.n_choices)
            }
        }
    }
}

#[derive(Clone, Debug)]
enum Encoding {
    /// One dimension at `offset`.
    Scalar { offset: usize },
    /// `len` categorical dimensions starting at `offset`.
    Picks { offset: usize, len: usize },
    /// No dimension; always this choice.
    Constant(Choice),
    /// No dimension; the first `k` indices where `k` is another variable's value.
    Prefix(VarId),
}

/// The optimizer-facing view of an expression's variables.
///
/// # Examples
///
/// ```
/// use metalg::{Float, Int, List, SearchSpace};
///
/// let f = metalg::function("f", |_| Ok(metalg::Value::None));
/// let program = f.call(metalg::args![
///     Int::new(1, 8).name("depth"),
///     Float::new(0.0, 1.0).name("dropout"),
///     List::new(["relu", "tanh"]).name("act"),
/// ]);
///
/// let space = SearchSpace::from_expr(&program).unwrap();
/// assert_eq!(space.len(), 3);
///
/// let b = space.decode(&[3.2, 0.5, 1.0]).unwrap();
/// assert_eq!(b.get("depth"), Some(&metalg::Choice::Int(3)));
/// assert_eq!(space.encode(&b).unwrap(), vec![3.0, 0.5, 1.0]);
/// ```
#[derive(Clone, Debug)]
pub struct SearchSpace {
    dimensions: Vec<Dimension>,
    entries: Vec<(VarId, Encoding)>,
}

impl SearchSpace {
    /// Builds the space for every variable of `expr`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDimension`] for variables that have no
    /// fixed-shape encoding: ranges with variable bounds, distinct
    /// multi-selections, and non-invariant lists with a variable count. Also
    /// returns the validation error of malformed variables.
    #[allow(clippy::cast_possible_wrap)]
    pub fn from_expr(expr: &Expr) -> Result<Self> {
        let mut dimensions = Vec::new();
        let mut entries = Vec::new();

        for var_expr in expr.variables() {
            let Some(var) = var_expr.as_var() else {
                continue;
            };
            let id = var.id().clone();
            let unsupported = |reason| Error::UnsupportedDimension {
                id: id.clone(),
                reason,
            };

            let encoding = match var.kind() {
                VarKind::Int(spec) => {
                    let (Limit::Fixed(low), Limit::Fixed(high)) = (spec.low(), spec.high()) else {
                        return Err(unsupported("integer bounds are not fixed"));
                    };
                    dimensions.push(Dimension {
                        name: id.to_string(),
                        distribution: Distribution::int(*low, *high, spec.log_scale())?,
                    });
                    Encoding::Scalar {
                        offset: dimensions.len() - 1,
                    }
                }
                VarKind::Float(spec) => {
                    let (Limit::Fixed(low), Limit::Fixed(high)) = (spec.low(), spec.high()) else {
                        return Err(unsupported("float bounds are not fixed"));
                    };
                    dimensions.push(Dimension {
                        name: id.to_string(),
                        distribution: Distribution::float(*low, *high, spec.log_scale())?,
                    });
                    Encoding::Scalar {
                        offset: dimensions.len() - 1,
                    }
                }
                VarKind::List(spec) => {
                    let n = spec.values().len();
                    match (spec.k(), spec.invariant(), spec.replace()) {
                        (None, true, _) => Encoding::Constant(Choice::Int(0)),
                        (None, false, _) => {
                            dimensions.push(Dimension {
                                name: id.to_string(),
                                distribution: Distribution::categorical(n)?,
                            });
                            Encoding::Scalar {
                                offset: dimensions.len() - 1,
                            }
                        }
                        (Some(Count::Fixed(k)), true, _) => {
                            if *k > n {
                                return Err(unsupported("selection count exceeds the list length"));
                            }
                            Encoding::Constant(Choice::Indices((0..*k).collect()))
                        }
                        (Some(Count::Var(k)), true, _) => {
                            let k_var = k
                                .as_var()
                                .ok_or_else(|| Error::NotAVariable(k.to_string()))?;
                            Encoding::Prefix(k_var.id().clone())
                        }
                        (Some(Count::Fixed(k)), false, true) => {
                            let offset = dimensions.len();
                            for i in 0..*k {
                                dimensions.push(Dimension {
                                    name: format!("{id}[{i}]"),
                                    distribution: Distribution::categorical(n)?,
                                });
                            }
                            Encoding::Picks { offset, len: *k }
                        }
                        (Some(Count::Fixed(_)), false, false) => {
                            return Err(unsupported("distinct multi-selection has no fixed-shape encoding"));
                        }
                        (Some(Count::Var(_)), false, _) => {
                            return Err(unsupported("variable selection count requires an invariant list"));
                        }
                    }
                }
            };
            entries.push((id, encoding));
        }

        Ok(Self {
            dimensions,
            entries,
        })
    }

    /// The dimensions, in vector order.
    #[must_use]
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// Number of dimensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    /// Returns `true` if the space has no dimensions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Converts an optimizer vector into bindings for every variable.
    ///
    /// Integer and categorical components are rounded to the nearest integer
    /// and not clamped; out-of-range values are reported by `freeze`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if `x` has the wrong length, or
    /// [`Error::OutOfRange`] for a non-finite component or a negative pick.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn decode(&self, x: &[f64]) -> Result<Bindings> {
        if x.len() != self.dimensions.len() {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions.len(),
                got: x.len(),
            });
        }
        if let Some(i) = x.iter().position(|v| !v.is_finite()) {
            return Err(self.component_out_of_range(i, x[i]));
        }
        let mut decoded: Vec<Option<Choice>> = self
            .entries
            .iter()
            .map(|(_, encoding)| match encoding {
                Encoding::Scalar { offset } => Ok(Some(
                    self.dimensions[*offset].distribution.from_internal(x[*offset]),
                )),
                Encoding::Picks { offset, len } => (*offset..*offset + *len)
                    .map(|i| {
                        let r = x[i].round();
                        if r < 0.0 {
                            Err(self.component_out_of_range(i, x[i]))
                        } else {
                            Ok(r as usize)
                        }
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(|picks| Some(Choice::Indices(picks))),
                Encoding::Constant(c) => Ok(Some(c.clone())),
                Encoding::Prefix(_) => Ok(None),
            })
            .collect::<Result<_>>()?;

        // Prefixes read their count from another entry, which may come later.
        let prefixes: Vec<(usize, usize)> = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(i, (_, encoding))| match encoding {
                Encoding::Prefix(k_id) => {
                    let k = self
                        .entries
                        .iter()
                        .position(|(id, _)| id == k_id)
                        .and_then(|j| decoded[j].as_ref())
                        .and_then(Choice::as_i64)
                        .and_then(|k| usize::try_from(k).ok())
                        .unwrap_or(0);
                    Some((i, k))
                }
                _ => None,
            })
            .collect();
        for (i, k) in prefixes {
            decoded[i] = Some(Choice::Indices((0..k).collect()));
        }

        let mut out = Bindings::new();
        for ((id, _), choice) in self.entries.iter().zip(decoded) {
            if let Some(choice) = choice {
                out.insert(id, choice);
            }
        }
        Ok(out)
    }

    fn component_out_of_range(&self, i: usize, value: f64) -> Error {
        let dim = &self.dimensions[i];
        let bounds = match &dim.distribution {
            Distribution::Float(d) => format!("[{}, {}]", d.low, d.high),
            Distribution::Int(d) => format!("[{}, {}]", d.low, d.high),
            Distribution::Categorical(d) => format!("[0, {})", d.n_choices),
        };
        let id = self
            .entries
            .iter()
            .find(|(_, encoding)| match encoding {
                Encoding::Scalar { offset } => *offset == i,
                Encoding::Picks { offset, len } => (*offset..*offset + *len).contains(&i),
                Encoding::Constant(_) | Encoding::Prefix(_) => false,
            })
            .map_or_else(|| VarId::new(&dim.name), |(id, _)| id.clone());
        Error::OutOfRange {
            id,
            value: value.to_string(),
            bounds,
        }
    }

    /// Converts bindings back into an optimizer vector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingBinding`] if a dimension's variable is absent,
    /// or [`Error::InvalidChoice`] if its choice has the wrong kind.
    #[allow(clippy::cast_precision_loss)]
    pub fn encode(&self, bindings: &Bindings) -> Result<Vec<f64>> {
        let mut x = vec![0.0; self.dimensions.len()];
        for (id, encoding) in &self.entries {
            let (offset, len) = match encoding {
                Encoding::Scalar { offset } => (*offset, 1),
                Encoding::Picks { offset, len } => (*offset, *len),
                Encoding::Constant(_) | Encoding::Prefix(_) => continue,
            };
            let choice = bindings
                .get(id.as_str())
                .ok_or_else(|| Error::MissingBinding(id.clone()))?;
            let invalid = || Error::InvalidChoice {
                id: id.clone(),
                reason: format!("cannot encode {choice}"),
            };
            if let Encoding::Picks { .. } = encoding {
                let picks = choice.as_indices().ok_or_else(invalid)?;
                if picks.len() != len {
                    return Err(invalid());
                }
                for (slot, &i) in x[offset..offset + len].iter_mut().zip(picks) {
                    *slot = i as f64;
                }
            } else {
                x[offset] = self.dimensions[offset]
                    .distribution
                    .to_internal(choice)
                    .ok_or_else(invalid)?;
            }
        }
        Ok(x)
    }
}

impl fmt::Display for SearchSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.dimensions.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{d}")?;
        }
        Ok(())
    }
}
