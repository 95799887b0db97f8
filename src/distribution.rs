//! Variable distribution types.
//!
//! Each leaf variable with fixed bounds owns one of these, built once at
//! construction. Optimizers work in an internal `f64` space: the log of the
//! value for log-scaled ranges, the value itself otherwise.

use crate::choice::Choice;
use crate::error::{Error, Result};
use crate::rng_util;

/// Distribution for floating-point variables.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FloatDistribution {
    /// Lower bound (inclusive).
    pub low: f64,
    /// Upper bound (inclusive).
    pub high: f64,
    /// Whether to sample in log space.
    pub log_scale: bool,
}

/// Distribution for integer variables.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntDistribution {
    /// Lower bound (inclusive).
    pub low: i64,
    /// Upper bound (inclusive).
    pub high: i64,
    /// Whether to sample in log space.
    pub log_scale: bool,
}

/// Distribution for categorical variables.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CategoricalDistribution {
    /// Number of choices available.
    pub n_choices: usize,
}

/// Enum wrapping all variable distribution types.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Distribution {
    /// A floating-point distribution.
    Float(FloatDistribution),
    /// An integer distribution.
    Int(IntDistribution),
    /// A categorical distribution.
    Categorical(CategoricalDistribution),
}

impl Distribution {
    /// Creates a validated float distribution.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBounds`] if `low > high` or a bound is not
    /// finite, and [`Error::InvalidLogBounds`] if `log_scale` is set with
    /// `low <= 0`.
    pub fn float(low: f64, high: f64, log_scale: bool) -> Result<Self> {
        if !(low.is_finite() && high.is_finite()) || low > high {
            return Err(Error::InvalidBounds { low, high });
        }
        if log_scale && low <= 0.0 {
            return Err(Error::InvalidLogBounds);
        }
        Ok(Distribution::Float(FloatDistribution {
            low,
            high,
            log_scale,
        }))
    }

    /// Creates a validated integer distribution.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBounds`] if `low > high`, and
    /// [`Error::InvalidLogBounds`] if `log_scale` is set with `low < 1`.
    #[allow(clippy::cast_precision_loss)]
    pub fn int(low: i64, high: i64, log_scale: bool) -> Result<Self> {
        if low > high {
            return Err(Error::InvalidBounds {
                low: low as f64,
                high: high as f64,
            });
        }
        if log_scale && low < 1 {
            return Err(Error::InvalidLogBounds);
        }
        Ok(Distribution::Int(IntDistribution {
            low,
            high,
            log_scale,
        }))
    }

    /// Creates a categorical distribution over `n_choices` indices.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyChoices`] if `n_choices` is zero.
    pub fn categorical(n_choices: usize) -> Result<Self> {
        if n_choices == 0 {
            return Err(Error::EmptyChoices);
        }
        Ok(Distribution::Categorical(CategoricalDistribution { n_choices }))
    }

    /// Draws `count` independent values.
    ///
    /// Categorical draws are returned as [`Choice::Int`] indices.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::cast_possible_wrap)]
    pub fn draw(&self, count: usize, rng: &mut fastrand::Rng) -> Vec<Choice> {
        (0..count)
            .map(|_| match self {
                Distribution::Float(d) => {
                    let value = if d.log_scale {
                        rng_util::uniform(rng, d.low.ln(), d.high.ln()).exp()
                    } else {
                        rng_util::uniform(rng, d.low, d.high)
                    };
                    // exp(ln(x)) can land a hair outside the range.
                    Choice::Float(value.clamp(d.low, d.high))
                }
                Distribution::Int(d) => {
                    let value = if d.log_scale {
                        let log_low = (d.low as f64).ln();
                        let log_high = (d.high as f64).ln();
                        let raw = rng_util::uniform(rng, log_low, log_high).exp().round() as i64;
                        raw.clamp(d.low, d.high)
                    } else {
                        rng.i64(d.low..=d.high)
                    };
                    Choice::Int(value)
                }
                Distribution::Categorical(d) => Choice::Int(rng.usize(0..d.n_choices) as i64),
            })
            .collect()
    }

    /// Draws a single value.
    pub fn draw_one(&self, rng: &mut fastrand::Rng) -> Choice {
        self.draw(1, rng)
            .pop()
            .unwrap_or(Choice::Int(0))
    }

    /// Internal-space bounds, or `None` for categorical distributions.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn internal_bounds(&self) -> Option<(f64, f64)> {
        match self {
            Distribution::Float(d) => {
                if d.log_scale {
                    Some((d.low.ln(), d.high.ln()))
                } else {
                    Some((d.low, d.high))
                }
            }
            Distribution::Int(d) => {
                if d.log_scale {
                    Some(((d.low as f64).ln(), (d.high as f64).ln()))
                } else {
                    Some((d.low as f64, d.high as f64))
                }
            }
            Distribution::Categorical(_) => None,
        }
    }

    /// Converts a vector component in internal space back to a value.
    ///
    /// Integer and categorical components are rounded to the nearest integer
    /// without clamping; out-of-range values surface later as freeze errors.
    /// On a log scale, a component inside the internal bounds always maps
    /// inside `[low, high]`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_internal(&self, value: f64) -> Choice {
        match self {
            Distribution::Float(d) => Choice::Float(if d.log_scale {
                log_to_linear(value, d.low, d.high)
            } else {
                value
            }),
            Distribution::Int(d) => {
                let v = if d.log_scale {
                    log_to_linear(value, d.low as f64, d.high as f64)
                } else {
                    value
                };
                Choice::Int(v.round() as i64)
            }
            Distribution::Categorical(_) => Choice::Int(value.round() as i64),
        }
    }

    /// Converts a value to its internal-space representation.
    ///
    /// Returns `None` if the choice kind does not fit the distribution.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn to_internal(&self, choice: &Choice) -> Option<f64> {
        let raw = match (self, choice) {
            (Distribution::Float(_), Choice::Float(v)) => *v,
            (_, Choice::Int(v)) => *v as f64,
            _ => return None,
        };
        let log_scale = match self {
            Distribution::Float(d) => d.log_scale,
            Distribution::Int(d) => d.log_scale,
            Distribution::Categorical(_) => false,
        };
        Some(if log_scale { raw.ln() } else { raw })
    }

    /// Returns `true` for categorical distributions.
    #[must_use]
    pub fn is_categorical(&self) -> bool {
        matches!(self, Distribution::Categorical(_))
    }
}

/// `exp(value)`, kept inside `[low, high]` when `value` lies in
/// `[ln low, ln high]`. `exp(ln(x))` can differ from `x` in the last bit.
fn log_to_linear(value: f64, low: f64, high: f64) -> f64 {
    let v = value.exp();
    if low.ln() <= value && value <= high.ln() {
        v.clamp(low, high)
    } else {
        v
    }
}
