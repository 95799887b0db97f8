use crate::variable::VarId;

/// Errors produced while building, binding, sampling, or evaluating a search space.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a frozen value falls outside a variable's declared bounds,
    /// or when a list index falls outside `[0, len)`.
    #[error("value {value} for variable '{id}' is out of range {bounds}")]
    OutOfRange {
        /// The variable being frozen.
        id: VarId,
        /// The offending value.
        value: String,
        /// The accepted range, rendered as an interval.
        bounds: String,
    },

    /// Returned when freezing with a binding map that lacks a required variable.
    #[error("no binding for variable '{0}'")]
    MissingBinding(VarId),

    /// Returned when a binding has the wrong kind for its variable, or when a
    /// list index set is inconsistent with the list's selection count.
    #[error("invalid choice for variable '{id}': {reason}")]
    InvalidChoice {
        /// The variable being frozen.
        id: VarId,
        /// Why the choice was rejected.
        reason: String,
    },

    /// Returned when the lower bound is greater than the upper bound.
    #[error("invalid bounds: low ({low}) must be less than or equal to high ({high})")]
    InvalidBounds {
        /// The lower bound value.
        low: f64,
        /// The upper bound value.
        high: f64,
    },

    /// Returned when log scale is used with non-positive bounds.
    #[error("invalid log bounds: low must be positive for log scale")]
    InvalidLogBounds,

    /// Returned when a list variable has no values to choose from.
    #[error("list choices cannot be empty")]
    EmptyChoices,

    /// Returned when wrapping a value that is neither a class, a function nor a
    /// callable object.
    #[error("cannot wrap a value of type '{0}': expected a class, a function or a callable object")]
    UnsupportedWrappedType(String),

    /// Returned when a bound or selection count refers to an expression that
    /// is not a variable.
    #[error("expected a variable expression, got {0}")]
    NotAVariable(String),

    /// Returned when an operator is applied to operands it does not support.
    #[error("unsupported operand type(s) for {op}: {operands}")]
    TypeMismatch {
        /// The operator symbol.
        op: &'static str,
        /// The operand type names, e.g. `'str' and 'int'`.
        operands: String,
    },

    /// Returned when calling a value that is not callable.
    #[error("'{0}' object is not callable")]
    NotCallable(String),

    /// Returned when an attribute lookup fails on an evaluated value.
    #[error("'{type_name}' object has no attribute '{name}'")]
    NoSuchAttribute {
        /// The type name of the evaluated base.
        type_name: String,
        /// The requested attribute.
        name: String,
    },

    /// Returned when an item lookup fails on an evaluated value.
    #[error("item access failed: {0}")]
    ItemAccess(String),

    /// Returned by arithmetic on concrete operands, e.g. division by zero.
    #[error("arithmetic error: {0}")]
    Arithmetic(&'static str),

    /// Returned by strict evaluation when a reachable variable is unbound.
    #[error("variable '{0}' is unbound")]
    Unbound(VarId),

    /// Returned by a wrapped host callable.
    #[error("{0}")]
    Host(String),

    /// Returned when an optimizer vector does not match the search space.
    #[error("dimension mismatch: expected {expected} values, got {got}")]
    DimensionMismatch {
        /// The number of dimensions of the search space.
        expected: usize,
        /// The length of the vector received.
        got: usize,
    },

    /// Returned when a variable cannot be expressed as optimizer dimensions.
    #[error("variable '{id}' cannot be used as a search dimension: {reason}")]
    UnsupportedDimension {
        /// The variable that could not be encoded.
        id: VarId,
        /// Why the variable could not be encoded.
        reason: &'static str,
    },

    /// Returned when an internal invariant is violated.
    #[error("internal error: {0}")]
    Internal(&'static str),
}

impl Error {
    /// Build a [`Error::Host`] from any displayable message.
    ///
    /// Convenience for wrapped callables that fail.
    ///
    /// # Examples
    ///
    /// ```
    /// use metalg::{CallArgs, Error, Value};
    ///
    /// fn needs_one(args: &CallArgs) -> metalg::Result<Value> {
    ///     if args.positional.is_empty() {
    ///         return Err(Error::host("expected one argument"));
    ///     }
    ///     Ok(args.positional[0].clone())
    /// }
    ///
    /// assert!(needs_one(&CallArgs::default()).is_err());
    /// ```
    pub fn host(message: impl core::fmt::Display) -> Self {
        Error::Host(message.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
