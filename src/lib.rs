#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Symbolic search spaces over program variants.
//!
//! Describe a family of alternative programs (alternative arguments,
//! alternative constructions, alternative sub-expressions) as one deferred
//! expression tree, then draw concrete variants from it by random sampling or
//! under an ask/tell optimizer.
//!
//! # Getting Started
//!
//! ```
//! use metalg::prelude::*;
//!
//! // A host constructor, wrapped so that calling it only builds a node.
//! let dense = metalg::class("Dense", |args| {
//!     let units = args.param(0, "units")?.as_i64()?;
//!     Ok(Value::Str(format!("Dense({units})").into()))
//! });
//!
//! let units = Int::new(16, 256).log_scale().name("units");
//! let layer = dense.call(metalg::args![units]);
//!
//! let sampler = RandomSampler::with_seed(layer, 42);
//! let (bindings, program) = sampler.sample_program().unwrap();
//! assert!(bindings.contains("units"));
//! assert!(program.evaluate().unwrap().as_str().unwrap().starts_with("Dense("));
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`Expr`] | A deferred expression node: operators, calls, attribute and item access, variables. |
//! | [`List`], [`Int`], [`Float`] | Variable builders. A [`List`] chooses among sub-expressions, so variables inside unchosen branches are inactive. |
//! | [`Bindings`] | Variable id to [`Choice`] map, used to [`freeze`](Expr::freeze) a tree. |
//! | [`Sampler`] | Draws complete hierarchical bindings ([`RandomSampler`]). |
//! | [`SearchSpace`] | Maps a tree's variables to flat optimizer vectors. |
//! | [`Optimizer`] | Ask/tell minimizer ([`RandomSearch`], `BayesianOptimizer`). |
//! | [`Search`] | The optimization loop, an iterator of [`Evaluation`]s. |
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `gp` | `BayesianOptimizer`, a Gaussian-process optimizer with Expected Improvement | on |
//! | `serde` | `Serialize`/`Deserialize` on [`Bindings`], [`Choice`], [`VarId`], [`Distribution`], [`Dimension`] and [`Observation`] | off |
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) at sampling and search points | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

mod choice;
pub mod distribution;
mod error;
pub mod expr;
pub mod ops;
pub mod optimizer;
mod rng_util;
pub mod sampler;
mod search;
mod space;
mod types;
mod value;
mod variable;

pub use choice::{Bindings, Choice};
pub use distribution::Distribution;
pub use error::{Error, Result};
pub use expr::{CallTarget, EvalOptions, Expr, ExprKind, Term, class, function, meta, object};
pub use ops::{BinaryOp, UnaryOp};
#[cfg(feature = "gp")]
pub use optimizer::BayesianOptimizer;
pub use optimizer::{OBJECTIVE_VALUE_FAILURE, Optimizer, RandomSearch};
pub use sampler::{RandomSampler, SampleMemo, Sampler, draw_bindings};
pub use search::{Evaluation, Observation, Search, SearchBuilder};
pub use space::{Dimension, SearchSpace};
pub use types::{Direction, SearchState};
pub use value::{CallArgs, HostClass, HostFn, HostObject, Value};
pub use variable::{
    Count, Float, Int, Limit, List, ListSpec, RangeSpec, VarId, VarKind, Variable, reset_var_ids,
};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use metalg::prelude::*;
/// ```
pub mod prelude {
    #[cfg(feature = "gp")]
    pub use crate::optimizer::BayesianOptimizer;
    pub use crate::optimizer::{Optimizer, RandomSearch};
    pub use crate::sampler::{RandomSampler, Sampler};
    pub use crate::{
        Bindings, CallArgs, Choice, Direction, Error, EvalOptions, Evaluation, Expr, Float,
        HostObject, Int, List, Result, Search, SearchSpace, Term, Value,
    };
}
