//! Deferred expression trees.
//!
//! An [`Expr`] records an operation instead of performing it. Building nodes
//! never runs host code; [`Expr::evaluate`] does, once the variables the tree
//! reaches are bound.
//!
//! ```
//! use metalg::{Bindings, Expr, Int, Value, args, function};
//!
//! let f = function("f", |args| Ok(Value::Int(args.arg(0)?.as_i64()? + 1)));
//! let x: Expr = Int::new(0, 10).name("x").into();
//! let program = f.call(args![&x]);
//!
//! program.freeze(&Bindings::from([("x", 3)])).unwrap();
//! assert_eq!(program.evaluate().unwrap(), Value::Int(4));
//! ```

mod eval;
mod overload;
mod term;
mod traverse;

use core::fmt;
use std::sync::Arc;

pub use eval::EvalOptions;
pub use term::Term;

use crate::error::{Error, Result};
use crate::ops::{BinaryOp, UnaryOp};
use crate::value::{CallArgs, HostClass, HostFn, HostObject, Value};
use crate::variable::{VarKind, Variable};

/// A shared handle to an expression node.
///
/// Cloning the handle keeps node identity: both handles refer to the same
/// node, and binding one binds the other. Use [`Expr::clone_shallow`] or
/// [`Expr::clone_deep`] for an independent copy.
#[derive(Clone)]
pub struct Expr(Arc<ExprKind>);

/// The closed set of node variants.
#[derive(Debug, PartialEq)]
pub enum ExprKind {
    /// `left op right`
    Binary {
        /// Operator tag.
        op: BinaryOp,
        /// Left operand.
        left: Term,
        /// Right operand.
        right: Term,
    },
    /// `op operand`
    Unary {
        /// Operator tag.
        op: UnaryOp,
        /// The operand.
        operand: Term,
    },
    /// A call of a wrapped class, function or callable object.
    FunctionCall {
        /// What gets invoked.
        target: CallTarget,
        /// Positional arguments.
        args: Vec<Term>,
        /// Keyword arguments, in call order.
        kwargs: Vec<(String, Term)>,
    },
    /// `base[key]`
    ItemAccess {
        /// The indexed expression.
        base: Term,
        /// Index or key.
        key: Term,
    },
    /// `base.name`
    AttributeAccess {
        /// The accessed expression.
        base: Term,
        /// Member name.
        name: String,
    },
    /// A call of whatever another expression evaluates to.
    ExprCall {
        /// The expression producing the callee.
        callee: Term,
        /// Positional arguments.
        args: Vec<Term>,
        /// Keyword arguments, in call order.
        kwargs: Vec<(String, Term)>,
    },
    /// A wrapped host callable, classified once when it was wrapped.
    Object(CallTarget),
    /// A search-space variable.
    Var(Variable),
}

/// How a wrapped callable is invoked.
#[derive(Clone, Debug)]
pub enum CallTarget {
    /// Construction: the receiver is the class itself.
    Constructor(HostClass),
    /// A free function without a receiver.
    Function(HostFn),
    /// The call operator of an object; the receiver is the object.
    CallOperator(Arc<dyn HostObject>),
}

impl CallTarget {
    /// The name used when rendering calls.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            CallTarget::Constructor(c) => c.name(),
            CallTarget::Function(f) => f.name(),
            CallTarget::CallOperator(o) => o.type_name(),
        }
    }

    pub(crate) fn invoke(&self, args: &CallArgs) -> Result<Value> {
        match self {
            CallTarget::Constructor(c) => c.construct(args),
            CallTarget::Function(f) => f.call(args),
            CallTarget::CallOperator(o) => o.call(args),
        }
    }

    /// The wrapped callable as a plain value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            CallTarget::Constructor(c) => Value::Class(c.clone()),
            CallTarget::Function(f) => Value::Func(f.clone()),
            CallTarget::CallOperator(o) => Value::Object(Arc::clone(o)),
        }
    }
}

impl PartialEq for CallTarget {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CallTarget::Constructor(a), CallTarget::Constructor(b)) => a.ptr_eq(b),
            (CallTarget::Function(a), CallTarget::Function(b)) => a.ptr_eq(b),
            (CallTarget::CallOperator(a), CallTarget::CallOperator(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Wraps a host value so calling it builds a node instead of running it.
///
/// Classes become constructor calls, functions become free calls and callable
/// objects become calls of their call operator.
///
/// # Errors
///
/// Returns [`Error::UnsupportedWrappedType`] for any other value, including
/// objects that are not callable.
pub fn meta(value: impl Into<Value>) -> Result<Expr> {
    let target = match value.into() {
        Value::Class(c) => CallTarget::Constructor(c),
        Value::Func(f) => CallTarget::Function(f),
        Value::Object(o) if o.is_callable() => CallTarget::CallOperator(o),
        other => return Err(Error::UnsupportedWrappedType(other.type_name())),
    };
    Ok(Expr::from_kind(ExprKind::Object(target)))
}

/// Wraps a closure as a symbolic function.
pub fn function<F>(name: impl Into<Arc<str>>, f: F) -> Expr
where
    F: Fn(&CallArgs) -> Result<Value> + Send + Sync + 'static,
{
    Expr::from_kind(ExprKind::Object(CallTarget::Function(HostFn::new(name, f))))
}

/// Wraps a constructor as a symbolic class.
pub fn class<F>(name: impl Into<Arc<str>>, ctor: F) -> Expr
where
    F: Fn(&CallArgs) -> Result<Value> + Send + Sync + 'static,
{
    Expr::from_kind(ExprKind::Object(CallTarget::Constructor(HostClass::new(
        name, ctor,
    ))))
}

/// Wraps a callable host object.
///
/// # Errors
///
/// Returns [`Error::UnsupportedWrappedType`] if the object is not callable.
pub fn object<O: HostObject + 'static>(obj: O) -> Result<Expr> {
    meta(Value::object(obj))
}

impl Expr {
    pub(crate) fn from_kind(kind: ExprKind) -> Self {
        Self(Arc::new(kind))
    }

    /// The node variant.
    #[must_use]
    pub fn kind(&self) -> &ExprKind {
        &self.0
    }

    /// Returns the variable if this node is one.
    #[must_use]
    pub fn as_var(&self) -> Option<&Variable> {
        match &*self.0 {
            ExprKind::Var(v) => Some(v),
            _ => None,
        }
    }

    /// Returns `true` if both handles refer to the same node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Expr) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Node identity, used to key sampling and cloning memos.
    pub(crate) fn node_addr(&self) -> usize {
        Arc::as_ptr(&self.0).cast::<()>() as usize
    }

    /// Builds `self op rhs`.
    #[must_use]
    pub fn binary(&self, op: BinaryOp, rhs: impl Into<Term>) -> Expr {
        Expr::from_kind(ExprKind::Binary {
            op,
            left: Term::from(self),
            right: rhs.into(),
        })
    }

    /// Builds `op self`.
    #[must_use]
    pub fn unary(&self, op: UnaryOp) -> Expr {
        Expr::from_kind(ExprKind::Unary {
            op,
            operand: Term::from(self),
        })
    }

    /// `self < rhs`
    #[must_use]
    pub fn lt(&self, rhs: impl Into<Term>) -> Expr {
        self.binary(BinaryOp::Lt, rhs)
    }

    /// `self <= rhs`
    #[must_use]
    pub fn le(&self, rhs: impl Into<Term>) -> Expr {
        self.binary(BinaryOp::Le, rhs)
    }

    /// `self > rhs`
    #[must_use]
    pub fn gt(&self, rhs: impl Into<Term>) -> Expr {
        self.binary(BinaryOp::Gt, rhs)
    }

    /// `self >= rhs`
    #[must_use]
    pub fn ge(&self, rhs: impl Into<Term>) -> Expr {
        self.binary(BinaryOp::Ge, rhs)
    }

    /// `self == rhs`, as a node. `==` on `Expr` compares structure instead.
    #[must_use]
    pub fn eq_(&self, rhs: impl Into<Term>) -> Expr {
        self.binary(BinaryOp::Eq, rhs)
    }

    /// `self != rhs`, as a node.
    #[must_use]
    pub fn ne_(&self, rhs: impl Into<Term>) -> Expr {
        self.binary(BinaryOp::Ne, rhs)
    }

    /// `self ** rhs`
    #[must_use]
    pub fn pow(&self, rhs: impl Into<Term>) -> Expr {
        self.binary(BinaryOp::Pow, rhs)
    }

    /// `self // rhs`
    #[must_use]
    pub fn floor_div(&self, rhs: impl Into<Term>) -> Expr {
        self.binary(BinaryOp::FloorDiv, rhs)
    }

    /// `self @ rhs`
    #[must_use]
    pub fn matmul(&self, rhs: impl Into<Term>) -> Expr {
        self.binary(BinaryOp::MatMul, rhs)
    }

    /// `self.name`. Never fails at build time, even if the attribute will not
    /// exist on the evaluated value.
    #[must_use]
    pub fn attr(&self, name: impl Into<String>) -> Expr {
        Expr::from_kind(ExprKind::AttributeAccess {
            base: Term::from(self),
            name: name.into(),
        })
    }

    /// `self[key]`
    #[must_use]
    pub fn item(&self, key: impl Into<Term>) -> Expr {
        Expr::from_kind(ExprKind::ItemAccess {
            base: Term::from(self),
            key: key.into(),
        })
    }

    /// `self(args...)`
    ///
    /// On a wrapped callable this builds a call of it; on any other node it
    /// builds a call of the node's evaluated value.
    #[must_use]
    pub fn call<T: Into<Term>>(&self, args: impl IntoIterator<Item = T>) -> Expr {
        self.call_with(args, core::iter::empty::<(String, Term)>())
    }

    /// `self(args..., key=value...)`
    #[must_use]
    pub fn call_with<T, K, V>(
        &self,
        args: impl IntoIterator<Item = T>,
        kwargs: impl IntoIterator<Item = (K, V)>,
    ) -> Expr
    where
        T: Into<Term>,
        K: Into<String>,
        V: Into<Term>,
    {
        let args: Vec<Term> = args.into_iter().map(Into::into).collect();
        let kwargs: Vec<(String, Term)> = kwargs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let kind = match &*self.0 {
            ExprKind::Object(target) => ExprKind::FunctionCall {
                target: target.clone(),
                args,
                kwargs,
            },
            _ => ExprKind::ExprCall {
                callee: Term::from(self),
                args,
                kwargs,
            },
        };
        Expr::from_kind(kind)
    }

    /// Draws a complete hierarchical binding for this tree.
    ///
    /// A missing random source is replaced by a freshly seeded one.
    ///
    /// # Errors
    ///
    /// Returns an error if a reachable variable is malformed.
    pub fn sample(&self, rng: Option<&mut fastrand::Rng>) -> Result<crate::Bindings> {
        let mut memo = crate::sampler::SampleMemo::new();
        match rng {
            Some(rng) => crate::sampler::draw_bindings(self, rng, &mut memo),
            None => crate::sampler::draw_bindings(self, &mut fastrand::Rng::new(), &mut memo),
        }
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0 == *other.0
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expr({self})")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            ExprKind::Binary { op, left, right } => write!(f, "{left} {op} {right}"),
            ExprKind::Unary { op, operand } => write!(f, "{op}{operand}"),
            ExprKind::FunctionCall {
                target,
                args,
                kwargs,
            } => {
                write!(f, "{}(", target.name())?;
                write_call_args(f, args, kwargs)?;
                f.write_str(")")
            }
            ExprKind::ItemAccess { base, key } => write!(f, "{base}[{key}]"),
            ExprKind::AttributeAccess { base, name } => write!(f, "{base}.{name}"),
            ExprKind::ExprCall {
                callee,
                args,
                kwargs,
            } => {
                write!(f, "{callee}(")?;
                write_call_args(f, args, kwargs)?;
                f.write_str(")")
            }
            ExprKind::Object(target) => f.write_str(target.name()),
            ExprKind::Var(v) => write_var(f, v),
        }
    }
}

fn write_call_args(
    f: &mut fmt::Formatter<'_>,
    args: &[Term],
    kwargs: &[(String, Term)],
) -> fmt::Result {
    term::write_joined(f, args)?;
    for (i, (k, v)) in kwargs.iter().enumerate() {
        if i > 0 || !args.is_empty() {
            f.write_str(", ")?;
        }
        write!(f, "{k}={v}")?;
    }
    Ok(())
}

fn write_var(f: &mut fmt::Formatter<'_>, v: &Variable) -> fmt::Result {
    if let Some(choice) = v.bound() {
        return match v.kind() {
            VarKind::List(spec) => {
                let selected = spec.selected(&choice);
                match (choice.as_indices(), selected.as_slice()) {
                    (None, [one]) => write!(f, "{one}"),
                    _ => {
                        f.write_str("[")?;
                        term::write_joined(f, &selected)?;
                        f.write_str("]")
                    }
                }
            }
            _ => write!(f, "{choice}"),
        };
    }
    match v.kind() {
        VarKind::List(spec) => {
            write!(f, "List(id={}, [", v.id())?;
            term::write_joined(f, spec.values())?;
            f.write_str("]")?;
            match spec.k() {
                Some(crate::variable::Count::Fixed(k)) => write!(f, ", k={k}")?,
                Some(crate::variable::Count::Var(e)) => write!(f, ", k={e}")?,
                None => {}
            }
            if spec.invariant() {
                f.write_str(", invariant=True")?;
            }
            f.write_str(")")
        }
        VarKind::Int(spec) => {
            write!(f, "Int(id={}, low={}, high={})", v.id(), spec.low(), spec.high())
        }
        VarKind::Float(spec) => {
            write!(f, "Float(id={}, low={}, high={})", v.id(), spec.low(), spec.high())
        }
    }
}

/// Builds a positional argument list, converting each item into a [`Term`].
///
/// ```
/// use metalg::{Term, args};
///
/// let a: Vec<Term> = args![1, "two", 3.0];
/// assert_eq!(a.len(), 3);
/// ```
#[macro_export]
macro_rules! args {
    () => { ::std::vec::Vec::<$crate::Term>::new() };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::Term::from($arg)),+]
    };
}
