//! Child slots of expression nodes.

use core::fmt;
use std::sync::Arc;

use crate::expr::Expr;
use crate::value::Value;
use crate::variable::{Float, Int, List};

/// One child slot: a constant, a sub-expression, or a nested container of
/// further slots.
///
/// Sequences evaluate to [`Value::List`] and mappings to [`Value::Map`], so
/// `vec![Term::from(1), x.into()]` behaves like a list literal holding a
/// variable.
#[derive(Clone, Debug, PartialEq)]
pub enum Term {
    /// A plain constant. Shallow clones share it.
    Const(Arc<Value>),
    /// A sub-expression.
    Expr(Expr),
    /// An ordered sequence of slots.
    Seq(Vec<Term>),
    /// A string-keyed mapping of slots, in insertion order.
    Map(Vec<(String, Term)>),
}

impl Term {
    /// Wraps a constant value.
    pub fn constant(value: impl Into<Value>) -> Self {
        Term::Const(Arc::new(value.into()))
    }

    /// Builds a mapping slot from `(key, slot)` pairs.
    pub fn map<K: Into<String>, T: Into<Term>>(entries: impl IntoIterator<Item = (K, T)>) -> Self {
        Term::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Returns the expression if this slot holds one directly.
    #[must_use]
    pub fn as_expr(&self) -> Option<&Expr> {
        match self {
            Term::Expr(e) => Some(e),
            _ => None,
        }
    }

    /// Calls `f` on every expression reachable through this slot without
    /// entering the expressions themselves.
    pub(crate) fn for_each_expr<'a>(&'a self, f: &mut impl FnMut(&'a Expr)) {
        match self {
            Term::Const(_) => {}
            Term::Expr(e) => f(e),
            Term::Seq(items) => {
                for item in items {
                    item.for_each_expr(f);
                }
            }
            Term::Map(entries) => {
                for (_, item) in entries {
                    item.for_each_expr(f);
                }
            }
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Const(v) => write!(f, "{v}"),
            Term::Expr(e) => write!(f, "{e}"),
            Term::Seq(items) => {
                f.write_str("[")?;
                write_joined(f, items)?;
                f.write_str("]")
            }
            Term::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "'{k}': {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

pub(crate) fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl From<Value> for Term {
    fn from(v: Value) -> Self {
        Term::Const(Arc::new(v))
    }
}

impl From<Expr> for Term {
    fn from(e: Expr) -> Self {
        Term::Expr(e)
    }
}

impl From<&Expr> for Term {
    fn from(e: &Expr) -> Self {
        Term::Expr(e.clone())
    }
}

impl From<List> for Term {
    fn from(b: List) -> Self {
        Term::Expr(b.into())
    }
}

impl From<Int> for Term {
    fn from(b: Int) -> Self {
        Term::Expr(b.into())
    }
}

impl From<Float> for Term {
    fn from(b: Float) -> Self {
        Term::Expr(b.into())
    }
}

impl<T: Into<Term>> From<Vec<T>> for Term {
    fn from(items: Vec<T>) -> Self {
        Term::Seq(items.into_iter().map(Into::into).collect())
    }
}

macro_rules! const_term_from {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Term {
                fn from(v: $t) -> Self {
                    Term::Const(Arc::new(Value::from(v)))
                }
            }
        )*
    };
}

const_term_from!(bool, i64, i32, usize, f64, &str, String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_render_like_literals() {
        let t = Term::from(vec![Term::from(1), Term::from("a"), Term::from(2.5)]);
        assert_eq!(t.to_string(), "[1, 'a', 2.5]");
        let m = Term::map([("lr", 0.1)]);
        assert_eq!(m.to_string(), "{'lr': 0.1}");
    }

    #[test]
    fn test_for_each_expr_enters_containers() {
        let x: Expr = Int::new(0, 1).name("x").into();
        let y: Expr = Int::new(0, 1).name("y").into();
        let t = Term::from(vec![
            Term::from(1),
            Term::from(&x),
            Term::map([("inner", Term::from(vec![&y]))]),
        ]);
        let mut seen = Vec::new();
        t.for_each_expr(&mut |e| seen.push(e.clone()));
        assert_eq!(seen.len(), 2);
        assert!(seen[0].ptr_eq(&x));
        assert!(seen[1].ptr_eq(&y));
    }
}
