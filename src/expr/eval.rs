//! Bottom-up evaluation.

use crate::error::{Error, Result};
use crate::expr::{Expr, ExprKind, Term};
use crate::value::{CallArgs, Value};
use crate::variable::{VarKind, Variable};

/// Controls how evaluation treats unbound variables.
///
/// The default is lenient: an unbound variable evaluates to [`Value::None`].
/// Strict evaluation fails with [`Error::Unbound`] instead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EvalOptions {
    /// Fail on unbound variables instead of producing `None`.
    pub strict: bool,
}

impl EvalOptions {
    /// Lenient evaluation.
    #[must_use]
    pub fn lenient() -> Self {
        Self { strict: false }
    }

    /// Strict evaluation.
    #[must_use]
    pub fn strict() -> Self {
        Self { strict: true }
    }
}

impl Expr {
    /// Evaluates the tree with lenient handling of unbound variables.
    ///
    /// Evaluation does not modify the tree and can be repeated.
    ///
    /// # Errors
    ///
    /// Propagates operator and host-call errors.
    pub fn evaluate(&self) -> Result<Value> {
        self.evaluate_with(&EvalOptions::default())
    }

    /// Evaluates the tree with explicit options.
    ///
    /// # Errors
    ///
    /// In strict mode, returns [`Error::Unbound`] for the first unbound
    /// variable reached. Always propagates operator and host-call errors.
    pub fn evaluate_with(&self, options: &EvalOptions) -> Result<Value> {
        match self.kind() {
            ExprKind::Binary { op, left, right } => {
                let l = left.evaluate_with(options)?;
                let r = right.evaluate_with(options)?;
                op.apply(&l, &r)
            }
            ExprKind::Unary { op, operand } => op.apply(&operand.evaluate_with(options)?),
            ExprKind::FunctionCall {
                target,
                args,
                kwargs,
            } => target.invoke(&evaluate_args(args, kwargs, options)?),
            ExprKind::ItemAccess { base, key } => {
                let b = base.evaluate_with(options)?;
                b.item(&key.evaluate_with(options)?)
            }
            ExprKind::AttributeAccess { base, name } => base.evaluate_with(options)?.attr(name),
            ExprKind::ExprCall {
                callee,
                args,
                kwargs,
            } => {
                let f = callee.evaluate_with(options)?;
                f.call(&evaluate_args(args, kwargs, options)?)
            }
            ExprKind::Object(target) => Ok(target.to_value()),
            ExprKind::Var(v) => evaluate_var(v, options),
        }
    }
}

impl Term {
    /// Evaluates the slot, keeping its shape: sequences become lists and
    /// mappings become maps. Constants evaluate to themselves.
    ///
    /// # Errors
    ///
    /// Propagates errors from contained expressions.
    pub fn evaluate_with(&self, options: &EvalOptions) -> Result<Value> {
        match self {
            Term::Const(v) => Ok((**v).clone()),
            Term::Expr(e) => e.evaluate_with(options),
            Term::Seq(items) => items
                .iter()
                .map(|t| t.evaluate_with(options))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            Term::Map(entries) => entries
                .iter()
                .map(|(k, t)| Ok((k.clone(), t.evaluate_with(options)?)))
                .collect::<Result<Vec<_>>>()
                .map(Value::Map),
        }
    }

    /// Lenient [`Term::evaluate_with`].
    ///
    /// # Errors
    ///
    /// Propagates errors from contained expressions.
    pub fn evaluate(&self) -> Result<Value> {
        self.evaluate_with(&EvalOptions::default())
    }
}

fn evaluate_args(args: &[Term], kwargs: &[(String, Term)], options: &EvalOptions) -> Result<CallArgs> {
    Ok(CallArgs {
        positional: args
            .iter()
            .map(|t| t.evaluate_with(options))
            .collect::<Result<_>>()?,
        keyword: kwargs
            .iter()
            .map(|(k, t)| Ok((k.clone(), t.evaluate_with(options)?)))
            .collect::<Result<_>>()?,
    })
}

fn evaluate_var(v: &Variable, options: &EvalOptions) -> Result<Value> {
    let Some(choice) = v.bound() else {
        if options.strict {
            return Err(Error::Unbound(v.id().clone()));
        }
        return Ok(Value::None);
    };
    match v.kind() {
        VarKind::List(spec) => {
            let selected = spec.selected(&choice);
            if choice.as_indices().is_some() {
                selected
                    .into_iter()
                    .map(|t| t.evaluate_with(options))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::List)
            } else {
                selected
                    .first()
                    .map_or(Err(Error::Internal("bound list index out of range")), |t| {
                        t.evaluate_with(options)
                    })
            }
        }
        VarKind::Int(_) | VarKind::Float(_) => Ok(choice.to_value()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choice::Bindings;
    use crate::variable::{Int, List};

    #[test]
    fn test_unbound_is_none_when_lenient() {
        let x: Expr = Int::new(0, 3).name("x").into();
        assert_eq!(x.evaluate().unwrap(), Value::None);
    }

    #[test]
    fn test_unbound_fails_when_strict() {
        let x: Expr = Int::new(0, 3).name("x").into();
        let e = x + 1;
        assert!(matches!(
            e.evaluate_with(&EvalOptions::strict()),
            Err(Error::Unbound(id)) if id.as_str() == "x"
        ));
    }

    #[test]
    fn test_list_with_k_evaluates_to_list() {
        let l: Expr = List::new(["a", "b", "c"]).k(2_usize).name("l").into();
        l.freeze(&Bindings::from([("l", vec![2_usize, 0])])).unwrap();
        assert_eq!(
            l.evaluate().unwrap(),
            Value::List(vec![Value::str("c"), Value::str("a")])
        );
    }

    #[test]
    fn test_containers_keep_shape() {
        let x: Expr = Int::new(0, 3).name("x").into();
        let t = Term::map([("a", Term::from(vec![Term::from(1), Term::from(&x)]))]);
        x.freeze(&Bindings::from([("x", 2)])).unwrap();
        assert_eq!(
            t.evaluate().unwrap(),
            Value::Map(vec![(
                "a".to_string(),
                Value::List(vec![Value::Int(1), Value::Int(2)])
            )])
        );
    }

    #[test]
    fn test_evaluation_is_repeatable() {
        let x: Expr = Int::new(0, 3).name("x").into();
        let e = &x * 3;
        x.freeze(&Bindings::from([("x", 2)])).unwrap();
        assert_eq!(e.evaluate().unwrap(), e.evaluate().unwrap());
        assert!(x.as_var().is_some_and(Variable::is_bound));
    }
}
