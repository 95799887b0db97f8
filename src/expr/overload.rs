//! Operator overloads that build nodes.
//!
//! Comparisons, `**`, `//` and `@` have no overloadable Rust operator and are
//! builder methods on [`Expr`] instead.

use core::ops;

use crate::expr::{Expr, ExprKind, Term};
use crate::ops::{BinaryOp, UnaryOp};

fn binary(op: BinaryOp, left: Term, right: Term) -> Expr {
    Expr::from_kind(ExprKind::Binary { op, left, right })
}

fn unary(op: UnaryOp, operand: Term) -> Expr {
    Expr::from_kind(ExprKind::Unary { op, operand })
}

macro_rules! binary_overload {
    ($($trait:ident :: $method:ident => $op:expr),* $(,)?) => {
        $(
            impl<R: Into<Term>> ops::$trait<R> for Expr {
                type Output = Expr;

                fn $method(self, rhs: R) -> Expr {
                    binary($op, Term::Expr(self), rhs.into())
                }
            }

            impl<R: Into<Term>> ops::$trait<R> for &Expr {
                type Output = Expr;

                fn $method(self, rhs: R) -> Expr {
                    binary($op, Term::from(self), rhs.into())
                }
            }

            /// Lets a constant or container sit on the left: `Term::from(vec!["a"]) + list`.
            impl<R: Into<Term>> ops::$trait<R> for Term {
                type Output = Expr;

                fn $method(self, rhs: R) -> Expr {
                    binary($op, self, rhs.into())
                }
            }
        )*
    };
}

binary_overload! {
    Add::add => BinaryOp::Add,
    Sub::sub => BinaryOp::Sub,
    Mul::mul => BinaryOp::Mul,
    Div::div => BinaryOp::Div,
    Rem::rem => BinaryOp::Mod,
    BitAnd::bitand => BinaryOp::And,
    BitOr::bitor => BinaryOp::Or,
    BitXor::bitxor => BinaryOp::Xor,
}

impl ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        unary(UnaryOp::Neg, Term::Expr(self))
    }
}

impl ops::Neg for &Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        unary(UnaryOp::Neg, Term::from(self))
    }
}

/// `!x` builds `~x`.
impl ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        unary(UnaryOp::Invert, Term::Expr(self))
    }
}

impl ops::Not for &Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        unary(UnaryOp::Invert, Term::from(self))
    }
}
