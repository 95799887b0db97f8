//! Operator tags and their application to concrete values.
//!
//! The builders in [`expr`](crate::expr) record an operator tag; evaluation
//! applies it to the evaluated operands. Numeric operators follow the usual
//! promotion rules: booleans act as `0`/`1`, mixing an int with a float yields
//! a float, true division always yields a float.

use core::fmt;

use crate::error::{Error, Result};
use crate::value::Value;

/// Binary operator tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `@`
    MatMul,
    /// `/`
    Div,
    /// `//`
    FloorDiv,
    /// `%`
    Mod,
    /// `**`
    Pow,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `&`
    And,
    /// `^`
    Xor,
    /// `|`
    Or,
}

impl BinaryOp {
    /// The operator's source syntax.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::MatMul => "@",
            BinaryOp::Div => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&",
            BinaryOp::Xor => "^",
            BinaryOp::Or => "|",
        }
    }

    /// Applies the operator to two concrete operands.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] for unsupported operand types and
    /// [`Error::Arithmetic`] for division by zero or integer overflow.
    pub fn apply(self, left: &Value, right: &Value) -> Result<Value> {
        match self {
            BinaryOp::Eq => Ok(Value::Bool(left == right)),
            BinaryOp::Ne => Ok(Value::Bool(left != right)),
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                self.compare(left, right)
            }
            BinaryOp::And | BinaryOp::Xor | BinaryOp::Or => self.bitwise(left, right),
            BinaryOp::MatMul => self.matmul(left, right),
            _ => self.arithmetic(left, right),
        }
    }

    fn mismatch(self, left: &Value, right: &Value) -> Error {
        Error::TypeMismatch {
            op: self.symbol(),
            operands: format!("'{}' and '{}'", left.type_name(), right.type_name()),
        }
    }

    fn compare(self, left: &Value, right: &Value) -> Result<Value> {
        let ordering = match (left, right) {
            (Value::Str(a), Value::Str(b)) => a.partial_cmp(b),
            _ => match (number(left), number(right)) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => return Err(self.mismatch(left, right)),
            },
        };
        let Some(ordering) = ordering else {
            // NaN compares false with everything.
            return Ok(Value::Bool(false));
        };
        let result = match self {
            BinaryOp::Lt => ordering.is_lt(),
            BinaryOp::Le => ordering.is_le(),
            BinaryOp::Gt => ordering.is_gt(),
            BinaryOp::Ge => ordering.is_ge(),
            _ => return Err(Error::Internal("compare called with a non-comparison operator")),
        };
        Ok(Value::Bool(result))
    }

    fn bitwise(self, left: &Value, right: &Value) -> Result<Value> {
        if let (Value::Bool(a), Value::Bool(b)) = (left, right) {
            let v = match self {
                BinaryOp::And => a & b,
                BinaryOp::Xor => a ^ b,
                _ => a | b,
            };
            return Ok(Value::Bool(v));
        }
        let (Some(Num::Int(a)), Some(Num::Int(b))) = (number(left), number(right)) else {
            return Err(self.mismatch(left, right));
        };
        let v = match self {
            BinaryOp::And => a & b,
            BinaryOp::Xor => a ^ b,
            _ => a | b,
        };
        Ok(Value::Int(v))
    }

    fn matmul(self, left: &Value, right: &Value) -> Result<Value> {
        let (Value::List(a), Value::List(b)) = (left, right) else {
            return Err(self.mismatch(left, right));
        };
        if a.len() != b.len() {
            return Err(Error::Arithmetic("matmul operands have different lengths"));
        }
        let mut acc = Value::Int(0);
        for (x, y) in a.iter().zip(b) {
            let prod = BinaryOp::Mul.arithmetic(x, y)?;
            acc = BinaryOp::Add.arithmetic(&acc, &prod)?;
        }
        Ok(acc)
    }

    fn arithmetic(self, left: &Value, right: &Value) -> Result<Value> {
        // Sequence operators.
        match (self, left, right) {
            (BinaryOp::Add, Value::Str(a), Value::Str(b)) => {
                return Ok(Value::str(format!("{a}{b}")));
            }
            (BinaryOp::Add, Value::List(a), Value::List(b)) => {
                let mut out = a.clone();
                out.extend(b.iter().cloned());
                return Ok(Value::List(out));
            }
            (BinaryOp::Mul, Value::Str(s), Value::Int(n))
            | (BinaryOp::Mul, Value::Int(n), Value::Str(s)) => {
                let times = if s.is_empty() { 0 } else { repeat_count(*n) };
                let mut out = String::new();
                out.try_reserve(repeated_len(s.len(), times)?)
                    .map_err(|_| REPEAT_TOO_LARGE)?;
                for _ in 0..times {
                    out.push_str(s);
                }
                return Ok(Value::str(out));
            }
            (BinaryOp::Mul, Value::List(items), Value::Int(n))
            | (BinaryOp::Mul, Value::Int(n), Value::List(items)) => {
                let times = if items.is_empty() { 0 } else { repeat_count(*n) };
                let mut out = Vec::new();
                out.try_reserve(repeated_len(items.len(), times)?)
                    .map_err(|_| REPEAT_TOO_LARGE)?;
                for _ in 0..times {
                    out.extend(items.iter().cloned());
                }
                return Ok(Value::List(out));
            }
            _ => {}
        }

        let (Some(a), Some(b)) = (number(left), number(right)) else {
            return Err(self.mismatch(left, right));
        };

        match (a, b) {
            (Num::Int(x), Num::Int(y)) => self.int_arithmetic(x, y),
            _ => self.float_arithmetic(a.as_f64(), b.as_f64()),
        }
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn int_arithmetic(self, x: i64, y: i64) -> Result<Value> {
        const OVERFLOW: Error = Error::Arithmetic("integer overflow");
        let v = match self {
            BinaryOp::Add => x.checked_add(y).ok_or(OVERFLOW)?,
            BinaryOp::Sub => x.checked_sub(y).ok_or(OVERFLOW)?,
            BinaryOp::Mul => x.checked_mul(y).ok_or(OVERFLOW)?,
            BinaryOp::Div => {
                if y == 0 {
                    return Err(Error::Arithmetic("division by zero"));
                }
                return Ok(Value::Float(x as f64 / y as f64));
            }
            BinaryOp::FloorDiv => {
                if y == 0 {
                    return Err(Error::Arithmetic("integer division or modulo by zero"));
                }
                x.checked_div_euclid(y).ok_or(OVERFLOW)?
                    - i64::from(y < 0 && x.rem_euclid(y) != 0)
            }
            BinaryOp::Mod => {
                if y == 0 {
                    return Err(Error::Arithmetic("integer division or modulo by zero"));
                }
                // The result takes the sign of the divisor.
                let r = x.checked_rem_euclid(y).ok_or(OVERFLOW)?;
                if y < 0 && r != 0 { r + y } else { r }
            }
            BinaryOp::Pow => {
                if y < 0 {
                    return Ok(Value::Float((x as f64).powf(y as f64)));
                }
                match (x, u32::try_from(y)) {
                    (_, Ok(exp)) => x.checked_pow(exp).ok_or(OVERFLOW)?,
                    (0 | 1, Err(_)) => x,
                    (-1, Err(_)) => {
                        if y % 2 == 0 {
                            1
                        } else {
                            -1
                        }
                    }
                    (_, Err(_)) => return Err(OVERFLOW),
                }
            }
            _ => return Err(Error::Internal("int arithmetic called with a non-arithmetic operator")),
        };
        Ok(Value::Int(v))
    }

    fn float_arithmetic(self, x: f64, y: f64) -> Result<Value> {
        let v = match self {
            BinaryOp::Add => x + y,
            BinaryOp::Sub => x - y,
            BinaryOp::Mul => x * y,
            BinaryOp::Div => {
                if y == 0.0 {
                    return Err(Error::Arithmetic("float division by zero"));
                }
                x / y
            }
            BinaryOp::FloorDiv => {
                if y == 0.0 {
                    return Err(Error::Arithmetic("float floor division by zero"));
                }
                (x / y).floor()
            }
            BinaryOp::Mod => {
                if y == 0.0 {
                    return Err(Error::Arithmetic("float modulo by zero"));
                }
                x - y * (x / y).floor()
            }
            BinaryOp::Pow => x.powf(y),
            _ => {
                return Err(Error::Internal(
                    "float arithmetic called with a non-arithmetic operator",
                ));
            }
        };
        Ok(Value::Float(v))
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Unary operator tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `+x`
    Pos,
    /// `~x`
    Invert,
}

impl UnaryOp {
    /// The operator's source syntax.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Pos => "+",
            UnaryOp::Invert => "~",
        }
    }

    /// Applies the operator to a concrete operand.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] for unsupported operand types.
    pub fn apply(self, operand: &Value) -> Result<Value> {
        let mismatch = || Error::TypeMismatch {
            op: self.symbol(),
            operands: format!("'{}'", operand.type_name()),
        };
        match (self, number(operand).ok_or_else(mismatch)?) {
            (UnaryOp::Neg, Num::Int(v)) => v
                .checked_neg()
                .map(Value::Int)
                .ok_or(Error::Arithmetic("integer overflow")),
            (UnaryOp::Neg, Num::Float(v)) => Ok(Value::Float(-v)),
            (UnaryOp::Pos, Num::Int(v)) => Ok(Value::Int(v)),
            (UnaryOp::Pos, Num::Float(v)) => Ok(Value::Float(v)),
            (UnaryOp::Invert, Num::Int(v)) => Ok(Value::Int(!v)),
            (UnaryOp::Invert, Num::Float(_)) => Err(mismatch()),
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    #[allow(clippy::cast_precision_loss)]
    fn as_f64(self) -> f64 {
        match self {
            Num::Int(v) => v as f64,
            Num::Float(v) => v,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn partial_cmp(&self, other: &Num) -> Option<core::cmp::Ordering> {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => Some(a.cmp(b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

fn number(v: &Value) -> Option<Num> {
    match v {
        Value::Int(i) => Some(Num::Int(*i)),
        Value::Bool(b) => Some(Num::Int(i64::from(*b))),
        Value::Float(f) => Some(Num::Float(*f)),
        _ => None,
    }
}

const REPEAT_TOO_LARGE: Error = Error::Arithmetic("repeated sequence is too large");

/// Repetition count for `seq * n`; non-positive counts give an empty sequence.
fn repeat_count(n: i64) -> usize {
    usize::try_from(n).unwrap_or(0)
}

fn repeated_len(len: usize, times: usize) -> Result<usize> {
    len.checked_mul(times).ok_or(REPEAT_TOO_LARGE)
}
