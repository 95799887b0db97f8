//! Concrete host values produced by evaluation, and the host callables that
//! expressions ultimately invoke.
//!
//! A [`Value`] is what an expression tree evaluates to once every variable is
//! bound. Host logic enters the tree through three kinds of callables:
//!
//! | Kind | Rust type | Wrapped as |
//! |------|-----------|------------|
//! | free function | [`HostFn`] | [`CallTarget::Function`](crate::expr::CallTarget::Function) |
//! | class | [`HostClass`] | [`CallTarget::Constructor`](crate::expr::CallTarget::Constructor) |
//! | callable object | [`HostObject`] with [`HostObject::is_callable`] | [`CallTarget::CallOperator`](crate::expr::CallTarget::CallOperator) |

use core::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

type HostFnImpl = dyn Fn(&CallArgs) -> Result<Value> + Send + Sync;

/// Evaluated positional and keyword arguments passed to a host callable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CallArgs {
    /// Positional arguments, in call order.
    pub positional: Vec<Value>,
    /// Keyword arguments, in call order.
    pub keyword: Vec<(String, Value)>,
}

impl CallArgs {
    /// Creates call arguments from positional values only.
    #[must_use]
    pub fn positional(values: Vec<Value>) -> Self {
        Self {
            positional: values,
            keyword: Vec::new(),
        }
    }

    /// Returns the positional argument at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Host`] if fewer than `index + 1` positional arguments were passed.
    pub fn arg(&self, index: usize) -> Result<&Value> {
        self.positional
            .get(index)
            .ok_or_else(|| Error::host(format!("missing positional argument {index}")))
    }

    /// Returns the keyword argument named `name`, if passed.
    #[must_use]
    pub fn kwarg(&self, name: &str) -> Option<&Value> {
        self.keyword
            .iter()
            .find_map(|(k, v)| (k == name).then_some(v))
    }

    /// Returns the argument passed either by keyword `name` or at position `index`.
    ///
    /// Keyword arguments take precedence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Host`] if the argument was passed neither way.
    pub fn param(&self, index: usize, name: &str) -> Result<&Value> {
        if let Some(v) = self.kwarg(name) {
            return Ok(v);
        }
        self.positional
            .get(index)
            .ok_or_else(|| Error::host(format!("missing argument '{name}'")))
    }

    /// Returns `true` if no arguments were passed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }
}

/// A named host function.
///
/// Cloning shares the underlying closure; two `HostFn`s are equal only when
/// they share it.
#[derive(Clone)]
pub struct HostFn {
    name: Arc<str>,
    f: Arc<HostFnImpl>,
}

impl HostFn {
    /// Creates a host function from a closure.
    ///
    /// # Examples
    ///
    /// ```
    /// use metalg::{CallArgs, HostFn, Value};
    ///
    /// let inc = HostFn::new("inc", |args| Ok(Value::Int(args.arg(0)?.as_i64()? + 1)));
    /// let out = inc.call(&CallArgs::positional(vec![Value::Int(1)])).unwrap();
    /// assert_eq!(out, Value::Int(2));
    /// ```
    pub fn new<F>(name: impl Into<Arc<str>>, f: F) -> Self
    where
        F: Fn(&CallArgs) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            f: Arc::new(f),
        }
    }

    /// Returns the function's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes the function.
    ///
    /// # Errors
    ///
    /// Propagates any error returned by the closure.
    pub fn call(&self, args: &CallArgs) -> Result<Value> {
        (self.f)(args)
    }

    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.f, &other.f)
    }
}

impl fmt::Debug for HostFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostFn").field("name", &self.name).finish()
    }
}

/// A host class: a name plus a constructor producing instances.
#[derive(Clone)]
pub struct HostClass {
    name: Arc<str>,
    ctor: Arc<HostFnImpl>,
}

impl HostClass {
    /// Creates a class from its constructor.
    pub fn new<F>(name: impl Into<Arc<str>>, ctor: F) -> Self
    where
        F: Fn(&CallArgs) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            ctor: Arc::new(ctor),
        }
    }

    /// Returns the class name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Constructs an instance.
    ///
    /// # Errors
    ///
    /// Propagates any error returned by the constructor.
    pub fn construct(&self, args: &CallArgs) -> Result<Value> {
        (self.ctor)(args)
    }

    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.ctor, &other.ctor)
    }
}

impl fmt::Debug for HostClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostClass").field("name", &self.name).finish()
    }
}

/// A host object: an instance with attributes and, optionally, a call operator.
pub trait HostObject: fmt::Debug + Send + Sync {
    /// The object's type name, used in error messages and rendering.
    fn type_name(&self) -> &str;

    /// Looks up an attribute. Returns `None` if the object has no such attribute.
    fn attr(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Returns `true` if the object can be called.
    fn is_callable(&self) -> bool {
        false
    }

    /// Invokes the object's call operator.
    ///
    /// # Errors
    ///
    /// The default implementation returns [`Error::NotCallable`].
    fn call(&self, _args: &CallArgs) -> Result<Value> {
        Err(Error::NotCallable(self.type_name().to_string()))
    }
}

/// A concrete, non-symbolic value.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// The absence of a value; also the placeholder for unbound variables.
    #[default]
    None,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating-point number.
    Float(f64),
    /// A string.
    Str(Arc<str>),
    /// An ordered sequence.
    List(Vec<Value>),
    /// A string-keyed mapping that preserves insertion order.
    Map(Vec<(String, Value)>),
    /// A host function.
    Func(HostFn),
    /// A host class.
    Class(HostClass),
    /// A host object.
    Object(Arc<dyn HostObject>),
}

impl Value {
    /// Wraps a host object.
    pub fn object<O: HostObject + 'static>(obj: O) -> Self {
        Value::Object(Arc::new(obj))
    }

    /// Creates a string value.
    pub fn str(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    /// Returns the name of this value's type.
    #[must_use]
    pub fn type_name(&self) -> String {
        match self {
            Value::None => "None".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::Str(_) => "str".to_string(),
            Value::List(_) => "list".to_string(),
            Value::Map(_) => "map".to_string(),
            Value::Func(_) => "function".to_string(),
            Value::Class(_) => "class".to_string(),
            Value::Object(o) => o.type_name().to_string(),
        }
    }

    /// Returns `true` for [`Value::None`].
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Returns the value as an integer. Booleans convert to 0 or 1.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Host`] for any non-integer value.
    pub fn as_i64(&self) -> Result<i64> {
        match self {
            Value::Int(v) => Ok(*v),
            Value::Bool(b) => Ok(i64::from(*b)),
            other => Err(Error::host(format!(
                "expected an int, got '{}'",
                other.type_name()
            ))),
        }
    }

    /// Returns the value as a float. Integers and booleans are widened.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Host`] for any non-numeric value.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Result<f64> {
        match self {
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            Value::Bool(b) => Ok(f64::from(u8::from(*b))),
            other => Err(Error::host(format!(
                "expected a number, got '{}'",
                other.type_name()
            ))),
        }
    }

    /// Returns the string slice if this is a [`Value::Str`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements if this is a [`Value::List`].
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up an attribute on this value.
    ///
    /// Objects delegate to [`HostObject::attr`]; maps look up the key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuchAttribute`] if the attribute does not exist.
    pub fn attr(&self, name: &str) -> Result<Value> {
        let found = match self {
            Value::Object(o) => o.attr(name),
            Value::Map(entries) => entries
                .iter()
                .find_map(|(k, v)| (k == name).then(|| v.clone())),
            _ => None,
        };
        found.ok_or_else(|| Error::NoSuchAttribute {
            type_name: self.type_name(),
            name: name.to_string(),
        })
    }

    /// Looks up an item on this value.
    ///
    /// Lists and strings are indexed by integer (negative indices count from
    /// the end); maps are indexed by string key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ItemAccess`] for a missing key, an index out of range,
    /// or an unsupported base/key combination.
    pub fn item(&self, key: &Value) -> Result<Value> {
        match (self, key) {
            (Value::List(items), Value::Int(i)) => resolve_index(*i, items.len())
                .map(|idx| items[idx].clone())
                .ok_or_else(|| Error::ItemAccess(format!("list index {i} out of range"))),
            (Value::Str(s), Value::Int(i)) => {
                let chars: Vec<char> = s.chars().collect();
                resolve_index(*i, chars.len())
                    .map(|idx| Value::str(chars[idx].to_string()))
                    .ok_or_else(|| Error::ItemAccess(format!("string index {i} out of range")))
            }
            (Value::Map(entries), Value::Str(k)) => entries
                .iter()
                .find_map(|(name, v)| (name.as_str() == &**k).then(|| v.clone()))
                .ok_or_else(|| Error::ItemAccess(format!("key '{k}' not found"))),
            (base, key) => Err(Error::ItemAccess(format!(
                "'{}' object cannot be indexed by '{}'",
                base.type_name(),
                key.type_name()
            ))),
        }
    }

    /// Calls this value with evaluated arguments.
    ///
    /// Functions are invoked, classes constructed, callable objects called.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCallable`] for any other value, or the callee's error.
    pub fn call(&self, args: &CallArgs) -> Result<Value> {
        match self {
            Value::Func(f) => f.call(args),
            Value::Class(c) => c.construct(args),
            Value::Object(o) if o.is_callable() => o.call(args),
            other => Err(Error::NotCallable(other.type_name())),
        }
    }
}

#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn resolve_index(i: i64, len: usize) -> Option<usize> {
    let idx = if i < 0 { len as i64 + i } else { i };
    (idx >= 0 && (idx as usize) < len).then_some(idx as usize)
}

impl PartialEq for Value {
    #[allow(clippy::cast_precision_loss)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Func(a), Value::Func(b)) => a.ptr_eq(b),
            (Value::Class(a), Value::Class(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Str(s) => write!(f, "'{s}'"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            Value::Func(h) => write!(f, "{}", h.name()),
            Value::Class(c) => write!(f, "{}", c.name()),
            Value::Object(o) => write!(f, "<{} object>", o.type_name()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<usize> for Value {
    #[allow(clippy::cast_possible_wrap)]
    fn from(v: usize) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.into())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v.into())
    }
}

impl From<HostFn> for Value {
    fn from(v: HostFn) -> Self {
        Value::Func(v)
    }
}

impl From<HostClass> for Value {
    fn from(v: HostClass) -> Self {
        Value::Class(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}
