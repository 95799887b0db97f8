//! Concrete variable values and the binding map passed to `freeze`.

use core::fmt;
use std::collections::HashMap;

use crate::value::Value;
use crate::variable::VarId;

/// A concrete value for one variable.
///
/// `Int` is used for integer variables and for single-choice lists (the
/// selected index). `Indices` is used for lists with a selection count.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Choice {
    /// An integer value or a list index.
    Int(i64),
    /// A floating-point value.
    Float(f64),
    /// A set of list indices, in selection order.
    Indices(Vec<usize>),
}

impl Choice {
    /// Returns the value as an integer if it is an `Int` or an integral `Float`.
    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Choice::Int(v) => Some(*v),
            Choice::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            _ => None,
        }
    }

    /// Returns the value as a float if it is numeric.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Choice::Int(v) => Some(*v as f64),
            Choice::Float(v) => Some(*v),
            Choice::Indices(_) => None,
        }
    }

    /// Returns the selected indices when the choice is an index set.
    #[must_use]
    pub fn as_indices(&self) -> Option<&[usize]> {
        match self {
            Choice::Indices(v) => Some(v),
            _ => None,
        }
    }

    /// Converts the choice into an evaluated [`Value`].
    #[allow(clippy::cast_possible_wrap)]
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Choice::Int(v) => Value::Int(*v),
            Choice::Float(v) => Value::Float(*v),
            Choice::Indices(v) => Value::List(v.iter().map(|&i| Value::Int(i as i64)).collect()),
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::Int(v) => write!(f, "{v}"),
            Choice::Float(v) => write!(f, "{v:?}"),
            Choice::Indices(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<i64> for Choice {
    fn from(v: i64) -> Self {
        Choice::Int(v)
    }
}

impl From<i32> for Choice {
    fn from(v: i32) -> Self {
        Choice::Int(i64::from(v))
    }
}

impl From<f64> for Choice {
    fn from(v: f64) -> Self {
        Choice::Float(v)
    }
}

impl From<Vec<usize>> for Choice {
    fn from(v: Vec<usize>) -> Self {
        Choice::Indices(v)
    }
}

/// An insertion-ordered map from variable id to its [`Choice`].
///
/// # Examples
///
/// ```
/// use metalg::{Bindings, Choice};
///
/// let mut b = Bindings::from([("x", 3)]);
/// b.insert("y", 0.5);
/// assert_eq!(b.get("x"), Some(&Choice::Int(3)));
/// assert_eq!(b.ids().map(|id| id.as_str()).collect::<Vec<_>>(), ["x", "y"]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Bindings {
    entries: Vec<(VarId, Choice)>,
    index: HashMap<VarId, usize>,
}

impl Bindings {
    /// Creates an empty binding map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the choice for `id`, returning the previous one.
    ///
    /// Replacing keeps the original insertion position.
    pub fn insert(&mut self, id: impl Into<VarId>, choice: impl Into<Choice>) -> Option<Choice> {
        let id = id.into();
        let choice = choice.into();
        if let Some(&pos) = self.index.get(&id) {
            return Some(core::mem::replace(&mut self.entries[pos].1, choice));
        }
        self.index.insert(id.clone(), self.entries.len());
        self.entries.push((id, choice));
        None
    }

    /// Returns the choice bound to `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Choice> {
        self.index.get(id).map(|&pos| &self.entries[pos].1)
    }

    /// Returns `true` if `id` is bound.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Number of bound variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(id, choice)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&VarId, &Choice)> {
        self.entries.iter().map(|(id, c)| (id, c))
    }

    /// Iterates over ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &VarId> {
        self.entries.iter().map(|(id, _)| id)
    }
}

impl PartialEq for Bindings {
    /// Two binding maps are equal when they bind the same ids to the same
    /// choices, regardless of insertion order.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(id, c)| other.get(id.as_str()) == Some(c))
    }
}

impl<K: Into<VarId>, C: Into<Choice>> FromIterator<(K, C)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (K, C)>>(iter: I) -> Self {
        let mut out = Bindings::new();
        for (id, choice) in iter {
            out.insert(id, choice);
        }
        out
    }
}

impl<K: Into<VarId>, C: Into<Choice>, const N: usize> From<[(K, C); N]> for Bindings {
    fn from(entries: [(K, C); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a Bindings {
    type Item = (&'a VarId, &'a Choice);
    type IntoIter = core::iter::Map<
        core::slice::Iter<'a, (VarId, Choice)>,
        fn(&'a (VarId, Choice)) -> (&'a VarId, &'a Choice),
    >;

    fn into_iter(self) -> Self::IntoIter {
        fn split(entry: &(VarId, Choice)) -> (&VarId, &Choice) {
            (&entry.0, &entry.1)
        }
        self.entries.iter().map(split as fn(&'a (VarId, Choice)) -> (&'a VarId, &'a Choice))
    }
}

impl fmt::Display for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (id, c)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{id}': {c}")?;
        }
        f.write_str("}")
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Bindings {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (id, choice) in &self.entries {
            map.serialize_entry(id.as_str(), choice)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Bindings {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        struct BindingsVisitor;

        impl<'de> serde::de::Visitor<'de> for BindingsVisitor {
            type Value = Bindings;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from variable id to a number or a list of indices")
            }

            fn visit_map<A: serde::de::MapAccess<'de>>(
                self,
                mut access: A,
            ) -> core::result::Result<Bindings, A::Error> {
                let mut out = Bindings::new();
                while let Some((id, choice)) = access.next_entry::<String, Choice>()? {
                    out.insert(id, choice);
                }
                Ok(out)
            }
        }

        deserializer.deserialize_map(BindingsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_first_position() {
        let mut b = Bindings::new();
        b.insert("a", 1);
        b.insert("b", 2);
        assert_eq!(b.insert("a", 5), Some(Choice::Int(1)));
        let ids: Vec<&str> = b.ids().map(VarId::as_str).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(b.get("a"), Some(&Choice::Int(5)));
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn test_equality_ignores_order() {
        let a = Bindings::from([("x", 1), ("y", 2)]);
        let b = Bindings::from([("y", 2), ("x", 1)]);
        assert_eq!(a, b);
        assert_ne!(a, Bindings::from([("x", 1)]));
    }

    #[test]
    fn test_integral_float_is_int() {
        assert_eq!(Choice::Float(3.0).as_i64(), Some(3));
        assert_eq!(Choice::Float(3.5).as_i64(), None);
        assert_eq!(Choice::Indices(vec![1]).as_i64(), None);
        assert_eq!(Choice::Int(2).as_f64(), Some(2.0));
    }

    #[test]
    fn test_display() {
        let mut b = Bindings::new();
        b.insert("x", 3);
        b.insert("y", vec![0_usize, 2]);
        b.insert("z", 0.5);
        assert_eq!(b.to_string(), "{'x': 3, 'y': [0, 2], 'z': 0.5}");
    }
}
