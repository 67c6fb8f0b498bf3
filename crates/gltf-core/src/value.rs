//! Generic JSON values.
//!
//! [`Value`] holds data the schema has no named field for: the contents of
//! `extras` and `extensions` dictionaries, or any JSON read generically.

use std::collections::BTreeMap;

use num_traits::NumCast;

/// A string-keyed map with deterministic (sorted) iteration order.
pub type Dictionary<V> = BTreeMap<String, V>;

/// The tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Undefined,
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

/// A JSON value.
///
/// `Undefined` is distinct from `Null`: it marks the absence of a value and is
/// never written.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(Dictionary<Value>),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Undefined => ValueType::Undefined,
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Bool,
            Value::Number(_) => ValueType::Number,
            Value::String(_) => ValueType::String,
            Value::Array(_) => ValueType::Array,
            Value::Object(_) => ValueType::Object,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool_or(&self, default: bool) -> bool {
        match self {
            Value::Bool(b) => *b,
            _ => default,
        }
    }

    /// Returns the number converted to `T`, or `default` if this is not a
    /// number or the number does not fit in `T`.
    pub fn as_number_or<T: NumCast>(&self, default: T) -> T {
        match self {
            Value::Number(n) => <T as NumCast>::from(*n).unwrap_or(default),
            _ => default,
        }
    }

    pub fn as_str_or<'a>(&'a self, default: &'a str) -> &'a str {
        match self {
            Value::String(s) => s,
            _ => default,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Dictionary<Value>> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Dictionary<Value>> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(a: Vec<Value>) -> Self {
        Value::Array(a)
    }
}

impl From<Dictionary<Value>> for Value {
    fn from(o: Dictionary<Value>) -> Self {
        Value::Object(o)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_tags() {
        assert_eq!(Value::from(true).value_type(), ValueType::Bool);
        assert_eq!(Value::from(1.5).value_type(), ValueType::Number);
        assert_eq!(Value::from("x").value_type(), ValueType::String);
        assert_eq!(Value::from(vec![Value::Null]).value_type(), ValueType::Array);
        assert_eq!(Value::from(Dictionary::new()).value_type(), ValueType::Object);
        assert_eq!(Value::from(None::<bool>), Value::Null);
        assert!(Value::default().is_undefined());
    }

    #[test]
    fn test_extraction_defaults() {
        let n = Value::from(42u32);
        assert_eq!(n.as_number_or(0u8), 42u8);
        assert_eq!(Value::from(300u32).as_number_or(7u8), 7u8);
        assert_eq!(Value::from(-1).as_number_or(5usize), 5usize);
        assert_eq!(n.as_str_or("none"), "none");
        assert!(!n.as_bool_or(false));
        assert!(Value::from(true).as_bool_or(false));
        assert!(n.as_array().is_none());
        assert_eq!(Value::Null.as_number_or(2.5f64), 2.5);
    }
}
