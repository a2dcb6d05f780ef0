//! The JSON document model.
//!
//! A [`Value`] is a tagged union over the six JSON types. Containers own their
//! children exclusively, so a document is always a tree. Numbers are stored as
//! `f64`; integers beyond 2^53 lose exactness, which is accepted.
//!
//! Mutation goes through keyed or indexed access. [`Value::at`] never changes the
//! shape of a document, while [`Value::entry`] (and `IndexMut`) auto-vivify: a
//! `Null` receiver becomes an `Object` when indexed by a string key and an `Array`
//! when indexed by a position.

use std::fmt;

use crate::error::{JsonError, Result};
use crate::index::Key;
use crate::object::Object;
use crate::reflect::FromValue;

/// A JSON value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    /// Key-value pairs in insertion order.
    Object(Object),
}

/// The variant tag of a [`Value`], used in type errors and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        };
        f.write_str(name)
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// An empty array value.
    pub fn array() -> Self {
        Value::Array(Vec::new())
    }

    /// An empty object value.
    pub fn object() -> Self {
        Value::Object(Object::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    // ------------------------------------------------------------------------
    // Typed access
    // ------------------------------------------------------------------------

    fn mismatch(&self, expected: ValueKind) -> JsonError {
        JsonError::type_mismatch(expected, self.kind())
    }

    pub fn get_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(other.mismatch(ValueKind::Bool)),
        }
    }

    pub fn get_bool_mut(&mut self) -> Result<&mut bool> {
        match self {
            Value::Bool(b) => Ok(b),
            other => Err(other.mismatch(ValueKind::Bool)),
        }
    }

    pub fn get_number(&self) -> Result<f64> {
        match self {
            Value::Number(n) => Ok(*n),
            other => Err(other.mismatch(ValueKind::Number)),
        }
    }

    pub fn get_number_mut(&mut self) -> Result<&mut f64> {
        match self {
            Value::Number(n) => Ok(n),
            other => Err(other.mismatch(ValueKind::Number)),
        }
    }

    pub fn get_string(&self) -> Result<&str> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(other.mismatch(ValueKind::String)),
        }
    }

    pub fn get_string_mut(&mut self) -> Result<&mut String> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(other.mismatch(ValueKind::String)),
        }
    }

    pub fn get_array(&self) -> Result<&Vec<Value>> {
        match self {
            Value::Array(a) => Ok(a),
            other => Err(other.mismatch(ValueKind::Array)),
        }
    }

    pub fn get_array_mut(&mut self) -> Result<&mut Vec<Value>> {
        match self {
            Value::Array(a) => Ok(a),
            other => Err(other.mismatch(ValueKind::Array)),
        }
    }

    pub fn get_object(&self) -> Result<&Object> {
        match self {
            Value::Object(o) => Ok(o),
            other => Err(other.mismatch(ValueKind::Object)),
        }
    }

    pub fn get_object_mut(&mut self) -> Result<&mut Object> {
        match self {
            Value::Object(o) => Ok(o),
            other => Err(other.mismatch(ValueKind::Object)),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.get_bool().ok()
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.get_number().ok()
    }

    /// The number as an `i64`, if it is integral and in range.
    pub fn as_i64(&self) -> Option<i64> {
        let n = self.as_f64()?;
        // 2^63 is exactly representable; anything at or above it does not fit.
        if n.fract() == 0.0 && n >= -9_223_372_036_854_775_808.0 && n < 9_223_372_036_854_775_808.0
        {
            Some(n as i64)
        } else {
            None
        }
    }

    /// The number as a `u64`, if it is integral, non-negative and in range.
    pub fn as_u64(&self) -> Option<u64> {
        let n = self.as_f64()?;
        if n.fract() == 0.0 && n >= 0.0 && n < 18_446_744_073_709_551_616.0 {
            Some(n as u64)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.get_string().ok()
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        self.get_array().ok()
    }

    pub fn as_object(&self) -> Option<&Object> {
        self.get_object().ok()
    }

    // ------------------------------------------------------------------------
    // Keyed / indexed access
    // ------------------------------------------------------------------------

    /// Look up a key or index without changing the document.
    ///
    /// Objects take string keys and fail with `Key` when the key is absent.
    /// Arrays take positions and fail with `Index` when out of range.
    /// Any other combination fails with `Type`.
    pub fn at<K: Key>(&self, key: K) -> Result<&Value> {
        key.lookup(self)
    }

    /// Mutable counterpart of [`Value::at`]; never inserts.
    pub fn at_mut<K: Key>(&mut self, key: K) -> Result<&mut Value> {
        key.lookup_mut(self)
    }

    /// Auto-vivifying access.
    ///
    /// A `Null` receiver is turned into the container matching the key type.
    /// A missing object key is inserted with a `Null` value at the end of the
    /// object. An array index past the end grows the array with `Null`s up to
    /// and including that index. A non-matching variant fails with `Type`.
    pub fn entry<K: Key>(&mut self, key: K) -> Result<&mut Value> {
        key.vivify(self)
    }

    /// Object membership test; fails with `Type` on anything but an object.
    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get_object()?.contains_key(key))
    }

    /// The value at `key` converted to `T`, or `default`.
    ///
    /// Never fails: a non-object receiver, a missing key and a failed
    /// conversion all yield `default`.
    pub fn value_or<T: FromValue>(&self, key: &str, default: T) -> T {
        self.as_object()
            .and_then(|o| o.get(key))
            .and_then(|v| T::from_value(v).ok())
            .unwrap_or(default)
    }

    /// Append to an array, turning a `Null` receiver into an empty array first.
    pub fn push(&mut self, value: impl Into<Value>) -> Result<()> {
        if self.is_null() {
            *self = Value::array();
        }
        self.get_array_mut()?.push(value.into());
        Ok(())
    }

    /// Number of children for containers and 0 for scalars.
    pub fn len(&self) -> usize {
        match self {
            Value::Array(a) => a.len(),
            Value::Object(o) => o.len(),
            _ => 0,
        }
    }

    /// `true` for scalars and for containers without children.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Move the value out, leaving `Null` behind.
    pub fn take(&mut self) -> Value {
        std::mem::take(self)
    }
}
