//! Key types accepted by [`Value::at`], [`Value::entry`] and the `[]` operators.
//!
//! String keys address object entries and `usize` keys address array elements.
//! The trait is sealed; the three lookup flavours are the whole contract.

use std::ops;

use crate::error::{JsonError, Result};
use crate::value::{Value, ValueKind};

mod private {
    pub trait Sealed {}
    impl Sealed for usize {}
    impl Sealed for str {}
    impl Sealed for String {}
    impl<T: Sealed + ?Sized> Sealed for &T {}
}

/// A string key or array position.
pub trait Key: private::Sealed {
    #[doc(hidden)]
    fn lookup<'v>(&self, value: &'v Value) -> Result<&'v Value>;
    #[doc(hidden)]
    fn lookup_mut<'v>(&self, value: &'v mut Value) -> Result<&'v mut Value>;
    #[doc(hidden)]
    fn vivify<'v>(&self, value: &'v mut Value) -> Result<&'v mut Value>;
}

impl Key for usize {
    fn lookup<'v>(&self, value: &'v Value) -> Result<&'v Value> {
        let array = value.get_array()?;
        array.get(*self).ok_or(JsonError::Index {
            index: *self,
            len: array.len(),
        })
    }

    fn lookup_mut<'v>(&self, value: &'v mut Value) -> Result<&'v mut Value> {
        let array = value.get_array_mut()?;
        let len = array.len();
        array
            .get_mut(*self)
            .ok_or(JsonError::Index { index: *self, len })
    }

    fn vivify<'v>(&self, value: &'v mut Value) -> Result<&'v mut Value> {
        if value.is_null() {
            *value = Value::array();
        }
        let array = value.get_array_mut()?;
        if *self >= array.len() {
            array.resize(*self + 1, Value::Null);
        }
        Ok(&mut array[*self])
    }
}

impl Key for str {
    fn lookup<'v>(&self, value: &'v Value) -> Result<&'v Value> {
        value
            .get_object()?
            .get(self)
            .ok_or_else(|| JsonError::Key(self.to_string()))
    }

    fn lookup_mut<'v>(&self, value: &'v mut Value) -> Result<&'v mut Value> {
        value
            .get_object_mut()?
            .get_mut(self)
            .ok_or_else(|| JsonError::Key(self.to_string()))
    }

    fn vivify<'v>(&self, value: &'v mut Value) -> Result<&'v mut Value> {
        if value.is_null() {
            *value = Value::object();
        }
        match value {
            Value::Object(object) => Ok(object.get_or_insert_null(self)),
            other => Err(JsonError::type_mismatch(ValueKind::Object, other.kind())),
        }
    }
}

impl Key for String {
    fn lookup<'v>(&self, value: &'v Value) -> Result<&'v Value> {
        self.as_str().lookup(value)
    }

    fn lookup_mut<'v>(&self, value: &'v mut Value) -> Result<&'v mut Value> {
        self.as_str().lookup_mut(value)
    }

    fn vivify<'v>(&self, value: &'v mut Value) -> Result<&'v mut Value> {
        self.as_str().vivify(value)
    }
}

impl<T: Key + ?Sized> Key for &T {
    fn lookup<'v>(&self, value: &'v Value) -> Result<&'v Value> {
        (**self).lookup(value)
    }

    fn lookup_mut<'v>(&self, value: &'v mut Value) -> Result<&'v mut Value> {
        (**self).lookup_mut(value)
    }

    fn vivify<'v>(&self, value: &'v mut Value) -> Result<&'v mut Value> {
        (**self).vivify(value)
    }
}

/// Read access through `value[key]`.
///
/// Behaves like [`Value::at`] and panics with the error message when the lookup
/// fails. Use `at` to handle the failure instead.
impl<K: Key> ops::Index<K> for Value {
    type Output = Value;

    fn index(&self, key: K) -> &Value {
        match key.lookup(self) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

/// Auto-vivifying write access through `value[key] = ...`.
///
/// Behaves like [`Value::entry`] and panics with the error message when the
/// receiver is neither `Null` nor the container the key addresses.
impl<K: Key> ops::IndexMut<K> for Value {
    fn index_mut(&mut self, key: K) -> &mut Value {
        match key.vivify(self) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}
