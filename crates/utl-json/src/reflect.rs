//! Struct ↔ [`Value`] reflection driven by a per-type field table.
//!
//! Rust has no runtime field enumeration, so a struct opts in once with the
//! [`reflect!`](crate::reflect!) macro, naming the fields to expose. The macro
//! records the names (in declaration order) and generates [`ToValue`] and
//! [`FromValue`] impls that walk those fields, recursing through nested structs,
//! `Vec`s, maps and `Option`s exactly the way a [`Value`] tree nests.
//!
//! ```
//! use utl_json::{from_struct, reflect, to_struct, Format};
//!
//! #[derive(Debug, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//! reflect!(Point { x, y });
//!
//! let v = from_struct(&Point { x: 1, y: -2 });
//! assert_eq!(v.to_string_with(Format::Minimized), r#"{"x":1,"y":-2}"#);
//! assert_eq!(to_struct::<Point>(&v).unwrap(), Point { x: 1, y: -2 });
//! ```

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use crate::error::{JsonError, Result};
use crate::object::Object;
use crate::value::Value;

/// Conversion into a [`Value`] tree.
pub trait ToValue {
    fn to_value(&self) -> Value;
}

/// Conversion out of a [`Value`] tree.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self>;

    /// Called by reflected structs when the field's key is absent from the object.
    /// Defaults to a `Key` error; `Option<T>` overrides it to produce `None`.
    fn from_missing(key: &str) -> Result<Self> {
        Err(JsonError::Key(key.to_string()))
    }
}

/// The field table registered by [`reflect!`](crate::reflect!).
pub trait Reflect {
    /// Field names in declaration order; this is also the key order of the
    /// objects produced by [`ToValue`].
    const FIELDS: &'static [&'static str];
}

/// Build an object value from a reflected struct (or anything implementing [`ToValue`]).
pub fn from_struct<T: ToValue + ?Sized>(value: &T) -> Value {
    value.to_value()
}

/// Rebuild a reflected struct (or anything implementing [`FromValue`]) from a value.
pub fn to_struct<T: FromValue>(value: &Value) -> Result<T> {
    T::from_value(value)
}

/// Read one field of a reflected struct from its object. Used by [`reflect!`](crate::reflect!).
#[doc(hidden)]
pub fn field<T: FromValue>(object: &Object, key: &str) -> Result<T> {
    match object.get(key) {
        Some(value) => T::from_value(value),
        None => T::from_missing(key),
    }
}

/// Register a struct's fields for reflection.
///
/// `reflect!(Type { a, b, c })` implements [`Reflect`], [`ToValue`] and
/// [`FromValue`] for `Type`. The generated `FromValue` builds the struct with a
/// literal, so every field of the struct must be listed.
#[macro_export]
macro_rules! reflect {
    ($ty:ident { $($field:ident),* $(,)? }) => {
        impl $crate::reflect::Reflect for $ty {
            const FIELDS: &'static [&'static str] = &[$(stringify!($field)),*];
        }

        impl $crate::reflect::ToValue for $ty {
            fn to_value(&self) -> $crate::Value {
                let mut object = $crate::Object::with_capacity(
                    <$ty as $crate::reflect::Reflect>::FIELDS.len(),
                );
                $(
                    object.insert(
                        stringify!($field),
                        $crate::reflect::ToValue::to_value(&self.$field),
                    );
                )*
                $crate::Value::Object(object)
            }
        }

        impl $crate::reflect::FromValue for $ty {
            fn from_value(value: &$crate::Value) -> $crate::Result<Self> {
                #[allow(unused_variables)]
                let object = value.get_object()?;
                Ok(Self {
                    $( $field: $crate::reflect::field(object, stringify!($field))?, )*
                })
            }
        }
    };
}

// ----------------------------------------------------------------------------
// Leaf and container impls
// ----------------------------------------------------------------------------

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self> {
        value.get_bool()
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self> {
        value.get_string().map(str::to_string)
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Number(*self)
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self> {
        value.get_number()
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::Number(f64::from(*self))
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Result<Self> {
        value.get_number().map(|n| n as f32)
    }
}

/// Integers accept only integral numbers that fit the target type.
macro_rules! reflect_integer {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::Number(*self as f64)
                }
            }

            impl FromValue for $ty {
                fn from_value(value: &Value) -> Result<Self> {
                    let n = value.get_number()?;
                    // `MAX as f64 + 1.0` rounds to the first power of two past MAX,
                    // which is exactly the exclusive upper bound.
                    if n.fract() == 0.0 && n >= <$ty>::MIN as f64 && n < <$ty>::MAX as f64 + 1.0 {
                        Ok(n as $ty)
                    } else {
                        Err(JsonError::Number {
                            value: n,
                            target: stringify!($ty),
                        })
                    }
                }
            }
        )*
    };
}

reflect_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, ToValue::to_value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }

    fn from_missing(_key: &str) -> Result<Self> {
        Ok(None)
    }
}

impl<T: ToValue + ?Sized> ToValue for Box<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: FromValue> FromValue for Box<T> {
    fn from_value(value: &Value) -> Result<Self> {
        T::from_value(value).map(Box::new)
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self> {
        value.get_array()?.iter().map(T::from_value).collect()
    }
}

impl<T: ToValue, const N: usize> ToValue for [T; N] {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<T: FromValue, const N: usize> FromValue for [T; N] {
    fn from_value(value: &Value) -> Result<Self> {
        let items = value.get_array()?;
        if items.len() != N {
            return Err(JsonError::Index {
                index: items.len().min(N),
                len: items.len(),
            });
        }
        let converted = items
            .iter()
            .map(T::from_value)
            .collect::<Result<Vec<T>>>()?;
        converted.try_into().map_err(|rest: Vec<T>| JsonError::Index {
            index: N,
            len: rest.len(),
        })
    }
}

impl<T: ToValue> ToValue for BTreeMap<String, T> {
    fn to_value(&self) -> Value {
        Value::Object(self.iter().map(|(k, v)| (k.clone(), v.to_value())).collect())
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(value: &Value) -> Result<Self> {
        value
            .get_object()?
            .iter()
            .map(|(k, v)| Ok((k.to_string(), T::from_value(v)?)))
            .collect()
    }
}

impl<T: ToValue, S> ToValue for HashMap<String, T, S> {
    fn to_value(&self) -> Value {
        Value::Object(self.iter().map(|(k, v)| (k.clone(), v.to_value())).collect())
    }
}

impl<T: FromValue, S: BuildHasher + Default> FromValue for HashMap<String, T, S> {
    fn from_value(value: &Value) -> Result<Self> {
        value
            .get_object()?
            .iter()
            .map(|(k, v)| Ok((k.to_string(), T::from_value(v)?)))
            .collect()
    }
}

impl ToValue for Object {
    fn to_value(&self) -> Value {
        Value::Object(self.clone())
    }
}

impl FromValue for Object {
    fn from_value(value: &Value) -> Result<Self> {
        value.get_object().cloned()
    }
}
