//! # utl-json
//!
//! An insertion-ordered JSON document model with a strict RFC 8259 parser, a
//! two-mode serializer and a reflection bridge between plain structs and
//! documents.
//!
//! ## Quick start
//!
//! ```rust
//! use utl_json::{parse, Format, Value};
//!
//! // text → tree
//! let mut doc = parse(r#"{"name":"Alice","scores":[95,87]}"#).unwrap();
//! assert_eq!(doc["scores"][1], 87);
//!
//! // mutate with auto-vivification
//! doc["address"]["city"] = "Oslo".into();
//! doc["matrix"] = Value::from([[1, 2], [3, 4]]);
//!
//! // tree → text, keys in insertion order
//! assert_eq!(
//!     doc.to_string_with(Format::Minimized),
//!     r#"{"name":"Alice","scores":[95,87],"address":{"city":"Oslo"},"matrix":[[1,2],[3,4]]}"#
//! );
//! ```
//!
//! ## Modules
//!
//! - [`value`] — `Value` tagged union, typed and keyed access
//! - [`object`] — insertion-ordered `Object` map
//! - [`parser`] — JSON text → `Value`
//! - [`serializer`] — `Value` → JSON text (pretty or minimized)
//! - [`reflect`] — struct ↔ `Value` via the `reflect!` field table
//! - [`io`] — whole-file load/store
//! - [`error`] — `JsonError` and its classification

mod convert;
pub mod error;
mod index;
pub mod io;
pub mod object;
pub mod parser;
pub mod reflect;
mod serde_impl;
pub mod serializer;
pub mod value;

pub use error::{ErrorKind, JsonError, Result};
pub use index::Key;
pub use io::{from_file, to_file};
pub use object::Object;
pub use parser::{parse, parse_bytes, parse_with, ParseOptions};
pub use reflect::{from_struct, to_struct, FromValue, Reflect, ToValue};
pub use serializer::{to_string, to_writer, Format, SerializeOptions};
pub use value::{Value, ValueKind};
