//! Serializer — renders a [`Value`] tree back to JSON text.
//!
//! Two layouts are supported:
//!
//! - **Minimized**: no insignificant whitespace at all (`{"a":[1,2]}`).
//! - **Pretty**: one element per line, `indent` spaces per nesting level, a single
//!   space after each colon. Empty containers stay compact as `[]` / `{}`.
//!
//! Object members are written in insertion order. Output is always valid JSON
//! that [`crate::parse`] reads back to an equal tree, with one exception:
//! non-finite numbers have no JSON spelling and are written as `null`.
//!
//! # Number formatting
//!
//! Numbers use the shortest decimal string that parses back to the same `f64`.
//! Magnitudes in `[1e-5, 1e16)` are written in plain notation (`0.25`, `42`,
//! `-0`); anything else uses an exponent (`1e300`, `5e-324`) to avoid hundreds of
//! padding zeros.
//!
//! # Nesting depth
//!
//! Writing recurses once per nesting level, as do `Clone`, `Drop` and equality on
//! [`Value`]. Trees read by [`crate::parse`] are bounded by
//! [`crate::parser::DEFAULT_MAX_DEPTH`]; trees built in code should stay within a
//! few thousand levels, or be serialized on a thread with a larger stack.

use std::fmt::{self, Write as _};
use std::io;

use crate::object::Object;
use crate::value::Value;

/// Indentation width used by [`Format::Pretty`] unless overridden.
pub const DEFAULT_INDENT: usize = 4;

/// Output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    Pretty,
    #[default]
    Minimized,
}

/// Full serializer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializeOptions {
    pub format: Format,
    /// Spaces per nesting level in pretty mode; ignored when minimized.
    pub indent: usize,
}

impl SerializeOptions {
    pub fn pretty() -> Self {
        Self {
            format: Format::Pretty,
            indent: DEFAULT_INDENT,
        }
    }

    pub fn minimized() -> Self {
        Self {
            format: Format::Minimized,
            indent: DEFAULT_INDENT,
        }
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self::minimized()
    }
}

impl From<Format> for SerializeOptions {
    fn from(format: Format) -> Self {
        Self {
            format,
            indent: DEFAULT_INDENT,
        }
    }
}

/// Serialize a value to a JSON string.
///
/// Accepts either a bare [`Format`] or a full [`SerializeOptions`].
///
/// # Example
/// ```
/// use utl_json::{to_string, Format, Value};
///
/// let v = Value::from_iter([("b", 1), ("a", 2)]);
/// assert_eq!(to_string(&v, Format::Minimized), r#"{"b":1,"a":2}"#);
/// assert_eq!(to_string(&v, Format::Pretty), "{\n    \"b\": 1,\n    \"a\": 2\n}");
/// ```
pub fn to_string(value: &Value, options: impl Into<SerializeOptions>) -> String {
    let options = options.into();
    let mut out = String::new();
    write_value(value, 0, &options, &mut out);
    out
}

/// Serialize a value and write it to `writer` in one call.
pub fn to_writer<W: io::Write>(
    writer: &mut W,
    value: &Value,
    options: impl Into<SerializeOptions>,
) -> io::Result<()> {
    writer.write_all(to_string(value, options).as_bytes())
}

impl Value {
    /// Serialize this value; see [`to_string`].
    pub fn to_string_with(&self, options: impl Into<SerializeOptions>) -> String {
        to_string(self, options)
    }
}

/// `{}` writes minimized JSON and `{:#}` writes pretty JSON.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format = if f.alternate() {
            Format::Pretty
        } else {
            Format::Minimized
        };
        f.write_str(&to_string(self, format))
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format = if f.alternate() {
            Format::Pretty
        } else {
            Format::Minimized
        };
        let mut out = String::new();
        write_object(self, 0, &format.into(), &mut out);
        f.write_str(&out)
    }
}

/// Dispatch on the variant; containers recurse with `depth + 1`.
fn write_value(value: &Value, depth: usize, options: &SerializeOptions, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => write_number(*n, out),
        Value::String(s) => write_string(s, out),
        Value::Array(items) => write_array(items, depth, options, out),
        Value::Object(object) => write_object(object, depth, options, out),
    }
}

fn write_array(items: &[Value], depth: usize, options: &SerializeOptions, out: &mut String) {
    if items.is_empty() {
        out.push_str("[]");
        return;
    }
    out.push('[');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_newline_indent(depth + 1, options, out);
        write_value(item, depth + 1, options, out);
    }
    write_newline_indent(depth, options, out);
    out.push(']');
}

fn write_object(object: &Object, depth: usize, options: &SerializeOptions, out: &mut String) {
    if object.is_empty() {
        out.push_str("{}");
        return;
    }
    let separator = match options.format {
        Format::Pretty => ": ",
        Format::Minimized => ":",
    };
    out.push('{');
    for (i, (key, value)) in object.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_newline_indent(depth + 1, options, out);
        write_string(key, out);
        out.push_str(separator);
        write_value(value, depth + 1, options, out);
    }
    write_newline_indent(depth, options, out);
    out.push('}');
}

/// Start a new line at `depth` in pretty mode; no-op when minimized.
fn write_newline_indent(depth: usize, options: &SerializeOptions, out: &mut String) {
    if options.format == Format::Pretty {
        out.push('\n');
        out.extend(std::iter::repeat_n(' ', depth * options.indent));
    }
}

/// Write a number in its shortest round-trip form; NaN and ±infinity become `null`.
fn write_number(n: f64, out: &mut String) {
    if !n.is_finite() {
        out.push_str("null");
        return;
    }
    let magnitude = n.abs();
    // Writing into a String cannot fail.
    let _ = if magnitude == 0.0 || (1e-5..1e16).contains(&magnitude) {
        write!(out, "{n}")
    } else {
        write!(out, "{n:e}")
    };
}

/// Write a quoted string, escaping `"`, `\` and control characters.
///
/// Everything else, including `/` and non-ASCII text, is copied through as UTF-8.
/// Escapes are found byte-wise; they are all ASCII, so every slice taken between
/// them falls on a character boundary.
fn write_string(s: &str, out: &mut String) {
    out.push('"');
    let mut run_start = 0;
    for (i, b) in s.bytes().enumerate() {
        let short = match b {
            b'"' => "\\\"",
            b'\\' => "\\\\",
            b'\n' => "\\n",
            b'\r' => "\\r",
            b'\t' => "\\t",
            0x08 => "\\b",
            0x0C => "\\f",
            0x00..=0x1F => "",
            _ => continue,
        };
        out.push_str(&s[run_start..i]);
        if short.is_empty() {
            let _ = write!(out, "\\u{b:04x}");
        } else {
            out.push_str(short);
        }
        run_start = i + 1;
    }
    out.push_str(&s[run_start..]);
    out.push('"');
}
