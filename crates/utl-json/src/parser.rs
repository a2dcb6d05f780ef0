//! RFC 8259 parser — converts JSON text into a [`Value`] tree.
//!
//! Single-pass recursive descent over the input bytes with one cursor. Each
//! production (`object`, `array`, `string`, `number`, literal) consumes exactly its
//! own token(s) and builds its subtree bottom-up; the first error aborts the whole
//! parse and is returned with its byte offset, line and column.
//!
//! # Key design decisions
//!
//! - **Strict grammar**: trailing commas, leading zeros, `+1`, `.5`, `1.`, `NaN`,
//!   `Infinity`, single quotes, comments and unescaped control characters in
//!   strings are all rejected. Only space, tab, CR and LF count as whitespace, so a
//!   byte-order mark is an error.
//! - **Permissive number range**: a grammatically valid number whose magnitude does
//!   not fit an `f64` is accepted and stored as the nearest double (`1e400` becomes
//!   infinity, `1e-400` becomes zero). RFC 8259 leaves range limits to the
//!   implementation.
//! - **Lone surrogates**: a `\uD800`-style escape without its partner decodes to
//!   U+FFFD, because a Rust `String` cannot hold an unpaired surrogate.
//! - **Duplicate keys**: the first occurrence keeps its position and the last
//!   occurrence's value wins.
//! - **Depth limit**: nesting deeper than [`ParseOptions::max_depth`] is an error,
//!   so hostile input cannot exhaust the stack.

use crate::error::{JsonError, Result};
use crate::object::Object;
use crate::value::Value;

/// Nesting limit used by [`parse`].
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Parser configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum number of nested arrays/objects. The outermost container is depth 1.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Parse JSON text into a [`Value`] with default options.
///
/// # Example
/// ```
/// let v = utl_json::parse(r#"{"b": 1, "a": [true, null]}"#).unwrap();
/// assert_eq!(v["a"][0], true);
/// assert_eq!(v.get_object().unwrap().keys().collect::<Vec<_>>(), ["b", "a"]);
/// ```
pub fn parse(text: &str) -> Result<Value> {
    parse_with(text, ParseOptions::default())
}

/// Parse JSON text with explicit options.
pub fn parse_with(text: &str, options: ParseOptions) -> Result<Value> {
    let mut parser = Parser::new(text, options);
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if parser.pos < parser.bytes.len() {
        return Err(parser.error("trailing characters after JSON value"));
    }
    Ok(value)
}

/// Parse raw bytes; input that is not valid UTF-8 is a parse error.
pub fn parse_bytes(bytes: &[u8]) -> Result<Value> {
    match std::str::from_utf8(bytes) {
        Ok(text) => parse(text),
        Err(e) => {
            let offset = e.valid_up_to();
            let (line, column) = line_column(bytes, offset);
            Err(JsonError::Parse {
                message: "invalid UTF-8 in input".to_string(),
                offset,
                line,
                column,
            })
        }
    }
}

/// 1-based line and column (in characters) of a byte offset.
fn line_column(bytes: &[u8], offset: usize) -> (usize, usize) {
    let offset = offset.min(bytes.len());
    let before = &bytes[..offset];
    let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
    let line_start = before
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |i| i + 1);
    // Count UTF-8 lead bytes so multi-byte characters take one column.
    let column = before[line_start..]
        .iter()
        .filter(|&&b| b & 0xC0 != 0x80)
        .count()
        + 1;
    (line, column)
}

struct Parser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str, options: ParseOptions) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            depth: 0,
            max_depth: options.max_depth,
        }
    }

    fn error(&self, message: impl Into<String>) -> JsonError {
        self.error_at(self.pos, message)
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> JsonError {
        let (line, column) = line_column(self.bytes, offset);
        JsonError::Parse {
            message: message.into(),
            offset,
            line,
            column,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    fn skip_digits(&mut self) {
        while let Some(b'0'..=b'9') = self.peek() {
            self.pos += 1;
        }
    }

    /// Describe the character under the cursor for error messages.
    fn unexpected(&self, expected: &str) -> JsonError {
        match self.text.get(self.pos..).and_then(|s| s.chars().next()) {
            Some(c) => self.error(format!("unexpected character {c:?}, expected {expected}")),
            None => self.error(format!("unexpected end of input, expected {expected}")),
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(self.error(format!(
                "nesting depth exceeds limit of {}",
                self.max_depth
            )));
        }
        Ok(())
    }

    /// `value := object | array | string | number | true | false | null`
    fn parse_value(&mut self) -> Result<Value> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'{') => self.parse_object(),
            Some(b'[') => self.parse_array(),
            Some(b'"') => Ok(Value::String(self.parse_string()?)),
            Some(b'-' | b'0'..=b'9') => self.parse_number(),
            Some(b't') => self.parse_literal("true", Value::Bool(true)),
            Some(b'f') => self.parse_literal("false", Value::Bool(false)),
            Some(b'n') => self.parse_literal("null", Value::Null),
            _ => Err(self.unexpected("a JSON value")),
        }
    }

    fn parse_object(&mut self) -> Result<Value> {
        self.enter()?;
        self.pos += 1; // '{'
        let mut object = Object::new();

        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            self.depth -= 1;
            return Ok(Value::Object(object));
        }

        loop {
            self.skip_whitespace();
            if self.peek() != Some(b'"') {
                return Err(self.unexpected("a string key"));
            }
            let key = self.parse_string()?;

            self.skip_whitespace();
            if self.peek() != Some(b':') {
                return Err(self.unexpected("':' after object key"));
            }
            self.pos += 1;

            let value = self.parse_value()?;
            object.insert(key, value);

            self.skip_whitespace();
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    if self.peek() == Some(b'}') {
                        return Err(self.error("trailing comma in object"));
                    }
                }
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.unexpected("',' or '}' after object member")),
            }
        }

        self.depth -= 1;
        Ok(Value::Object(object))
    }

    fn parse_array(&mut self) -> Result<Value> {
        self.enter()?;
        self.pos += 1; // '['
        let mut items = Vec::new();

        self.skip_whitespace();
        if self.peek() == Some(b']') {
            self.pos += 1;
            self.depth -= 1;
            return Ok(Value::Array(items));
        }

        loop {
            items.push(self.parse_value()?);

            self.skip_whitespace();
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    if self.peek() == Some(b']') {
                        return Err(self.error("trailing comma in array"));
                    }
                }
                Some(b']') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.unexpected("',' or ']' after array element")),
            }
        }

        self.depth -= 1;
        Ok(Value::Array(items))
    }

    /// Parse a string token starting at the opening quote.
    ///
    /// Runs of plain characters are copied in one slice; the run only stops on
    /// ASCII bytes (quote, backslash, control) so every slice boundary is a
    /// character boundary.
    fn parse_string(&mut self) -> Result<String> {
        let start = self.pos;
        self.pos += 1; // '"'
        let mut out = String::new();

        loop {
            let run_start = self.pos;
            while let Some(&b) = self.bytes.get(self.pos) {
                if b == b'"' || b == b'\\' || b < 0x20 {
                    break;
                }
                self.pos += 1;
            }
            out.push_str(&self.text[run_start..self.pos]);

            match self.peek() {
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b'\\') => {
                    self.pos += 1;
                    self.parse_escape(&mut out)?;
                }
                Some(b) => {
                    return Err(self.error(format!(
                        "unescaped control character 0x{b:02x} in string"
                    )));
                }
                None => return Err(self.error_at(start, "unterminated string")),
            }
        }
    }

    /// Decode the escape following a backslash into `out`.
    fn parse_escape(&mut self, out: &mut String) -> Result<()> {
        let escape_start = self.pos - 1;
        let Some(b) = self.peek() else {
            return Err(self.error_at(escape_start, "unterminated escape sequence"));
        };
        self.pos += 1;
        match b {
            b'"' => out.push('"'),
            b'\\' => out.push('\\'),
            b'/' => out.push('/'),
            b'b' => out.push('\u{08}'),
            b'f' => out.push('\u{0C}'),
            b'n' => out.push('\n'),
            b'r' => out.push('\r'),
            b't' => out.push('\t'),
            b'u' => out.push(self.parse_unicode_escape()?),
            _ => {
                let shown = self.text[escape_start..]
                    .chars()
                    .nth(1)
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                return Err(self.error_at(escape_start, format!("invalid escape sequence '\\{shown}'")));
            }
        }
        Ok(())
    }

    /// Decode `XXXX` after `\u`, joining a following low surrogate escape when
    /// the first unit is a high surrogate.
    fn parse_unicode_escape(&mut self) -> Result<char> {
        let first = self.parse_hex4()?;
        match first {
            0xD800..=0xDBFF => {
                if self.bytes.get(self.pos) == Some(&b'\\')
                    && self.bytes.get(self.pos + 1) == Some(&b'u')
                {
                    let resume = self.pos;
                    self.pos += 2;
                    let second = self.parse_hex4()?;
                    if (0xDC00..=0xDFFF).contains(&second) {
                        let code = 0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00);
                        return Ok(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                    }
                    // Not a low surrogate: decode it on its own next time round.
                    self.pos = resume;
                }
                Ok(char::REPLACEMENT_CHARACTER)
            }
            0xDC00..=0xDFFF => Ok(char::REPLACEMENT_CHARACTER),
            code => Ok(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)),
        }
    }

    fn parse_hex4(&mut self) -> Result<u32> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = match self.peek() {
                Some(b @ b'0'..=b'9') => b - b'0',
                Some(b @ b'a'..=b'f') => b - b'a' + 10,
                Some(b @ b'A'..=b'F') => b - b'A' + 10,
                _ => return Err(self.error("invalid \\u escape, expected 4 hex digits")),
            };
            code = (code << 4) | u32::from(digit);
            self.pos += 1;
        }
        Ok(code)
    }

    /// `number := '-'? int frac? exp?`
    fn parse_number(&mut self) -> Result<Value> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }

        match self.peek() {
            Some(b'0') => {
                self.pos += 1;
                if let Some(b'0'..=b'9') = self.peek() {
                    return Err(self.error_at(start, "leading zeros are not allowed"));
                }
            }
            Some(b'1'..=b'9') => self.skip_digits(),
            _ => return Err(self.unexpected("a digit")),
        }

        if self.peek() == Some(b'.') {
            self.pos += 1;
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.unexpected("a digit after the decimal point"));
            }
            self.skip_digits();
        }

        if let Some(b'e' | b'E') = self.peek() {
            self.pos += 1;
            if let Some(b'+' | b'-') = self.peek() {
                self.pos += 1;
            }
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.unexpected("a digit in the exponent"));
            }
            self.skip_digits();
        }

        let token = &self.text[start..self.pos];
        token
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|_| self.error_at(start, format!("invalid number {token:?}")))
    }

    fn parse_literal(&mut self, word: &str, value: Value) -> Result<Value> {
        if self.bytes[self.pos..].starts_with(word.as_bytes()) {
            self.pos += word.len();
            Ok(value)
        } else {
            Err(self.error(format!("invalid literal, expected `{word}`")))
        }
    }
}

impl std::str::FromStr for Value {
    type Err = JsonError;

    fn from_str(text: &str) -> Result<Self> {
        parse(text)
    }
}
