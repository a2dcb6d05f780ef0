//! Whole-file load and store helpers.

use std::fs;
use std::path::Path;

use crate::error::{JsonError, Result};
use crate::parser::parse;
use crate::serializer::{to_string, SerializeOptions};
use crate::value::Value;

/// Read a file completely and parse it.
///
/// Open/read failures are `Io` errors carrying the path; malformed content is a
/// `Parse` error.
pub fn from_file(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| JsonError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(target: "utl::json", path = %path.display(), bytes = text.len(), "loaded JSON file");
    parse(&text)
}

/// Serialize `value` and write it to `path`, replacing any existing file.
pub fn to_file(
    path: impl AsRef<Path>,
    value: &Value,
    options: impl Into<SerializeOptions>,
) -> Result<()> {
    let path = path.as_ref();
    let text = to_string(value, options);
    fs::write(path, &text).map_err(|source| JsonError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(target: "utl::json", path = %path.display(), bytes = text.len(), "wrote JSON file");
    Ok(())
}

impl Value {
    /// Load a document from disk; see [`from_file`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Value> {
        from_file(path)
    }

    /// Write this document to disk; see [`to_file`].
    pub fn to_file(&self, path: impl AsRef<Path>, options: impl Into<SerializeOptions>) -> Result<()> {
        to_file(path, self, options)
    }
}
