//! Error types for parsing, typed access and file I/O.

use std::path::PathBuf;

use thiserror::Error;

use crate::value::ValueKind;

/// Errors produced by the document model, the parser and the file helpers.
#[derive(Error, Debug)]
pub enum JsonError {
    /// The input text was not valid JSON.
    /// `offset` is the byte offset of the failure; `line` and `column` are 1-based.
    #[error("parse error at line {line}, column {column}: {message}")]
    Parse {
        message: String,
        offset: usize,
        line: usize,
        column: usize,
    },

    /// A value was accessed as a variant it does not hold.
    #[error("type error: expected {expected}, found {found}")]
    Type { expected: ValueKind, found: ValueKind },

    /// A number could not be represented in the requested numeric type
    /// (fractional value for an integer, or out of range).
    #[error("type error: number {value} does not fit {target}")]
    Number { value: f64, target: &'static str },

    /// An object lookup without auto-vivification missed.
    #[error("key error: no entry for key {0:?}")]
    Key(String),

    /// An array lookup without auto-vivification was out of range.
    #[error("index error: index {index} out of range for array of length {len}")]
    Index { index: usize, len: usize },

    /// A file could not be opened, read or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Coarse classification of a [`JsonError`], convenient for matching in callers
/// that only care about the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Type,
    Key,
    Index,
    Io,
}

impl JsonError {
    pub(crate) fn type_mismatch(expected: ValueKind, found: ValueKind) -> Self {
        JsonError::Type { expected, found }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            JsonError::Parse { .. } => ErrorKind::Parse,
            JsonError::Type { .. } | JsonError::Number { .. } => ErrorKind::Type,
            JsonError::Key(_) => ErrorKind::Key,
            JsonError::Index { .. } => ErrorKind::Index,
            JsonError::Io { .. } => ErrorKind::Io,
        }
    }

    /// Byte offset of a parse failure, `None` for every other error.
    pub fn offset(&self) -> Option<usize> {
        match self {
            JsonError::Parse { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

/// Convenience alias used throughout utl-json.
pub type Result<T> = std::result::Result<T, JsonError>;
