//! Error type for task results.

use std::any::Any;

use thiserror::Error;

/// Why an awaited task produced no value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The task panicked; carries the panic message.
    #[error("task panicked: {0}")]
    Panicked(String),

    /// The task was dropped without ever reporting a result.
    #[error("task was abandoned before producing a result")]
    Abandoned,
}

/// Convenience alias used throughout utl-parallel.
pub type Result<T> = std::result::Result<T, TaskError>;

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
