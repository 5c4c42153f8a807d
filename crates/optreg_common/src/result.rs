//! Failures that indicate a generator bug rather than bad user input.
//!
//! User mistakes become diagnostics and the pass keeps going; an
//! `InternalError` aborts the generator that raised it.

/// A broken internal invariant.
#[derive(Debug, thiserror::Error)]
#[error("internal generator error: {message}")]
pub struct InternalError {
    /// What went wrong.
    pub message: String,
}

impl InternalError {
    /// Creates an internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
