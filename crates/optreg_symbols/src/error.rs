//! Errors raised by symbol queries.

/// A symbol query that could not be answered.
///
/// [`Ambiguous`](QueryError::Ambiguous) is a defect in the user's code and
/// only rejects the candidate or collection whose query hit it. Every other
/// variant means the compilation could not be inspected at all, and the pass
/// that issued it is abandoned.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The same type definition is declared more than once in one assembly.
    #[error("type `{name}` is declared {count} times in assembly `{assembly}`")]
    Ambiguous {
        /// Fully-qualified type name.
        name: String,
        /// Assembly containing the duplicates.
        assembly: String,
        /// Number of declarations found.
        count: usize,
    },

    /// The serialised compilation could not be read.
    #[error("failed to read compilation `{path}`: {source}")]
    Io {
        /// Path that was being read.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The serialised compilation is not valid JSON for the symbol model.
    #[error("invalid compilation data: {0}")]
    Format(#[from] serde_json::Error),

    /// The host reported a failure of its own.
    #[error("host symbol query failed: {0}")]
    Host(String),
}

impl QueryError {
    /// Returns `true` if the user's declarations, not the host, caused the failure.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, QueryError::Ambiguous { .. })
    }
}
