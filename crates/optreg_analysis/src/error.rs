//! Extraction failures.

use optreg_symbols::QueryError;

/// Why an option candidate could not be turned into a model.
///
/// Cancellation and host query failures abandon the pass. Everything else,
/// including an ambiguous type met while walking the candidate's hierarchy,
/// rejects a single candidate and is reported as an `E104` diagnostic.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Options are instantiated by the registry, so they must be concrete.
    #[error("`{0}` is abstract")]
    Abstract(String),

    /// Interfaces cannot be options.
    #[error("`{0}` is an interface")]
    Interface(String),

    /// Open generic types cannot be instantiated.
    #[error("`{0}` has unbound generic parameters")]
    OpenGeneric(String),

    /// Static types cannot be instantiated.
    #[error("`{0}` is static")]
    Static(String),

    /// No constructor the registry can call without arguments.
    #[error("`{0}` has no accessible parameterless constructor")]
    NoUsableConstructor(String),

    /// The host symbol query failed.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Cancellation was requested before the candidate started.
    #[error("extraction cancelled")]
    Cancelled,
}

impl ExtractError {
    /// Returns `true` if this error rejects one candidate rather than the pass.
    pub fn is_candidate_rejection(&self) -> bool {
        match self {
            ExtractError::Query(e) => e.is_ambiguous(),
            ExtractError::Cancelled => false,
            _ => true,
        }
    }
}
