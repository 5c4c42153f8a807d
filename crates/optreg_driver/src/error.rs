//! Errors a generator pass can return instead of output.

use optreg_analysis::ExtractError;
use optreg_common::InternalError;
use optreg_symbols::QueryError;

/// Why a generator produced no output.
///
/// User mistakes never surface here; they are diagnostics. A `DriverError`
/// means the host failed, the pass was cancelled, or the generator has a bug.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// The host symbol model failed to answer a query.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Cancellation was requested while the pass was running.
    #[error("generation was cancelled")]
    Cancelled,

    /// A generator invariant was broken.
    #[error(transparent)]
    Internal(#[from] InternalError),

    /// A generator failed for a reason of its own.
    #[error("generator `{generator}` failed: {message}")]
    Generator {
        /// Name of the failing generator.
        generator: String,
        /// What went wrong.
        message: String,
    },

    /// A sequence finished with error diagnostics where none were expected.
    #[error("{count} error(s) reported, first: {first}")]
    ErrorsReported {
        /// Number of error diagnostics.
        count: usize,
        /// Rendered message of the first error.
        first: String,
    },
}

impl DriverError {
    /// Returns `true` for [`DriverError::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DriverError::Cancelled)
    }
}

impl From<ExtractError> for DriverError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Query(e) => DriverError::Query(e),
            ExtractError::Cancelled => DriverError::Cancelled,
            rejection => DriverError::Internal(InternalError::new(format!(
                "candidate rejection escaped extraction: {rejection}"
            ))),
        }
    }
}
