//! How bad a diagnostic is.

use crate::code::Category;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Warnings exclude part of the output; errors also fail the pass.
///
/// A code's category gives its default severity, which a deny policy can
/// raise to `Error`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Severity {
    /// The offending candidate is skipped.
    Warning,
    /// The candidate or collection is skipped and the pass fails.
    Error,
}

impl Severity {
    /// The severity a code of `category` is reported with by default.
    pub fn default_for(category: Category) -> Self {
        match category {
            Category::Error => Severity::Error,
            Category::Warning => Severity::Warning,
        }
    }

    /// Returns `true` for [`Severity::Error`].
    pub fn is_error(self) -> bool {
        self == Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_sets_the_default() {
        assert_eq!(Severity::default_for(Category::Error), Severity::Error);
        assert_eq!(Severity::default_for(Category::Warning), Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn display() {
        assert_eq!(Severity::Error.to_string(), "error");
        assert_eq!(Severity::Warning.to_string(), "warning");
    }
}
