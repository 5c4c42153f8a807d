//! Source locations attached to symbols and diagnostics.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 1-indexed position in a source file, as reported by the host compiler.
///
/// The generator never reads source text itself; locations are opaque
/// references carried from symbols through to diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Path of the source file, as given by the host.
    pub file: String,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed).
    pub column: u32,
}

impl SourceLocation {
    /// Creates a new location.
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
