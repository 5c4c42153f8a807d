//! Structured diagnostic messages with severity, codes, locations and notes.

use crate::code::DiagnosticCode;
use crate::severity::Severity;
use optreg_common::SourceLocation;
use serde::{Deserialize, Serialize};

/// A structured diagnostic produced while generating a registry.
///
/// Diagnostics are appended to a sink by every pipeline stage. A failing
/// candidate produces a diagnostic and is skipped; the pass continues.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The stable code identifying the kind of diagnostic.
    pub code: DiagnosticCode,
    /// The main diagnostic message.
    pub message: String,
    /// Where the offending symbol was declared, if known.
    pub location: Option<SourceLocation>,
    /// Explanatory footnotes (e.g., the underlying extraction failure).
    pub notes: Vec<String>,
    /// Actionable suggestions.
    pub help: Vec<String>,
}

impl Diagnostic {
    /// Creates a new error diagnostic with the given code and message.
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    /// Creates a new warning diagnostic with the given code and message.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    /// Creates a diagnostic at the default severity of its code's category.
    pub fn of(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::default_for(code.category), code, message)
    }

    fn new(severity: Severity, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            location: None,
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    /// Attaches a source location to this diagnostic.
    pub fn at(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }

    /// Adds a note to this diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Adds a help message to this diagnostic.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Category;

    #[test]
    fn create_error() {
        let code = DiagnosticCode::new(Category::Error, 104);
        let diag = Diagnostic::error(code, "generation failed for option `Added`");
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(format!("{}", diag.code), "E104");
        assert!(diag.location.is_none());
    }

    #[test]
    fn create_warning() {
        let code = DiagnosticCode::new(Category::Warning, 201);
        let diag = Diagnostic::warning(code, "not an option");
        assert_eq!(diag.severity, Severity::Warning);
    }

    #[test]
    fn category_picks_severity() {
        let w = Diagnostic::of(DiagnosticCode::new(Category::Warning, 203), "internal option");
        let e = Diagnostic::of(DiagnosticCode::new(Category::Error, 107), "declared twice");
        assert_eq!(w.severity, Severity::Warning);
        assert_eq!(e.severity, Severity::Error);
    }

    #[test]
    fn builder_methods() {
        let code = DiagnosticCode::new(Category::Error, 102);
        let diag = Diagnostic::error(code, "duplicate option name")
            .at(Some(SourceLocation::new("Crud.cs", 4, 2)))
            .with_note("first declared on `Crud`")
            .with_help("give one of the markers a distinct name");
        assert_eq!(diag.notes.len(), 1);
        assert_eq!(diag.help.len(), 1);
        assert_eq!(diag.location.unwrap().line, 4);
    }
}
