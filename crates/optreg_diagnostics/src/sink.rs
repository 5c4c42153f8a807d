//! Thread-safe diagnostic accumulator for parallel extraction.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A thread-safe, append-only accumulator for diagnostics.
///
/// Candidates are extracted concurrently and each may emit diagnostics via
/// [`emit`](Self::emit). The error count is tracked atomically for fast
/// `has_errors` checks without locking the diagnostic vector.
pub struct DiagnosticSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
    error_count: AtomicUsize,
}

impl DiagnosticSink {
    /// Creates a new empty diagnostic sink.
    pub fn new() -> Self {
        Self {
            diagnostics: Mutex::new(Vec::new()),
            error_count: AtomicUsize::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Diagnostic>> {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Emits a diagnostic into the sink.
    ///
    /// If the diagnostic has [`Severity::Error`], the error count is incremented atomically.
    pub fn emit(&self, diag: Diagnostic) {
        if diag.severity == Severity::Error {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }
        self.lock().push(diag);
    }

    /// Emits every diagnostic from an iterator, in order.
    pub fn extend(&self, diags: impl IntoIterator<Item = Diagnostic>) {
        for diag in diags {
            self.emit(diag);
        }
    }

    /// Returns `true` if any error-severity diagnostics have been emitted.
    pub fn has_errors(&self) -> bool {
        self.error_count.load(Ordering::Relaxed) > 0
    }

    /// Returns the number of error-severity diagnostics emitted so far.
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Takes all accumulated diagnostics, leaving the sink empty.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.lock())
    }

    /// Returns a snapshot of all accumulated diagnostics without draining.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{self, E104, W201, W202};
    use optreg_common::SourceLocation;

    fn rejected(option: &str) -> Diagnostic {
        catalog::error_option_generation_failed(
            &format!("Demo.{option}"),
            "has no accessible parameterless constructor",
            Some(SourceLocation::new(&format!("{option}.cs"), 3, 1)),
        )
    }

    fn stray(type_name: &str) -> Diagnostic {
        catalog::warning_not_an_option(type_name, None)
    }

    #[test]
    fn fresh_sink_reports_nothing() {
        let sink = DiagnosticSink::default();
        assert!(!sink.has_errors());
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn warnings_do_not_fail_the_pass() {
        let sink = DiagnosticSink::new();
        sink.emit(stray("Demo.Loose"));
        sink.emit(catalog::warning_duplicate_key_value(
            "Widgets", "Id", "1", "Added", "Copied", None,
        ));
        assert!(!sink.has_errors());
        let codes: Vec<_> = sink.diagnostics().iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![W201, W202]);

        sink.emit(rejected("Pending"));
        assert_eq!(sink.error_count(), 1);
    }

    #[test]
    fn merged_collection_diagnostics_keep_their_order() {
        let collection = DiagnosticSink::new();
        collection.emit(rejected("Zeta"));
        collection.emit(stray("Demo.Alpha"));
        let pass = DiagnosticSink::new();
        pass.extend(collection.take_all());
        assert!(collection.diagnostics().is_empty());
        let merged = pass.take_all();
        assert_eq!(merged[0].code, E104);
        assert!(merged[0].message.contains("Demo.Zeta"));
        assert_eq!(merged[1].code, W201);
        assert_eq!(pass.error_count(), 1);
    }

    #[test]
    fn draining_keeps_the_error_count() {
        let sink = DiagnosticSink::new();
        sink.emit(rejected("Pending"));
        assert_eq!(sink.take_all().len(), 1);
        assert!(sink.has_errors());
    }

    #[test]
    fn candidates_report_concurrently() {
        let sink = DiagnosticSink::new();
        let options: Vec<String> = (0..64).map(|i| format!("Option{i}")).collect();
        std::thread::scope(|scope| {
            for chunk in options.chunks(8) {
                let sink = &sink;
                scope.spawn(move || {
                    for (i, option) in chunk.iter().enumerate() {
                        if i % 2 == 0 {
                            sink.emit(rejected(option));
                        } else {
                            sink.emit(stray(option));
                        }
                    }
                });
            }
        });
        assert_eq!(sink.error_count(), 32);
        assert_eq!(sink.diagnostics().len(), 64);
    }
}
