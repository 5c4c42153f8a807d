//! Multi-pass orchestration.
//!
//! Generators run strictly one after another. Each sees the compilation
//! produced by the previous one: the starting compilation plus every source
//! and type added so far. A generator that fails is reported as `E108` and
//! contributes nothing; the remaining generators still run. Cancellation is
//! checked before each generator starts, and a generator that observes it
//! mid-pass has its output discarded as a whole.

use optreg_diagnostics::{catalog, Diagnostic, DiagnosticSink};
use optreg_emit::GeneratedArtifact;
use optreg_symbols::{Compilation, GeneratedSource};
use tokio_util::sync::CancellationToken;

use crate::error::DriverError;
use crate::generator::Generator;

/// How one generator's turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The generator returned output, which was added to the compilation.
    Completed,
    /// The generator returned an error, reported as `E108`.
    Failed,
    /// Cancellation stopped the generator; nothing it produced was kept.
    Cancelled,
}

/// The record of one generator's turn.
#[derive(Debug, Clone)]
pub struct GeneratorRun {
    /// Generator name.
    pub generator: String,
    /// How the turn ended.
    pub outcome: RunOutcome,
    /// Sources the generator added.
    pub sources: Vec<GeneratedSource>,
    /// Diagnostics from this turn, including an `E108` for a failure.
    pub diagnostics: Vec<Diagnostic>,
    /// The generator's registry artifact, if it produced one.
    pub artifact: Option<GeneratedArtifact>,
}

/// Result of [`run_sequence`].
#[derive(Debug, Clone)]
pub struct SequenceResult {
    /// The compilation after the last completed generator.
    pub final_compilation: Compilation,
    /// One entry per generator that was started, in order.
    pub results: Vec<GeneratorRun>,
    /// Diagnostics of every turn, in order.
    pub diagnostics: Vec<Diagnostic>,
    /// Every source added across all turns, in order.
    pub added_sources: Vec<GeneratedSource>,
    /// `true` if cancellation stopped the sequence early.
    pub cancelled: bool,
}

impl SequenceResult {
    /// Returns `true` if any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }

    /// Number of error diagnostics.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity.is_error())
            .count()
    }

    /// Fails with [`DriverError::ErrorsReported`] if any turn reported an
    /// error. Verification tooling uses this to assert a clean sequence.
    pub fn ensure_no_errors(&self) -> Result<(), DriverError> {
        match self.diagnostics.iter().find(|d| d.severity.is_error()) {
            Some(first) => Err(DriverError::ErrorsReported {
                count: self.error_count(),
                first: format!("{}[{}]: {}", first.severity, first.code, first.message),
            }),
            None => Ok(()),
        }
    }

    /// The result of the generator named `name`, if it ran.
    pub fn run(&self, name: &str) -> Option<&GeneratorRun> {
        self.results.iter().find(|r| r.generator == name)
    }
}

/// Runs `generators` in order over `start` without cancellation.
pub fn run_sequence(start: &Compilation, generators: &[&dyn Generator]) -> SequenceResult {
    run_sequence_with_cancellation(start, generators, &CancellationToken::new())
}

/// Runs `generators` in order over `start`, stopping once `cancel` fires.
pub fn run_sequence_with_cancellation(
    start: &Compilation,
    generators: &[&dyn Generator],
    cancel: &CancellationToken,
) -> SequenceResult {
    let mut compilation = start.clone();
    let mut results = Vec::with_capacity(generators.len());
    let sink = DiagnosticSink::new();
    let mut added_sources = Vec::new();
    let mut cancelled = false;

    for generator in generators {
        if cancel.is_cancelled() {
            tracing::debug!(next = generator.name(), "sequence cancelled");
            cancelled = true;
            break;
        }
        let name = generator.name().to_string();
        let _span = tracing::debug_span!("generator", name = %name).entered();
        match generator.generate(&compilation, cancel) {
            Ok(output) => {
                tracing::debug!(
                    sources = output.sources.len(),
                    types = output.added_types.len(),
                    diagnostics = output.diagnostics.len(),
                    "generator completed"
                );
                sink.extend(output.diagnostics.iter().cloned());
                compilation =
                    compilation.with_generated(output.sources.iter().cloned(), output.added_types);
                added_sources.extend(output.sources.iter().cloned());
                results.push(GeneratorRun {
                    generator: name,
                    outcome: RunOutcome::Completed,
                    sources: output.sources,
                    diagnostics: output.diagnostics,
                    artifact: output.artifact,
                });
            }
            Err(DriverError::Cancelled) => {
                tracing::debug!("generator cancelled, output discarded");
                cancelled = true;
                results.push(GeneratorRun {
                    generator: name,
                    outcome: RunOutcome::Cancelled,
                    sources: Vec::new(),
                    diagnostics: Vec::new(),
                    artifact: None,
                });
                break;
            }
            Err(err) => {
                tracing::warn!(error = %err, "generator failed");
                let diag = catalog::error_symbol_query_failed(&name, &err.to_string());
                sink.emit(diag.clone());
                results.push(GeneratorRun {
                    generator: name,
                    outcome: RunOutcome::Failed,
                    sources: Vec::new(),
                    diagnostics: vec![diag],
                    artifact: None,
                });
            }
        }
    }

    SequenceResult {
        final_compilation: compilation,
        results,
        diagnostics: sink.take_all(),
        added_sources,
        cancelled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::GeneratorOutput;
    use optreg_diagnostics::catalog::{E108, W201};
    use optreg_symbols::{QueryError, TypeKind, TypeSymbol};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Adds one source and one type, recording what it saw.
    struct Adder {
        name: &'static str,
        seen: AtomicUsize,
    }

    impl Adder {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                seen: AtomicUsize::new(usize::MAX),
            }
        }
    }

    impl Generator for Adder {
        fn name(&self) -> &str {
            self.name
        }

        fn generate(
            &self,
            compilation: &Compilation,
            _cancel: &CancellationToken,
        ) -> Result<GeneratorOutput, DriverError> {
            self.seen.store(compilation.generated().len(), Ordering::SeqCst);
            Ok(GeneratorOutput {
                sources: vec![GeneratedSource {
                    generator: self.name.to_string(),
                    hint_name: format!("{}.g.cs", self.name),
                    text: format!("// {}", self.name),
                }],
                added_types: vec![TypeSymbol::new("Gen", self.name, TypeKind::Class)],
                diagnostics: vec![catalog::warning_not_an_option(self.name, None)],
                artifact: None,
            })
        }
    }

    struct Failing;

    impl Generator for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn generate(
            &self,
            _compilation: &Compilation,
            _cancel: &CancellationToken,
        ) -> Result<GeneratorOutput, DriverError> {
            Err(QueryError::Host("symbol table unavailable".to_string()).into())
        }
    }

    /// Cancels the shared token while running, then reports cancellation.
    struct CancelsMidway;

    impl Generator for CancelsMidway {
        fn name(&self) -> &str {
            "cancels"
        }

        fn generate(
            &self,
            _compilation: &Compilation,
            cancel: &CancellationToken,
        ) -> Result<GeneratorOutput, DriverError> {
            cancel.cancel();
            Err(DriverError::Cancelled)
        }
    }

    fn start() -> Compilation {
        Compilation::new("Demo", Some("net8.0"))
    }

    #[test]
    fn each_generator_sees_previous_output() {
        let (a, b) = (Adder::new("first"), Adder::new("second"));
        let result = run_sequence(&start(), &[&a, &b]);
        assert_eq!(a.seen.load(Ordering::SeqCst), 0);
        assert_eq!(b.seen.load(Ordering::SeqCst), 1);
        assert_eq!(result.final_compilation.generated().len(), 2);
        assert_eq!(result.final_compilation.types().len(), 2);
        assert_eq!(result.added_sources.len(), 2);
        assert_eq!(result.diagnostics.len(), 2);
        assert!(result.diagnostics.iter().all(|d| d.code == W201));
        assert!(!result.cancelled);
        assert!(!result.has_errors());
        assert!(result.ensure_no_errors().is_ok());
    }

    #[test]
    fn failure_is_e108_and_sequence_continues() {
        let after = Adder::new("after");
        let result = run_sequence(&start(), &[&Failing, &after]);
        assert_eq!(result.results.len(), 2);
        assert_eq!(result.results[0].outcome, RunOutcome::Failed);
        assert_eq!(result.results[1].outcome, RunOutcome::Completed);
        assert_eq!(after.seen.load(Ordering::SeqCst), 0);
        assert_eq!(result.error_count(), 1);
        assert_eq!(result.diagnostics[0].code, E108);
        assert!(result.diagnostics[0].message.contains("symbol table unavailable"));
        let err = result.ensure_no_errors().unwrap_err();
        assert!(matches!(err, DriverError::ErrorsReported { count: 1, .. }));
    }

    #[test]
    fn cancelled_before_start_runs_nothing() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let a = Adder::new("first");
        let result = run_sequence_with_cancellation(&start(), &[&a], &cancel);
        assert!(result.cancelled);
        assert!(result.results.is_empty());
        assert_eq!(a.seen.load(Ordering::SeqCst), usize::MAX);
        assert!(result.final_compilation.generated().is_empty());
    }

    #[test]
    fn cancellation_mid_sequence_discards_and_stops() {
        let cancel = CancellationToken::new();
        let (a, c) = (Adder::new("first"), Adder::new("third"));
        let result = run_sequence_with_cancellation(&start(), &[&a, &CancelsMidway, &c], &cancel);
        assert!(result.cancelled);
        assert_eq!(result.results.len(), 2);
        assert_eq!(result.results[1].outcome, RunOutcome::Cancelled);
        assert_eq!(result.final_compilation.generated().len(), 1);
        assert_eq!(c.seen.load(Ordering::SeqCst), usize::MAX);
        assert!(result.run("third").is_none());
        assert!(!result.has_errors());
    }
}
