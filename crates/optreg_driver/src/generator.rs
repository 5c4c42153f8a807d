//! The generator abstraction the orchestrator runs.

use optreg_diagnostics::Diagnostic;
use optreg_emit::GeneratedArtifact;
use optreg_symbols::{Compilation, GeneratedSource, TypeSymbol};
use tokio_util::sync::CancellationToken;

use crate::error::DriverError;

/// What one generator pass adds to a compilation.
#[derive(Debug, Clone, Default)]
pub struct GeneratorOutput {
    /// Source units to add.
    pub sources: Vec<GeneratedSource>,
    /// Types the added sources declare, visible to later passes.
    pub added_types: Vec<TypeSymbol>,
    /// Diagnostics raised by the pass.
    pub diagnostics: Vec<Diagnostic>,
    /// The registry artifact, for generators that produce one.
    pub artifact: Option<GeneratedArtifact>,
}

/// A source generator.
///
/// A generator reads the compilation it is given and never mutates it; the
/// orchestrator builds the next compilation from the returned output.
/// Implementations should check `cancel` at their own granularity and return
/// [`DriverError::Cancelled`] when it fires.
pub trait Generator: Send + Sync {
    /// Stable name, used in diagnostics and to tag generated sources.
    fn name(&self) -> &str;

    /// Runs one pass over `compilation`.
    fn generate(
        &self,
        compilation: &Compilation,
        cancel: &CancellationToken,
    ) -> Result<GeneratorOutput, DriverError>;
}
