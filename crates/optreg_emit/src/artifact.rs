//! Generated units and the artifact a generation pass produces.

use optreg_common::{ContentHash, Fingerprint};
use optreg_diagnostics::Diagnostic;
use serde::Serialize;

/// Whether a unit was rendered in this pass or carried over from an
/// earlier one with an identical fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    /// Rendered in this pass.
    Fresh,
    /// Reused from the incremental cache.
    Reused,
}

/// One generated source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceUnit {
    /// File name: `<Namespace>.<Registry>.g.cs`.
    pub hint_name: String,
    /// Name of the collection the unit renders.
    pub collection: String,
    /// Generated text.
    pub text: String,
    /// Hash of `text`.
    pub content_hash: ContentHash,
    /// Structural fingerprint of the model the text was rendered from.
    pub fingerprint: Fingerprint,
    /// Rendered or reused.
    pub status: UnitStatus,
}

impl SourceUnit {
    /// Marks a cached unit as reused.
    pub fn reused(mut self) -> Self {
        self.status = UnitStatus::Reused;
        self
    }
}

/// Everything a generation pass emits: one unit per valid collection,
/// ordered by hint name, plus diagnostics raised while rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeneratedArtifact {
    /// Generated units.
    pub units: Vec<SourceUnit>,
    /// Emitter diagnostics.
    pub diagnostics: Vec<Diagnostic>,
}

impl GeneratedArtifact {
    /// Finds a unit by hint name.
    pub fn unit(&self, hint_name: &str) -> Option<&SourceUnit> {
        self.units.iter().find(|u| u.hint_name == hint_name)
    }

    /// Number of units rendered in this pass.
    pub fn fresh_count(&self) -> usize {
        self.units
            .iter()
            .filter(|u| u.status == UnitStatus::Fresh)
            .count()
    }
}
