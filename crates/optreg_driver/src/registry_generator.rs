//! The option-registry generator pass.

use std::collections::HashMap;
use std::sync::Mutex;

use optreg_analysis::hasher::hash_collection;
use optreg_analysis::{
    collect_lookups, discover_candidates, discover_collections, extract_collection,
};
use optreg_common::{Fingerprint, InternalError};
use optreg_diagnostics::{Diagnostic, DiagnosticPolicy, DiagnosticSink};
use optreg_emit::{emit_collection, select_shape, GeneratedArtifact, SourceUnit};
use optreg_model::{CollectionModel, LookupShape};
use optreg_symbols::{Compilation, GeneratedSource, SymbolQuery};
use tokio_util::sync::CancellationToken;

use crate::error::DriverError;
use crate::generator::{Generator, GeneratorOutput};

/// Name the registry generator tags its sources and diagnostics with.
pub const REGISTRY_GENERATOR_NAME: &str = "optreg";

/// Extracted collections and the lookup shape they will be rendered with.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Shape chosen for the target platform.
    pub shape: LookupShape,
    /// One model per valid collection, in discovery order.
    pub models: Vec<CollectionModel>,
}

struct CachedUnit {
    fingerprint: Fingerprint,
    unit: SourceUnit,
    diagnostics: Vec<Diagnostic>,
}

/// Generates one registry source per `GenerateCollection` marker.
///
/// The generator keeps the last unit it rendered for each registry. When a
/// later pass produces a collection model with the same fingerprint, the
/// stored unit is returned as [`UnitStatus::Reused`](optreg_emit::UnitStatus)
/// instead of being rendered again. Analysis always runs; only emission is
/// skipped.
#[derive(Default)]
pub struct RegistryGenerator {
    target_override: Option<String>,
    policy: DiagnosticPolicy,
    cache: Mutex<HashMap<String, CachedUnit>>,
}

impl RegistryGenerator {
    /// Creates a generator that reads the target moniker from the compilation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `moniker` instead of the compilation's target platform.
    pub fn with_target_framework(mut self, moniker: impl Into<String>) -> Self {
        self.target_override = Some(moniker.into());
        self
    }

    /// Applies `policy` to every diagnostic the generator returns.
    pub fn with_policy(mut self, policy: DiagnosticPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The deny/allow policy applied to returned diagnostics.
    pub fn policy(&self) -> &DiagnosticPolicy {
        &self.policy
    }

    /// Number of registries remembered from earlier passes.
    pub fn cached_units(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or_default()
    }

    /// Forgets every remembered unit, forcing the next pass to re-render.
    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    /// Runs discovery and extraction without rendering anything.
    ///
    /// User errors go to `sink`. Diagnostics raised while extracting one
    /// collection are sorted by location, code and message so that parallel
    /// extraction reports them in a stable order.
    pub fn analyze(
        &self,
        query: &dyn SymbolQuery,
        cancel: &CancellationToken,
        sink: &DiagnosticSink,
    ) -> Result<Analysis, DriverError> {
        let moniker = self.target_override.as_deref().or(query.target_framework());
        let shape = select_shape(moniker, sink);
        tracing::debug!(
            assembly = query.assembly_name(),
            moniker,
            shape = shape.label(),
            "starting registry analysis"
        );

        let collections = discover_collections(query, moniker, sink)?;
        let grouped = discover_candidates(query, &collections, sink)?;
        let mut models = Vec::with_capacity(collections.len());
        for (definition, candidates) in collections.iter().zip(&grouped) {
            if cancel.is_cancelled() {
                return Err(DriverError::Cancelled);
            }
            let Some(lookups) = collect_lookups(query, definition, sink)? else {
                continue;
            };
            let local = DiagnosticSink::new();
            let model = extract_collection(query, definition, lookups, candidates, cancel, &local);
            let mut diags = local.take_all();
            diags.sort_by(|a, b| {
                a.location
                    .cmp(&b.location)
                    .then_with(|| a.code.cmp(&b.code))
                    .then_with(|| a.message.cmp(&b.message))
            });
            sink.extend(diags);
            if let Some(model) = model? {
                tracing::debug!(
                    collection = %model.definition.name,
                    options = model.options.len(),
                    lookups = model.lookups.len(),
                    "extracted collection"
                );
                models.push(model);
            }
        }
        Ok(Analysis { shape, models })
    }

    /// Renders `analysis`, reusing remembered units whose fingerprint is
    /// unchanged. Diagnostics of a reused unit are replayed.
    fn emit_all(
        &self,
        analysis: &Analysis,
        sink: &DiagnosticSink,
    ) -> Result<Vec<SourceUnit>, DriverError> {
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| InternalError::new("registry unit cache lock poisoned"))?;
        let mut units = Vec::with_capacity(analysis.models.len());
        let mut live = Vec::with_capacity(analysis.models.len());
        for model in &analysis.models {
            let key = model.definition.registry_full_name();
            let fingerprint = hash_collection(model, analysis.shape);
            live.push(key.clone());
            if let Some(cached) = cache.get(&key).filter(|c| c.fingerprint == fingerprint) {
                tracing::debug!(registry = %key, "inputs unchanged, reusing unit");
                sink.extend(cached.diagnostics.iter().cloned());
                units.push(cached.unit.clone().reused());
                continue;
            }
            let local = DiagnosticSink::new();
            let unit = emit_collection(model, analysis.shape, &local);
            let diagnostics = local.take_all();
            sink.extend(diagnostics.iter().cloned());
            match unit {
                Some(unit) => {
                    cache.insert(
                        key,
                        CachedUnit {
                            fingerprint,
                            unit: unit.clone(),
                            diagnostics,
                        },
                    );
                    units.push(unit);
                }
                None => {
                    cache.remove(&key);
                }
            }
        }
        cache.retain(|key, _| live.contains(key));
        units.sort_by(|a, b| a.hint_name.cmp(&b.hint_name));
        Ok(units)
    }
}

impl Generator for RegistryGenerator {
    fn name(&self) -> &str {
        REGISTRY_GENERATOR_NAME
    }

    fn generate(
        &self,
        compilation: &Compilation,
        cancel: &CancellationToken,
    ) -> Result<GeneratorOutput, DriverError> {
        let analysis_sink = DiagnosticSink::new();
        let analysis = self.analyze(compilation, cancel, &analysis_sink)?;
        if cancel.is_cancelled() {
            return Err(DriverError::Cancelled);
        }

        let emit_sink = DiagnosticSink::new();
        let units = self.emit_all(&analysis, &emit_sink)?;
        let emitted = self.policy.apply_all(emit_sink.take_all());
        let mut diagnostics = self.policy.apply_all(analysis_sink.take_all());
        diagnostics.extend(emitted.iter().cloned());

        let sources = units
            .iter()
            .map(|unit| GeneratedSource {
                generator: REGISTRY_GENERATOR_NAME.to_string(),
                hint_name: unit.hint_name.clone(),
                text: unit.text.clone(),
            })
            .collect();
        let artifact = GeneratedArtifact {
            units,
            diagnostics: emitted,
        };
        tracing::debug!(
            units = artifact.units.len(),
            rendered = artifact.fresh_count(),
            diagnostics = diagnostics.len(),
            "registry pass finished"
        );
        Ok(GeneratorOutput {
            sources,
            added_types: Vec::new(),
            diagnostics,
            artifact: Some(artifact),
        })
    }
}
