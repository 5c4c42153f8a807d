//! Generator sequences: later passes see earlier output, failures are
//! isolated, and cancellation stops the sequence.

use optreg_conformance::{
    demo, run_sequence, run_sequence_clean, run_sequence_with_cancellation, CompilationBuilder,
    TypeBuilder,
};
use optreg_diagnostics::catalog::E108;
use optreg_driver::{
    DriverError, Generator, GeneratorOutput, RegistryGenerator, RunOutcome,
    REGISTRY_GENERATOR_NAME,
};
use optreg_symbols::{Compilation, GeneratedSource, QueryError};
use tokio_util::sync::CancellationToken;

/// Adds one `Widget` option, as another generator in the build might.
struct Seeder;

impl Generator for Seeder {
    fn name(&self) -> &str {
        "seeder"
    }

    fn generate(
        &self,
        _compilation: &Compilation,
        _cancel: &CancellationToken,
    ) -> Result<GeneratorOutput, DriverError> {
        Ok(GeneratorOutput {
            sources: vec![GeneratedSource {
                generator: "seeder".to_string(),
                hint_name: "Demo.Seeded.g.cs".to_string(),
                text: "namespace Demo; public sealed class Seeded : Widget { }".to_string(),
            }],
            added_types: vec![TypeBuilder::option("Seeded", demo("Widget"))
                .id(10)
                .name_value("seeded")
                .build()],
            ..GeneratorOutput::default()
        })
    }
}

struct Unavailable;

impl Generator for Unavailable {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn generate(
        &self,
        _compilation: &Compilation,
        _cancel: &CancellationToken,
    ) -> Result<GeneratorOutput, DriverError> {
        Err(QueryError::Host("host shut down".to_string()).into())
    }
}

/// Requests cancellation and completes normally.
struct Canceller;

impl Generator for Canceller {
    fn name(&self) -> &str {
        "canceller"
    }

    fn generate(
        &self,
        _compilation: &Compilation,
        cancel: &CancellationToken,
    ) -> Result<GeneratorOutput, DriverError> {
        cancel.cancel();
        Ok(GeneratorOutput::default())
    }
}

fn start() -> Compilation {
    CompilationBuilder::new()
        .widgets()
        .widget("Added", 1, "added")
        .build()
}

#[test]
fn registry_sees_options_from_earlier_generators() {
    let registry = RegistryGenerator::new();
    let result = run_sequence_clean(&start(), &[&Seeder, &registry]).unwrap();
    assert_eq!(result.results.len(), 2);
    let run = result.run(REGISTRY_GENERATOR_NAME).unwrap();
    assert_eq!(run.outcome, RunOutcome::Completed);
    let text = &run.artifact.as_ref().unwrap().units[0].text;
    assert!(text.contains("Seeded => s_instanceSeeded;"));
    assert!(text.contains("public static int Count => 2;"));

    let hints: Vec<&str> = result
        .added_sources
        .iter()
        .map(|s| s.hint_name.as_str())
        .collect();
    assert_eq!(hints, vec!["Demo.Seeded.g.cs", "Demo.Widgets.g.cs"]);
    assert_eq!(result.final_compilation.generated().len(), 2);
}

#[test]
fn registry_before_seeder_misses_its_options() {
    let registry = RegistryGenerator::new();
    let result = run_sequence(&start(), &[&registry, &Seeder]);
    let run = result.run(REGISTRY_GENERATOR_NAME).unwrap();
    let text = &run.artifact.as_ref().unwrap().units[0].text;
    assert!(!text.contains("Seeded"));
    assert!(text.contains("public static int Count => 1;"));
}

#[test]
fn failing_generator_is_reported_and_sequence_continues() {
    let registry = RegistryGenerator::new();
    let result = run_sequence(&start(), &[&Unavailable, &registry]);
    assert_eq!(result.results[0].outcome, RunOutcome::Failed);
    assert_eq!(result.results[1].outcome, RunOutcome::Completed);
    assert_eq!(result.error_count(), 1);
    assert_eq!(result.diagnostics[0].code, E108);
    assert!(result.diagnostics[0].message.contains("host shut down"));
    assert_eq!(result.added_sources.len(), 1);

    let err = run_sequence_clean(&start(), &[&Unavailable, &registry]).unwrap_err();
    assert!(matches!(err, DriverError::ErrorsReported { count: 1, .. }));
}

#[test]
fn cancelled_before_start_produces_nothing() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let registry = RegistryGenerator::new();
    let result = run_sequence_with_cancellation(&start(), &[&registry], &cancel);
    assert!(result.cancelled);
    assert!(result.results.is_empty());
    assert!(result.added_sources.is_empty());
    assert_eq!(registry.cached_units(), 0);
}

#[test]
fn cancellation_between_generators_stops_the_sequence() {
    let cancel = CancellationToken::new();
    let registry = RegistryGenerator::new();
    let generators: [&dyn Generator; 3] = [&Seeder, &Canceller, &registry];
    let result = run_sequence_with_cancellation(&start(), &generators, &cancel);
    assert!(result.cancelled);
    assert_eq!(result.results.len(), 2);
    assert!(result.run(REGISTRY_GENERATOR_NAME).is_none());
    assert_eq!(result.added_sources.len(), 1);
    assert!(!result.has_errors());
}

#[test]
fn registry_generator_honours_a_cancelled_token() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = RegistryGenerator::new().generate(&start(), &cancel).unwrap_err();
    assert!(err.is_cancelled());
}

#[test]
fn output_is_deterministic_across_generators() {
    let c = CompilationBuilder::new()
        .widgets()
        .widget("Zeta", 3, "zeta")
        .widget("Alpha", 1, "alpha")
        .widget("Mid", 2, "mid")
        .build();
    let first = run_sequence(&c, &[&RegistryGenerator::new()]);
    let second = run_sequence(&c, &[&RegistryGenerator::new()]);
    let unit = |r: &optreg_driver::SequenceResult| {
        let artifact = r.results[0].artifact.clone().unwrap();
        let unit = artifact.units[0].clone();
        (unit.text, unit.content_hash)
    };
    assert_eq!(unit(&first), unit(&second));
    assert_eq!(first.added_sources, second.added_sources);
}
