//! Incremental regeneration: structural hashes and unit reuse.

use optreg_analysis::hasher::{hash_collection, hash_model};
use optreg_conformance::{
    demo, int, model, param_with_default, run_with, CompilationBuilder, TypeBuilder,
};
use optreg_driver::RegistryGenerator;
use optreg_emit::UnitStatus;
use optreg_model::LookupShape;
use optreg_symbols::{Compilation, ConstantValue, ParameterSymbol, TypeRef};

fn with_parameter(param: ParameterSymbol) -> Compilation {
    CompilationBuilder::new()
        .widgets()
        .with(
            TypeBuilder::option("Added", demo("Widget"))
                .id(1)
                .name_value("added")
                .primary_constructor(vec![param]),
        )
        .build()
}

fn added_fingerprint(c: &Compilation) -> optreg_common::Fingerprint {
    hash_model(&model(c, "Widgets").options[0])
}

fn base_param() -> ParameterSymbol {
    param_with_default("size", int(), ConstantValue::Int(1))
}

#[test]
fn identical_sources_hash_equal() {
    let a = added_fingerprint(&with_parameter(base_param()));
    let b = added_fingerprint(&with_parameter(base_param()));
    assert_eq!(a, b);
}

#[test]
fn doc_comment_does_not_change_hash() {
    let plain = with_parameter(base_param());
    let documented = CompilationBuilder::new()
        .widgets()
        .with(
            TypeBuilder::option("Added", demo("Widget"))
                .id(1)
                .name_value("added")
                .primary_constructor(vec![base_param()])
                .doc("The added state."),
        )
        .build();
    assert_eq!(added_fingerprint(&plain), added_fingerprint(&documented));
    let shape = LookupShape::AlternateLookup;
    assert_eq!(
        hash_collection(&model(&plain, "Widgets"), shape),
        hash_collection(&model(&documented, "Widgets"), shape)
    );
}

#[test]
fn parameter_changes_change_hash() {
    let base = added_fingerprint(&with_parameter(base_param()));
    let renamed = param_with_default("length", int(), ConstantValue::Int(1));
    let retyped = ParameterSymbol {
        ty: TypeRef::keyword("long"),
        ..base_param()
    };
    let redefaulted = param_with_default("size", int(), ConstantValue::Int(2));
    let variants = [renamed, retyped, redefaulted];
    for variant in variants {
        let name = variant.name.clone();
        assert_ne!(
            base,
            added_fingerprint(&with_parameter(variant)),
            "changing parameter `{name}` must change the hash"
        );
    }
}

#[test]
fn unchanged_compilation_reuses_unit() {
    let generator = RegistryGenerator::new();
    let c = with_parameter(base_param());
    let first = run_with(&generator, &c);
    let second = run_with(&generator, &c);
    assert_eq!(first.artifact.units[0].status, UnitStatus::Fresh);
    assert_eq!(second.artifact.units[0].status, UnitStatus::Reused);
    assert_eq!(first.artifact.units[0].text, second.artifact.units[0].text);
}

#[test]
fn key_value_change_reuses_unit() {
    let generator = RegistryGenerator::new();
    let before = CompilationBuilder::new()
        .widgets()
        .widget("Added", 1, "added")
        .build();
    let after = CompilationBuilder::new()
        .widgets()
        .widget("Added", 5, "added")
        .build();
    let first = run_with(&generator, &before);
    let second = run_with(&generator, &after);
    assert_eq!(second.artifact.units[0].status, UnitStatus::Reused);
    assert_eq!(first.artifact.units[0].text, second.artifact.units[0].text);
}

#[test]
fn new_option_re_renders() {
    let generator = RegistryGenerator::new();
    let before = CompilationBuilder::new()
        .widgets()
        .widget("Added", 1, "added")
        .build();
    let after = CompilationBuilder::new()
        .widgets()
        .widget("Added", 1, "added")
        .widget("Removed", 2, "removed")
        .build();
    run_with(&generator, &before);
    let second = run_with(&generator, &after);
    assert_eq!(second.artifact.units[0].status, UnitStatus::Fresh);
    assert!(second.artifact.units[0].text.contains("Removed"));
}

#[test]
fn target_platform_change_re_renders() {
    let generator = RegistryGenerator::new();
    let modern = CompilationBuilder::new()
        .widgets()
        .widget("Added", 1, "added")
        .build();
    let legacy = CompilationBuilder::new()
        .target(Some("netstandard2.0"))
        .widgets()
        .widget("Added", 1, "added")
        .build();
    let first = run_with(&generator, &modern);
    let second = run_with(&generator, &legacy);
    assert_eq!(second.artifact.units[0].status, UnitStatus::Fresh);
    assert_ne!(first.artifact.units[0].text, second.artifact.units[0].text);
}
