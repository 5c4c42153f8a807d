//! Conformance test helpers for the option registry generator.
//!
//! Provides builders for in-memory compilations and shared functions that
//! run the generator (or a sequence of generators) and return structured
//! results for assertion in integration tests.

#![warn(missing_docs)]

use optreg_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink, Severity};
use optreg_driver::{Analysis, DriverError, Generator, RegistryGenerator, SequenceResult};
use optreg_emit::{GeneratedArtifact, SourceUnit};
use optreg_model::{CollectionModel, LookupShape};
use optreg_runtime::{Registry, RegistryError};
use optreg_symbols::{
    Accessibility, Assembly, Attribute, AttributeArg, Compilation, ConstantValue,
    ConstructorSymbol, ParameterSymbol, PropertySymbol, TypeKind, TypeRef, TypeSymbol,
};
use tokio_util::sync::CancellationToken;

pub use optreg_driver::{run_sequence, run_sequence_with_cancellation};

/// Namespace every fixture type lives in unless stated otherwise.
pub const NS: &str = "Demo";

/// `int`
pub fn int() -> TypeRef {
    TypeRef::keyword("int")
}

/// `string`
pub fn string() -> TypeRef {
    TypeRef::keyword("string")
}

/// `bool`
pub fn boolean() -> TypeRef {
    TypeRef::keyword("bool")
}

/// A type in [`NS`].
pub fn demo(name: &str) -> TypeRef {
    TypeRef::named(NS, name)
}

/// A string constant argument.
pub fn str_arg(value: &str) -> AttributeArg {
    AttributeArg::Constant(ConstantValue::String(value.to_string()))
}

/// A boolean constant argument.
pub fn bool_arg(value: bool) -> AttributeArg {
    AttributeArg::Constant(ConstantValue::Bool(value))
}

/// An enum member argument such as `StringComparison.OrdinalIgnoreCase`.
pub fn enum_arg(member: &str) -> AttributeArg {
    AttributeArg::EnumMember(member.to_string())
}

/// A required constructor parameter.
pub fn param(name: &str, ty: TypeRef) -> ParameterSymbol {
    ParameterSymbol {
        name: name.to_string(),
        ty,
        default: None,
    }
}

/// An optional constructor parameter.
pub fn param_with_default(name: &str, ty: TypeRef, default: ConstantValue) -> ParameterSymbol {
    ParameterSymbol {
        name: name.to_string(),
        ty,
        default: Some(default),
    }
}

/// A public read-only property with no known value.
pub fn property(name: &str, ty: TypeRef) -> PropertySymbol {
    PropertySymbol {
        name: name.to_string(),
        ty,
        accessibility: Accessibility::Public,
        nullable: false,
        is_abstract: false,
        is_virtual: false,
        is_override: false,
        is_static: false,
        is_auto: false,
        is_read_only: true,
        value: None,
        attributes: Vec::new(),
        location: None,
    }
}

/// A public abstract property.
pub fn abstract_property(name: &str, ty: TypeRef) -> PropertySymbol {
    PropertySymbol {
        is_abstract: true,
        ..property(name, ty)
    }
}

/// An override returning a constant.
pub fn override_property(name: &str, ty: TypeRef, value: ConstantValue) -> PropertySymbol {
    PropertySymbol {
        is_override: true,
        value: Some(value),
        ..property(name, ty)
    }
}

/// A `Lookup` marker with no arguments.
pub fn lookup_marker() -> Attribute {
    Attribute::new("Lookup")
}

/// Builds a [`TypeSymbol`].
#[derive(Debug, Clone)]
pub struct TypeBuilder {
    symbol: TypeSymbol,
}

impl TypeBuilder {
    /// A public class.
    pub fn class(namespace: &str, name: &str) -> Self {
        Self {
            symbol: TypeSymbol::new(namespace, name, TypeKind::Class),
        }
    }

    /// A public record class.
    pub fn record(namespace: &str, name: &str) -> Self {
        Self {
            symbol: TypeSymbol::new(namespace, name, TypeKind::Record),
        }
    }

    /// A public interface.
    pub fn interface(namespace: &str, name: &str) -> Self {
        Self {
            symbol: TypeSymbol::new(namespace, name, TypeKind::Interface),
        }
    }

    /// An option: a sealed class deriving from `base`, carrying one
    /// unnamed `CollectionOption` marker.
    pub fn option(name: &str, base: TypeRef) -> Self {
        Self::class(NS, name).sealed().base(base).option_marker()
    }

    /// Marks the type `abstract`.
    pub fn abstract_type(mut self) -> Self {
        self.symbol.is_abstract = true;
        self
    }

    /// Marks the type `sealed`.
    pub fn sealed(mut self) -> Self {
        self.symbol.is_sealed = true;
        self
    }

    /// Marks the type `static`.
    pub fn static_type(mut self) -> Self {
        self.symbol.is_static = true;
        self
    }

    /// Sets the declared accessibility.
    pub fn accessibility(mut self, accessibility: Accessibility) -> Self {
        self.symbol.accessibility = accessibility;
        self
    }

    /// Declares generic parameters.
    pub fn generic(mut self, params: &[&str]) -> Self {
        self.symbol.generic_params = params.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Sets the direct base class.
    pub fn base(mut self, base: TypeRef) -> Self {
        self.symbol.base = Some(base);
        self
    }

    /// Adds an implemented interface.
    pub fn implements(mut self, interface: TypeRef) -> Self {
        self.symbol.interfaces.push(interface);
        self
    }

    /// Adds an attribute.
    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.symbol.attributes.push(attribute);
        self
    }

    /// Adds an unnamed `CollectionOption` marker.
    pub fn option_marker(self) -> Self {
        self.attribute(Attribute::new("CollectionOption"))
    }

    /// Adds a `CollectionOption(Name = name)` marker.
    pub fn option_named(self, name: &str) -> Self {
        self.attribute(Attribute::new("CollectionOption").with_named("Name", str_arg(name)))
    }

    /// Adds a `GenerateCollection(typeof(base))` marker and makes the type a
    /// static registry class.
    pub fn collection_of(self, base: TypeRef) -> Self {
        self.static_type().attribute(
            Attribute::new("GenerateCollection").with_positional(AttributeArg::Type(base)),
        )
    }

    /// Adds a source-declared constructor.
    pub fn constructor(
        mut self,
        accessibility: Accessibility,
        parameters: Vec<ParameterSymbol>,
    ) -> Self {
        self.symbol.constructors.push(ConstructorSymbol {
            accessibility,
            parameters,
            is_implicit: false,
            is_static: false,
        });
        self
    }

    /// Adds a compiler-synthesised public constructor.
    pub fn primary_constructor(mut self, parameters: Vec<ParameterSymbol>) -> Self {
        self.symbol.constructors.push(ConstructorSymbol {
            accessibility: Accessibility::Public,
            parameters,
            is_implicit: true,
            is_static: false,
        });
        self
    }

    /// Adds a property.
    pub fn property(mut self, property: PropertySymbol) -> Self {
        self.symbol.properties.push(property);
        self
    }

    /// Adds an `Id` override returning `id`.
    pub fn id(self, id: i64) -> Self {
        self.property(override_property("Id", int(), ConstantValue::Int(id)))
    }

    /// Adds a `Name` override returning `name`.
    pub fn name_value(self, name: &str) -> Self {
        self.property(override_property(
            "Name",
            string(),
            ConstantValue::String(name.to_string()),
        ))
    }

    /// Sets the documentation comment.
    pub fn doc(mut self, text: &str) -> Self {
        self.symbol.doc = Some(text.to_string());
        self
    }

    /// Finishes the symbol.
    pub fn build(self) -> TypeSymbol {
        self.symbol
    }
}

impl From<TypeBuilder> for TypeSymbol {
    fn from(builder: TypeBuilder) -> Self {
        builder.build()
    }
}

/// Builds a [`Compilation`].
#[derive(Debug, Clone)]
pub struct CompilationBuilder {
    compilation: Compilation,
}

impl CompilationBuilder {
    /// An empty compilation for assembly `Demo` targeting `net8.0`.
    pub fn new() -> Self {
        Self {
            compilation: Compilation::new(NS, Some("net8.0")),
        }
    }

    /// Sets or clears the target platform moniker.
    pub fn target(mut self, moniker: Option<&str>) -> Self {
        self.compilation.set_target_framework(moniker);
        self
    }

    /// Adds a type to the current assembly.
    pub fn with(mut self, ty: impl Into<TypeSymbol>) -> Self {
        self.compilation.add_type(ty.into());
        self
    }

    /// Adds a referenced assembly.
    pub fn reference(mut self, name: &str, types: Vec<TypeSymbol>) -> Self {
        self.compilation.add_reference(Assembly {
            name: name.to_string(),
            types,
        });
        self
    }

    /// Adds the standard `Widget` collection: an abstract base with
    /// abstract `Id` and `Name` keys and a static `Widgets` registry.
    pub fn widgets(self) -> Self {
        self.with(
            TypeBuilder::class(NS, "Widget")
                .abstract_type()
                .property(abstract_property("Id", int()))
                .property(abstract_property("Name", string())),
        )
        .with(TypeBuilder::class(NS, "Widgets").collection_of(demo("Widget")))
    }

    /// Adds a `Widget` option with the given key values.
    pub fn widget(self, type_name: &str, id: i64, name: &str) -> Self {
        self.with(
            TypeBuilder::option(type_name, demo("Widget"))
                .id(id)
                .name_value(name),
        )
    }

    /// Finishes the compilation.
    pub fn build(self) -> Compilation {
        self.compilation
    }
}

impl Default for CompilationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of one registry generator pass.
#[derive(Debug, Clone)]
pub struct PassResult {
    /// The generated artifact; empty if the pass failed.
    pub artifact: GeneratedArtifact,
    /// All diagnostics of the pass.
    pub diagnostics: Vec<Diagnostic>,
    /// Whether any errors were emitted.
    pub has_errors: bool,
    /// Number of error-severity diagnostics.
    pub error_count: usize,
    /// Number of warning-severity diagnostics.
    pub warning_count: usize,
}

impl PassResult {
    /// The unit rendered for `hint_name`.
    pub fn unit(&self, hint_name: &str) -> Option<&SourceUnit> {
        self.artifact.unit(hint_name)
    }

    /// Text of the only unit. Panics unless exactly one unit was generated.
    pub fn single_text(&self) -> &str {
        assert_eq!(self.artifact.units.len(), 1, "expected exactly one unit");
        &self.artifact.units[0].text
    }

    /// Diagnostic codes in order.
    pub fn codes(&self) -> Vec<DiagnosticCode> {
        self.diagnostics.iter().map(|d| d.code).collect()
    }
}

fn pass_result(artifact: GeneratedArtifact, diagnostics: Vec<Diagnostic>) -> PassResult {
    let error_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warning_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();
    PassResult {
        artifact,
        has_errors: error_count > 0,
        error_count,
        warning_count,
        diagnostics,
    }
}

/// Runs `generator` once over `compilation` through the orchestrator.
///
/// A generator failure shows up as an `E108` diagnostic and an empty artifact.
pub fn run_with(generator: &RegistryGenerator, compilation: &Compilation) -> PassResult {
    let sequence = run_sequence(compilation, &[generator]);
    let artifact = sequence
        .results
        .into_iter()
        .find_map(|run| run.artifact)
        .unwrap_or_default();
    pass_result(artifact, sequence.diagnostics)
}

/// Runs a fresh registry generator once over `compilation`.
pub fn run_single(compilation: &Compilation) -> PassResult {
    run_with(&RegistryGenerator::new(), compilation)
}

/// Runs `generators` in order and fails if any pass reported an error.
pub fn run_sequence_clean(
    start: &Compilation,
    generators: &[&dyn Generator],
) -> Result<SequenceResult, DriverError> {
    let result = run_sequence(start, generators);
    result.ensure_no_errors()?;
    Ok(result)
}

/// Runs discovery and extraction only.
pub fn analyze(compilation: &Compilation) -> (Result<Analysis, DriverError>, Vec<Diagnostic>) {
    let sink = DiagnosticSink::new();
    let analysis = RegistryGenerator::new().analyze(compilation, &CancellationToken::new(), &sink);
    (analysis, sink.take_all())
}

/// Extracts the collection named `name`. Panics if it was not produced.
pub fn model(compilation: &Compilation, name: &str) -> CollectionModel {
    let (analysis, diagnostics) = analyze(compilation);
    let analysis = match analysis {
        Ok(analysis) => analysis,
        Err(e) => panic!("analysis failed: {e}"),
    };
    match analysis.models.into_iter().find(|m| m.definition.name == name) {
        Some(model) => model,
        None => panic!("collection `{name}` was not produced; diagnostics: {diagnostics:?}"),
    }
}

/// Builds the runtime registry for collection `name` under `shape`.
pub fn registry(
    compilation: &Compilation,
    name: &str,
    shape: LookupShape,
) -> Result<Registry, RegistryError> {
    Registry::build(&model(compilation, name), shape)
}
