//! Collection and option-candidate discovery.

use std::collections::HashSet;

use optreg_diagnostics::{catalog, DiagnosticSink};
use optreg_model::{CollectionDefinition, OptionCandidate};
use optreg_symbols::markers::{
    decode_collection, decode_option, MarkerError, COLLECTION_OPTION, GENERATE_COLLECTION,
};
use optreg_symbols::{Accessibility, OptionMarker, QueryError, QueryScope, SymbolQuery, TypeKind};

use crate::matcher::{base_chain, matches};

fn report_marker(sink: &DiagnosticSink, err: MarkerError) {
    sink.emit(catalog::error_malformed_marker(
        err.marker,
        &err.argument,
        &err.detail,
        err.location,
    ));
}

/// Decodes every `GenerateCollection` marker in the current compilation.
///
/// A collection whose base type is missing, unresolvable, ambiguous or not
/// an inheritable class is reported (`E101`) and omitted. A registry type
/// declared by two markers keeps the first (`E107`).
pub fn discover_collections(
    query: &dyn SymbolQuery,
    target_framework: Option<&str>,
    sink: &DiagnosticSink,
) -> Result<Vec<CollectionDefinition>, QueryError> {
    let declared = query.types_with_attribute(GENERATE_COLLECTION, QueryScope::CurrentCompilation)?;
    let mut seen = HashSet::new();
    let mut collections = Vec::new();
    for decl in declared {
        let registry = decl.symbol;
        for attr in registry.attributes_named(GENERATE_COLLECTION) {
            let marker = match decode_collection(attr) {
                Ok(m) => m,
                Err(e) => {
                    report_marker(sink, e);
                    continue;
                }
            };
            let name = marker.name.clone().unwrap_or_else(|| registry.name.clone());
            let location = marker.location.clone().or_else(|| registry.location.clone());
            let Some(base) = marker.base else {
                sink.emit(catalog::error_invalid_base_type(
                    &name,
                    "no base type was given",
                    location,
                ));
                continue;
            };
            let problem = match query.resolve(&base) {
                Err(e) if e.is_ambiguous() => Some(e.to_string()),
                Err(e) => return Err(e),
                Ok(None) => Some(format!("`{base}` cannot be resolved")),
                Ok(Some(b)) if !matches!(b.symbol.kind, TypeKind::Class | TypeKind::Record) => {
                    Some(format!("`{base}` is not a class"))
                }
                Ok(Some(b)) if b.symbol.is_sealed || b.symbol.is_static => {
                    Some(format!("`{base}` cannot be inherited"))
                }
                Ok(Some(_)) => None,
            };
            if let Some(detail) = problem {
                sink.emit(catalog::error_invalid_base_type(&name, &detail, location));
                continue;
            }
            let definition = CollectionDefinition {
                namespace: registry.namespace.clone(),
                registry_name: registry.name.clone(),
                registry_accessibility: registry.accessibility,
                registry_is_static: registry.is_static,
                name,
                base,
                option_interface: marker.option_interface,
                current_compilation_only: marker.current_compilation_only,
                target_framework: target_framework.map(str::to_string),
                location,
            };
            if !seen.insert(definition.registry_full_name()) {
                sink.emit(catalog::error_duplicate_registry(
                    &definition.registry_full_name(),
                    definition.location.clone(),
                ));
                continue;
            }
            tracing::debug!(
                collection = %definition.name,
                base = %definition.base,
                "discovered collection"
            );
            collections.push(definition);
        }
    }
    Ok(collections)
}

/// Finds option candidates for each collection.
///
/// The result is index-aligned with `collections`. A candidate may land in
/// several collections if its chain matches several base types; a marker
/// naming a `Collection` only targets that collection. A candidate whose
/// hierarchy contains an ambiguous type is reported (`E104`) and skipped.
pub fn discover_candidates<'q>(
    query: &'q dyn SymbolQuery,
    collections: &[CollectionDefinition],
    sink: &DiagnosticSink,
) -> Result<Vec<Vec<OptionCandidate<'q>>>, QueryError> {
    let mut grouped: Vec<Vec<OptionCandidate<'q>>> = vec![Vec::new(); collections.len()];
    let declared = query.types_with_attribute(COLLECTION_OPTION, QueryScope::IncludeReferences)?;
    tracing::debug!(count = declared.len(), "option candidates");
    for decl in declared {
        let symbol = decl.symbol;
        let markers: Vec<OptionMarker> = symbol
            .attributes_named(COLLECTION_OPTION)
            .filter_map(|attr| match decode_option(attr) {
                Ok(m) => Some(m),
                Err(e) => {
                    report_marker(sink, e);
                    None
                }
            })
            .collect();
        if markers.is_empty() {
            continue;
        }
        let chain = match base_chain(query, symbol) {
            Ok(chain) => chain,
            Err(e) if e.is_ambiguous() => {
                sink.emit(catalog::error_option_generation_failed(
                    &symbol.full_name(),
                    &e.to_string(),
                    symbol.location.clone(),
                ));
                continue;
            }
            Err(e) => return Err(e),
        };
        let mut claimed = false;
        let mut eligible: Vec<(usize, Vec<OptionMarker>)> = Vec::new();
        for (idx, definition) in collections.iter().enumerate() {
            if !matches(&chain, &definition.base) {
                continue;
            }
            let targeted: Vec<OptionMarker> = markers
                .iter()
                .filter(|m| {
                    m.collection.as_deref().map_or(true, |c| {
                        c == definition.name || c == definition.registry_name
                    })
                })
                .cloned()
                .collect();
            if targeted.is_empty() {
                continue;
            }
            claimed = true;
            if definition.current_compilation_only && !decl.is_current {
                tracing::trace!(
                    option = %symbol.full_name(),
                    collection = %definition.name,
                    "skipping referenced option for current-compilation-only collection"
                );
                continue;
            }
            eligible.push((idx, targeted));
        }
        if !claimed {
            sink.emit(catalog::warning_not_an_option(
                &symbol.full_name(),
                symbol.location.clone(),
            ));
            continue;
        }
        if eligible.is_empty() {
            continue;
        }
        if !decl.is_current && symbol.accessibility != Accessibility::Public {
            sink.emit(catalog::warning_inaccessible_reference(
                &symbol.full_name(),
                decl.assembly,
                symbol.location.clone(),
            ));
            continue;
        }
        for (idx, targeted) in eligible {
            grouped[idx].push(OptionCandidate {
                symbol,
                assembly: decl.assembly,
                is_current: decl.is_current,
                full_name: symbol.full_name(),
                short_name: symbol.name.clone(),
                markers: targeted,
                base_chain: chain.clone(),
            });
        }
    }
    Ok(grouped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use optreg_diagnostics::catalog::{E101, E104, E106, E107, W201, W203};
    use optreg_symbols::{
        Assembly, Attribute, AttributeArg, Compilation, ConstantValue, TypeRef, TypeSymbol,
    };

    fn widget() -> TypeSymbol {
        let mut ty = TypeSymbol::new("Demo", "Widget", TypeKind::Class);
        ty.is_abstract = true;
        ty
    }

    fn registry(base: Option<TypeRef>) -> TypeSymbol {
        let mut ty = TypeSymbol::new("Demo", "Widgets", TypeKind::Class);
        ty.is_static = true;
        let mut attr = Attribute::new("GenerateCollection");
        if let Some(base) = base {
            attr = attr.with_positional(AttributeArg::Type(base));
        }
        ty.attributes.push(attr);
        ty
    }

    fn option(name: &str, base: &str) -> TypeSymbol {
        let mut ty = TypeSymbol::new("Demo", name, TypeKind::Class);
        ty.base = Some(TypeRef::named("Demo", base));
        ty.attributes.push(Attribute::new("CollectionOption"));
        ty
    }

    fn codes(sink: &DiagnosticSink) -> Vec<String> {
        sink.diagnostics().iter().map(|d| d.code.to_string()).collect()
    }

    #[test]
    fn discovers_collection() {
        let mut c = Compilation::new("Demo", Some("net8.0"));
        c.add_type(widget());
        c.add_type(registry(Some(TypeRef::named("Demo", "Widget"))));
        let sink = DiagnosticSink::new();
        let found = discover_collections(&c, Some("net8.0"), &sink).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Widgets");
        assert_eq!(found[0].target_framework.as_deref(), Some("net8.0"));
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn missing_base_is_e101() {
        let mut c = Compilation::new("Demo", None);
        c.add_type(registry(None));
        let sink = DiagnosticSink::new();
        assert!(discover_collections(&c, None, &sink).unwrap().is_empty());
        assert_eq!(codes(&sink), vec![E101.to_string()]);
    }

    #[test]
    fn unresolvable_base_is_e101() {
        let mut c = Compilation::new("Demo", None);
        c.add_type(registry(Some(TypeRef::named("Demo", "Missing"))));
        let sink = DiagnosticSink::new();
        assert!(discover_collections(&c, None, &sink).unwrap().is_empty());
        assert_eq!(codes(&sink), vec![E101.to_string()]);
    }

    #[test]
    fn ambiguous_base_is_e101() {
        let mut c = Compilation::new("Demo", None);
        c.add_type(widget());
        c.add_type(widget());
        c.add_type(registry(Some(TypeRef::named("Demo", "Widget"))));
        let sink = DiagnosticSink::new();
        assert!(discover_collections(&c, None, &sink).unwrap().is_empty());
        assert_eq!(codes(&sink), vec![E101.to_string()]);
        assert!(sink.diagnostics()[0].message.contains("declared 2 times"));
    }

    #[test]
    fn malformed_marker_is_e106() {
        let mut c = Compilation::new("Demo", None);
        let mut reg = TypeSymbol::new("Demo", "Widgets", TypeKind::Class);
        reg.attributes.push(
            Attribute::new("GenerateCollection")
                .with_positional(AttributeArg::Constant(ConstantValue::Int(1))),
        );
        c.add_type(reg);
        let sink = DiagnosticSink::new();
        assert!(discover_collections(&c, None, &sink).unwrap().is_empty());
        assert_eq!(codes(&sink), vec![E106.to_string()]);
    }

    #[test]
    fn duplicate_marker_is_e107() {
        let mut c = Compilation::new("Demo", None);
        c.add_type(widget());
        let mut reg = registry(Some(TypeRef::named("Demo", "Widget")));
        reg.attributes.push(reg.attributes[0].clone());
        c.add_type(reg);
        let sink = DiagnosticSink::new();
        assert_eq!(discover_collections(&c, None, &sink).unwrap().len(), 1);
        assert_eq!(codes(&sink), vec![E107.to_string()]);
    }

    #[test]
    fn candidates_grouped_by_collection() {
        let mut c = Compilation::new("Demo", None);
        c.add_type(widget());
        c.add_type(registry(Some(TypeRef::named("Demo", "Widget"))));
        c.add_type(option("Added", "Widget"));
        c.add_type(option("Updated", "Widget"));
        let sink = DiagnosticSink::new();
        let collections = discover_collections(&c, None, &sink).unwrap();
        let grouped = discover_candidates(&c, &collections, &sink).unwrap();
        assert_eq!(grouped[0].len(), 2);
        assert_eq!(grouped[0][0].short_name, "Added");
    }

    #[test]
    fn unmatched_candidate_is_w201() {
        let mut c = Compilation::new("Demo", None);
        c.add_type(widget());
        c.add_type(registry(Some(TypeRef::named("Demo", "Widget"))));
        c.add_type(TypeSymbol::new("Demo", "Gadget", TypeKind::Class));
        c.add_type(option("Stray", "Gadget"));
        let sink = DiagnosticSink::new();
        let collections = discover_collections(&c, None, &sink).unwrap();
        let grouped = discover_candidates(&c, &collections, &sink).unwrap();
        assert!(grouped[0].is_empty());
        assert_eq!(codes(&sink), vec![W201.to_string()]);
    }

    #[test]
    fn ambiguous_ancestor_rejects_only_that_candidate() {
        let mut c = Compilation::new("Demo", None);
        c.add_type(widget());
        c.add_type(registry(Some(TypeRef::named("Demo", "Widget"))));
        c.add_type(option("Added", "Widget"));
        c.add_type(TypeSymbol::new("Demo", "Dup", TypeKind::Class));
        c.add_type(TypeSymbol::new("Demo", "Dup", TypeKind::Class));
        c.add_type(option("Stray", "Dup"));
        let sink = DiagnosticSink::new();
        let collections = discover_collections(&c, None, &sink).unwrap();
        let grouped = discover_candidates(&c, &collections, &sink).unwrap();
        assert_eq!(grouped[0].len(), 1);
        assert_eq!(grouped[0][0].short_name, "Added");
        assert_eq!(codes(&sink), vec![E104.to_string()]);
        assert!(sink.diagnostics()[0].message.contains("Demo.Stray"));
    }

    #[test]
    fn internal_referenced_option_is_w203() {
        let mut c = Compilation::new("Demo", None);
        c.add_type(widget());
        c.add_type(registry(Some(TypeRef::named("Demo", "Widget"))));
        let mut hidden = option("Hidden", "Widget");
        hidden.accessibility = Accessibility::Internal;
        c.add_reference(Assembly {
            name: "Plugins".to_string(),
            types: vec![hidden, option("Shared", "Widget")],
        });
        let sink = DiagnosticSink::new();
        let collections = discover_collections(&c, None, &sink).unwrap();
        let grouped = discover_candidates(&c, &collections, &sink).unwrap();
        assert_eq!(grouped[0].len(), 1);
        assert_eq!(grouped[0][0].short_name, "Shared");
        assert!(!grouped[0][0].is_current);
        assert_eq!(codes(&sink), vec![W203.to_string()]);
    }

    #[test]
    fn current_compilation_only_skips_references() {
        let mut c = Compilation::new("Demo", None);
        c.add_type(widget());
        let mut reg = registry(Some(TypeRef::named("Demo", "Widget")));
        reg.attributes[0] = reg.attributes[0].clone().with_named(
            "CurrentCompilationOnly",
            AttributeArg::Constant(ConstantValue::Bool(true)),
        );
        c.add_type(reg);
        c.add_type(option("Local", "Widget"));
        c.add_reference(Assembly {
            name: "Plugins".to_string(),
            types: vec![option("Remote", "Widget")],
        });
        let sink = DiagnosticSink::new();
        let collections = discover_collections(&c, None, &sink).unwrap();
        let grouped = discover_candidates(&c, &collections, &sink).unwrap();
        assert_eq!(grouped[0].len(), 1);
        assert_eq!(grouped[0][0].short_name, "Local");
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn collection_argument_targets_one_collection() {
        let mut c = Compilation::new("Demo", None);
        c.add_type(widget());
        c.add_type(registry(Some(TypeRef::named("Demo", "Widget"))));
        let mut other = TypeSymbol::new("Demo", "Extras", TypeKind::Class);
        other.attributes.push(
            Attribute::new("GenerateCollection")
                .with_positional(AttributeArg::Type(TypeRef::named("Demo", "Widget"))),
        );
        c.add_type(other);
        let mut opt = option("Added", "Widget");
        opt.attributes[0] = Attribute::new("CollectionOption").with_named(
            "Collection",
            AttributeArg::Constant(ConstantValue::String("Extras".to_string())),
        );
        c.add_type(opt);
        let sink = DiagnosticSink::new();
        let collections = discover_collections(&c, None, &sink).unwrap();
        let grouped = discover_candidates(&c, &collections, &sink).unwrap();
        assert!(grouped[0].is_empty());
        assert_eq!(grouped[1].len(), 1);
    }
}
