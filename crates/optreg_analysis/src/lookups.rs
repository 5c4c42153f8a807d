//! Lookup-property collection for a collection's base type.

use std::collections::HashSet;

use optreg_diagnostics::{catalog, DiagnosticSink};
use optreg_model::{AbstractMember, CollectionDefinition, PropertyLookupInfo, StringComparison};
use optreg_symbols::markers::{decode_lookup, LookupMarker, LOOKUP};
use optreg_symbols::{
    Accessibility, ConstantValue, PropertySymbol, QueryError, SymbolQuery, TypeSymbol,
};

use crate::matcher::BaseTypeChain;

/// Lookup properties and empty-sentinel requirements of one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupSet {
    /// Lookups, default key first, then in base-type declaration order.
    pub lookups: Vec<PropertyLookupInfo>,
    /// Abstract non-lookup properties the sentinel must override.
    pub abstract_members: Vec<AbstractMember>,
    /// `true` if the base type is abstract.
    pub base_is_abstract: bool,
    /// Arity of the base constructor the sentinel chains to.
    pub sentinel_base_args: usize,
}

/// Reads lookup-eligible properties from the base type and its ancestors.
///
/// A property is eligible if it carries a `Lookup` marker, or by convention
/// if it is named `Id` with an integral type or `Name` with type `string`.
/// The most-derived declaration of each property wins. `Id` is the default
/// key unless another property is marked `Default = true`.
///
/// Returns `Ok(None)` if the collection cannot be generated; the reason has
/// been reported to `sink`.
pub fn collect_lookups(
    query: &dyn SymbolQuery,
    definition: &CollectionDefinition,
    sink: &DiagnosticSink,
) -> Result<Option<LookupSet>, QueryError> {
    let reject = |detail: String| {
        sink.emit(catalog::error_invalid_base_type(
            &definition.name,
            &detail,
            definition.location.clone(),
        ));
        Ok(None)
    };
    let base = match query.resolve(&definition.base) {
        Ok(Some(base)) => base,
        Ok(None) => return reject(format!("`{}` cannot be resolved", definition.base)),
        Err(e) if e.is_ambiguous() => return reject(e.to_string()),
        Err(e) => return Err(e),
    };
    let mut hierarchy: Vec<&TypeSymbol> = vec![base.symbol];
    for ancestor in BaseTypeChain::new(query, base.symbol) {
        match ancestor.and_then(|a| query.resolve(&a)) {
            Ok(Some(declared)) => hierarchy.push(declared.symbol),
            Ok(None) => {}
            Err(e) if e.is_ambiguous() => return reject(e.to_string()),
            Err(e) => return Err(e),
        }
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut lookups = Vec::new();
    let mut abstract_members = Vec::new();
    let mut ok = true;
    for symbol in &hierarchy {
        for prop in query.members(symbol) {
            if !seen.insert(prop.name.as_str()) {
                continue;
            }
            match lookup_for(definition, symbol, prop, sink) {
                Some(Ok(lookup)) => lookups.push(lookup),
                Some(Err(())) => ok = false,
                None if prop.is_abstract => abstract_members.push(AbstractMember {
                    name: prop.name.clone(),
                    ty: prop.ty.clone(),
                    accessibility: prop.accessibility,
                }),
                None => {}
            }
        }
    }
    if !ok {
        return Ok(None);
    }

    choose_default(&mut lookups, sink);
    lookups.sort_by_key(|l| !l.is_default);

    let sentinel_base_args = base
        .symbol
        .instance_constructors()
        .iter()
        .filter(|c| c.accessibility != Accessibility::Private)
        .map(|c| c.parameters.len())
        .min();
    let Some(sentinel_base_args) = sentinel_base_args else {
        return reject(format!(
            "`{}` has no constructor accessible to derived types",
            definition.base
        ));
    };

    tracing::debug!(
        collection = %definition.name,
        lookups = lookups.len(),
        "collected lookup properties"
    );
    Ok(Some(LookupSet {
        lookups,
        abstract_members,
        base_is_abstract: base.symbol.is_abstract,
        sentinel_base_args,
    }))
}

/// `None`: not a lookup. `Some(Err(()))`: a lookup that blocks generation.
fn lookup_for(
    definition: &CollectionDefinition,
    declaring: &TypeSymbol,
    prop: &PropertySymbol,
    sink: &DiagnosticSink,
) -> Option<Result<PropertyLookupInfo, ()>> {
    let marker_attr = prop.attributes.iter().find(|a| a.is(LOOKUP));
    let marker = match marker_attr.map(decode_lookup) {
        Some(Ok(m)) => m,
        Some(Err(e)) => {
            sink.emit(catalog::error_malformed_marker(
                e.marker,
                &e.argument,
                &e.detail,
                e.location.or_else(|| prop.location.clone()),
            ));
            return None;
        }
        None if is_conventional(prop) => LookupMarker::default(),
        None => return None,
    };

    let location = prop.location.clone();
    if marker_attr.is_some() && !prop.accessibility.is_assembly_visible() {
        sink.emit(catalog::error_malformed_marker(
            LOOKUP,
            "property",
            &format!("`{}` must be public or internal to be used as a key", prop.name),
            location,
        ));
        return None;
    }
    if marker_attr.is_none() && !prop.accessibility.is_assembly_visible() {
        return None;
    }

    let is_string = prop.ty.is_string();
    let comparison = match marker.comparison.as_deref() {
        None => StringComparison::Ordinal,
        Some(member) => match StringComparison::from_member(member) {
            Some(c) if is_string => c,
            Some(_) => {
                sink.emit(catalog::error_malformed_marker(
                    LOOKUP,
                    "Comparison",
                    &format!("`{}` is not a string property", prop.name),
                    location.clone(),
                ));
                StringComparison::Ordinal
            }
            None => {
                sink.emit(catalog::error_malformed_marker(
                    LOOKUP,
                    "Comparison",
                    &format!("`{member}` is not supported; use Ordinal or OrdinalIgnoreCase"),
                    location.clone(),
                ));
                StringComparison::Ordinal
            }
        },
    };

    let empty_value = marker
        .empty_value
        .clone()
        .or_else(|| natural_empty_value(prop));
    if prop.is_abstract && empty_value.is_none() {
        sink.emit(catalog::error_abstract_lookup_without_override(
            &definition.name,
            &prop.name,
            &prop.ty.full_name(),
            location,
        ));
        return Some(Err(()));
    }

    Some(Ok(PropertyLookupInfo {
        property_name: prop.name.clone(),
        type_name: prop.ty.full_name(),
        key_type: prop.ty.clone(),
        accessibility: prop.accessibility,
        method_name: marker
            .method_name
            .clone()
            .unwrap_or_else(|| format!("GetBy{}", prop.name)),
        try_get: marker.try_get,
        allow_multiple: marker.allow_multiple,
        is_default: marker.is_default,
        comparison,
        comparer: marker.comparer.clone(),
        nullable: prop.nullable,
        return_type: marker.return_type.clone(),
        requires_override: prop.is_abstract,
        empty_value,
        declared_in: declaring.full_name(),
        location: prop.location.clone(),
    }))
}

fn is_conventional(prop: &PropertySymbol) -> bool {
    (prop.name == "Id" && prop.ty.is_integer()) || (prop.name == "Name" && prop.ty.is_string())
}

/// The value an override can return without user input, if the type has one.
fn natural_empty_value(prop: &PropertySymbol) -> Option<ConstantValue> {
    if prop.nullable {
        Some(ConstantValue::Null)
    } else if prop.ty.is_integer() {
        Some(ConstantValue::Int(0))
    } else if prop.ty.is_bool() {
        Some(ConstantValue::Bool(false))
    } else if prop.ty.is_string() {
        Some(ConstantValue::String(String::new()))
    } else {
        None
    }
}

/// Keeps the first explicitly marked default; falls back to a
/// single-valued integral `Id`.
fn choose_default(lookups: &mut [PropertyLookupInfo], sink: &DiagnosticSink) {
    let mut found = false;
    for lookup in lookups.iter_mut().filter(|l| l.is_default) {
        if found {
            sink.emit(catalog::error_malformed_marker(
                LOOKUP,
                "Default",
                &format!(
                    "`{}` is marked default but another default key was declared first",
                    lookup.property_name
                ),
                lookup.location.clone(),
            ));
            lookup.is_default = false;
        }
        found = true;
    }
    if found {
        return;
    }
    if let Some(id) = lookups
        .iter_mut()
        .find(|l| l.property_name == "Id" && l.key_type.is_integer() && !l.allow_multiple)
    {
        id.is_default = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optreg_diagnostics::catalog::{E101, E103, E106};
    use optreg_symbols::{
        Attribute, AttributeArg, Compilation, ConstructorSymbol, ParameterSymbol, TypeKind, TypeRef,
    };

    fn prop(name: &str, ty: TypeRef) -> PropertySymbol {
        PropertySymbol {
            name: name.to_string(),
            ty,
            accessibility: Accessibility::Public,
            nullable: false,
            is_abstract: true,
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

    fn definition() -> CollectionDefinition {
        CollectionDefinition {
            namespace: "Demo".to_string(),
            registry_name: "Widgets".to_string(),
            registry_accessibility: Accessibility::Public,
            registry_is_static: true,
            name: "Widgets".to_string(),
            base: TypeRef::named("Demo", "Widget"),
            option_interface: None,
            current_compilation_only: false,
            target_framework: None,
            location: None,
        }
    }

    fn compilation(props: Vec<PropertySymbol>) -> Compilation {
        let mut base = TypeSymbol::new("Demo", "Widget", TypeKind::Class);
        base.is_abstract = true;
        base.properties = props;
        let mut c = Compilation::new("Demo", None);
        c.add_type(base);
        c
    }

    #[test]
    fn conventional_id_and_name() {
        let c = compilation(vec![
            prop("Name", TypeRef::keyword("string")),
            prop("Id", TypeRef::keyword("int")),
        ]);
        let sink = DiagnosticSink::new();
        let set = collect_lookups(&c, &definition(), &sink).unwrap().unwrap();
        let names: Vec<&str> = set.lookups.iter().map(|l| l.property_name.as_str()).collect();
        assert_eq!(names, vec!["Id", "Name"]);
        assert!(set.lookups[0].is_default);
        assert_eq!(set.lookups[0].method_name, "GetById");
        assert_eq!(
            set.lookups[1].empty_value,
            Some(ConstantValue::String(String::new()))
        );
        assert!(set.base_is_abstract);
        assert_eq!(set.sentinel_base_args, 0);
    }

    #[test]
    fn marked_lookup_options() {
        let mut code = prop("Code", TypeRef::keyword("string"));
        code.attributes.push(
            Attribute::new("Lookup")
                .with_named("TryGet", AttributeArg::Constant(ConstantValue::Bool(true)))
                .with_named("Default", AttributeArg::Constant(ConstantValue::Bool(true)))
                .with_named(
                    "Comparison",
                    AttributeArg::EnumMember("StringComparison.OrdinalIgnoreCase".to_string()),
                ),
        );
        let c = compilation(vec![prop("Id", TypeRef::keyword("int")), code]);
        let sink = DiagnosticSink::new();
        let set = collect_lookups(&c, &definition(), &sink).unwrap().unwrap();
        assert_eq!(set.lookups[0].property_name, "Code");
        assert!(set.lookups[0].is_default);
        assert!(set.lookups[0].try_get);
        assert_eq!(set.lookups[0].comparison, StringComparison::OrdinalIgnoreCase);
        assert!(!set.lookups[1].is_default);
    }

    #[test]
    fn abstract_lookup_without_empty_value_is_e103() {
        let mut color = prop("Color", TypeRef::named("Demo", "Color"));
        color.attributes.push(Attribute::new("Lookup"));
        let c = compilation(vec![color]);
        let sink = DiagnosticSink::new();
        assert!(collect_lookups(&c, &definition(), &sink).unwrap().is_none());
        assert_eq!(sink.diagnostics()[0].code, E103);
    }

    #[test]
    fn ambiguous_ancestor_is_e101() {
        let mut c = Compilation::new("Demo", None);
        let mut base = TypeSymbol::new("Demo", "Widget", TypeKind::Class);
        base.is_abstract = true;
        base.base = Some(TypeRef::named("Demo", "Root"));
        c.add_type(base);
        c.add_type(TypeSymbol::new("Demo", "Root", TypeKind::Class));
        c.add_type(TypeSymbol::new("Demo", "Root", TypeKind::Class));
        let sink = DiagnosticSink::new();
        assert!(collect_lookups(&c, &definition(), &sink).unwrap().is_none());
        let diags = sink.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, E101);
        assert!(diags[0].message.contains("`Demo.Root` is declared 2 times"));
    }

    #[test]
    fn abstract_lookup_with_empty_value_is_accepted() {
        let mut color = prop("Color", TypeRef::named("Demo", "Color"));
        color.attributes.push(Attribute::new("Lookup").with_named(
            "EmptyValue",
            AttributeArg::Constant(ConstantValue::Null),
        ));
        let c = compilation(vec![color]);
        let sink = DiagnosticSink::new();
        let set = collect_lookups(&c, &definition(), &sink).unwrap().unwrap();
        assert!(set.lookups[0].requires_override);
        assert_eq!(set.lookups[0].empty_value, Some(ConstantValue::Null));
    }

    #[test]
    fn non_lookup_abstract_members_recorded() {
        let c = compilation(vec![prop("Description", TypeRef::named("Demo", "Text"))]);
        let sink = DiagnosticSink::new();
        let set = collect_lookups(&c, &definition(), &sink).unwrap().unwrap();
        assert!(set.lookups.is_empty());
        assert_eq!(set.abstract_members.len(), 1);
        assert_eq!(set.abstract_members[0].name, "Description");
    }

    #[test]
    fn unsupported_comparison_is_e106() {
        let mut name = prop("Name", TypeRef::keyword("string"));
        name.attributes.push(Attribute::new("Lookup").with_named(
            "Comparison",
            AttributeArg::EnumMember("CurrentCulture".to_string()),
        ));
        let c = compilation(vec![name]);
        let sink = DiagnosticSink::new();
        let set = collect_lookups(&c, &definition(), &sink).unwrap().unwrap();
        assert_eq!(set.lookups[0].comparison, StringComparison::Ordinal);
        assert_eq!(sink.diagnostics()[0].code, E106);
    }

    #[test]
    fn second_default_is_demoted() {
        let marked = |name: &str| {
            let mut p = prop(name, TypeRef::keyword("string"));
            p.attributes.push(
                Attribute::new("Lookup")
                    .with_named("Default", AttributeArg::Constant(ConstantValue::Bool(true))),
            );
            p
        };
        let c = compilation(vec![marked("Code"), marked("Slug")]);
        let sink = DiagnosticSink::new();
        let set = collect_lookups(&c, &definition(), &sink).unwrap().unwrap();
        assert_eq!(set.lookups.iter().filter(|l| l.is_default).count(), 1);
        assert_eq!(set.lookups[0].property_name, "Code");
        assert_eq!(sink.diagnostics()[0].code, E106);
    }

    #[test]
    fn inherited_properties_and_most_derived_wins() {
        let mut root = TypeSymbol::new("Demo", "Root", TypeKind::Class);
        root.is_abstract = true;
        root.properties = vec![prop("Id", TypeRef::keyword("int"))];
        let mut base = TypeSymbol::new("Demo", "Widget", TypeKind::Class);
        base.is_abstract = true;
        base.base = Some(TypeRef::named("Demo", "Root"));
        let mut id_override = prop("Id", TypeRef::keyword("int"));
        id_override.is_abstract = false;
        id_override.is_override = true;
        base.properties = vec![id_override];
        let mut c = Compilation::new("Demo", None);
        c.add_type(root);
        c.add_type(base);
        let sink = DiagnosticSink::new();
        let set = collect_lookups(&c, &definition(), &sink).unwrap().unwrap();
        assert_eq!(set.lookups.len(), 1);
        assert!(!set.lookups[0].requires_override);
        assert_eq!(set.lookups[0].declared_in, "Demo.Widget");
    }

    #[test]
    fn sentinel_uses_smallest_accessible_base_constructor() {
        let ctor = |accessibility, arity: usize| ConstructorSymbol {
            accessibility,
            parameters: (0..arity)
                .map(|i| ParameterSymbol {
                    name: format!("p{i}"),
                    ty: TypeRef::keyword("int"),
                    default: None,
                })
                .collect(),
            is_implicit: false,
            is_static: false,
        };
        let mut base = TypeSymbol::new("Demo", "Widget", TypeKind::Class);
        base.is_abstract = true;
        base.constructors = vec![
            ctor(Accessibility::Private, 0),
            ctor(Accessibility::Protected, 2),
            ctor(Accessibility::Protected, 1),
        ];
        let mut c = Compilation::new("Demo", None);
        c.add_type(base);
        let sink = DiagnosticSink::new();
        let set = collect_lookups(&c, &definition(), &sink).unwrap().unwrap();
        assert_eq!(set.sentinel_base_args, 1);
    }
}
