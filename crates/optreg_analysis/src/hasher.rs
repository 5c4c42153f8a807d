//! Content Hasher: structural fingerprints for incremental regeneration.
//!
//! Fingerprints cover exactly what the emitted text depends on. Source
//! locations, documentation and per-option key values are excluded: the
//! generated registry reads key values from the option instances at run
//! time, so changing them does not change the emitted code.

use optreg_common::{Fingerprint, FingerprintBuilder};
use optreg_model::{
    CollectionDefinition, CollectionModel, ConstructorInfo, LookupShape, ParameterInfo,
    PropertyLookupInfo, TypeInfoModel,
};
use optreg_symbols::TypeRef;

/// Fingerprints one constructor: accessibility, primary flag, then each
/// parameter's name, type, default presence and default literal, in order.
pub fn hash_constructor(ctor: &ConstructorInfo) -> Fingerprint {
    let mut b = FingerprintBuilder::new("constructor");
    b.str(ctor.accessibility.keyword())
        .bool(ctor.is_primary)
        .seq(ctor.parameters.len());
    for param in &ctor.parameters {
        write_parameter(&mut b, param);
    }
    b.finish()
}

fn write_parameter(b: &mut FingerprintBuilder, param: &ParameterInfo) {
    b.str(&param.name)
        .str(&param.namespace)
        .str(&param.type_name)
        .bool(param.has_default)
        .opt_str(param.default_literal.as_deref());
}

fn write_type(b: &mut FingerprintBuilder, ty: &TypeRef) {
    b.str(&ty.full_name());
}

/// Fingerprints one option model.
pub fn hash_model(model: &TypeInfoModel) -> Fingerprint {
    let mut b = FingerprintBuilder::new("option");
    b.str(&model.name)
        .str(&model.namespace)
        .str(&model.short_type_name)
        .str(&model.full_type_name);
    match &model.return_type {
        Some(ret) => {
            b.bool(true);
            write_type(&mut b, &ret.0);
        }
        None => {
            b.bool(false);
        }
    }
    b.seq(model.constructors.len());
    for ctor in &model.constructors {
        b.fingerprint(&hash_constructor(ctor));
    }
    b.finish()
}

fn hash_lookup(lookup: &PropertyLookupInfo) -> Fingerprint {
    let mut b = FingerprintBuilder::new("lookup");
    b.str(&lookup.property_name)
        .str(&lookup.type_name)
        .str(lookup.accessibility.keyword())
        .str(&lookup.method_name)
        .bool(lookup.try_get)
        .bool(lookup.allow_multiple)
        .bool(lookup.is_default)
        .str(lookup.comparison.comparer_member())
        .opt_str(lookup.comparer.as_deref())
        .bool(lookup.nullable)
        .opt_str(lookup.return_type.as_ref().map(TypeRef::full_name).as_deref())
        .bool(lookup.requires_override)
        .opt_str(lookup.empty_value.as_ref().map(|v| v.to_literal()).as_deref());
    b.finish()
}

fn write_definition(b: &mut FingerprintBuilder, def: &CollectionDefinition) {
    b.str(&def.namespace)
        .str(&def.registry_name)
        .str(def.registry_accessibility.keyword())
        .bool(def.registry_is_static)
        .str(&def.name)
        .str(&def.base.full_name())
        .opt_str(def.option_interface.as_ref().map(TypeRef::full_name).as_deref())
        .bool(def.current_compilation_only);
}

/// Fingerprints everything the emitted unit for `model` depends on, under
/// the lookup `shape` it will be rendered with.
///
/// The target moniker itself is not hashed; only the shape it selects is.
pub fn hash_collection(model: &CollectionModel, shape: LookupShape) -> Fingerprint {
    let mut b = FingerprintBuilder::new("collection");
    write_definition(&mut b, &model.definition);
    b.str(shape.label());
    write_type(&mut b, &model.base_type);
    write_type(&mut b, &model.element_type);
    b.bool(model.base_is_abstract)
        .u64(model.sentinel_base_args as u64)
        .seq(model.abstract_members.len());
    for member in &model.abstract_members {
        b.str(&member.name).str(member.accessibility.keyword());
        write_type(&mut b, &member.ty);
    }
    b.seq(model.lookups.len());
    for lookup in &model.lookups {
        b.fingerprint(&hash_lookup(lookup));
    }
    b.seq(model.options.len());
    for option in &model.options {
        b.fingerprint(&hash_model(option));
    }
    b.finish()
}
