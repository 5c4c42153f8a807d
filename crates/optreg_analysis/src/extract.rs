//! Metadata Extractor: turns matched candidates into option models.

use std::collections::{BTreeMap, HashMap};

use optreg_diagnostics::{catalog, DiagnosticSink};
use optreg_model::{
    CollectionDefinition, CollectionModel, OptionCandidate, PropertyLookupInfo, TypeInfoModel,
};
use optreg_symbols::{ConstantValue, SymbolQuery, TypeKind, TypeRef};
use rayon::prelude::*;
use tokio_util::sync::CancellationToken;

use crate::constructors::classify_constructors;
use crate::error::ExtractError;
use crate::lookups::LookupSet;
use crate::matcher::matched_ancestor;
use crate::return_type::{all_interfaces, infer_return_type};

/// Extracts one model per option marker on `candidate`.
///
/// Two markers yield two models for the same type (aliases).
pub fn extract_option(
    query: &dyn SymbolQuery,
    definition: &CollectionDefinition,
    lookups: &[PropertyLookupInfo],
    candidate: &OptionCandidate<'_>,
) -> Result<Vec<TypeInfoModel>, ExtractError> {
    let symbol = candidate.symbol;
    let full_name = candidate.full_name.clone();
    if symbol.kind == TypeKind::Interface {
        return Err(ExtractError::Interface(full_name));
    }
    if symbol.is_static {
        return Err(ExtractError::Static(full_name));
    }
    if symbol.is_abstract {
        return Err(ExtractError::Abstract(full_name));
    }
    if !symbol.generic_params.is_empty() {
        return Err(ExtractError::OpenGeneric(full_name));
    }
    let constructors = classify_constructors(symbol);
    if !constructors.iter().any(|c| c.is_invocable_without_arguments()) {
        return Err(ExtractError::NoUsableConstructor(full_name));
    }

    let interfaces = all_interfaces(query, symbol, &candidate.base_chain)?;
    let mut key_values = BTreeMap::new();
    for lookup in lookups {
        if let Some(value) = key_value(query, candidate, &lookup.property_name)? {
            key_values.insert(lookup.property_name.clone(), value);
        }
    }

    let models = candidate
        .markers
        .iter()
        .zip(candidate.logical_names())
        .map(|(marker, name)| {
            let mut key_values = key_values.clone();
            if lookups.iter().any(|l| l.property_name == "Name" && l.key_type.is_string()) {
                key_values
                    .entry("Name".to_string())
                    .or_insert_with(|| ConstantValue::String(name.to_string()));
            }
            TypeInfoModel {
                name: name.to_string(),
                short_type_name: candidate.short_name.clone(),
                full_type_name: full_name.clone(),
                namespace: symbol.namespace.clone(),
                constructors: constructors.clone(),
                return_type: infer_return_type(marker.return_type.as_ref(), &interfaces, definition),
                key_values,
                assembly: candidate.assembly.to_string(),
                location: marker.location.clone().or_else(|| symbol.location.clone()),
            }
        })
        .collect();
    Ok(models)
}

/// The constant a property returns for this option: the option's own
/// declaration first, then each ancestor in chain order.
fn key_value(
    query: &dyn SymbolQuery,
    candidate: &OptionCandidate<'_>,
    property: &str,
) -> Result<Option<ConstantValue>, ExtractError> {
    if let Some(value) = candidate.symbol.property(property).and_then(|p| p.value.clone()) {
        return Ok(Some(value));
    }
    for ancestor in &candidate.base_chain {
        if let Some(declared) = query.resolve(ancestor)? {
            if let Some(value) = declared.symbol.property(property).and_then(|p| p.value.clone()) {
                return Ok(Some(value));
            }
        }
    }
    Ok(None)
}

/// Extracts every candidate of a collection and assembles the model.
///
/// Candidates are processed in parallel; cancellation is checked before each
/// one starts. A rejected candidate is reported (`E104`) and left out.
/// Options are then sorted by logical name (ordinal), ties broken by full
/// type name; a repeated logical name keeps the first option (`E102`).
///
/// Returns `Ok(None)` when a generic base type cannot be closed over a
/// single set of type arguments (`E101`).
pub fn extract_collection(
    query: &dyn SymbolQuery,
    definition: &CollectionDefinition,
    mut lookups: LookupSet,
    candidates: &[OptionCandidate<'_>],
    cancel: &CancellationToken,
    sink: &DiagnosticSink,
) -> Result<Option<CollectionModel>, ExtractError> {
    let extracted: Vec<(Vec<TypeInfoModel>, Option<TypeRef>)> = candidates
        .par_iter()
        .map(|candidate| {
            if cancel.is_cancelled() {
                return Err(ExtractError::Cancelled);
            }
            match extract_option(query, definition, &lookups.lookups, candidate) {
                Ok(models) => {
                    let ancestor = matched_ancestor(&candidate.base_chain, &definition.base);
                    Ok((models, ancestor.cloned()))
                }
                Err(e) if e.is_candidate_rejection() => {
                    sink.emit(catalog::error_option_generation_failed(
                        &candidate.full_name,
                        &e.to_string(),
                        candidate.symbol.location.clone(),
                    ));
                    Ok((Vec::new(), None))
                }
                Err(e) => Err(e),
            }
        })
        .collect::<Result<_, _>>()?;

    let mut closed_bases: Vec<TypeRef> = Vec::new();
    let mut options: Vec<TypeInfoModel> = Vec::new();
    for (models, ancestor) in extracted {
        if let Some(ancestor) = ancestor {
            if !closed_bases.contains(&ancestor) {
                closed_bases.push(ancestor);
            }
        }
        options.extend(models);
    }
    let Some(base_type) = close_base(definition, &closed_bases, sink) else {
        return Ok(None);
    };
    close_members(query, definition, &base_type, &mut lookups)?;

    options.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.full_type_name.cmp(&b.full_type_name))
    });
    let options = dedup_names(definition, options, sink);
    check_duplicate_keys(definition, &lookups.lookups, &options, sink);

    let element_type = common_return_type(&options).unwrap_or_else(|| base_type.clone());
    tracing::debug!(
        collection = %definition.name,
        candidates = candidates.len(),
        options = options.len(),
        element = %element_type,
        "extracted collection"
    );
    Ok(Some(CollectionModel {
        definition: definition.clone(),
        options,
        lookups: lookups.lookups,
        base_type,
        element_type,
        base_is_abstract: lookups.base_is_abstract,
        sentinel_base_args: lookups.sentinel_base_args,
        abstract_members: lookups.abstract_members,
    }))
}

/// The concrete base type the registry is typed against. A generic base
/// must be closed the same way by every option.
fn close_base(
    definition: &CollectionDefinition,
    closed: &[TypeRef],
    sink: &DiagnosticSink,
) -> Option<TypeRef> {
    if !definition.base.is_generic() {
        return Some(definition.base.clone());
    }
    match closed {
        [single] => Some(single.clone()),
        [] => {
            sink.emit(catalog::error_invalid_base_type(
                &definition.name,
                &format!("no option closes the generic base `{}`", definition.base),
                definition.location.clone(),
            ));
            None
        }
        several => {
            let forms: Vec<String> = several.iter().map(TypeRef::to_string).collect();
            sink.emit(catalog::error_invalid_base_type(
                &definition.name,
                &format!(
                    "options close the generic base `{}` differently: {}",
                    definition.base,
                    forms.join(", ")
                ),
                definition.location.clone(),
            ));
            None
        }
    }
}

/// Rewrites base-type parameters in lookup and abstract member types with
/// the arguments of the closed base.
fn close_members(
    query: &dyn SymbolQuery,
    definition: &CollectionDefinition,
    base_type: &TypeRef,
    lookups: &mut LookupSet,
) -> Result<(), ExtractError> {
    if !definition.base.is_generic() {
        return Ok(());
    }
    let Some(declared) = query.resolve(&definition.base)? else {
        return Ok(());
    };
    let params = &declared.symbol.generic_params;
    let args = base_type.args();
    for lookup in &mut lookups.lookups {
        lookup.key_type = lookup.key_type.substitute(params, args);
        lookup.type_name = lookup.key_type.to_string();
        lookup.return_type = lookup.return_type.as_ref().map(|t| t.substitute(params, args));
    }
    for member in &mut lookups.abstract_members {
        member.ty = member.ty.substitute(params, args);
    }
    Ok(())
}

fn dedup_names(
    definition: &CollectionDefinition,
    options: Vec<TypeInfoModel>,
    sink: &DiagnosticSink,
) -> Vec<TypeInfoModel> {
    let mut kept: Vec<TypeInfoModel> = Vec::with_capacity(options.len());
    for option in options {
        match kept.last() {
            Some(first) if first.name == option.name => {
                sink.emit(catalog::error_duplicate_option_name(
                    &definition.name,
                    &option.name,
                    &first.full_type_name,
                    &option.full_type_name,
                    option.location.clone(),
                ));
            }
            _ => kept.push(option),
        }
    }
    kept
}

/// Reports single-valued keys shared by two different option types. Aliases
/// of one type share every key and are not reported.
fn check_duplicate_keys(
    definition: &CollectionDefinition,
    lookups: &[PropertyLookupInfo],
    options: &[TypeInfoModel],
    sink: &DiagnosticSink,
) {
    for lookup in lookups.iter().filter(|l| !l.allow_multiple) {
        let mut first_by_key: HashMap<&ConstantValue, &TypeInfoModel> = HashMap::new();
        for option in options {
            let Some(value) = option.key_value(&lookup.property_name) else {
                continue;
            };
            if *value == ConstantValue::Null {
                continue;
            }
            match first_by_key.get(value) {
                Some(first) if first.full_type_name != option.full_type_name => {
                    sink.emit(catalog::warning_duplicate_key_value(
                        &definition.name,
                        &lookup.property_name,
                        &value.to_literal(),
                        &first.name,
                        &option.name,
                        option.location.clone(),
                    ));
                }
                Some(_) => {}
                None => {
                    first_by_key.insert(value, option);
                }
            }
        }
    }
}

/// The return type every option agrees on, if any.
fn common_return_type(options: &[TypeInfoModel]) -> Option<TypeRef> {
    let first = options.first()?.return_type.as_ref()?;
    options
        .iter()
        .all(|o| o.return_type.as_ref() == Some(first))
        .then(|| first.0.clone())
}
