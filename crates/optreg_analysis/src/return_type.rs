//! Best-effort inference of the element interface an option exposes.

use optreg_model::{CollectionDefinition, ReturnTypeName};
use optreg_symbols::{QueryError, SymbolQuery, TypeRef, TypeSymbol};

/// Every interface `symbol` implements: its own, those of each base class
/// in `chain`, and the interfaces those interfaces extend. Order is
/// first-seen, duplicates removed.
pub fn all_interfaces(
    query: &dyn SymbolQuery,
    symbol: &TypeSymbol,
    chain: &[TypeRef],
) -> Result<Vec<TypeRef>, QueryError> {
    let mut pending: Vec<TypeRef> = symbol.interfaces.clone();
    for ancestor in chain {
        if let Some(declared) = query.resolve(ancestor)? {
            pending.extend(
                declared
                    .symbol
                    .interfaces
                    .iter()
                    .map(|i| i.substitute(&declared.symbol.generic_params, ancestor.args())),
            );
        }
    }
    let mut out: Vec<TypeRef> = Vec::new();
    let mut cursor = 0;
    while cursor < pending.len() {
        let iface = pending[cursor].clone();
        cursor += 1;
        if out.contains(&iface) {
            continue;
        }
        if let Some(declared) = query.resolve(&iface)? {
            pending.extend(
                declared
                    .symbol
                    .interfaces
                    .iter()
                    .map(|i| i.substitute(&declared.symbol.generic_params, iface.args())),
            );
        }
        out.push(iface);
    }
    Ok(out)
}

/// Picks the return type of an option's generated accessor.
///
/// An explicit marker return type is used verbatim. Otherwise an implemented
/// interface qualifies if its name without the `I` prefix equals the base
/// type name or the singular collection name, or if it is the collection's
/// declared option interface. Exactly one qualifying interface is required;
/// none or several leave the return type unset.
pub fn infer_return_type(
    explicit: Option<&TypeRef>,
    interfaces: &[TypeRef],
    definition: &CollectionDefinition,
) -> Option<ReturnTypeName> {
    if let Some(ty) = explicit {
        return Some(ReturnTypeName(ty.clone()));
    }
    let singular = singularize(&definition.name);
    let mut found: Vec<&TypeRef> = interfaces
        .iter()
        .filter(|iface| {
            let stem = interface_stem(iface.name());
            stem == definition.base.name()
                || stem == singular
                || definition.option_interface.as_ref() == Some(*iface)
        })
        .collect();
    found.dedup();
    match found.as_slice() {
        [single] => Some(ReturnTypeName((*single).clone())),
        [] => None,
        several => {
            tracing::debug!(
                collection = %definition.name,
                candidates = several.len(),
                "ambiguous return type, falling back to base type"
            );
            None
        }
    }
}

/// `IWidget` -> `Widget`; names not following the `I` + uppercase
/// convention are returned unchanged.
fn interface_stem(name: &str) -> &str {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some('I'), Some(c)) if c.is_uppercase() => &name[1..],
        _ => name,
    }
}

/// English singular of a collection name: `Widgets` -> `Widget`,
/// `Categories` -> `Category`, `Boxes` -> `Box`.
pub fn singularize(name: &str) -> String {
    if let Some(stem) = name.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{stem}y");
        }
    }
    for suffix in ["sses", "uses", "shes", "ches", "xes", "zes"] {
        if name.ends_with(suffix) {
            return name[..name.len() - 2].to_string();
        }
    }
    match name.strip_suffix('s') {
        Some(stem) if !stem.is_empty() && !stem.ends_with('s') => stem.to_string(),
        _ => name.to_string(),
    }
}
