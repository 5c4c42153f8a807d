//! The empty sentinel: the value every lookup miss returns.
//!
//! The sentinel is a private sealed subclass of the option base type. It
//! chains to the base constructor with default arguments and overrides
//! every abstract base property: lookup properties return their empty
//! value, other abstract members return the type default.

use optreg_diagnostics::{catalog, Diagnostic};
use optreg_model::CollectionModel;

use crate::literal::{nullable_type_expr, type_expr, value_literal};
use crate::writer::SourceBuilder;

/// Name of the sentinel class for `model`: `Empty` + base type name.
pub fn sentinel_class_name(model: &CollectionModel) -> String {
    format!("Empty{}", model.base_type.name())
}

/// Checks that every abstract lookup has an empty value to return.
///
/// Lookup collection already reports such properties (`E103`) and drops
/// the collection, so reaching here with one is an internal error (`E105`).
pub fn check(model: &CollectionModel) -> Result<(), Diagnostic> {
    match model
        .lookups
        .iter()
        .find(|l| l.requires_override && l.empty_value.is_none())
    {
        Some(lookup) => Err(catalog::error_internal_invariant(
            &model.definition.name,
            &format!(
                "abstract lookup `{}` reached the emitter without an empty value",
                lookup.property_name
            ),
        )),
        None => Ok(()),
    }
}

/// Writes the sentinel class into `out`.
pub fn write(out: &mut SourceBuilder, model: &CollectionModel) -> Result<(), Diagnostic> {
    check(model)?;
    let name = sentinel_class_name(model);
    let mut bases = type_expr(&model.base_type);
    if model.element_type != model.base_type {
        bases.push_str(", ");
        bases.push_str(&type_expr(&model.element_type));
    }
    out.open(format!("private sealed class {name} : {bases}"));
    if model.sentinel_base_args > 0 {
        let args = vec!["default!"; model.sentinel_base_args].join(", ");
        out.line(format!("public {name}()"));
        out.indent();
        out.line(format!(": base({args})"));
        out.dedent();
        out.line("{");
        out.line("}");
        out.blank();
    }
    for lookup in model.lookups.iter().filter(|l| l.requires_override) {
        let Some(value) = &lookup.empty_value else {
            continue;
        };
        out.line(format!(
            "{} override {} {} => {};",
            lookup.accessibility.keyword(),
            nullable_type_expr(&lookup.key_type, lookup.nullable),
            lookup.property_name,
            value_literal(value, lookup.nullable)
        ));
    }
    for member in &model.abstract_members {
        out.line(format!(
            "{} override {} {} => default!;",
            member.accessibility.keyword(),
            type_expr(&member.ty),
            member.name
        ));
    }
    out.close();
    Ok(())
}
