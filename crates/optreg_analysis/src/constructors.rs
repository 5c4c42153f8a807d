//! Constructor discovery and primary-constructor classification.

use optreg_model::{ConstructorInfo, ParameterInfo};
use optreg_symbols::{ConstructorSymbol, ParameterSymbol, TypeKind, TypeSymbol};

/// Converts every instance constructor of `symbol`, in declaration order.
///
/// At most one constructor is flagged primary. If the heuristic accepts
/// several, the first one wins; the ambiguity is not reported.
pub fn classify_constructors(symbol: &TypeSymbol) -> Vec<ConstructorInfo> {
    let mut primary_taken = false;
    symbol
        .instance_constructors()
        .iter()
        .map(|ctor| {
            let is_primary = !primary_taken && is_primary(symbol, ctor);
            primary_taken |= is_primary;
            ConstructorInfo {
                accessibility: ctor.accessibility,
                is_primary,
                parameters: ctor.parameters.iter().map(parameter_info).collect(),
            }
        })
        .collect()
}

/// A constructor is primary iff it is compiler-synthesised, has the same
/// accessibility as its type, and either mirrors a record's read-only auto
/// properties or belongs to a class/struct and takes at least one parameter.
fn is_primary(symbol: &TypeSymbol, ctor: &ConstructorSymbol) -> bool {
    if !ctor.is_implicit || ctor.accessibility != symbol.accessibility {
        return false;
    }
    match symbol.kind {
        TypeKind::Record => mirrors_record_properties(symbol, ctor),
        TypeKind::Class | TypeKind::Struct => !ctor.parameters.is_empty(),
        TypeKind::Interface => false,
    }
}

fn mirrors_record_properties(symbol: &TypeSymbol, ctor: &ConstructorSymbol) -> bool {
    let properties: Vec<_> = symbol
        .properties
        .iter()
        .filter(|p| p.is_auto && p.is_read_only && !p.is_static)
        .collect();
    if properties.len() != ctor.parameters.len() {
        return false;
    }
    let mut used = vec![false; properties.len()];
    ctor.parameters.iter().all(|param| {
        let found = properties.iter().enumerate().position(|(i, prop)| {
            !used[i] && prop.name.eq_ignore_ascii_case(&param.name) && prop.ty == param.ty
        });
        match found {
            Some(i) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}

/// Converts a parameter symbol into its model form.
pub fn parameter_info(param: &ParameterSymbol) -> ParameterInfo {
    ParameterInfo {
        name: param.name.clone(),
        type_name: param.ty.name().to_string(),
        namespace: param.ty.namespace().unwrap_or_default().to_string(),
        has_default: param.default.is_some(),
        default_literal: param.default.as_ref().map(|v| v.to_literal()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optreg_symbols::{Accessibility, ConstantValue, PropertySymbol, TypeRef};

    fn param(name: &str, ty: &str) -> ParameterSymbol {
        ParameterSymbol {
            name: name.to_string(),
            ty: TypeRef::keyword(ty),
            default: None,
        }
    }

    fn auto_prop(name: &str, ty: &str) -> PropertySymbol {
        PropertySymbol {
            name: name.to_string(),
            ty: TypeRef::keyword(ty),
            accessibility: Accessibility::Public,
            nullable: false,
            is_abstract: false,
            is_virtual: false,
            is_override: false,
            is_static: false,
            is_auto: true,
            is_read_only: true,
            value: None,
            attributes: Vec::new(),
            location: None,
        }
    }

    fn ctor(implicit: bool, params: Vec<ParameterSymbol>) -> ConstructorSymbol {
        ConstructorSymbol {
            accessibility: Accessibility::Public,
            parameters: params,
            is_implicit: implicit,
            is_static: false,
        }
    }

    #[test]
    fn record_synthesised_constructor_is_primary() {
        let mut ty = TypeSymbol::new("Demo", "Pair", TypeKind::Record);
        ty.properties = vec![auto_prop("Id", "int"), auto_prop("Name", "string")];
        ty.constructors = vec![ctor(true, vec![param("id", "int"), param("name", "string")])];
        let ctors = classify_constructors(&ty);
        assert_eq!(ctors.len(), 1);
        assert!(ctors[0].is_primary);
    }

    #[test]
    fn explicit_constructors_are_never_primary() {
        let mut ty = TypeSymbol::new("Demo", "Pair", TypeKind::Class);
        ty.constructors = vec![
            ctor(false, vec![]),
            ctor(false, vec![param("id", "int"), param("name", "string")]),
        ];
        let ctors = classify_constructors(&ty);
        assert_eq!(ctors.len(), 2);
        assert!(ctors.iter().all(|c| !c.is_primary));
    }

    #[test]
    fn record_type_mismatch_is_not_primary() {
        let mut ty = TypeSymbol::new("Demo", "Pair", TypeKind::Record);
        ty.properties = vec![auto_prop("Id", "long")];
        ty.constructors = vec![ctor(true, vec![param("id", "int")])];
        assert!(!classify_constructors(&ty)[0].is_primary);
    }

    #[test]
    fn record_copy_constructor_with_other_accessibility_is_not_primary() {
        let mut ty = TypeSymbol::new("Demo", "Pair", TypeKind::Record);
        ty.properties = vec![auto_prop("Id", "int")];
        ty.constructors = vec![
            ConstructorSymbol {
                accessibility: Accessibility::Protected,
                parameters: vec![ParameterSymbol {
                    name: "original".to_string(),
                    ty: TypeRef::named("Demo", "Pair"),
                    default: None,
                }],
                is_implicit: true,
                is_static: false,
            },
            ctor(true, vec![param("id", "int")]),
        ];
        let ctors = classify_constructors(&ty);
        assert!(!ctors[0].is_primary);
        assert!(ctors[1].is_primary);
    }

    #[test]
    fn class_primary_needs_parameters() {
        let mut ty = TypeSymbol::new("Demo", "Added", TypeKind::Class);
        ty.constructors = vec![ctor(true, vec![])];
        assert!(!classify_constructors(&ty)[0].is_primary);
        ty.constructors = vec![ctor(true, vec![param("id", "int")])];
        assert!(classify_constructors(&ty)[0].is_primary);
    }

    #[test]
    fn first_primary_wins() {
        let mut ty = TypeSymbol::new("Demo", "Added", TypeKind::Class);
        ty.constructors = vec![
            ctor(true, vec![param("id", "int")]),
            ctor(true, vec![param("name", "string")]),
        ];
        let ctors = classify_constructors(&ty);
        assert!(ctors[0].is_primary);
        assert!(!ctors[1].is_primary);
    }

    #[test]
    fn parameter_default_literal() {
        let p = ParameterSymbol {
            name: "label".to_string(),
            ty: TypeRef::keyword("string"),
            default: Some(ConstantValue::String("none".to_string())),
        };
        let info = parameter_info(&p);
        assert!(info.has_default);
        assert_eq!(info.default_literal.as_deref(), Some("\"none\""));
        assert_eq!(info.namespace, "");
    }

    #[test]
    fn static_constructors_are_skipped() {
        let mut ty = TypeSymbol::new("Demo", "Added", TypeKind::Class);
        ty.constructors = vec![
            ConstructorSymbol {
                accessibility: Accessibility::Private,
                parameters: vec![],
                is_implicit: false,
                is_static: true,
            },
            ctor(false, vec![]),
        ];
        assert_eq!(classify_constructors(&ty).len(), 1);
    }
}
