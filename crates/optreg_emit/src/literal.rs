//! Names, type expressions and constant literals in emitted source.

use optreg_symbols::{ConstantValue, TypeRef};

const KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// Escapes `name` with `@` if it is a reserved word.
pub fn identifier(name: &str) -> String {
    if KEYWORDS.contains(&name) {
        format!("@{name}")
    } else {
        name.to_string()
    }
}

/// Parameter name for a key property: `DisplayName` -> `displayName`.
pub fn parameter_name(property: &str) -> String {
    let mut chars = property.chars();
    let camel: String = match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => "key".to_string(),
    };
    identifier(&camel)
}

/// Fully-qualified type expression. Named types are rooted at `global::`
/// so user namespaces cannot shadow them; keyword types are written bare.
pub fn type_expr(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Parameter(name) => name.clone(),
        TypeRef::Named {
            namespace,
            name,
            args,
        } => {
            let mut out = if namespace.is_empty() {
                name.clone()
            } else {
                format!("global::{namespace}.{name}")
            };
            if !args.is_empty() {
                let args: Vec<String> = args.iter().map(type_expr).collect();
                out.push('<');
                out.push_str(&args.join(", "));
                out.push('>');
            }
            out
        }
    }
}

/// [`type_expr`] with a nullable annotation when `nullable` is set.
pub fn nullable_type_expr(ty: &TypeRef, nullable: bool) -> String {
    let expr = type_expr(ty);
    if nullable {
        format!("{expr}?")
    } else {
        expr
    }
}

/// Literal for a constant returned by a property of the given nullability.
/// `null` for a non-nullable property is written `null!`.
pub fn value_literal(value: &ConstantValue, nullable: bool) -> String {
    match value {
        ConstantValue::Null if !nullable => "null!".to_string(),
        other => other.to_literal(),
    }
}

/// A string literal.
pub fn string_literal(value: &str) -> String {
    ConstantValue::String(value.to_string()).to_literal()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_escaped() {
        assert_eq!(identifier("class"), "@class");
        assert_eq!(identifier("Class"), "Class");
        assert_eq!(parameter_name("Default"), "@default");
        assert_eq!(parameter_name("DisplayName"), "displayName");
    }

    #[test]
    fn type_expressions() {
        assert_eq!(type_expr(&TypeRef::keyword("int")), "int");
        assert_eq!(
            type_expr(&TypeRef::named("Demo.Core", "Widget")),
            "global::Demo.Core.Widget"
        );
        let generic = TypeRef::generic(
            "Demo",
            "Option",
            vec![TypeRef::keyword("string"), TypeRef::parameter("T")],
        );
        assert_eq!(type_expr(&generic), "global::Demo.Option<string, T>");
        assert_eq!(
            nullable_type_expr(&TypeRef::keyword("string"), true),
            "string?"
        );
    }

    #[test]
    fn literals() {
        assert_eq!(value_literal(&ConstantValue::Null, false), "null!");
        assert_eq!(value_literal(&ConstantValue::Null, true), "null");
        assert_eq!(value_literal(&ConstantValue::Int(-3), false), "-3");
        assert_eq!(string_literal("a\"b"), "\"a\\\"b\"");
    }
}
