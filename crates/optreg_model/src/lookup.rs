//! Lookup-eligible properties of a collection's base type.

use optreg_common::SourceLocation;
use optreg_symbols::{Accessibility, ConstantValue, TypeRef};
use serde::Serialize;

/// How string keys are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StringComparison {
    /// Byte-wise, case-sensitive.
    #[default]
    Ordinal,
    /// Case-insensitive using invariant simple case folding.
    OrdinalIgnoreCase,
}

impl StringComparison {
    /// Parses a `StringComparison` member name.
    ///
    /// Culture-sensitive members are not supported because their results
    /// depend on the machine running the generated code.
    pub fn from_member(member: &str) -> Option<Self> {
        match member {
            "Ordinal" => Some(StringComparison::Ordinal),
            "OrdinalIgnoreCase" => Some(StringComparison::OrdinalIgnoreCase),
            _ => None,
        }
    }

    /// Name of the matching `StringComparer` member.
    pub fn comparer_member(self) -> &'static str {
        match self {
            StringComparison::Ordinal => "Ordinal",
            StringComparison::OrdinalIgnoreCase => "OrdinalIgnoreCase",
        }
    }
}

/// Coarse classification of a key type, which decides how keys are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyKind {
    /// Any built-in integral type.
    Integer,
    /// `string`.
    String,
    /// `bool`.
    Boolean,
    /// Anything else, compared with its own equality.
    Other,
}

impl KeyKind {
    /// Classifies a declared property type.
    pub fn of(ty: &TypeRef) -> Self {
        if ty.is_integer() {
            KeyKind::Integer
        } else if ty.is_string() {
            KeyKind::String
        } else if ty.is_bool() {
            KeyKind::Boolean
        } else {
            KeyKind::Other
        }
    }
}

/// One property the generated registry can look options up by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyLookupInfo {
    /// Property name.
    pub property_name: String,
    /// Declared type, as displayed in diagnostics.
    pub type_name: String,
    /// Declared type.
    pub key_type: TypeRef,
    /// Declared accessibility of the property.
    pub accessibility: Accessibility,
    /// Name of the generated lookup method.
    pub method_name: String,
    /// Also generate `Try<method_name>`.
    pub try_get: bool,
    /// Several options may share one key value; the lookup returns a sequence.
    pub allow_multiple: bool,
    /// This is the collection's default key (`Get`/`TryGet`).
    pub is_default: bool,
    /// Comparison for string keys.
    pub comparison: StringComparison,
    /// Custom comparer expression, overriding `comparison`.
    pub comparer: Option<String>,
    /// `true` if the declared type is nullable.
    pub nullable: bool,
    /// Return type override for the generated method.
    pub return_type: Option<TypeRef>,
    /// The property is abstract on the base type, so the empty sentinel
    /// must override it.
    pub requires_override: bool,
    /// Value the empty sentinel's override returns.
    pub empty_value: Option<ConstantValue>,
    /// Declaring type of the property.
    pub declared_in: String,
    /// Declaration location.
    pub location: Option<SourceLocation>,
}

impl PropertyLookupInfo {
    /// Name of the generated `TryGet`-style method.
    pub fn try_method_name(&self) -> String {
        format!("Try{}", self.method_name)
    }

    /// Storage classification of the key.
    pub fn key_kind(&self) -> KeyKind {
        KeyKind::of(&self.key_type)
    }

    /// Returns `true` if keys are strings compared case-insensitively.
    pub fn ignores_case(&self) -> bool {
        self.key_kind() == KeyKind::String
            && self.comparer.is_none()
            && self.comparison == StringComparison::OrdinalIgnoreCase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_comparison() {
        assert_eq!(
            StringComparison::from_member("OrdinalIgnoreCase"),
            Some(StringComparison::OrdinalIgnoreCase)
        );
        assert_eq!(StringComparison::from_member("CurrentCulture"), None);
    }

    #[test]
    fn key_kinds() {
        assert_eq!(KeyKind::of(&TypeRef::keyword("int")), KeyKind::Integer);
        assert_eq!(KeyKind::of(&TypeRef::keyword("string")), KeyKind::String);
        assert_eq!(KeyKind::of(&TypeRef::keyword("bool")), KeyKind::Boolean);
        assert_eq!(KeyKind::of(&TypeRef::named("System", "Guid")), KeyKind::Other);
    }
}
