//! Extracted option models.

use std::collections::BTreeMap;

use optreg_common::SourceLocation;
use optreg_symbols::{ConstantValue, TypeRef};
use serde::Serialize;

use crate::constructor::ConstructorInfo;

/// An inferred or declared accessor return type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ReturnTypeName(pub TypeRef);

impl ReturnTypeName {
    /// Simple name of the type.
    pub fn name(&self) -> &str {
        self.0.name()
    }

    /// Namespace of the type.
    pub fn namespace(&self) -> &str {
        self.0.namespace().unwrap_or_default()
    }
}

/// The validated model of one logical option.
///
/// A type registered under two logical names yields two models sharing the
/// same `full_type_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeInfoModel {
    /// Logical name, unique within the collection.
    pub name: String,
    /// Simple type name.
    pub short_type_name: String,
    /// Fully-qualified type name.
    pub full_type_name: String,
    /// Namespace of the type.
    pub namespace: String,
    /// Instance constructors in declaration order.
    pub constructors: Vec<ConstructorInfo>,
    /// Return type of the generated accessor, `None` to use the
    /// collection's element type.
    pub return_type: Option<ReturnTypeName>,
    /// Constant values of the collection's lookup properties, by property name.
    pub key_values: BTreeMap<String, ConstantValue>,
    /// Declaring assembly.
    pub assembly: String,
    /// Declaration location.
    pub location: Option<SourceLocation>,
}

impl TypeInfoModel {
    /// Returns the constant value of lookup property `property`, if known.
    pub fn key_value(&self, property: &str) -> Option<&ConstantValue> {
        self.key_values.get(property)
    }
}
