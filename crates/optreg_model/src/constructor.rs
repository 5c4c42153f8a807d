//! Constructor and parameter metadata.

use optreg_symbols::Accessibility;
use serde::Serialize;

/// One constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ParameterInfo {
    /// Parameter name.
    pub name: String,
    /// Declared type, without namespace.
    pub type_name: String,
    /// Namespace of the declared type, empty for keyword types.
    pub namespace: String,
    /// `true` if the parameter is optional.
    pub has_default: bool,
    /// Source literal of the default value, if any.
    pub default_literal: Option<String>,
}

/// One instance constructor of an option type.
///
/// Equality is structural: two constructors are equal iff accessibility,
/// primary flag and the ordered parameter list all match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ConstructorInfo {
    /// Declared accessibility.
    pub accessibility: Accessibility,
    /// `true` for the compiler-synthesised primary constructor.
    pub is_primary: bool,
    /// Parameters in declaration order.
    pub parameters: Vec<ParameterInfo>,
}

impl ConstructorInfo {
    /// Returns `true` if generated code in the same assembly can invoke
    /// this constructor with no arguments.
    pub fn is_invocable_without_arguments(&self) -> bool {
        self.accessibility.is_assembly_visible() && self.parameters.iter().all(|p| p.has_default)
    }
}
