//! Collection definitions and the per-pass collection model.

use optreg_common::SourceLocation;
use optreg_symbols::{Accessibility, TypeRef};
use serde::Serialize;

use crate::lookup::PropertyLookupInfo;
use crate::option::TypeInfoModel;

/// The code shape used for alternate-key lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupShape {
    /// One table per key, queried through a borrowed alternate view.
    AlternateLookup,
    /// One dedicated table per key, queried with an owned, normalised key.
    PerKeyDictionary,
}

impl LookupShape {
    /// Stable label, used in fingerprints and logs.
    pub fn label(self) -> &'static str {
        match self {
            LookupShape::AlternateLookup => "alternate-lookup",
            LookupShape::PerKeyDictionary => "per-key-dictionary",
        }
    }
}

/// A collection declared by a `GenerateCollection` marker.
///
/// Immutable once decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionDefinition {
    /// Namespace of the registry type.
    pub namespace: String,
    /// Simple name of the partial registry type the marker is applied to.
    pub registry_name: String,
    /// Accessibility of the registry type.
    pub registry_accessibility: Accessibility,
    /// `true` if the registry type is declared `static`.
    pub registry_is_static: bool,
    /// Collection name: the marker's `Name`, or the registry type name.
    pub name: String,
    /// Option base type.
    pub base: TypeRef,
    /// Interface every option exposes, if declared.
    pub option_interface: Option<TypeRef>,
    /// Only options declared in the current compilation are collected.
    pub current_compilation_only: bool,
    /// Target platform moniker the registry is generated for.
    pub target_framework: Option<String>,
    /// Where the marker was applied.
    pub location: Option<SourceLocation>,
}

impl CollectionDefinition {
    /// Fully-qualified registry type name.
    pub fn registry_full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.registry_name.clone()
        } else {
            format!("{}.{}", self.namespace, self.registry_name)
        }
    }

    /// File name of the generated unit.
    pub fn hint_name(&self) -> String {
        format!("{}.g.cs", self.registry_full_name())
    }
}

/// Everything the emitter needs to render one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionModel {
    /// The collection.
    pub definition: CollectionDefinition,
    /// Options, sorted by logical name (ordinal) then full type name.
    pub options: Vec<TypeInfoModel>,
    /// Lookup properties, default key first.
    pub lookups: Vec<PropertyLookupInfo>,
    /// The option base type, closed over the arguments every option agrees
    /// on when the declared base is generic.
    pub base_type: TypeRef,
    /// Element type of `All` and of single-valued lookups.
    pub element_type: TypeRef,
    /// `true` if the base type is abstract.
    pub base_is_abstract: bool,
    /// Number of arguments the empty sentinel passes to the base constructor.
    pub sentinel_base_args: usize,
    /// Abstract base properties that are not lookups; the empty sentinel
    /// overrides them with the type's default value.
    pub abstract_members: Vec<AbstractMember>,
}

/// An abstract, non-lookup property of the option base type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbstractMember {
    /// Property name.
    pub name: String,
    /// Declared type.
    pub ty: TypeRef,
    /// Declared accessibility.
    pub accessibility: Accessibility,
}

impl CollectionModel {
    /// The default lookup, if any.
    pub fn default_lookup(&self) -> Option<&PropertyLookupInfo> {
        self.lookups.iter().find(|l| l.is_default)
    }

    /// Finds a lookup by property name.
    pub fn lookup(&self, property: &str) -> Option<&PropertyLookupInfo> {
        self.lookups.iter().find(|l| l.property_name == property)
    }

    /// Finds an option by logical name (ordinal).
    pub fn option(&self, name: &str) -> Option<&TypeInfoModel> {
        self.options.iter().find(|o| o.name == name)
    }
}
