//! Typed decoding of the generator's marker attributes.
//!
//! Three markers drive generation:
//!
//! - `GenerateCollection(typeof(Base), OptionInterface = ..., Name = ..., CurrentCompilationOnly = ...)`
//!   on the partial registry type;
//! - `CollectionOption(Name = ..., ReturnType = ..., Collection = ...)`, repeatable,
//!   on each option type;
//! - `Lookup(MethodName = ..., TryGet = ..., AllowMultiple = ..., Default = ...,
//!   Comparison = ..., Comparer = ..., ReturnType = ..., EmptyValue = ...)`
//!   on properties of the option base type.

use optreg_common::SourceLocation;

use crate::types::{Attribute, AttributeArg, ConstantValue, TypeRef};

/// Simple name of the collection marker.
pub const GENERATE_COLLECTION: &str = "GenerateCollection";
/// Simple name of the option marker.
pub const COLLECTION_OPTION: &str = "CollectionOption";
/// Simple name of the lookup marker.
pub const LOOKUP: &str = "Lookup";

/// An argument of a marker had the wrong shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("argument `{argument}` of `{marker}`: {detail}")]
pub struct MarkerError {
    /// Marker name.
    pub marker: &'static str,
    /// Argument name.
    pub argument: String,
    /// What was wrong.
    pub detail: String,
    /// Where the marker was applied.
    pub location: Option<SourceLocation>,
}

/// Decoded `GenerateCollection` marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionMarker {
    /// The option base type; `None` if the argument was omitted or `null`.
    pub base: Option<TypeRef>,
    /// Interface every option exposes, used for return-type inference.
    pub option_interface: Option<TypeRef>,
    /// Collection name override.
    pub name: Option<String>,
    /// Restrict discovery to the current compilation.
    pub current_compilation_only: bool,
    /// Where the marker was applied.
    pub location: Option<SourceLocation>,
}

/// Decoded `CollectionOption` marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionMarker {
    /// Logical name; defaults to the type's simple name.
    pub name: Option<String>,
    /// Explicit return type for the generated accessor.
    pub return_type: Option<TypeRef>,
    /// Name of the collection this marker targets when several match.
    pub collection: Option<String>,
    /// Where the marker was applied.
    pub location: Option<SourceLocation>,
}

/// Decoded `Lookup` marker.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LookupMarker {
    /// Generated method name override.
    pub method_name: Option<String>,
    /// Also generate a `TryGet` overload.
    pub try_get: bool,
    /// Several options may share one key value.
    pub allow_multiple: bool,
    /// This is the collection's default key.
    pub is_default: bool,
    /// String comparison member name, e.g. `OrdinalIgnoreCase`.
    pub comparison: Option<String>,
    /// Custom equality comparer expression.
    pub comparer: Option<String>,
    /// Return type override for the generated method.
    pub return_type: Option<TypeRef>,
    /// Value the empty sentinel returns for this property.
    pub empty_value: Option<ConstantValue>,
}

struct Args<'a> {
    marker: &'static str,
    attr: &'a Attribute,
}

impl<'a> Args<'a> {
    fn error(&self, argument: &str, detail: impl Into<String>) -> MarkerError {
        MarkerError {
            marker: self.marker,
            argument: argument.to_string(),
            detail: detail.into(),
            location: self.attr.location.clone(),
        }
    }

    fn get(&self, name: &str, position: Option<usize>) -> Option<&'a AttributeArg> {
        self.attr
            .named
            .get(name)
            .or_else(|| position.and_then(|p| self.attr.positional.get(p)))
    }

    fn ty(&self, name: &str, position: Option<usize>) -> Result<Option<TypeRef>, MarkerError> {
        match self.get(name, position) {
            None | Some(AttributeArg::Constant(ConstantValue::Null)) => Ok(None),
            Some(AttributeArg::Type(t)) => Ok(Some(t.clone())),
            Some(other) => Err(self.error(name, format!("expected a type, found {other:?}"))),
        }
    }

    fn string(&self, name: &str) -> Result<Option<String>, MarkerError> {
        match self.get(name, None) {
            None | Some(AttributeArg::Constant(ConstantValue::Null)) => Ok(None),
            Some(AttributeArg::Constant(ConstantValue::String(s))) if s.trim().is_empty() => {
                Err(self.error(name, "must not be empty"))
            }
            Some(AttributeArg::Constant(ConstantValue::String(s))) => Ok(Some(s.clone())),
            Some(other) => Err(self.error(name, format!("expected a string, found {other:?}"))),
        }
    }

    fn flag(&self, name: &str) -> Result<bool, MarkerError> {
        match self.get(name, None) {
            None => Ok(false),
            Some(AttributeArg::Constant(ConstantValue::Bool(b))) => Ok(*b),
            Some(other) => Err(self.error(name, format!("expected a boolean, found {other:?}"))),
        }
    }

    fn enum_member(&self, name: &str) -> Result<Option<String>, MarkerError> {
        match self.get(name, None) {
            None => Ok(None),
            Some(AttributeArg::EnumMember(m)) => {
                Ok(Some(m.rsplit('.').next().unwrap_or(m).to_string()))
            }
            Some(AttributeArg::Constant(ConstantValue::String(s))) => Ok(Some(s.clone())),
            Some(other) => {
                Err(self.error(name, format!("expected an enum member, found {other:?}")))
            }
        }
    }

    fn constant(&self, name: &str) -> Result<Option<ConstantValue>, MarkerError> {
        match self.get(name, None) {
            None => Ok(None),
            Some(AttributeArg::Constant(c)) => Ok(Some(c.clone())),
            Some(other) => Err(self.error(name, format!("expected a constant, found {other:?}"))),
        }
    }
}

/// Decodes a `GenerateCollection` attribute.
pub fn decode_collection(attr: &Attribute) -> Result<CollectionMarker, MarkerError> {
    let args = Args {
        marker: GENERATE_COLLECTION,
        attr,
    };
    Ok(CollectionMarker {
        base: args.ty("BaseType", Some(0))?,
        option_interface: args.ty("OptionInterface", Some(1))?,
        name: args.string("Name")?,
        current_compilation_only: args.flag("CurrentCompilationOnly")?,
        location: attr.location.clone(),
    })
}

/// Decodes a `CollectionOption` attribute.
pub fn decode_option(attr: &Attribute) -> Result<OptionMarker, MarkerError> {
    let args = Args {
        marker: COLLECTION_OPTION,
        attr,
    };
    let name = match args.get("Name", Some(0)) {
        None | Some(AttributeArg::Constant(ConstantValue::Null)) => None,
        Some(AttributeArg::Constant(ConstantValue::String(s))) if is_identifier(s) => {
            Some(s.clone())
        }
        Some(AttributeArg::Constant(ConstantValue::String(s))) => {
            return Err(args.error("Name", format!("`{s}` is not a valid identifier")))
        }
        Some(_) => return Err(args.error("Name", "expected a string")),
    };
    Ok(OptionMarker {
        name,
        return_type: args.ty("ReturnType", None)?,
        collection: args.string("Collection")?,
        location: attr.location.clone(),
    })
}

/// Decodes a `Lookup` attribute.
pub fn decode_lookup(attr: &Attribute) -> Result<LookupMarker, MarkerError> {
    let args = Args {
        marker: LOOKUP,
        attr,
    };
    let marker = LookupMarker {
        method_name: args.string("MethodName")?,
        try_get: args.flag("TryGet")?,
        allow_multiple: args.flag("AllowMultiple")?,
        is_default: args.flag("Default")?,
        comparison: args.enum_member("Comparison")?,
        comparer: args.string("Comparer")?,
        return_type: args.ty("ReturnType", None)?,
        empty_value: args.constant("EmptyValue")?,
    };
    if marker.is_default && marker.allow_multiple {
        return Err(args.error(
            "AllowMultiple",
            "the default lookup key must be single-valued",
        ));
    }
    if let Some(method) = &marker.method_name {
        if !is_identifier(method) {
            return Err(args.error("MethodName", format!("`{method}` is not a valid identifier")));
        }
    }
    Ok(marker)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_alphabetic())
        && chars.all(|c| c == '_' || c.is_alphanumeric())
}
