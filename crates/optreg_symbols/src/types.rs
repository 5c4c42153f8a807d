//! Type symbols, type references and attribute data as reported by the host.

use optreg_common::SourceLocation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A reference to a type, as it appears in a base list, a property
/// signature or a marker argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeRef {
    /// A named type, possibly constructed from a generic definition.
    ///
    /// Built-in keyword types (`int`, `string`, ...) use an empty namespace.
    Named {
        /// Containing namespace, empty for keyword types and the global namespace.
        #[serde(default)]
        namespace: String,
        /// Simple name without generic arguments.
        name: String,
        /// Generic arguments, empty for non-generic types.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<TypeRef>,
    },
    /// A generic type parameter such as `T`.
    Parameter(String),
}

/// Identity of a generic or non-generic type definition, ignoring arguments.
///
/// `Foo<Bar>` and `Foo<T>` share the key `(ns, "Foo", 1)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefinitionKey {
    /// Containing namespace.
    pub namespace: String,
    /// Simple name.
    pub name: String,
    /// Number of generic parameters.
    pub arity: usize,
}

const INTEGER_KEYWORDS: &[&str] = &[
    "sbyte", "byte", "short", "ushort", "int", "uint", "long", "ulong",
];
const INTEGER_SYSTEM_NAMES: &[&str] = &[
    "SByte", "Byte", "Int16", "UInt16", "Int32", "UInt32", "Int64", "UInt64",
];

impl TypeRef {
    /// A non-generic named type.
    pub fn named(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        TypeRef::Named {
            namespace: namespace.into(),
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// A constructed generic type.
    pub fn generic(
        namespace: impl Into<String>,
        name: impl Into<String>,
        args: Vec<TypeRef>,
    ) -> Self {
        TypeRef::Named {
            namespace: namespace.into(),
            name: name.into(),
            args,
        }
    }

    /// A built-in keyword type such as `int` or `string`.
    pub fn keyword(name: &str) -> Self {
        Self::named("", name)
    }

    /// A generic type parameter.
    pub fn parameter(name: impl Into<String>) -> Self {
        TypeRef::Parameter(name.into())
    }

    /// Simple name without namespace or arguments.
    pub fn name(&self) -> &str {
        match self {
            TypeRef::Named { name, .. } | TypeRef::Parameter(name) => name,
        }
    }

    /// Containing namespace, or `None` for type parameters.
    pub fn namespace(&self) -> Option<&str> {
        match self {
            TypeRef::Named { namespace, .. } => Some(namespace),
            TypeRef::Parameter(_) => None,
        }
    }

    /// Generic arguments.
    pub fn args(&self) -> &[TypeRef] {
        match self {
            TypeRef::Named { args, .. } => args,
            TypeRef::Parameter(_) => &[],
        }
    }

    /// Returns `true` for constructed or open generic types.
    pub fn is_generic(&self) -> bool {
        !self.args().is_empty()
    }

    /// The unbound definition this reference instantiates.
    pub fn definition(&self) -> Option<DefinitionKey> {
        match self {
            TypeRef::Named {
                namespace,
                name,
                args,
            } => Some(DefinitionKey {
                namespace: namespace.clone(),
                name: name.clone(),
                arity: args.len(),
            }),
            TypeRef::Parameter(_) => None,
        }
    }

    /// Display name: `Ns.Name<A, B>`.
    pub fn full_name(&self) -> String {
        self.to_string()
    }

    /// Replaces type parameters named in `params` with the matching `args`.
    ///
    /// Parameters without a matching argument are left untouched.
    pub fn substitute(&self, params: &[String], args: &[TypeRef]) -> TypeRef {
        match self {
            TypeRef::Parameter(p) => params
                .iter()
                .position(|name| name == p)
                .and_then(|i| args.get(i))
                .cloned()
                .unwrap_or_else(|| self.clone()),
            TypeRef::Named {
                namespace,
                name,
                args: own,
            } => TypeRef::Named {
                namespace: namespace.clone(),
                name: name.clone(),
                args: own.iter().map(|a| a.substitute(params, args)).collect(),
            },
        }
    }

    fn is_builtin(&self, keyword: &str, system_name: &str) -> bool {
        match self {
            TypeRef::Named {
                namespace,
                name,
                args,
            } if args.is_empty() => {
                (namespace.is_empty() && name == keyword)
                    || (namespace == "System" && name == system_name)
            }
            _ => false,
        }
    }

    /// Returns `true` for `string` / `System.String`.
    pub fn is_string(&self) -> bool {
        self.is_builtin("string", "String")
    }

    /// Returns `true` for `bool` / `System.Boolean`.
    pub fn is_bool(&self) -> bool {
        self.is_builtin("bool", "Boolean")
    }

    /// Returns `true` for any built-in integral type.
    pub fn is_integer(&self) -> bool {
        INTEGER_KEYWORDS
            .iter()
            .zip(INTEGER_SYSTEM_NAMES)
            .any(|(k, s)| self.is_builtin(k, s))
    }

    /// Returns `true` for `object` / `System.Object`, the root of every chain.
    pub fn is_object(&self) -> bool {
        self.is_builtin("object", "Object")
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Parameter(name) => f.write_str(name),
            TypeRef::Named {
                namespace,
                name,
                args,
            } => {
                if !namespace.is_empty() {
                    write!(f, "{namespace}.")?;
                }
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
        }
    }
}

/// The kind of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// A class.
    Class,
    /// A record class.
    Record,
    /// A struct.
    Struct,
    /// An interface.
    Interface,
}

/// Declared accessibility of a type or member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    /// `public`
    Public,
    /// `protected internal`
    ProtectedInternal,
    /// `internal`
    Internal,
    /// `protected`
    Protected,
    /// `private protected`
    PrivateProtected,
    /// `private`
    Private,
}

impl Accessibility {
    /// The source keyword(s) for this accessibility.
    pub fn keyword(self) -> &'static str {
        match self {
            Accessibility::Public => "public",
            Accessibility::ProtectedInternal => "protected internal",
            Accessibility::Internal => "internal",
            Accessibility::Protected => "protected",
            Accessibility::PrivateProtected => "private protected",
            Accessibility::Private => "private",
        }
    }

    /// Whether code generated into the same assembly can call a member with
    /// this accessibility from outside the declaring type's hierarchy.
    pub fn is_assembly_visible(self) -> bool {
        matches!(
            self,
            Accessibility::Public | Accessibility::Internal | Accessibility::ProtectedInternal
        )
    }
}

impl fmt::Display for Accessibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A compile-time constant: a parameter default, a property value or an
/// attribute argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstantValue {
    /// `null`
    Null,
    /// A boolean literal.
    Bool(bool),
    /// An integral literal.
    Int(i64),
    /// A string literal.
    String(String),
}

impl ConstantValue {
    /// The value as an integer, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConstantValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// The value as a string slice, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstantValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// The value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConstantValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The value as a source literal in the generated language.
    pub fn to_literal(&self) -> String {
        match self {
            ConstantValue::Null => "null".to_string(),
            ConstantValue::Bool(b) => b.to_string(),
            ConstantValue::Int(v) => v.to_string(),
            ConstantValue::String(s) => {
                let mut out = String::with_capacity(s.len() + 2);
                out.push('"');
                for c in s.chars() {
                    match c {
                        '"' => out.push_str("\\\""),
                        '\\' => out.push_str("\\\\"),
                        '\n' => out.push_str("\\n"),
                        '\r' => out.push_str("\\r"),
                        '\t' => out.push_str("\\t"),
                        '\0' => out.push_str("\\0"),
                        c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
                        c => out.push(c),
                    }
                }
                out.push('"');
                out
            }
        }
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Null => f.write_str("null"),
            ConstantValue::Bool(b) => write!(f, "{b}"),
            ConstantValue::Int(v) => write!(f, "{v}"),
            ConstantValue::String(s) => write!(f, "{s:?}"),
        }
    }
}

/// One argument of an attribute application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeArg {
    /// A constant (`"Crud"`, `true`, `3`).
    Constant(ConstantValue),
    /// A `typeof(...)` argument.
    Type(TypeRef),
    /// An enum member, qualified or not (`StringComparison.OrdinalIgnoreCase`).
    EnumMember(String),
}

/// An attribute applied to a type or property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name, simple or fully qualified, with or without the
    /// `Attribute` suffix.
    pub name: String,
    /// Positional constructor arguments.
    #[serde(default)]
    pub positional: Vec<AttributeArg>,
    /// Named arguments.
    #[serde(default)]
    pub named: BTreeMap<String, AttributeArg>,
    /// Where the attribute was applied.
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

impl Attribute {
    /// Creates an attribute with no arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            positional: Vec::new(),
            named: BTreeMap::new(),
            location: None,
        }
    }

    /// Adds a positional argument.
    pub fn with_positional(mut self, arg: AttributeArg) -> Self {
        self.positional.push(arg);
        self
    }

    /// Adds a named argument.
    pub fn with_named(mut self, name: impl Into<String>, arg: AttributeArg) -> Self {
        self.named.insert(name.into(), arg);
        self
    }

    /// Returns `true` if this attribute is the marker `simple_name`.
    ///
    /// `Lookup`, `LookupAttribute`, `Optreg.Lookup` and
    /// `Optreg.LookupAttribute` all match `"Lookup"`.
    pub fn is(&self, simple_name: &str) -> bool {
        let last = self.name.rsplit('.').next().unwrap_or(&self.name);
        let last = last.strip_suffix("Attribute").unwrap_or(last);
        last == simple_name
    }
}

/// A constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSymbol {
    /// Parameter name.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// Default value, if the parameter is optional.
    #[serde(default)]
    pub default: Option<ConstantValue>,
}

/// An instance or static constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorSymbol {
    /// Declared accessibility.
    pub accessibility: Accessibility,
    /// Parameters in declaration order.
    #[serde(default)]
    pub parameters: Vec<ParameterSymbol>,
    /// `true` if synthesised by the compiler rather than written in source.
    #[serde(default)]
    pub is_implicit: bool,
    /// `true` for a static (type) initializer.
    #[serde(default)]
    pub is_static: bool,
}

/// A property declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySymbol {
    /// Property name.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// Declared accessibility.
    #[serde(default = "default_public")]
    pub accessibility: Accessibility,
    /// `true` if the declared type is nullable (`string?`, `int?`).
    #[serde(default)]
    pub nullable: bool,
    /// `abstract`
    #[serde(default)]
    pub is_abstract: bool,
    /// `virtual`
    #[serde(default)]
    pub is_virtual: bool,
    /// `override`
    #[serde(default)]
    pub is_override: bool,
    /// `static`
    #[serde(default)]
    pub is_static: bool,
    /// Auto-implemented (`{ get; }` with a compiler backing field).
    #[serde(default)]
    pub is_auto: bool,
    /// Getter only, no setter or `init`.
    #[serde(default)]
    pub is_read_only: bool,
    /// Constant value the getter returns, when the host can determine it.
    #[serde(default)]
    pub value: Option<ConstantValue>,
    /// Attributes applied to the property.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Declaration location.
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

fn default_public() -> Accessibility {
    Accessibility::Public
}

/// A declared type with the members and metadata the generator inspects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSymbol {
    /// Containing namespace.
    #[serde(default)]
    pub namespace: String,
    /// Simple name.
    pub name: String,
    /// Class, record, struct or interface.
    pub kind: TypeKind,
    /// Declared accessibility.
    #[serde(default = "default_public")]
    pub accessibility: Accessibility,
    /// `abstract`
    #[serde(default)]
    pub is_abstract: bool,
    /// `sealed`
    #[serde(default)]
    pub is_sealed: bool,
    /// `static`
    #[serde(default)]
    pub is_static: bool,
    /// Generic parameter names in declaration order.
    #[serde(default)]
    pub generic_params: Vec<String>,
    /// Direct base class, `None` when the type implicitly derives from `object`.
    #[serde(default)]
    pub base: Option<TypeRef>,
    /// Directly implemented (or, for interfaces, inherited) interfaces.
    #[serde(default)]
    pub interfaces: Vec<TypeRef>,
    /// Attributes applied to the type.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Declared and compiler-synthesised constructors.
    #[serde(default)]
    pub constructors: Vec<ConstructorSymbol>,
    /// Declared properties.
    #[serde(default)]
    pub properties: Vec<PropertySymbol>,
    /// Documentation comment text. Never affects generated output.
    #[serde(default)]
    pub doc: Option<String>,
    /// Declaration location.
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

impl TypeSymbol {
    /// Creates a public, non-generic symbol with no members.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            kind,
            accessibility: Accessibility::Public,
            is_abstract: false,
            is_sealed: false,
            is_static: false,
            generic_params: Vec::new(),
            base: None,
            interfaces: Vec::new(),
            attributes: Vec::new(),
            constructors: Vec::new(),
            properties: Vec::new(),
            doc: None,
            location: None,
        }
    }

    /// A reference to this type, open over its own generic parameters.
    pub fn type_ref(&self) -> TypeRef {
        TypeRef::generic(
            self.namespace.clone(),
            self.name.clone(),
            self.generic_params
                .iter()
                .map(|p| TypeRef::parameter(p.clone()))
                .collect(),
        )
    }

    /// The definition key of this type.
    pub fn definition(&self) -> DefinitionKey {
        DefinitionKey {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            arity: self.generic_params.len(),
        }
    }

    /// Fully-qualified name without generic parameters.
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// Attributes matching the marker `simple_name`, in declaration order.
    pub fn attributes_named<'a>(
        &'a self,
        simple_name: &'a str,
    ) -> impl Iterator<Item = &'a Attribute> + 'a {
        self.attributes.iter().filter(move |a| a.is(simple_name))
    }

    /// Returns `true` if any attribute matches `simple_name`.
    pub fn has_attribute(&self, simple_name: &str) -> bool {
        self.attributes_named(simple_name).next().is_some()
    }

    /// Looks up a declared property by name.
    pub fn property(&self, name: &str) -> Option<&PropertySymbol> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Instance constructors as the compiler sees them.
    ///
    /// A class or struct that declares none gets an implicit parameterless
    /// constructor, `protected` for abstract classes and `public` otherwise.
    pub fn instance_constructors(&self) -> Vec<ConstructorSymbol> {
        let declared: Vec<ConstructorSymbol> = self
            .constructors
            .iter()
            .filter(|c| !c.is_static)
            .cloned()
            .collect();
        if !declared.is_empty() || self.kind == TypeKind::Interface || self.is_static {
            return declared;
        }
        vec![ConstructorSymbol {
            accessibility: if self.is_abstract {
                Accessibility::Protected
            } else {
                Accessibility::Public
            },
            parameters: Vec::new(),
            is_implicit: true,
            is_static: false,
        }]
    }
}
