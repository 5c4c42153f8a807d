//! Symbol Query Facade: the narrow view of the host compiler's symbol model
//! that the generator depends on.
//!
//! The generator never parses source text. A host adapter implements
//! [`SymbolQuery`]; this crate ships one adapter, the serialisable in-memory
//! [`Compilation`], which the CLI loads from JSON and the tests build directly.

#![warn(missing_docs)]

pub mod compilation;
pub mod error;
pub mod markers;
pub mod query;
pub mod types;

pub use compilation::{Assembly, Compilation, GeneratedSource};
pub use error::QueryError;
pub use markers::{CollectionMarker, LookupMarker, MarkerError, OptionMarker};
pub use query::{DeclaredType, QueryScope, SymbolQuery};
pub use types::{
    Accessibility, Attribute, AttributeArg, ConstantValue, ConstructorSymbol, DefinitionKey,
    ParameterSymbol, PropertySymbol, TypeKind, TypeRef, TypeSymbol,
};
