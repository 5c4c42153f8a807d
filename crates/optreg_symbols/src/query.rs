//! The capability interface every host adapter implements.

use crate::error::QueryError;
use crate::types::{PropertySymbol, TypeRef, TypeSymbol};

/// Which assemblies a query searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryScope {
    /// Only types declared in the compilation being generated.
    CurrentCompilation,
    /// The current compilation plus every referenced assembly.
    IncludeReferences,
}

/// A type symbol together with the assembly that declares it.
#[derive(Debug, Clone, Copy)]
pub struct DeclaredType<'a> {
    /// The symbol.
    pub symbol: &'a TypeSymbol,
    /// Name of the declaring assembly.
    pub assembly: &'a str,
    /// `true` if declared in the compilation being generated.
    pub is_current: bool,
}

/// Narrow read-only view of a host compilation.
///
/// Everything downstream of the facade depends only on this trait. Queries
/// are expected to be pure; implementations must be shareable across the
/// worker threads used for parallel extraction.
pub trait SymbolQuery: Send + Sync {
    /// Name of the assembly being generated.
    fn assembly_name(&self) -> &str;

    /// Target platform moniker recorded for the compilation, if any.
    fn target_framework(&self) -> Option<&str>;

    /// Enumerates every type carrying the marker `attribute`, in declaration
    /// order: current compilation first, then references in reference order.
    fn types_with_attribute(
        &self,
        attribute: &str,
        scope: QueryScope,
    ) -> Result<Vec<DeclaredType<'_>>, QueryError>;

    /// Resolves a type reference to its definition.
    ///
    /// Returns `Ok(None)` for types the host does not know (e.g. framework
    /// types outside the supplied references).
    fn resolve(&self, ty: &TypeRef) -> Result<Option<DeclaredType<'_>>, QueryError>;

    /// Direct base class of `ty`, `None` for an implicit `object` base.
    fn base_type<'a>(&self, ty: &'a TypeSymbol) -> Option<&'a TypeRef> {
        ty.base.as_ref().filter(|b| !b.is_object())
    }

    /// Declared instance properties of `ty`.
    fn members<'a>(&self, ty: &'a TypeSymbol) -> Vec<&'a PropertySymbol> {
        ty.properties.iter().filter(|p| !p.is_static).collect()
    }
}
