//! Option candidates: symbols discovered during a single pass.

use optreg_symbols::{OptionMarker, TypeRef, TypeSymbol};

/// A type carrying at least one option marker, before validation.
///
/// Candidates borrow from the compilation and never outlive the pass that
/// discovered them.
#[derive(Debug, Clone)]
pub struct OptionCandidate<'a> {
    /// The declaring symbol.
    pub symbol: &'a TypeSymbol,
    /// Name of the declaring assembly.
    pub assembly: &'a str,
    /// `true` if declared in the compilation being generated.
    pub is_current: bool,
    /// Fully-qualified type name.
    pub full_name: String,
    /// Simple type name.
    pub short_name: String,
    /// Option markers that target this collection, in declaration order.
    pub markers: Vec<OptionMarker>,
    /// Class inheritance chain, nearest ancestor first, `object` excluded.
    pub base_chain: Vec<TypeRef>,
}

impl<'a> OptionCandidate<'a> {
    /// Logical names this candidate registers, one per marker.
    ///
    /// A marker without an explicit name uses the type's simple name.
    pub fn logical_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.markers
            .iter()
            .map(|m| m.name.as_deref().unwrap_or(&self.short_name))
    }
}
