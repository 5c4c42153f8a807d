//! Type Matcher: decides whether a candidate derives from a collection's
//! base type.
//!
//! Only the class inheritance chain is walked. Interfaces play no part in
//! matching; they are consulted later for return-type inference.

use std::collections::HashSet;

use optreg_symbols::{DefinitionKey, QueryError, SymbolQuery, TypeRef, TypeSymbol};

/// Upper bound on chain length. Well-formed type systems never get close.
const MAX_DEPTH: usize = 256;

/// Iterator over the base classes of a type, nearest first.
///
/// Generic arguments are substituted as the walk goes up, so for
/// `class Added : Option<Widget>` and `class Option<T> : Root<T>` the chain
/// is `Option<Widget>, Root<Widget>`. The walk stops at `object`, at a type
/// the host cannot resolve (after yielding it), or when a definition repeats.
pub struct BaseTypeChain<'q> {
    query: &'q dyn SymbolQuery,
    next: Option<TypeRef>,
    seen: HashSet<DefinitionKey>,
    depth: usize,
}

impl<'q> BaseTypeChain<'q> {
    /// Starts a walk at the direct base of `symbol`.
    pub fn new(query: &'q dyn SymbolQuery, symbol: &TypeSymbol) -> Self {
        let mut seen = HashSet::new();
        seen.insert(symbol.definition());
        Self {
            query,
            next: query.base_type(symbol).cloned(),
            seen,
            depth: 0,
        }
    }
}

impl Iterator for BaseTypeChain<'_> {
    type Item = Result<TypeRef, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        if current.is_object() {
            return None;
        }
        if self.depth >= MAX_DEPTH {
            tracing::warn!(ty = %current, "base type chain exceeds depth limit");
            return None;
        }
        if let Some(key) = current.definition() {
            if !self.seen.insert(key) {
                tracing::warn!(ty = %current, "cycle in base type chain");
                return None;
            }
        }
        self.depth += 1;
        match self.query.resolve(&current) {
            Ok(Some(declared)) => {
                self.next = self
                    .query
                    .base_type(declared.symbol)
                    .map(|b| b.substitute(&declared.symbol.generic_params, current.args()));
            }
            Ok(None) => {}
            Err(e) => return Some(Err(e)),
        }
        Some(Ok(current))
    }
}

/// Collects the full base chain of `symbol`.
pub fn base_chain(
    query: &dyn SymbolQuery,
    symbol: &TypeSymbol,
) -> Result<Vec<TypeRef>, QueryError> {
    BaseTypeChain::new(query, symbol).collect()
}

/// Returns `true` if any ancestor in `chain` is `base`.
///
/// When both the ancestor and `base` are generic, their unbound definitions
/// are compared, so `Option<Widget>` matches a collection keyed on
/// `Option<T>`. Otherwise the comparison is nominal.
pub fn matches(chain: &[TypeRef], base: &TypeRef) -> bool {
    chain.iter().any(|ancestor| is_same_type(ancestor, base))
}

/// The ancestor in `chain` that matches `base`, with its own type arguments.
pub fn matched_ancestor<'c>(chain: &'c [TypeRef], base: &TypeRef) -> Option<&'c TypeRef> {
    chain.iter().find(|ancestor| is_same_type(ancestor, base))
}

fn is_same_type(ancestor: &TypeRef, base: &TypeRef) -> bool {
    if ancestor.is_generic() && base.is_generic() {
        ancestor.definition() == base.definition()
    } else {
        ancestor == base
    }
}
