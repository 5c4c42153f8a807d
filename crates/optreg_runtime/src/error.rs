//! Errors raised while building or querying a [`Registry`](crate::Registry).

use thiserror::Error;

/// Registry construction and query errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two options share a logical name. Extraction removes these, so a
    /// model that still has one was not produced by the extractor.
    #[error("logical name `{0}` is registered twice")]
    DuplicateName(String),

    /// The property is not one of the collection's lookups.
    #[error("`{0}` is not a lookup property of this registry")]
    UnknownLookup(String),

    /// A single-valued lookup was queried for many results, or the reverse.
    #[error("lookup `{property}` is {}", arity_hint(*multiple))]
    Arity {
        /// Lookup property.
        property: String,
        /// `true` if the lookup is multi-valued.
        multiple: bool,
    },

    /// The default key is multi-valued, so `get` could not return one option.
    /// Marker decoding rejects this; a model that has it was built by hand.
    #[error("default key `{0}` is multi-valued")]
    MultiValuedDefault(String),

    /// The collection has no default key.
    #[error("the registry has no default key")]
    NoDefaultKey,
}

fn arity_hint(multiple: bool) -> &'static str {
    if multiple {
        "multi-valued; query it with `lookup_many`"
    } else {
        "single-valued; query it with `lookup`"
    }
}
