//! Candidate discovery, type matching, metadata extraction and structural
//! hashing.
//!
//! The entry points run in pipeline order:
//!
//! 1. [`discover_collections`] decodes every collection marker;
//! 2. [`collect_lookups`] reads the lookup properties of each base type;
//! 3. [`discover_candidates`] finds option types and matches them against
//!    collection base types ([`matcher`]);
//! 4. [`extract_collection`] extracts every candidate in parallel and
//!    assembles the sorted [`CollectionModel`](optreg_model::CollectionModel);
//! 5. [`hasher`] fingerprints the result for incremental regeneration.
//!
//! User errors go to a [`DiagnosticSink`](optreg_diagnostics::DiagnosticSink);
//! only host query failures and cancellation are returned as `Err`.

#![warn(missing_docs)]

pub mod constructors;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod hasher;
pub mod lookups;
pub mod matcher;
pub mod return_type;

pub use discovery::{discover_candidates, discover_collections};
pub use error::ExtractError;
pub use extract::{extract_collection, extract_option};
pub use lookups::{collect_lookups, LookupSet};
pub use matcher::{base_chain, matched_ancestor, matches, BaseTypeChain};
