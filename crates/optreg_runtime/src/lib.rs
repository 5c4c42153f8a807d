//! An in-process registry built from a collection model.
//!
//! [`Registry`] mirrors the behaviour of the generated registry code: one
//! shared instance per option type, name lookup, per-property key lookups
//! with first-wins insertion and null-key skipping, and an empty sentinel
//! returned on every miss. It is what the conformance suite queries to
//! check that both lookup shapes answer identically.

#![warn(missing_docs)]

pub mod error;
pub mod key;
pub mod registry;

pub use error::RegistryError;
pub use key::KeyRef;
pub use registry::{same_instance, OptionInstance, Registry};
