//! Shared foundational types used across the optreg registry generator.
//!
//! This crate provides content hashing for emitted text, structural
//! fingerprints for incremental regeneration, source locations for
//! diagnostics, and the common internal-error result type.

#![warn(missing_docs)]

pub mod hash;
pub mod location;
pub mod result;

pub use hash::{ContentHash, Fingerprint, FingerprintBuilder};
pub use location::SourceLocation;
pub use result::InternalError;
