//! Registry Emitter: renders collection models as host-language source.
//!
//! [`emit`] turns each [`CollectionModel`](optreg_model::CollectionModel)
//! into one generated unit named `<Namespace>.<Registry>.g.cs`. The lookup
//! code shape is chosen once per target platform by
//! [`strategy::select_shape`]; within a shape, each lookup property gets a
//! [`GenerationStrategy`]. Output is deterministic: the same model and shape
//! always produce byte-identical text.

#![warn(missing_docs)]

pub mod artifact;
pub mod literal;
pub mod registry;
pub mod sentinel;
pub mod strategy;
pub mod writer;

pub use artifact::{GeneratedArtifact, SourceUnit, UnitStatus};
pub use registry::{emit, emit_collection};
pub use strategy::{select_shape, select_strategy, GenerationStrategy, Platform, TargetPlatform};
pub use writer::SourceBuilder;
