//! Generator passes and the multi-pass orchestrator.
//!
//! A [`Generator`] turns one [`Compilation`](optreg_symbols::Compilation)
//! into generated sources and diagnostics. [`RegistryGenerator`] is the
//! option-registry pass: discovery, extraction, strategy selection and
//! emission, with an in-memory skip for collections whose inputs have not
//! changed since its previous run. [`run_sequence`] threads a compilation
//! through several generators in order.

#![warn(missing_docs)]

pub mod error;
pub mod generator;
pub mod orchestrator;
pub mod registry_generator;

pub use error::DriverError;
pub use generator::{Generator, GeneratorOutput};
pub use orchestrator::{
    run_sequence, run_sequence_with_cancellation, GeneratorRun, RunOutcome, SequenceResult,
};
pub use registry_generator::{Analysis, RegistryGenerator, REGISTRY_GENERATOR_NAME};
