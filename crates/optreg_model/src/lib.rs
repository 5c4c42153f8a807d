//! Data model shared by the analysis, emission and runtime stages.
//!
//! A [`CollectionDefinition`] is decoded once per collection marker. Each
//! generation pass turns [`OptionCandidate`]s into immutable
//! [`TypeInfoModel`]s and groups them into a [`CollectionModel`], which is
//! the sole input of the emitter and of the in-process runtime registry.

#![warn(missing_docs)]

pub mod candidate;
pub mod collection;
pub mod constructor;
pub mod lookup;
pub mod option;

pub use candidate::OptionCandidate;
pub use collection::{AbstractMember, CollectionDefinition, CollectionModel, LookupShape};
pub use constructor::{ConstructorInfo, ParameterInfo};
pub use lookup::{KeyKind, PropertyLookupInfo, StringComparison};
pub use option::{ReturnTypeName, TypeInfoModel};
