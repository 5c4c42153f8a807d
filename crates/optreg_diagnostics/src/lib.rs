//! Diagnostic creation, severity management, and rendering.
//!
//! This crate provides structured [`Diagnostic`] messages with severity levels,
//! stable codes and optional source locations. The thread-safe [`DiagnosticSink`]
//! accumulates diagnostics while candidates are extracted in parallel,
//! [`DiagnosticPolicy`] applies deny/allow overrides, and [`DiagnosticRenderer`]
//! implementations format them for terminal or JSON output.

#![warn(missing_docs)]

pub mod catalog;
pub mod code;
pub mod diagnostic;
pub mod policy;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use policy::DiagnosticPolicy;
pub use renderer::{DiagnosticRenderer, JsonRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
