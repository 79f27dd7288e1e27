//! High-level IR (HIR) — the semantic model of a set of study files.
//!
//! ## Key Types
//!
//! - [`Diagnostic`] — A typed, serializable compilation finding
//! - [`FileDefs`] / [`DefinitionIndex`] — Named declarations per file
//! - [`CompilationResult`] — The resolved configuration model
//! - [`ConfigState`] — Fold target of the builder phases
//!
//! ## Layers
//!
//! ```text
//! SyntaxFile (per file)
//!     │
//!     ▼
//! FileDefs                 ← purely syntactic, per file
//!     │
//!     ▼
//! phases 1..4              ← over every live file, emit ConfigEvents
//!     │
//!     ▼
//! ConfigState → CompilationResult
//! ```

mod defs;
mod diagnostics;
pub mod model;
mod phases;
mod store;
pub mod time;
mod visitor;

pub use defs::{Definition, DefinitionIndex, FileDefs};
pub use diagnostics::{DefType, Diagnostic, DiagnosticKind, Scope, codes};
pub use model::CompilationResult;
pub use phases::{FileContext, Phase, run_phase};
pub use store::{ConfigEvent, ConfigSink, ConfigState};
pub use visitor::{ItemVisitor, walk_file, walk_item};
