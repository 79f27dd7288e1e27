//! # trialdsl-base
//!
//! Incremental, multi-file semantic core for the clinical-study definition
//! language: parsing, diagnostics and the resolved study configuration.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide       → Completion items
//!   ↓
//! compiler  → Compiler orchestrator, action log and its fold
//!   ↓
//! hir       → Diagnostics, definition index, config model, builder phases
//!   ↓
//! syntax    → Parsed files, ParseError
//!   ↓
//! parser    → Logos lexer, rowan CST, recursive-descent parser, time literals
//!   ↓
//! base      → Primitives (FileName, LineIndex, TextRange)
//! config    → CompilerOptions
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → syntax → hir → compiler → ide)
// ============================================================================

/// Foundation types: FileName, LineIndex, TextRange
pub mod base;

/// Compiler options
pub mod config;

/// Parser: Logos lexer, recursive-descent parser, typed AST
pub mod parser;

/// Syntax: parsed files and the first-error view of a parse
pub mod syntax;

/// High-level IR: diagnostics, config model and the phased builder
pub mod hir;

/// Orchestration over a changing set of files
pub mod compiler;

/// IDE features: completion
pub mod ide;

// Re-export commonly needed items
pub use parser::keywords;

pub use compiler::Compiler;
pub use config::{CompilerOptions, ConfigError};
pub use hir::{CompilationResult, DefType, Diagnostic, DiagnosticKind, Scope};
pub use ide::{CompletionItem, CompletionKind};
pub use syntax::{ParseError, SyntaxFile, parse_file};

// Re-export foundation types
pub use base::{FileName, LineCol, LineIndex, Location, TextRange, TextSize};
