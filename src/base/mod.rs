//! Foundation types for the trialdsl toolchain.
//!
//! This module provides fundamental types used throughout the compiler:
//! - [`FileName`] - Opaque unique key for a source unit (URI or path)
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//! - [`LineCol`], [`LineIndex`] - Offset to line/column conversion
//! - [`Location`] - 1-based line/column range attached to diagnostics
//!
//! This module has NO dependencies on other trialdsl modules.

mod file_name;
mod position;
mod span;

pub use file_name::FileName;
pub use position::Location;
pub use span::{LineCol, LineIndex, TextRange, TextSize};

// Re-export text-size types for convenience
pub use text_size;
