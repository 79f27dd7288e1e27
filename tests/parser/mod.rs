//! Parser tests
//!
//! Tests for:
//! - Parsing well-formed study files
//! - First-error reporting with 1-based positions

pub mod tests_parse;
