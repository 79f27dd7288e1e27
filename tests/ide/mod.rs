//! IDE feature tests
//!
//! Tests for:
//! - Code completion

pub mod tests_completion;
