//! HIR tests
//!
//! Tests for:
//! - Study, milestone and codelist resolution
//! - Dataset columns and time-range expansion
//! - Mapping rendering
//! - Diagnostic serialization

pub mod tests_config_model;
pub mod tests_diagnostics;
