//! Compiler orchestration tests
//!
//! Tests for:
//! - Order independence of update batches
//! - Stale results on parse failure
//! - Self-healing forward references
//! - Idempotence and deletion

pub mod tests_incremental;
