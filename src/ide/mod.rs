//! IDE features — editor-facing queries over the compiled model.
//!
//! Functions here take the current config state and a document and return
//! plain data; protocol conversion happens at the caller's boundary.
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: Take data in, return data out
//! 2. **No LSP types**: Uses our own types, converted at LSP boundary

mod completion;

pub use completion::{CompletionItem, CompletionKind, completions};
