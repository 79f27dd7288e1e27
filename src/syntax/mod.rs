//! Syntax-level entry points: a parsed file together with its line index.
pub mod file;
pub mod parser;

pub use file::SyntaxFile;
pub use parser::{ParseError, parse_file};
