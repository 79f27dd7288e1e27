//! Syntax-level parsing interface.
//!
//! The rowan parser always produces a tree; this layer turns its first
//! syntax error into a [`ParseError`] so callers see parsing as fallible.

use thiserror::Error;

use crate::base::{LineIndex, TextRange};
use crate::parser::parse;
use crate::syntax::file::SyntaxFile;

/// Parse error type for syntax-level errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{col}: {message}")]
pub struct ParseError {
    pub message: String,
    /// Text of the offending token, empty at end of input
    pub token: String,
    /// 1-based line of the offending token
    pub line: u32,
    /// 1-based column of the offending token
    pub col: u32,
    pub range: TextRange,
}

/// Parse a single source into a [`SyntaxFile`].
///
/// # Errors
///
/// Returns the first syntax error if the source does not conform to the grammar.
pub fn parse_file(source: &str) -> Result<SyntaxFile, ParseError> {
    let parse = parse(source);
    let line_index = LineIndex::new(source);
    if let Some(error) = parse.errors.first() {
        let start = line_index.line_col(error.range.start());
        return Err(ParseError {
            message: error.message.clone(),
            token: error.token.clone(),
            line: start.line + 1,
            col: start.col + 1,
            range: error.range,
        });
    }
    Ok(SyntaxFile::new(parse, line_index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_ok() {
        let file = parse_file("study { id: \"S1\", name: \"Trial\" }").unwrap();
        assert_eq!(file.source_file().items().count(), 1);
    }

    #[test]
    fn test_parse_error_position_is_one_based() {
        let err = parse_file("study {\n  id \"S1\"\n}").unwrap_err();
        assert_eq!(err.token, "\"S1\"");
        assert_eq!((err.line, err.col), (2, 6));
    }
}
