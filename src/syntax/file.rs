//! Syntax file wrapper for parsed study definition files.

use std::sync::Arc;

use crate::base::{LineIndex, Location, TextRange};
use crate::parser::{Parse, SourceFile};

/// A successfully parsed source file.
///
/// Cloning is cheap: the green tree and the line index are shared.
#[derive(Debug, Clone)]
pub struct SyntaxFile {
    /// The underlying rowan parse result
    parse: Parse,
    line_index: Arc<LineIndex>,
}

// Two SyntaxFiles are equal if they hold the same tree
impl PartialEq for SyntaxFile {
    fn eq(&self, other: &Self) -> bool {
        self.parse.green == other.parse.green
    }
}

impl Eq for SyntaxFile {}

impl SyntaxFile {
    pub(crate) fn new(parse: Parse, line_index: LineIndex) -> Self {
        Self {
            parse,
            line_index: Arc::new(line_index),
        }
    }

    /// Get the underlying parse result
    pub fn parse(&self) -> &Parse {
        &self.parse
    }

    /// Get the root source file AST node
    pub fn source_file(&self) -> SourceFile {
        self.parse.tree()
    }

    /// Get the source text of the file
    pub fn source_text(&self) -> String {
        self.parse.syntax().text().to_string()
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    /// 1-based location of a range in this file
    pub fn location(&self, range: TextRange) -> Location {
        self.line_index.location(range)
    }
}
