//! Byte-offset ranges and their conversion to line/column coordinates.

pub use text_size::{TextRange, TextSize};

use super::position::Location;

/// A zero-based line/column pair, measured in bytes within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

/// Maps byte offsets to line/column pairs for a single source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Offset of the first byte of every line.
    line_starts: Vec<TextSize>,
    len: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::new(0)];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(TextSize::new(offset as u32 + 1));
            }
        }
        Self {
            line_starts,
            len: TextSize::of(text),
        }
    }

    /// Convert an offset to a zero-based line/column. Offsets past the end clamp to the end.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let offset = offset.min(self.len);
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let col = offset - self.line_starts[line];
        LineCol {
            line: line as u32,
            col: col.into(),
        }
    }

    /// Convert a zero-based line/column back into an offset, clamped to the text.
    pub fn offset(&self, line_col: LineCol) -> TextSize {
        let Some(&start) = self.line_starts.get(line_col.line as usize) else {
            return self.len;
        };
        let line_end = self
            .line_starts
            .get(line_col.line as usize + 1)
            .copied()
            .unwrap_or(self.len);
        TextSize::new(u32::from(start).saturating_add(line_col.col)).min(line_end)
    }

    /// Build a 1-based [`Location`] for a byte range.
    pub fn location(&self, range: TextRange) -> Location {
        let start = self.line_col(range.start());
        let end = self.line_col(range.end());
        Location::new(start.line + 1, start.col + 1, end.line + 1, end.col + 1)
    }
}
