//! Core types for source positions

use serde::{Deserialize, Serialize};

/// Identifies an original file by its position in the inclusion order.
///
/// The root file is `FileId(0)`. Files are numbered in the order the
/// flattener first enters them, so a higher id means the file was entered
/// later (deeper in a depth-first expansion).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileId(pub usize);

/// A position in a multi-line text (0-indexed)
///
/// `offset` determines the position; `line` and `column` are derived from it
/// by the [`IndexedText`](crate::IndexedText) that produced the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TextPosition {
    /// Byte offset from start of text
    pub offset: usize,
    /// Line number (0-indexed)
    pub line: usize,
    /// Byte distance from the start of the line
    pub column: usize,
}

impl TextPosition {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        TextPosition {
            offset,
            line,
            column,
        }
    }

    /// The position one byte further on the same line.
    ///
    /// Used to turn an inclusive last position into an exclusive end. The
    /// result may point at the start of the next line when `self` is a line
    /// terminator; line and column then still refer to the old line.
    pub fn virtual_next(&self) -> Self {
        TextPosition {
            offset: self.offset + 1,
            line: self.line,
            column: self.column + 1,
        }
    }
}

/// A way to address a position in an [`IndexedText`](crate::IndexedText):
/// either a linear offset or a (line, column) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextIndex {
    Offset(usize),
    LineColumn { line: usize, column: usize },
}

impl From<usize> for TextIndex {
    fn from(offset: usize) -> Self {
        TextIndex::Offset(offset)
    }
}

impl From<(usize, usize)> for TextIndex {
    fn from((line, column): (usize, usize)) -> Self {
        TextIndex::LineColumn { line, column }
    }
}

impl From<TextPosition> for TextIndex {
    fn from(position: TextPosition) -> Self {
        TextIndex::Offset(position.offset)
    }
}
