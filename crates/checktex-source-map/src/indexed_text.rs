//! Line-indexed text for offset <-> (line, column) lookups

use crate::types::{TextIndex, TextPosition};

/// A string together with the offsets at which its lines start.
///
/// The line table is computed once on construction. `line_starts[0]` is
/// always 0 and every following entry is the offset just after a `\n`, so
/// the table is strictly increasing. Offsets and columns are byte distances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedText {
    text: String,
    line_starts: Vec<usize>,
}

impl IndexedText {
    /// Index `text` by scanning it once for line breaks.
    ///
    /// # Example
    ///
    /// ```
    /// use checktex_source_map::IndexedText;
    ///
    /// let text = IndexedText::new("123\n456\n789");
    /// assert_eq!(text.line_starts(), &[0, 4, 8]);
    /// ```
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let line_starts = std::iter::once(0)
            .chain(
                text.bytes()
                    .enumerate()
                    .filter_map(|(idx, b)| if b == b'\n' { Some(idx + 1) } else { None }),
            )
            .collect();

        IndexedText { text, line_starts }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of lines; a trailing newline opens an (empty) last line.
    pub fn num_lines(&self) -> usize {
        self.line_starts.len()
    }

    pub fn line_starts(&self) -> &[usize] {
        &self.line_starts
    }

    /// Convert an offset into a full position.
    ///
    /// `offset == len()` is valid and denotes the position just after the
    /// last byte, which is what exclusive range ends need.
    ///
    /// # Panics
    ///
    /// Panics if `offset > len()`.
    pub fn offset_to_position(&self, offset: usize) -> TextPosition {
        assert!(
            offset <= self.text.len(),
            "offset {} out of bounds for text of length {}",
            offset,
            self.text.len()
        );
        // Greatest line whose start is <= offset. Never 0 because the
        // first entry is 0.
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        TextPosition {
            offset,
            line,
            column: offset - self.line_starts[line],
        }
    }

    /// # Panics
    ///
    /// Panics if `offset > len()`.
    pub fn offset_to_line_col(&self, offset: usize) -> (usize, usize) {
        let pos = self.offset_to_position(offset);
        (pos.line, pos.column)
    }

    /// Convert a (line, column) pair into an offset.
    ///
    /// There is no carry into the next line: the caller is responsible for
    /// keeping `column` within the line.
    ///
    /// # Panics
    ///
    /// Panics if `line` does not exist or the result lies past the end of
    /// the text.
    pub fn line_col_to_offset(&self, line: usize, column: usize) -> usize {
        assert!(
            line < self.line_starts.len(),
            "line {} out of bounds ({} lines)",
            line,
            self.line_starts.len()
        );
        let offset = self.line_starts[line] + column;
        assert!(
            offset <= self.text.len(),
            "line {} column {} lies past the end of the text",
            line,
            column
        );
        offset
    }

    /// Resolve a [`TextIndex`], returning `None` instead of panicking when it
    /// does not address a position of this text.
    ///
    /// A (line, column) pair is accepted if the column stays within the line
    /// including its terminator.
    pub fn checked_position(&self, index: TextIndex) -> Option<TextPosition> {
        match index {
            TextIndex::Offset(offset) => {
                if offset > self.text.len() {
                    return None;
                }
                Some(self.offset_to_position(offset))
            }
            TextIndex::LineColumn { line, column } => {
                let start = *self.line_starts.get(line)?;
                let end = self.line_end(line);
                if start + column > end {
                    return None;
                }
                Some(TextPosition {
                    offset: start + column,
                    line,
                    column,
                })
            }
        }
    }

    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn resolve(&self, index: TextIndex) -> TextPosition {
        match self.checked_position(index) {
            Some(pos) => pos,
            None => panic!("{:?} is out of range for this text", index),
        }
    }

    /// Text of line `n`, including its trailing `\n` unless it is the last line.
    ///
    /// # Panics
    ///
    /// Panics if line `n` does not exist.
    pub fn get_line(&self, n: usize) -> &str {
        assert!(
            n < self.line_starts.len(),
            "line {} out of bounds ({} lines)",
            n,
            self.line_starts.len()
        );
        &self.text[self.line_starts[n]..self.line_end(n)]
    }

    fn line_end(&self, line: usize) -> usize {
        self.line_starts
            .get(line + 1)
            .copied()
            .unwrap_or(self.text.len())
    }
}
