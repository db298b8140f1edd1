//! Resolved origins of flat-source and plain-text ranges

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{OriginError, Result};
use crate::types::{FileId, TextPosition};

/// A position inside one original file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePosition {
    /// Path of the file as registered by the flattener
    pub path: String,
    /// Rank of the file in the inclusion order
    pub file_id: FileId,
    /// Position within the file's raw content
    pub position: TextPosition,
}

impl FilePosition {
    pub fn new(path: impl Into<String>, file_id: FileId, position: TextPosition) -> Self {
        FilePosition {
            path: path.into(),
            file_id,
            position,
        }
    }
}

impl fmt::Display for FilePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}:{}]",
            self.path, self.position.line, self.position.column
        )
    }
}

/// One end of an [`Origin`].
///
/// Carries the position in the original file, the position in the flattened
/// source it was derived from and, for origins of plain-text ranges, the
/// position in the plain text.
///
/// Pointers order by flat-source offset first and fall back to the file
/// inclusion order, then to file and text offsets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OriginPointer {
    pub file: FilePosition,
    pub source: TextPosition,
    pub text: Option<TextPosition>,
}

impl OriginPointer {
    pub fn new(file: FilePosition, source: TextPosition) -> Self {
        OriginPointer {
            file,
            source,
            text: None,
        }
    }

    fn sort_key(&self) -> (usize, FileId, usize, Option<usize>) {
        (
            self.source.offset,
            self.file.file_id,
            self.file.position.offset,
            self.text.map(|t| t.offset),
        )
    }
}

impl PartialEq for OriginPointer {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }
}

impl Eq for OriginPointer {}

impl PartialOrd for OriginPointer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OriginPointer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

/// The origin of a range: a non-empty span within a single original file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "UncheckedOrigin")]
pub struct Origin {
    begin: OriginPointer,
    end: OriginPointer,
}

#[derive(Deserialize)]
struct UncheckedOrigin {
    begin: OriginPointer,
    end: OriginPointer,
}

impl TryFrom<UncheckedOrigin> for Origin {
    type Error = OriginError;

    fn try_from(raw: UncheckedOrigin) -> Result<Self> {
        Origin::new(raw.begin, raw.end)
    }
}

impl Origin {
    /// Create an origin, rejecting cross-file and zero-width spans.
    pub fn new(begin: OriginPointer, end: OriginPointer) -> Result<Self> {
        if begin.file.path != end.file.path {
            return Err(OriginError::FileMismatch {
                begin: begin.file.path,
                end: end.file.path,
            });
        }
        if begin.file.position.offset >= end.file.position.offset {
            return Err(OriginError::EmptyOrigin {
                file: begin.file.path,
                begin: begin.file.position.offset,
                end: end.file.position.offset,
            });
        }
        if begin.source.offset >= end.source.offset {
            return Err(OriginError::EmptyOrigin {
                file: begin.file.path,
                begin: begin.source.offset,
                end: end.source.offset,
            });
        }
        Ok(Origin { begin, end })
    }

    pub fn begin(&self) -> &OriginPointer {
        &self.begin
    }

    pub fn end(&self) -> &OriginPointer {
        &self.end
    }

    /// Attach the plain-text positions this origin was derived from.
    pub fn with_text(mut self, begin: TextPosition, end: TextPosition) -> Self {
        self.begin.text = Some(begin);
        self.end.text = Some(end);
        self
    }

    pub fn file(&self) -> &str {
        &self.begin.file.path
    }

    pub fn file_id(&self) -> FileId {
        self.begin.file.file_id
    }

    pub fn file_span(&self) -> (usize, usize) {
        (
            self.begin.file.position.offset,
            self.end.file.position.offset,
        )
    }

    pub fn source_span(&self) -> (usize, usize) {
        (self.begin.source.offset, self.end.source.offset)
    }

    /// Span in the plain text, if the origin came from a plain-text query.
    pub fn text_span(&self) -> Option<(usize, usize)> {
        Some((self.begin.text?.offset, self.end.text?.offset))
    }

    pub fn file_line(&self) -> usize {
        self.begin.file.position.line
    }

    pub fn source_line(&self) -> usize {
        self.begin.source.line
    }

    pub fn text_line(&self) -> Option<usize> {
        self.begin.text.map(|t| t.line)
    }

    /// Flatten into a plain record for reporting layers.
    pub fn serialize(&self) -> OriginRecord {
        OriginRecord {
            file: self.begin.file.path.clone(),
            begin: PointerRecord::from(&self.begin),
            end: PointerRecord::from(&self.end),
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let begin = &self.begin.file.position;
        let end = &self.end.file.position;
        write!(
            f,
            "{}[{}:{}-{}:{}]",
            self.file(),
            begin.line,
            begin.column,
            end.line,
            end.column
        )
    }
}

/// Serializable summary of an [`Origin`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginRecord {
    pub file: String,
    pub begin: PointerRecord,
    pub end: PointerRecord,
}

/// Serializable summary of an [`OriginPointer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerRecord {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
    pub source_offset: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_offset: Option<usize>,
}

impl From<&OriginPointer> for PointerRecord {
    fn from(pointer: &OriginPointer) -> Self {
        PointerRecord {
            line: pointer.file.position.line,
            column: pointer.file.position.column,
            offset: pointer.file.position.offset,
            source_offset: pointer.source.offset,
            text_offset: pointer.text.map(|t| t.offset),
        }
    }
}
