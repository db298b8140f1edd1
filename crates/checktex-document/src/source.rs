//! The flattened source and the files it was assembled from

use std::collections::BTreeMap;

use checktex_source_map::{
    simplify_text_range, FileId, FilePosition, IndexedText, OriginError, TextPosition,
};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::flatten::{FlatOrigin, Flattened};

/// One original file of a document.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: String,
    id: FileId,
    text: IndexedText,
}

impl SourceFile {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn text(&self) -> &IndexedText {
        &self.text
    }
}

/// Content of a [`LatexSource`] for reporting layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub flat: String,
    /// Files in inclusion order
    pub files: Vec<FileRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    pub content: String,
}

/// The flat source of a document together with its original files.
///
/// Maps every flat offset back to the file and file offset it came from.
/// Immutable once built.
#[derive(Debug, Clone)]
pub struct LatexSource {
    flat: IndexedText,
    files: Vec<SourceFile>,
    origins: Vec<Option<FlatOrigin>>,
}

impl LatexSource {
    /// Index the output of a flattener.
    ///
    /// Fails unless there is exactly one origin entry per flat byte and
    /// every entry points at an existing byte of a registered file.
    pub fn new(flattened: Flattened) -> Result<Self, ParseError> {
        let Flattened {
            text,
            files,
            origins,
        } = flattened;

        if origins.len() != text.len() {
            return Err(ParseError::OriginTableLength {
                table_len: origins.len(),
                text_len: text.len(),
            });
        }

        let files: Vec<SourceFile> = files
            .into_iter()
            .enumerate()
            .map(|(id, (path, content))| SourceFile {
                path,
                id: FileId(id),
                text: IndexedText::new(content),
            })
            .collect();

        for (flat_offset, origin) in origins.iter().enumerate() {
            if let Some(origin) = origin {
                let valid = files
                    .get(origin.file.0)
                    .is_some_and(|file| origin.offset < file.text.len());
                if !valid {
                    return Err(ParseError::InvalidOrigin { flat_offset });
                }
            }
        }

        Ok(LatexSource {
            flat: IndexedText::new(text),
            files,
            origins,
        })
    }

    pub fn flat(&self) -> &IndexedText {
        &self.flat
    }

    /// Files in inclusion order; the index of a file is its [`FileId`].
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.0)
    }

    pub fn file_by_path(&self, path: &str) -> Option<&SourceFile> {
        self.files.iter().find(|file| file.path == path)
    }

    /// Content of a file, or of one of its lines (including the line break).
    pub fn get_file(&self, path: &str, line: Option<usize>) -> Option<&str> {
        let text = &self.file_by_path(path)?.text;
        match line {
            None => Some(text.as_str()),
            Some(line) if line < text.num_lines() => Some(text.get_line(line)),
            Some(_) => None,
        }
    }

    /// Export the flat source and the verbatim file contents.
    pub fn serialize(&self) -> SourceRecord {
        SourceRecord {
            flat: self.flat.as_str().to_string(),
            files: self
                .files
                .iter()
                .map(|file| FileRecord {
                    path: file.path.clone(),
                    content: file.text.as_str().to_string(),
                })
                .collect(),
        }
    }

    /// Number of flat bytes that have a file origin.
    pub fn origin_count(&self) -> usize {
        self.origins.iter().filter(|origin| origin.is_some()).count()
    }

    pub fn file_offset_of(&self, flat_offset: usize) -> Option<FlatOrigin> {
        self.origins.get(flat_offset).copied().flatten()
    }

    /// Where the flat byte at `flat_offset` comes from.
    pub fn investigate_origin(&self, flat_offset: usize) -> Option<FilePosition> {
        let origin = self.file_offset_of(flat_offset)?;
        let file = self.file(origin.file)?;
        Some(FilePosition::new(
            file.path.clone(),
            file.id,
            file.text.offset_to_position(origin.offset),
        ))
    }

    /// Collapse the flat range `begin..end` into a range of one file.
    ///
    /// Synthetic bytes are ignored. The range is attributed to the most
    /// deeply included file among those it touches, except when that file
    /// contributes a single byte and the next deepest contributes more;
    /// such a lone byte is usually a stray boundary character. Within the
    /// chosen file the positions are collapsed by [`simplify_text_range`].
    ///
    /// Returns `Ok(None)` if no byte of the range has a file origin.
    pub fn simplify_range(
        &self,
        begin: usize,
        end: usize,
    ) -> Result<Option<(FilePosition, FilePosition)>, OriginError> {
        if begin >= end {
            return Err(OriginError::EmptyRange { begin, end });
        }
        if end > self.flat.len() {
            return Err(OriginError::OutOfBounds {
                offset: end,
                len: self.flat.len(),
            });
        }

        let resolved: Vec<FlatOrigin> = (begin..end)
            .filter_map(|offset| self.file_offset_of(offset))
            .collect();

        let mut counts: BTreeMap<FileId, usize> = BTreeMap::new();
        for origin in &resolved {
            *counts.entry(origin.file).or_default() += 1;
        }

        let mut ranked = counts.iter().rev();
        let Some((&deepest, &deepest_count)) = ranked.next() else {
            return Ok(None);
        };
        let chosen = match ranked.next() {
            Some((&second, &second_count)) if deepest_count == 1 && second_count > 1 => {
                tracing::debug!(
                    begin,
                    end,
                    deepest = deepest.0,
                    chosen = second.0,
                    "Single byte of a deeper file ignored when resolving range"
                );
                second
            }
            _ => deepest,
        };

        let file = self.file(chosen).ok_or(OriginError::Incoherent { begin, end })?;
        let positions = resolved
            .iter()
            .filter(|origin| origin.file == chosen)
            .map(|origin| file.text.offset_to_position(origin.offset));
        let (file_begin, file_end): (TextPosition, TextPosition) =
            simplify_text_range(positions).ok_or(OriginError::Incoherent { begin, end })?;

        Ok(Some((
            FilePosition::new(file.path.clone(), file.id, file_begin),
            FilePosition::new(file.path.clone(), file.id, file_end),
        )))
    }
}
