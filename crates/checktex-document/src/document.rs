//! The document façade used by checkers
//!
//! [`LatexDocument`] owns the flat source and the plain text of a document
//! and answers the one question checkers have: where in the original files
//! does a reported range come from?

use checktex_source_map::{IndexedText, Origin, OriginError, OriginPointer, TextIndex, TextPosition};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_MAX_ORIGIN_SPAN;
use crate::detex::Detex;
use crate::error::ParseError;
use crate::source::{LatexSource, SourceRecord};

/// Content of a [`LatexDocument`], exported next to the origin records of
/// the problems found in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub sources: SourceRecord,
    pub text: String,
}

/// A parsed LaTeX document.
///
/// All queries take `&self` and do not mutate anything, so a document can
/// be shared between threads.
#[derive(Debug, Clone)]
pub struct LatexDocument {
    source: LatexSource,
    detex: Detex,
    max_origin_span: usize,
}

impl LatexDocument {
    /// Combine a source with the plain text derived from its flat source.
    pub fn new(source: LatexSource, detex: Detex) -> Result<Self, ParseError> {
        let map = detex.map().as_slice();
        if let Some(&target) = map.last() {
            if target >= source.flat().len() {
                return Err(ParseError::CharMapOutOfBounds {
                    offset: map.len() - 1,
                    target,
                    source_len: source.flat().len(),
                });
            }
        }
        Ok(LatexDocument {
            source,
            detex,
            max_origin_span: DEFAULT_MAX_ORIGIN_SPAN,
        })
    }

    /// Limit the flat length of ranges passed to origin resolution.
    /// Longer ranges keep only their last `span` bytes.
    pub fn with_max_origin_span(mut self, span: usize) -> Self {
        self.max_origin_span = span.max(1);
        self
    }

    pub fn source(&self) -> &LatexSource {
        &self.source
    }

    pub fn detex(&self) -> &Detex {
        &self.detex
    }

    /// Paths of all files, in inclusion order.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.source.files().iter().map(|file| file.path())
    }

    /// The flattened source.
    pub fn get_source(&self) -> &str {
        self.source.flat().as_str()
    }

    pub fn get_source_line(&self, line: usize) -> Option<&str> {
        let flat = self.source.flat();
        (line < flat.num_lines()).then(|| flat.get_line(line))
    }

    /// The plain text.
    pub fn get_text(&self) -> &str {
        self.detex.text().as_str()
    }

    pub fn serialize(&self) -> DocumentRecord {
        DocumentRecord {
            sources: self.source.serialize(),
            text: self.get_text().to_string(),
        }
    }

    pub fn get_file_content(&self, path: &str) -> Option<&str> {
        self.source.get_file(path, None)
    }

    pub fn get_file_line(&self, path: &str, line: usize) -> Option<&str> {
        self.source.get_file(path, Some(line))
    }

    /// Origin of the flat-source range `begin..end`.
    ///
    /// The result lies within one file and on one line of it; see
    /// [`LatexSource::simplify_range`]. Fails with
    /// [`OriginError::NoOrigin`] if the range only covers synthetic content.
    pub fn get_origin_of_source(
        &self,
        begin: impl Into<TextIndex>,
        end: impl Into<TextIndex>,
    ) -> Result<Origin, OriginError> {
        let flat = self.source.flat();
        let begin = position(flat, begin.into())?;
        let end = position(flat, end.into())?;
        if begin.offset >= end.offset {
            return Err(OriginError::EmptyRange {
                begin: begin.offset,
                end: end.offset,
            });
        }
        self.origin_of_flat_range(begin.offset, end.offset)
    }

    /// Origin of the plain-text range `begin..end`. The returned origin
    /// also carries the plain-text positions.
    pub fn get_origin_of_text(
        &self,
        begin: impl Into<TextIndex>,
        end: impl Into<TextIndex>,
    ) -> Result<Origin, OriginError> {
        let text = self.detex.text();
        let begin = position(text, begin.into())?;
        let end = position(text, end.into())?;
        if begin.offset >= end.offset {
            return Err(OriginError::EmptyRange {
                begin: begin.offset,
                end: end.offset,
            });
        }

        let out_of_bounds = |offset| OriginError::OutOfBounds {
            offset,
            len: text.len(),
        };
        let source_begin = self
            .detex
            .source_offset(begin.offset)
            .ok_or_else(|| out_of_bounds(begin.offset))?;
        let source_end = self
            .detex
            .source_end_offset(end.offset)
            .ok_or_else(|| out_of_bounds(end.offset))?;

        Ok(self
            .origin_of_flat_range(source_begin, source_end)?
            .with_text(begin, end))
    }

    /// Origins of all non-empty matches of `pattern` in the flat source.
    ///
    /// Every call starts a fresh search.
    pub fn find_in_source<'a>(
        &'a self,
        pattern: &'a Regex,
    ) -> impl Iterator<Item = Result<Origin, OriginError>> + 'a {
        pattern
            .find_iter(self.get_source())
            .filter(|m| !m.is_empty())
            .map(move |m| self.get_origin_of_source(m.start(), m.end()))
    }

    /// Origins of all non-empty matches of `pattern` in the plain text.
    pub fn find_in_text<'a>(
        &'a self,
        pattern: &'a Regex,
    ) -> impl Iterator<Item = Result<Origin, OriginError>> + 'a {
        pattern
            .find_iter(self.get_text())
            .filter(|m| !m.is_empty())
            .map(move |m| self.get_origin_of_text(m.start(), m.end()))
    }

    /// The raw file content around `origin`: its file span widened by up
    /// to `n` bytes on each side.
    pub fn get_source_context(&self, origin: &Origin, n: usize) -> Option<&str> {
        let content = self.get_file_content(origin.file())?;
        let (begin, end) = origin.file_span();
        if end > content.len() {
            return None;
        }

        let mut start = begin.saturating_sub(n);
        while !content.is_char_boundary(start) {
            start -= 1;
        }
        let mut stop = end.saturating_add(n).min(content.len());
        while !content.is_char_boundary(stop) {
            stop += 1;
        }
        content.get(start..stop)
    }

    fn origin_of_flat_range(&self, begin: usize, end: usize) -> Result<Origin, OriginError> {
        let mut begin = begin;
        if end - begin > self.max_origin_span {
            let reduced = end - self.max_origin_span;
            tracing::info!(begin, end, reduced, "Reducing long range");
            begin = reduced;
        }

        let (file_begin, file_end) = self
            .source
            .simplify_range(begin, end)?
            .ok_or(OriginError::NoOrigin { begin, end })?;

        // Keep the source end inside the chosen file as well.
        let chosen = file_begin.file_id;
        let mut source_end = end;
        while source_end > begin + 1
            && self.source.file_offset_of(source_end - 1).map(|o| o.file) != Some(chosen)
        {
            source_end -= 1;
        }
        if source_end != end {
            tracing::debug!(begin, end, source_end, "Pulled back source end of range");
        }

        let flat = self.source.flat();
        Origin::new(
            OriginPointer::new(file_begin, flat.offset_to_position(begin)),
            OriginPointer::new(file_end, flat.offset_to_position(source_end)),
        )
    }
}

fn position(text: &IndexedText, index: TextIndex) -> Result<TextPosition, OriginError> {
    match index {
        TextIndex::Offset(offset) if offset > text.len() => Err(OriginError::OutOfBounds {
            offset,
            len: text.len(),
        }),
        _ => text
            .checked_position(index)
            .ok_or(OriginError::InvalidPosition { index }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detex::CharMap;
    use crate::flatten::Flattened;
    use crate::parser::LatexParser;
    use crate::resolver::InMemoryFiles;

    fn document(files: InMemoryFiles) -> LatexDocument {
        LatexParser::new(Box::new(files)).parse("/main.tex").unwrap()
    }

    /// `abXYZcd` with `XYZ` from `s.tex`
    fn with_inline_include() -> LatexDocument {
        document(
            InMemoryFiles::new("/")
                .with_file("main.tex", "ab\\input{s}cd")
                .with_file("s.tex", "XYZ"),
        )
    }

    #[test]
    fn test_source_end_is_pulled_back_into_chosen_file() {
        let doc = with_inline_include();
        assert_eq!(doc.get_source(), "abXYZcd");

        let origin = doc.get_origin_of_source(2, 6).unwrap();
        assert_eq!(origin.file(), "/s.tex");
        assert_eq!(origin.file_span(), (0, 3));
        assert_eq!(origin.source_span(), (2, 5));
    }

    #[test]
    fn test_lone_deeper_byte_is_ignored() {
        let doc = with_inline_include();
        let origin = doc.get_origin_of_source(4, 7).unwrap();
        assert_eq!(origin.file(), "/main.tex");
        assert_eq!(origin.file_span(), (11, 13));
        assert_eq!(origin.source_span(), (4, 7));
    }

    #[test]
    fn test_long_ranges_keep_their_tail() {
        let doc = document(InMemoryFiles::new("/").with_file("main.tex", "0123456789"))
            .with_max_origin_span(4);
        let origin = doc.get_origin_of_source(0, 10).unwrap();
        assert_eq!(origin.file_span(), (6, 10));
        assert_eq!(origin.source_span(), (6, 10));
    }

    #[test]
    fn test_invalid_queries() {
        let doc = with_inline_include();
        assert_eq!(
            doc.get_origin_of_source(3, 3),
            Err(OriginError::EmptyRange { begin: 3, end: 3 })
        );
        assert_eq!(
            doc.get_origin_of_source(5, 2),
            Err(OriginError::EmptyRange { begin: 5, end: 2 })
        );
        assert_eq!(
            doc.get_origin_of_source(0, 8),
            Err(OriginError::OutOfBounds { offset: 8, len: 7 })
        );
        assert_eq!(
            doc.get_origin_of_source((0, 0), (3, 0)),
            Err(OriginError::InvalidPosition {
                index: TextIndex::LineColumn { line: 3, column: 0 }
            })
        );
        assert!(doc.get_origin_of_source(0, 7).is_ok());
    }

    #[test]
    fn test_line_column_queries() {
        let doc = document(InMemoryFiles::new("/").with_file("main.tex", "0123\n\tBCD\nXYZ\n"));
        let origin = doc.get_origin_of_source((1, 1), (1, 4)).unwrap();
        assert_eq!(origin.file_span(), (6, 9));
        let expected = origin.with_text(TextPosition::new(6, 1, 1), TextPosition::new(9, 1, 4));
        assert_eq!(doc.get_origin_of_text(6, 9).unwrap(), expected);
    }

    #[test]
    fn test_text_origin_through_macro() {
        let doc = document(
            InMemoryFiles::new("/").with_file("main.tex", "Some \\emph{word} here."),
        );
        assert_eq!(doc.get_text(), "Some word here.");
        let origin = doc.get_origin_of_text(5, 9).unwrap();
        assert_eq!(origin.file_span(), (11, 15));
        assert_eq!(origin.text_span(), Some((5, 9)));
    }

    #[test]
    fn test_synthetic_range_has_no_origin() {
        let mut flat = Flattened::default();
        let main = flat.add_file("/main.tex", "ab");
        flat.push_verbatim(main, "ab", 0, 1);
        flat.push_synthetic("--");
        flat.push_verbatim(main, "ab", 1, 2);
        let source = LatexSource::new(flat).unwrap();
        let detex = Detex::new("a--b", CharMap::from_zero_based(vec![0, 1, 2, 3])).unwrap();
        let doc = LatexDocument::new(source, detex).unwrap();

        let err = doc.get_origin_of_source(1, 3).unwrap_err();
        assert!(err.is_no_origin());
        assert!(doc.get_origin_of_text(1, 3).unwrap_err().is_no_origin());
        assert_eq!(doc.get_origin_of_source(0, 4).unwrap().file_span(), (0, 2));
    }

    #[test]
    fn test_detex_must_fit_source() {
        let mut flat = Flattened::default();
        let main = flat.add_file("/main.tex", "ab");
        flat.push_verbatim(main, "ab", 0, 2);
        let source = LatexSource::new(flat).unwrap();
        let detex = Detex::new("b", CharMap::from_zero_based(vec![2])).unwrap();
        assert!(matches!(
            LatexDocument::new(source, detex),
            Err(ParseError::CharMapOutOfBounds { target: 2, .. })
        ));
    }

    #[test]
    fn test_find_skips_empty_matches() {
        let doc = with_inline_include();
        let pattern = Regex::new("Y*").unwrap();
        let origins: Vec<Origin> = doc.find_in_source(&pattern).map(Result::unwrap).collect();
        assert_eq!(origins.len(), 1);
        assert_eq!(origins[0].file_span(), (1, 2));
    }

    #[test]
    fn test_source_context() {
        let doc = document(
            InMemoryFiles::new("/").with_file("main.tex", "Grüße aus \\textbf{Berlin}!"),
        );
        let pattern = Regex::new("Berlin").unwrap();
        let origin = doc.find_in_text(&pattern).next().unwrap().unwrap();
        assert_eq!(doc.get_source_context(&origin, 0), Some("Berlin"));
        assert_eq!(doc.get_source_context(&origin, 2), Some("f{Berlin}!"));
        // snaps to the start of the multi-byte character
        assert_eq!(
            doc.get_source_context(&origin, 17),
            Some("üße aus \\textbf{Berlin}!")
        );
    }

    #[test]
    fn test_serialize_record() {
        let doc = document(
            InMemoryFiles::new("/")
                .with_file("main.tex", "a \\emph{b}\\input{s}")
                .with_file("s.tex", "c"),
        );
        let record = doc.serialize();

        insta::assert_json_snapshot!(record, @r#"
        {
          "sources": {
            "flat": "a \\emph{b}c",
            "files": [
              {
                "path": "/main.tex",
                "content": "a \\emph{b}\\input{s}"
              },
              {
                "path": "/s.tex",
                "content": "c"
              }
            ]
          },
          "text": "a bc"
        }
        "#);

        let json = serde_json::to_string(&record).unwrap();
        let back: DocumentRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_accessors() {
        let doc = with_inline_include();
        assert_eq!(doc.files().collect::<Vec<_>>(), vec!["/main.tex", "/s.tex"]);
        assert_eq!(doc.get_source_line(0), Some("abXYZcd"));
        assert_eq!(doc.get_source_line(1), None);
        assert_eq!(doc.get_file_content("/s.tex"), Some("XYZ"));
        assert_eq!(doc.get_file_line("/main.tex", 0), Some("ab\\input{s}cd"));
        assert_eq!(doc.source().files().len(), 2);
        assert_eq!(doc.detex().text().len(), 7);
    }
}
