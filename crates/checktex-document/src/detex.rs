//! Plain text derived from the flat source

use checktex_source_map::IndexedText;

use crate::error::ParseError;

/// Flat-source offset of every plain-text byte.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharMap(Vec<usize>);

impl CharMap {
    pub fn from_zero_based(map: Vec<usize>) -> Self {
        CharMap(map)
    }

    /// Build from a table whose entries point just past the source
    /// character, as some detex tools report them.
    pub fn from_one_based(map: Vec<usize>) -> Self {
        CharMap(map.into_iter().map(|i| i.saturating_sub(1)).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

/// Produces plain text and its char map from a flat source.
pub trait Detexer: Send + Sync {
    fn detex(&self, flat: &str) -> Result<(String, CharMap), ParseError>;
}

/// Plain text together with its mapping back into the flat source.
#[derive(Debug, Clone)]
pub struct Detex {
    text: IndexedText,
    map: CharMap,
}

impl Detex {
    /// Pair `text` with `map`.
    ///
    /// Fails unless the map has exactly one entry per byte of `text` and
    /// never decreases.
    pub fn new(text: impl Into<String>, map: CharMap) -> Result<Self, ParseError> {
        let text = IndexedText::new(text);
        if map.len() != text.len() {
            return Err(ParseError::CharMapLength {
                map_len: map.len(),
                text_len: text.len(),
            });
        }
        if let Some(offset) = map.0.windows(2).position(|w| w[1] < w[0]) {
            return Err(ParseError::CharMapNotMonotonic { offset: offset + 1 });
        }
        Ok(Detex { text, map })
    }

    /// Run `detexer` on `flat` and check its map against `flat` as well.
    pub fn from_source(flat: &str, detexer: &dyn Detexer) -> Result<Self, ParseError> {
        let (text, map) = detexer.detex(flat)?;
        let detex = Detex::new(text, map)?;
        if let Some((offset, &target)) = detex
            .map
            .0
            .iter()
            .enumerate()
            .find(|(_, target)| **target >= flat.len())
        {
            return Err(ParseError::CharMapOutOfBounds {
                offset,
                target,
                source_len: flat.len(),
            });
        }
        tracing::debug!(
            source_len = flat.len(),
            text_len = detex.text.len(),
            "Detexed flat source"
        );
        Ok(detex)
    }

    pub fn text(&self) -> &IndexedText {
        &self.text
    }

    pub fn map(&self) -> &CharMap {
        &self.map
    }

    /// Flat offset the plain byte at `offset` stems from.
    pub fn source_offset(&self, offset: usize) -> Option<usize> {
        self.map.0.get(offset).copied()
    }

    /// Exclusive flat end for the exclusive plain end `end`.
    pub fn source_end_offset(&self, end: usize) -> Option<usize> {
        match end {
            0 => Some(0),
            _ => self.source_offset(end - 1).map(|offset| offset + 1),
        }
    }
}
