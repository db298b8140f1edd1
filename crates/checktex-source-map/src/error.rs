//! Errors produced while building or resolving origins

use thiserror::Error;

use crate::types::TextIndex;

/// Result type alias for origin resolution.
pub type Result<T> = std::result::Result<T, OriginError>;

/// Errors that can occur while tracing a range back to its origin.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OriginError {
    /// The requested range is empty or reversed.
    #[error("invalid range {begin}..{end}: begin must be before end")]
    EmptyRange { begin: usize, end: usize },

    /// An offset lies outside the text it was meant for.
    #[error("offset {offset} is out of bounds for a text of length {len}")]
    OutOfBounds { offset: usize, len: usize },

    /// A (line, column) pair does not address a position of the text.
    #[error("position {index:?} does not exist in the text")]
    InvalidPosition { index: TextIndex },

    /// Every offset of the range belongs to content without a file origin.
    #[error("no origin for range {begin}..{end}")]
    NoOrigin { begin: usize, end: usize },

    /// Offsets resolved, but no single-file range could be derived from them.
    #[error("could not determine a coherent origin for range {begin}..{end}")]
    Incoherent { begin: usize, end: usize },

    /// Begin and end of an origin point into different files.
    #[error("begin and end must be in the same file: {begin} != {end}")]
    FileMismatch { begin: String, end: String },

    /// An origin would be zero-width or reversed.
    #[error("origin in {file} would be empty: {begin} >= {end}")]
    EmptyOrigin { file: String, begin: usize, end: usize },
}

impl OriginError {
    /// Whether this is the expected "nothing to point at" outcome rather
    /// than a caller bug.
    pub fn is_no_origin(&self) -> bool {
        matches!(self, OriginError::NoOrigin { .. })
    }
}
