//! Source positions and origins for checktex
//!
//! This crate provides the value types used to point at locations in the
//! original files of a LaTeX document, together with the line index that
//! turns linear offsets into (line, column) positions.
//!
//! # Overview
//!
//! The core types are:
//! - [`IndexedText`]: A string with a precomputed line-start table
//! - [`TextPosition`]: Offset, line and column within one text
//! - [`FilePosition`]: A [`TextPosition`] in a named original file
//! - [`OriginPointer`] and [`Origin`]: Resolved locations handed to checkers
//!
//! # Example
//!
//! ```rust
//! use checktex_source_map::*;
//!
//! let text = IndexedText::new("0123\n\tBCD\nXYZ\n");
//! let pos = text.offset_to_position(6);
//! assert_eq!((pos.line, pos.column), (1, 1));
//! assert_eq!(text.line_col_to_offset(pos.line, pos.column), 6);
//! ```

pub mod error;
pub mod indexed_text;
pub mod origin;
pub mod simplify;
pub mod types;

// Re-export main types
pub use error::OriginError;
pub use indexed_text::IndexedText;
pub use origin::{FilePosition, Origin, OriginPointer, OriginRecord, PointerRecord};
pub use simplify::simplify_text_range;
pub use types::{FileId, TextIndex, TextPosition};
