//! Errors raised while building a document

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while flattening, detexing or configuring.
///
/// These are construction failures. Once a [`LatexDocument`](crate::LatexDocument)
/// exists, queries only fail with [`OriginError`](crate::OriginError).
#[derive(Debug, Error)]
pub enum ParseError {
    /// An inclusion directive names a file the resolver cannot find.
    #[error("could not find file '{name}' included from {including}")]
    FileNotFound { name: String, including: String },

    /// A file includes itself, directly or through other files.
    #[error("cyclic inclusion of {path}: {}", chain.join(" -> "))]
    CyclicInclude { path: String, chain: Vec<String> },

    /// Reading a file failed.
    #[error("failed to read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The detexer's char map does not cover the plain text exactly.
    #[error("char map has {map_len} entries but the plain text has {text_len} bytes")]
    CharMapLength { map_len: usize, text_len: usize },

    /// The detexer's char map moves backwards.
    #[error("char map decreases at plain offset {offset}")]
    CharMapNotMonotonic { offset: usize },

    /// A char map entry points past the end of the flat source.
    #[error("char map entry {target} at plain offset {offset} exceeds flat source length {source_len}")]
    CharMapOutOfBounds {
        offset: usize,
        target: usize,
        source_len: usize,
    },

    /// The flattener's origin table does not cover the flat source exactly.
    #[error("origin table has {table_len} entries but the flat source has {text_len} bytes")]
    OriginTableLength { table_len: usize, text_len: usize },

    /// An origin table entry points outside the registered files.
    #[error("flat offset {flat_offset} has an origin outside the known files")]
    InvalidOrigin { flat_offset: usize },

    /// The configuration file could not be read.
    #[error("failed to read configuration {}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML for [`ParserConfig`](crate::ParserConfig).
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}
