//! LaTeX documents with origin tracking
//!
//! A document is transformed twice before it is checked: inclusion
//! directives are expanded and comments removed (the *flat source*), then
//! markup is stripped (the *plain text*). This crate performs both steps and
//! keeps enough bookkeeping to trace any range of the flat source or the
//! plain text back to a range of one original file.
//!
//! # Example
//!
//! ```rust
//! use checktex_document::{InMemoryFiles, LatexParser};
//!
//! let files = InMemoryFiles::new("/")
//!     .with_file("main.tex", "0123\n\\input{sub.tex}\nXYZ\n")
//!     .with_file("sub.tex", "ABC\n");
//! let document = LatexParser::new(Box::new(files)).parse("/main.tex").unwrap();
//!
//! let begin = document.get_text().find("ABC").unwrap();
//! let origin = document.get_origin_of_text(begin, begin + 3).unwrap();
//! assert_eq!(origin.file(), "/sub.tex");
//! assert_eq!(origin.file_span(), (0, 3));
//! ```

pub mod check;
pub mod config;
pub mod detex;
pub mod detexer;
pub mod document;
pub mod error;
pub mod flatten;
pub mod parser;
pub mod resolver;
pub mod source;

mod scan;

pub use check::{
    Checker, DocumentAnalyzer, Filter, IgnoreSourceRegions, PatternChecker, Problem, SearchTarget,
};
pub use config::{
    CommandRule, DetexOptions, FlattenOptions, ParserConfig, DEFAULT_MAX_ORIGIN_SPAN,
};
pub use detex::{CharMap, Detex, Detexer};
pub use detexer::BasicDetexer;
pub use document::{DocumentRecord, LatexDocument};
pub use error::ParseError;
pub use flatten::{FlatOrigin, Flattened, Flattener, InputFlattener};
pub use parser::LatexParser;
pub use resolver::{FileResolver, FileSystemResolver, InMemoryFiles};
pub use source::{FileRecord, LatexSource, SourceFile, SourceRecord};

pub use checktex_source_map::{
    FileId, FilePosition, IndexedText, Origin, OriginError, OriginPointer, OriginRecord,
    TextIndex, TextPosition,
};
