//! Command implementations for the checktex CLI
//!
//! Each command loads the document through [`load_document`] and writes its
//! output to the given writer.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use checktex_document::{FileSystemResolver, LatexDocument, LatexParser, ParserConfig};

pub mod find;
pub mod show;

/// Options shared by all commands.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub root: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

pub fn load_document(main: &Path, options: &LoadOptions) -> Result<LatexDocument> {
    let main = std::path::absolute(main)
        .with_context(|| format!("invalid main file {}", main.display()))?;
    let root = match &options.root {
        Some(root) => root.clone(),
        None => main
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    let config = match &options.config {
        Some(path) => ParserConfig::load(path)?,
        None => ParserConfig::default(),
    };

    tracing::debug!(main = %main.display(), root = %root.display(), "Loading document");
    let parser = LatexParser::new(Box::new(FileSystemResolver::new(root))).with_config(config);
    let document = parser
        .parse(&main.to_string_lossy())
        .with_context(|| format!("failed to parse {}", main.display()))?;
    Ok(document)
}
