//! Building documents from files

use crate::config::ParserConfig;
use crate::detex::{Detex, Detexer};
use crate::detexer::BasicDetexer;
use crate::document::LatexDocument;
use crate::error::ParseError;
use crate::flatten::{Flattener, InputFlattener};
use crate::resolver::FileResolver;
use crate::source::LatexSource;

/// Runs a flattener and a detexer over a root file.
///
/// Uses [`InputFlattener`] and [`BasicDetexer`] configured from the
/// [`ParserConfig`] unless others are plugged in.
pub struct LatexParser {
    resolver: Box<dyn FileResolver>,
    config: ParserConfig,
    flattener: Option<Box<dyn Flattener>>,
    detexer: Option<Box<dyn Detexer>>,
}

impl LatexParser {
    pub fn new(resolver: Box<dyn FileResolver>) -> Self {
        LatexParser {
            resolver,
            config: ParserConfig::default(),
            flattener: None,
            detexer: None,
        }
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_flattener(mut self, flattener: Box<dyn Flattener>) -> Self {
        self.flattener = Some(flattener);
        self
    }

    pub fn with_detexer(mut self, detexer: Box<dyn Detexer>) -> Self {
        self.detexer = Some(detexer);
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Flatten `root` and index the result.
    pub fn parse_source(&self, root: &str) -> Result<LatexSource, ParseError> {
        let flattened = match &self.flattener {
            Some(flattener) => flattener.flatten(root, self.resolver.as_ref())?,
            None => InputFlattener::new(self.config.flatten.clone())
                .flatten(root, self.resolver.as_ref())?,
        };
        tracing::debug!(
            root,
            files = flattened.files.len(),
            len = flattened.text.len(),
            "Flattened document"
        );
        LatexSource::new(flattened)
    }

    /// Flatten and detex `root`.
    pub fn parse(&self, root: &str) -> Result<LatexDocument, ParseError> {
        let source = self.parse_source(root)?;
        let detex = match &self.detexer {
            Some(detexer) => Detex::from_source(source.flat().as_str(), detexer.as_ref())?,
            None => Detex::from_source(
                source.flat().as_str(),
                &BasicDetexer::new(self.config.detex.clone()),
            )?,
        };
        Ok(LatexDocument::new(source, detex)?.with_max_origin_span(self.config.max_origin_span))
    }
}
