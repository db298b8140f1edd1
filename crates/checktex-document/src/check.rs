//! Checkers, filters and the analyzer that runs them
//!
//! A [`Checker`] inspects a [`LatexDocument`] and reports [`Problem`]s
//! located by their [`Origin`]. A [`Filter`] removes problems that are known
//! to be false positives. [`DocumentAnalyzer`] runs all checkers and then
//! all filters.

use checktex_source_map::{Origin, OriginError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};

use crate::document::LatexDocument;

/// Bytes of file content shown around a problem.
const CONTEXT_BYTES: usize = 20;

/// A problem reported by a checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Problem {
    #[serde(serialize_with = "serialize_origin")]
    pub origin: Origin,
    pub message: String,
    /// Source around the problem
    pub context: String,
    /// Identifies the problem across runs, e.g. for whitelisting
    pub long_id: String,
    pub tool: String,
    pub rule: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub look_up_url: Option<String>,
}

fn serialize_origin<S: Serializer>(origin: &Origin, serializer: S) -> Result<S::Ok, S::Error> {
    origin.serialize().serialize(serializer)
}

impl Problem {
    pub fn new(
        origin: Origin,
        tool: impl Into<String>,
        rule: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Problem {
            origin,
            message: message.into(),
            context: String::new(),
            long_id: String::new(),
            tool: tool.into(),
            rule: rule.into(),
            look_up_url: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_long_id(mut self, long_id: impl Into<String>) -> Self {
        self.long_id = long_id.into();
        self
    }

    pub fn with_look_up_url(mut self, url: impl Into<String>) -> Self {
        self.look_up_url = Some(url.into());
        self
    }
}

/// Finds problems in a document.
pub trait Checker: Send + Sync {
    fn name(&self) -> &str;

    fn check<'a>(&'a self, document: &'a LatexDocument) -> Box<dyn Iterator<Item = Problem> + 'a>;
}

/// Removes problems after all checkers ran.
pub trait Filter {
    /// Collect whatever the filter needs from the document.
    fn prepare(&mut self, document: &LatexDocument);

    fn filter(&self, problems: Vec<Problem>) -> Vec<Problem>;
}

/// Where a [`PatternChecker`] searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTarget {
    /// The flattened source
    Source,
    /// The plain text
    Text,
}

/// Reports every match of a regular expression.
#[derive(Debug, Clone)]
pub struct PatternChecker {
    name: String,
    rule: String,
    message: String,
    pattern: Regex,
    target: SearchTarget,
}

impl PatternChecker {
    /// A checker named `name` that searches the plain text.
    pub fn new(
        name: impl Into<String>,
        rule: impl Into<String>,
        pattern: Regex,
        message: impl Into<String>,
    ) -> Self {
        PatternChecker {
            name: name.into(),
            rule: rule.into(),
            message: message.into(),
            pattern,
            target: SearchTarget::Text,
        }
    }

    pub fn with_target(mut self, target: SearchTarget) -> Self {
        self.target = target;
        self
    }

    fn problem(&self, document: &LatexDocument, origin: Origin) -> Problem {
        let context = document
            .get_source_context(&origin, CONTEXT_BYTES)
            .unwrap_or_default()
            .to_string();
        let (begin, end) = origin.file_span();
        let matched = document
            .get_file_content(origin.file())
            .and_then(|content| content.get(begin..end))
            .unwrap_or_default();
        let long_id = format!("{}:{}", self.rule, matched);
        Problem::new(origin, &self.name, &self.rule, &self.message)
            .with_context(context)
            .with_long_id(long_id)
    }
}

impl Checker for PatternChecker {
    fn name(&self) -> &str {
        &self.name
    }

    fn check<'a>(&'a self, document: &'a LatexDocument) -> Box<dyn Iterator<Item = Problem> + 'a> {
        let origins: Box<dyn Iterator<Item = Result<Origin, OriginError>> + 'a> = match self.target
        {
            SearchTarget::Source => Box::new(document.find_in_source(&self.pattern)),
            SearchTarget::Text => Box::new(document.find_in_text(&self.pattern)),
        };
        Box::new(origins.filter_map(move |origin| match origin {
            Ok(origin) => Some(self.problem(document, origin)),
            Err(err) => {
                tracing::debug!(checker = %self.name, error = %err, "Dropping match without origin");
                None
            }
        }))
    }
}

static INCLUDEGRAPHICS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\includegraphics(\[[^\]]*\])?\{(?P<path>[^\}]+)\}").unwrap()
});

static REFS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(([Cc]?ref)|(fullcite)|(f?ref((ch)|(sec))))\{(?P<ref>[^\}]+)\}").unwrap()
});

/// Drops problems whose source span lies inside a match of a regular
/// expression over the flat source, or inside one named group of it.
#[derive(Debug, Clone)]
pub struct IgnoreSourceRegions {
    pattern: Regex,
    group: Option<String>,
    regions: Vec<(usize, usize)>,
}

impl IgnoreSourceRegions {
    pub fn new(pattern: Regex) -> Self {
        IgnoreSourceRegions {
            pattern,
            group: None,
            regions: Vec::new(),
        }
    }

    /// Only ignore the part of each match captured by `group`.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Ignore the path argument of `\includegraphics`.
    pub fn includegraphics() -> Self {
        IgnoreSourceRegions::new(INCLUDEGRAPHICS.clone()).with_group("path")
    }

    /// Ignore the label argument of `\ref`-like commands.
    pub fn refs() -> Self {
        IgnoreSourceRegions::new(REFS.clone()).with_group("ref")
    }

    pub fn regions(&self) -> &[(usize, usize)] {
        &self.regions
    }

    fn covers(&self, (begin, end): (usize, usize)) -> bool {
        self.regions
            .iter()
            .any(|&(start, stop)| start <= begin && end <= stop)
    }
}

impl Filter for IgnoreSourceRegions {
    fn prepare(&mut self, document: &LatexDocument) {
        let source = document.get_source();
        self.regions = match &self.group {
            Some(group) => self
                .pattern
                .captures_iter(source)
                .filter_map(|captures| captures.name(group))
                .map(|m| (m.start(), m.end()))
                .collect(),
            None => self
                .pattern
                .find_iter(source)
                .map(|m| (m.start(), m.end()))
                .collect(),
        };
    }

    fn filter(&self, problems: Vec<Problem>) -> Vec<Problem> {
        problems
            .into_iter()
            .filter(|problem| !self.covers(problem.origin.source_span()))
            .collect()
    }
}

/// Runs checkers and filters over a document.
#[derive(Default)]
pub struct DocumentAnalyzer {
    checkers: Vec<Box<dyn Checker>>,
    filters: Vec<Box<dyn Filter>>,
}

impl DocumentAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_checker(mut self, checker: Box<dyn Checker>) -> Self {
        self.checkers.push(checker);
        self
    }

    pub fn with_filter(mut self, filter: Box<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// All problems that survive the filters, ordered by origin.
    pub fn analyze(&mut self, document: &LatexDocument) -> Vec<Problem> {
        let mut problems = Vec::new();
        for checker in &self.checkers {
            let before = problems.len();
            problems.extend(checker.check(document));
            tracing::info!(
                checker = checker.name(),
                problems = problems.len() - before,
                "Checker finished"
            );
        }

        for filter in &mut self.filters {
            filter.prepare(document);
            problems = filter.filter(problems);
        }

        problems.sort_by(|a, b| a.origin.cmp(&b.origin));
        problems
    }
}
