//! Flattening: inclusion expansion and comment removal
//!
//! A [`Flattener`] turns a root file into one flat source string and records,
//! for every byte of that string, which byte of which original file it came
//! from. [`InputFlattener`] is the built-in implementation.

use std::collections::HashMap;
use std::ops::Range;

use checktex_source_map::FileId;
use memchr::memchr2;

use crate::config::{CommandRule, FlattenOptions};
use crate::error::ParseError;
use crate::resolver::FileResolver;
use crate::scan::{braced, bracketed, control_word_end, skip_star, verb_argument};

/// The original location of one flat-source byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatOrigin {
    pub file: FileId,
    pub offset: usize,
}

/// Output of a [`Flattener`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flattened {
    /// The flat source
    pub text: String,
    /// `(path, verbatim content)` of every file, in inclusion order; the
    /// index is the file's [`FileId`]
    pub files: Vec<(String, String)>,
    /// One entry per byte of `text`; `None` marks content the flattener
    /// synthesized itself
    pub origins: Vec<Option<FlatOrigin>>,
}

impl Flattened {
    /// Register a file and return its id. Does not add any flat content.
    pub fn add_file(&mut self, path: impl Into<String>, content: impl Into<String>) -> FileId {
        let id = FileId(self.files.len());
        self.files.push((path.into(), content.into()));
        id
    }

    /// Append `content[start..end]` of `file`, keeping its origins.
    pub fn push_verbatim(&mut self, file: FileId, content: &str, start: usize, end: usize) {
        if start >= end {
            return;
        }
        self.text.push_str(&content[start..end]);
        self.origins.extend((start..end).map(|offset| Some(FlatOrigin { file, offset })));
    }

    /// Append content that has no file origin.
    pub fn push_synthetic(&mut self, text: &str) {
        self.text.push_str(text);
        self.origins.extend(std::iter::repeat_n(None, text.len()));
    }

    /// The file path and file offset a flat offset comes from.
    pub fn origin_of(&self, flat_offset: usize) -> Option<(&str, usize)> {
        let origin = self.origins.get(flat_offset).copied().flatten()?;
        let (path, _) = self.files.get(origin.file.0)?;
        Some((path.as_str(), origin.offset))
    }

    fn truncate_by(&mut self, n: usize) {
        let len = self.text.len() - n;
        self.text.truncate(len);
        self.origins.truncate(len);
    }
}

/// Produces the flat source of a document.
pub trait Flattener: Send + Sync {
    /// Flatten the document whose root file is `root`.
    fn flatten(&self, root: &str, resolver: &dyn FileResolver) -> Result<Flattened, ParseError>;
}

/// Expands `\input{...}`-style directives and strips comments.
///
/// An inclusion directive is replaced by the flattened content of the named
/// file, with nothing inserted around it. Comments run from an unescaped
/// `%` to the end of the line; a line holding nothing but a comment is
/// removed including its line break. Everything between a pause marker
/// line and the next continue marker line is dropped.
///
/// Commands named by a [`CommandRule`] are rewritten, which by default
/// resolves the markup of the `changes` and `todonotes` packages: added
/// and replacing text stays, deleted text and notes go. The argument of
/// `\verb` is copied untouched, so a `%` inside it is not a comment.
#[derive(Debug, Clone, Default)]
pub struct InputFlattener {
    options: FlattenOptions,
}

impl InputFlattener {
    pub fn new(options: FlattenOptions) -> Self {
        InputFlattener { options }
    }
}

impl Flattener for InputFlattener {
    fn flatten(&self, root: &str, resolver: &dyn FileResolver) -> Result<Flattened, ParseError> {
        let path = resolver
            .resolve(root, None)
            .ok_or_else(|| ParseError::FileNotFound {
                name: root.to_string(),
                including: "the command line".to_string(),
            })?;

        let mut expansion = Expansion {
            options: &self.options,
            resolver,
            out: Flattened::default(),
            ids: HashMap::new(),
            stack: Vec::new(),
        };
        expansion.expand_file(path)?;
        Ok(expansion.out)
    }
}

struct Expansion<'a> {
    options: &'a FlattenOptions,
    resolver: &'a dyn FileResolver,
    out: Flattened,
    ids: HashMap<String, FileId>,
    /// Paths of the files currently being expanded, outermost first
    stack: Vec<String>,
}

impl Expansion<'_> {
    fn expand_file(&mut self, path: String) -> Result<(), ParseError> {
        if self.stack.contains(&path) {
            let mut chain = self.stack.clone();
            chain.push(path.clone());
            return Err(ParseError::CyclicInclude { path, chain });
        }

        let content = self.resolver.read(&path)?;
        let file = match self.ids.get(&path) {
            Some(&id) => id,
            None => {
                let id = self.out.add_file(path.clone(), content.clone());
                self.ids.insert(path.clone(), id);
                id
            }
        };

        tracing::trace!(path = %path, file = file.0, depth = self.stack.len(), "Expanding file");
        self.stack.push(path);
        let result = self.expand_content(file, &content);
        self.stack.pop();
        result
    }

    fn expand_content(&mut self, file: FileId, content: &str) -> Result<(), ParseError> {
        self.expand_range(file, content, 0..content.len())
    }

    fn expand_range(
        &mut self,
        file: FileId,
        content: &str,
        range: Range<usize>,
    ) -> Result<(), ParseError> {
        let bytes = content.as_bytes();
        let end = range.end;
        let mut i = range.start;
        while i < end {
            let Some(found) = memchr2(b'\\', b'%', &bytes[i..end]) else {
                self.out.push_verbatim(file, content, i, end);
                break;
            };
            let special = i + found;
            self.out.push_verbatim(file, content, i, special);
            i = if bytes[special] == b'%' {
                self.skip_comment(content, special).min(end)
            } else {
                self.control_sequence(file, content, special)?
            };
        }
        Ok(())
    }

    /// Handle the control sequence starting at the backslash at `start`.
    /// Returns the offset to continue from.
    fn control_sequence(
        &mut self,
        file: FileId,
        content: &str,
        start: usize,
    ) -> Result<usize, ParseError> {
        let bytes = content.as_bytes();
        let name_end = control_word_end(bytes, start + 1);

        if name_end == start + 1 {
            // Control symbol such as `\%` or `\\`; copy both characters so
            // the second one is never taken for a comment.
            let end = content[start + 1..]
                .chars()
                .next()
                .map_or(start + 1, |c| start + 1 + c.len_utf8());
            self.out.push_verbatim(file, content, start, end);
            return Ok(end);
        }

        let name = &content[start + 1..name_end];
        if name == "verb" {
            let end = verb_argument(bytes, name_end).map_or(name_end, |group| group.end);
            self.out.push_verbatim(file, content, start, end);
            return Ok(end);
        }

        let options = self.options;
        if let Some(rule) = options.command_rules.iter().find(|rule| rule.name == name) {
            return self.apply_rule(file, content, name_end, rule);
        }

        if self.options.include_commands.iter().any(|c| c == name) {
            if let Some(group) = braced(bytes, name_end) {
                let argument = content[group.inner].trim();
                let including = self.stack.last().cloned().unwrap_or_default();
                let target = self
                    .resolver
                    .resolve(argument, Some(&including))
                    .ok_or_else(|| ParseError::FileNotFound {
                        name: argument.to_string(),
                        including: including.clone(),
                    })?;
                self.expand_file(target)?;
                return Ok(group.end);
            }
        }

        self.out.push_verbatim(file, content, start, name_end);
        Ok(name_end)
    }

    /// Remove the command matched by `rule` whose name ends at `name_end`,
    /// flattening the kept argument in its place. Stops at the first
    /// missing argument.
    fn apply_rule(
        &mut self,
        file: FileId,
        content: &str,
        name_end: usize,
        rule: &CommandRule,
    ) -> Result<usize, ParseError> {
        let bytes = content.as_bytes();
        let mut pos = skip_star(bytes, name_end);
        let mut kept = None;
        for index in 1..=rule.arguments {
            while let Some(option) = bracketed(bytes, pos) {
                pos = option.end;
            }
            let Some(group) = braced(bytes, pos) else {
                break;
            };
            if rule.keep == Some(index) {
                kept = Some(group.inner);
            }
            pos = group.end;
        }

        tracing::trace!(command = %rule.name, kept = kept.is_some(), "Rewriting command");
        if let Some(inner) = kept {
            self.expand_range(file, content, inner)?;
        }
        Ok(pos)
    }

    /// Skip the comment starting at `start` and return the offset to
    /// continue from.
    fn skip_comment(&mut self, content: &str, start: usize) -> usize {
        let line_begin = content[..start].rfind('\n').map_or(0, |p| p + 1);
        let line_end = content[start..]
            .find('\n')
            .map_or(content.len(), |p| start + p);
        let whole_line = content[line_begin..start]
            .bytes()
            .all(|b| b == b' ' || b == b'\t');

        if !whole_line {
            return line_end;
        }

        // The indentation before the comment was pushed already.
        self.out.truncate_by(start - line_begin);

        if content[start..line_end].starts_with(&self.options.pause_marker) {
            return self.paused_region_end(content, line_end);
        }
        (line_end + 1).min(content.len())
    }

    /// End of a paused region whose marker line ends at `from`: just after
    /// the continue marker line, or the end of the file.
    fn paused_region_end(&self, content: &str, from: usize) -> usize {
        let mut line_start = from + 1;
        while line_start < content.len() {
            let line_end = content[line_start..]
                .find('\n')
                .map_or(content.len(), |p| line_start + p);
            if content[line_start..line_end]
                .trim_start()
                .starts_with(&self.options.continue_marker)
            {
                return (line_end + 1).min(content.len());
            }
            line_start = line_end + 1;
        }
        content.len()
    }
}
