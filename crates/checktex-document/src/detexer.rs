//! A small rule-based detexer
//!
//! [`BasicDetexer`] removes markup from a flat source so that prose checkers
//! see plain sentences. It understands enough LaTeX for typical papers:
//! control words, groups, inline and display math, environments,
//! references, citations and a handful of preamble commands. It does not
//! expand user macros.

use crate::config::DetexOptions;
use crate::detex::{CharMap, Detexer};
use crate::error::ParseError;
use crate::scan::{braced, bracketed, control_word_end, skip_star, verb_argument};

/// Bytes that interrupt a run of plain text.
const SPECIAL: &[u8] = b"\\{}~$%";

const REFERENCES: &[&str] = &[
    "ref", "eqref", "pageref", "autoref", "cref", "Cref", "vref", "nameref",
];

const CITATIONS: &[&str] = &[
    "cite",
    "citep",
    "citet",
    "parencite",
    "textcite",
    "autocite",
    "footcite",
    "citeauthor",
    "citeyear",
];

/// Commands removed together with this many braced arguments.
const DROPPED: &[(&str, usize)] = &[
    ("label", 1),
    ("usepackage", 1),
    ("documentclass", 1),
    ("includegraphics", 1),
    ("bibliography", 1),
    ("bibliographystyle", 1),
    ("addbibresource", 1),
    ("vspace", 1),
    ("hspace", 1),
    ("setlength", 2),
    ("pagestyle", 1),
    ("thispagestyle", 1),
    ("newcommand", 2),
    ("renewcommand", 2),
    ("newenvironment", 3),
    ("todo", 1),
    ("url", 1),
];

/// Braced arguments following `\begin{env}` that are not prose.
const ENVIRONMENT_ARGUMENTS: &[(&str, usize)] = &[
    ("tabular", 1),
    ("tabular*", 2),
    ("tabularx", 2),
    ("array", 1),
    ("minipage", 1),
];

#[derive(Debug, Clone, Default)]
pub struct BasicDetexer {
    options: DetexOptions,
}

impl BasicDetexer {
    pub fn new(options: DetexOptions) -> Self {
        BasicDetexer { options }
    }
}

impl Detexer for BasicDetexer {
    fn detex(&self, flat: &str) -> Result<(String, CharMap), ParseError> {
        let mut run = Run {
            flat,
            bytes: flat.as_bytes(),
            options: &self.options,
            out: Output::default(),
        };
        run.all();
        Ok((run.out.text, CharMap::from_zero_based(run.out.map)))
    }
}

#[derive(Default)]
struct Output {
    text: String,
    map: Vec<usize>,
}

impl Output {
    fn copy(&mut self, flat: &str, start: usize, end: usize) {
        self.text.push_str(&flat[start..end]);
        self.map.extend(start..end);
    }

    /// Emit `text` in place of the flat bytes `start..end`. Its bytes map
    /// to consecutive offsets of the replaced construct, the surplus to the
    /// construct's last byte.
    fn synth(&mut self, text: &str, start: usize, end: usize) {
        debug_assert!(start < end);
        self.text.push_str(text);
        self.map.extend((0..text.len()).map(|k| (start + k).min(end - 1)));
    }
}

struct Run<'a> {
    flat: &'a str,
    bytes: &'a [u8],
    options: &'a DetexOptions,
    out: Output,
}

impl Run<'_> {
    fn all(&mut self) {
        let len = self.bytes.len();
        let mut i = 0;
        while i < len {
            let next = self.bytes[i..]
                .iter()
                .position(|b| SPECIAL.contains(b))
                .map_or(len, |p| i + p);
            self.out.copy(self.flat, i, next);
            if next == len {
                break;
            }
            i = match self.bytes[next] {
                b'\\' => self.control(next),
                b'~' => {
                    self.out.synth(" ", next, next + 1);
                    next + 1
                }
                b'$' => self.dollar_math(next),
                b'%' => self.flat[next..].find('\n').map_or(len, |p| next + p),
                // braces
                _ => next + 1,
            };
        }
    }

    fn control(&mut self, start: usize) -> usize {
        let flat = self.flat;
        let options = self.options;
        let name_end = control_word_end(self.bytes, start + 1);
        if name_end == start + 1 {
            return self.control_symbol(start);
        }

        let name = &flat[start + 1..name_end];
        match name {
            "begin" => self.begin_environment(start, name_end),
            "end" => braced(self.bytes, name_end).map_or(name_end, |group| group.end),
            "ldots" | "dots" => {
                self.out.synth("...", start, name_end);
                name_end
            }
            "LaTeX" | "TeX" => {
                self.out.synth(name, start, name_end);
                name_end
            }
            "verb" => match verb_argument(self.bytes, name_end) {
                Some(group) => {
                    self.out.copy(flat, group.inner.start, group.inner.end);
                    group.end
                }
                None => name_end,
            },
            "item" => bracketed(self.bytes, name_end).map_or(name_end, |group| group.end),
            _ if REFERENCES.contains(&name) => {
                self.replace(start, name_end, 1, &options.reference_placeholder)
            }
            _ if CITATIONS.contains(&name) => {
                self.replace(start, name_end, 1, &options.citation_placeholder)
            }
            _ => match DROPPED.iter().find(|(dropped, _)| *dropped == name) {
                Some(&(_, count)) => skip_arguments(self.bytes, name_end, count),
                None => skip_star(self.bytes, name_end),
            },
        }
    }

    fn control_symbol(&mut self, start: usize) -> usize {
        let Some(c) = self.flat[start + 1..].chars().next() else {
            return start + 1;
        };
        let end = start + 1 + c.len_utf8();
        match c {
            '\\' => {
                self.out.synth(" ", start, end);
                bracketed(self.bytes, end).map_or(end, |group| group.end)
            }
            '%' | '&' | '$' | '#' | '_' | '{' | '}' => {
                self.out.copy(self.flat, start + 1, end);
                end
            }
            '(' => self.math_until(start, end, b"\\)"),
            '[' => self.math_until(start, end, b"\\]"),
            ',' | ';' | ' ' | '\n' => {
                self.out.synth(" ", start, end);
                end
            }
            // accents and other symbols
            _ => end,
        }
    }

    fn dollar_math(&mut self, start: usize) -> usize {
        let close: &[u8] = if self.bytes.get(start + 1) == Some(&b'$') {
            b"$$"
        } else {
            b"$"
        };
        self.math_until(start, start + close.len(), close)
    }

    /// Replace math opened at `start` and closed by `close` (searched from
    /// `from`) with the placeholder. Unterminated math only drops its
    /// opening delimiter.
    fn math_until(&mut self, start: usize, from: usize, close: &[u8]) -> usize {
        match find_unescaped(self.bytes, from, close) {
            Some(at) => {
                let end = at + close.len();
                self.out.synth(&self.options.math_placeholder, start, end);
                end
            }
            None => from,
        }
    }

    fn begin_environment(&mut self, start: usize, name_end: usize) -> usize {
        let Some(group) = braced(self.bytes, name_end) else {
            return name_end;
        };
        let flat = self.flat;
        let env = flat[group.inner].trim();
        let listed = |names: &[String]| names.iter().any(|name| name == env);

        if listed(&self.options.skip_environments) {
            return self.environment_end(group.end, env);
        }
        if listed(&self.options.math_environments) {
            let end = self.environment_end(group.end, env);
            self.out.synth(&self.options.math_placeholder, start, end);
            return end;
        }

        let mut pos = group.end;
        while let Some(option) = bracketed(self.bytes, pos) {
            pos = option.end;
        }
        let count = ENVIRONMENT_ARGUMENTS
            .iter()
            .find(|(name, _)| *name == env)
            .map_or(0, |&(_, count)| count);
        skip_arguments(self.bytes, pos, count)
    }

    /// Offset just after the `\end{env}` matching an environment whose body
    /// starts at `from`; the end of the input if there is none.
    fn environment_end(&self, from: usize, env: &str) -> usize {
        let end_tag = format!("\\end{{{}}}", env);
        self.flat[from..]
            .find(&end_tag)
            .map_or(self.flat.len(), |p| from + p + end_tag.len())
    }

    /// Replace a command and its arguments with `text`. A command without
    /// its argument is dropped.
    fn replace(&mut self, start: usize, name_end: usize, count: usize, text: &str) -> usize {
        let end = skip_arguments(self.bytes, name_end, count);
        if end > skip_star(self.bytes, name_end) {
            self.out.synth(text, start, end);
        }
        end
    }
}

/// Skip an optional star and up to `count` braced arguments, each of
/// which may be preceded by optional `[...]` arguments.
fn skip_arguments(bytes: &[u8], pos: usize, count: usize) -> usize {
    let mut pos = skip_star(bytes, pos);
    for _ in 0..count {
        let mut next = pos;
        while let Some(option) = bracketed(bytes, next) {
            next = option.end;
        }
        match braced(bytes, next) {
            Some(group) => pos = group.end,
            None => break,
        }
    }
    pos
}

/// First occurrence of `pattern` at or after `from` that is not part of a
/// control symbol.
fn find_unescaped(bytes: &[u8], from: usize, pattern: &[u8]) -> Option<usize> {
    let mut i = from;
    while i < bytes.len() {
        if bytes[i..].starts_with(pattern) {
            return Some(i);
        }
        i += if bytes[i] == b'\\' { 2 } else { 1 };
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detex::Detex;

    fn detex(flat: &str) -> Detex {
        Detex::from_source(flat, &BasicDetexer::default()).unwrap()
    }

    fn text(flat: &str) -> String {
        detex(flat).text().as_str().to_string()
    }

    /// Flat offset of the plain byte where `needle` starts.
    fn source_of(detex: &Detex, needle: &str) -> usize {
        let at = detex.text().as_str().find(needle).unwrap();
        detex.source_offset(at).unwrap()
    }

    #[test]
    fn test_plain_text_is_unchanged() {
        let flat = "Hello world.\nNext line";
        let detex = detex(flat);
        assert_eq!(detex.text().as_str(), flat);
        assert_eq!(detex.map().as_slice(), (0..flat.len()).collect::<Vec<_>>().as_slice());
    }

    #[test]
    fn test_macro_argument_maps_into_macro() {
        let flat = "\\emph{word} end";
        let detex = detex(flat);
        assert_eq!(detex.text().as_str(), "word end");
        assert_eq!(source_of(&detex, "word"), 6);
        assert_eq!(source_of(&detex, " end"), 11);
    }

    #[test]
    fn test_inline_math() {
        let detex = detex("a $x^2$ b");
        assert_eq!(detex.text().as_str(), "a X b");
        assert_eq!(source_of(&detex, "X"), 2);
        assert_eq!(source_of(&detex, " b"), 7);
    }

    #[test]
    fn test_other_math_forms() {
        assert_eq!(text("a $$x$$ b"), "a X b");
        assert_eq!(text("a \\(x\\) b"), "a X b");
        assert_eq!(text("a \\[x\\] b"), "a X b");
        assert_eq!(text("a $5\\$$ b"), "a X b");
        assert_eq!(text("\\begin{equation}\nx = 1\n\\end{equation}."), "X.");
    }

    #[test]
    fn test_reference_and_citation() {
        let detex = detex("see \\ref{fig:a}. \\cite[p.~3]{knuth}");
        assert_eq!(detex.text().as_str(), "see 0. [0]");
        assert_eq!(source_of(&detex, "0."), 4);
        assert_eq!(source_of(&detex, "."), 15);
        assert_eq!(&detex.map().as_slice()[7..], &[17, 18, 19]);
    }

    #[test]
    fn test_dropped_commands() {
        assert_eq!(text("Intro\\label{sec:intro} text"), "Intro text");
        assert_eq!(
            text("\\includegraphics[width=\\linewidth]{x.png}Caption"),
            "Caption"
        );
        assert_eq!(text("\\newcommand{\\foo}[1]{x #1}after"), "after");
        assert_eq!(text("\\vspace*{2mm}gap"), "gap");
        assert_eq!(text("\\section*{Intro}"), "Intro");
    }

    #[test]
    fn test_escapes_and_spacing() {
        assert_eq!(
            text("50\\% \\& more~text\\\\next"),
            "50% & more text next"
        );
        assert_eq!(text("a\\\\[2mm]b"), "a b");
        assert_eq!(text("\\ldots and \\LaTeX"), "... and LaTeX");
    }

    #[test]
    fn test_environments() {
        assert_eq!(
            text("a\n\\begin{verbatim}\n\\x $\n\\end{verbatim}\nb"),
            "a\n\nb"
        );
        assert_eq!(
            text("\\begin{tabular}{|c|c|}\na & b\n\\end{tabular}"),
            "\na & b\n"
        );
        assert_eq!(
            text("\\begin{figure}[ht]\nCap\n\\end{figure}"),
            "\nCap\n"
        );
        assert_eq!(text("\\begin{itemize}\n\\item[a)] First\n\\end{itemize}"), "\n First\n");
    }

    #[test]
    fn test_verb_content_is_copied() {
        let flat = "a \\verb|x%y| b";
        let detex = detex(flat);
        assert_eq!(detex.text().as_str(), "a x%y b");
        assert_eq!(source_of(&detex, "x%y"), flat.find('x').unwrap());
    }

    #[test]
    fn test_leftover_comment() {
        assert_eq!(text("a % c\nb"), "a \nb");
    }

    #[test]
    fn test_multibyte_text() {
        let flat = "Grüße \\textbf{Welt}";
        let detex = detex(flat);
        assert_eq!(detex.text().as_str(), "Grüße Welt");
        assert_eq!(source_of(&detex, "Welt"), flat.find("Welt").unwrap());
    }

    #[test]
    fn test_unterminated_constructs() {
        assert_eq!(text("cost $5"), "cost 5");
        assert_eq!(text("\\begin{comment}\nhidden"), "");
        assert_eq!(text("trailing \\"), "trailing ");
    }

    #[test]
    fn test_map_is_valid_on_mixed_input() {
        let flat = "\\documentclass{article}\n\\begin{document}\n\
                    Text with $m$ and \\cite{a}, see~\\ref{b}.\n\
                    %% comment\n\\end{document}\n";
        let detex = detex(flat);
        assert_eq!(
            detex.text().as_str(),
            "\n\nText with X and [0], see 0.\n\n\n"
        );
    }
}
