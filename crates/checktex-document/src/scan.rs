//! Byte-level scanning helpers shared by the flattener and the detexer

use std::ops::Range;

/// A `{...}` or `[...]` group found in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Group {
    /// Content between the delimiters
    pub inner: Range<usize>,
    /// Offset just after the closing delimiter
    pub end: usize,
}

pub(crate) fn skip_inline_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && matches!(bytes[pos], b' ' | b'\t') {
        pos += 1;
    }
    pos
}

/// End of the control word whose name starts at `pos` (just after the
/// backslash). Equals `pos` if there is no letter there.
pub(crate) fn control_word_end(bytes: &[u8], pos: usize) -> usize {
    pos + bytes[pos.min(bytes.len())..]
        .iter()
        .take_while(|b| b.is_ascii_alphabetic())
        .count()
}

pub(crate) fn skip_star(bytes: &[u8], pos: usize) -> usize {
    if bytes.get(pos) == Some(&b'*') {
        pos + 1
    } else {
        pos
    }
}

/// Parse the argument of `\verb` starting just after the command name: an
/// optional star, an ASCII delimiter that is neither a letter nor blank,
/// and everything up to the same delimiter on the same line.
pub(crate) fn verb_argument(bytes: &[u8], pos: usize) -> Option<Group> {
    let open = skip_star(bytes, pos);
    let delimiter = *bytes.get(open)?;
    if !delimiter.is_ascii_graphic() || delimiter.is_ascii_alphabetic() {
        return None;
    }
    let close = open
        + 1
        + bytes[open + 1..]
            .iter()
            .position(|&b| b == delimiter || b == b'\n')?;
    (bytes[close] == delimiter).then(|| Group {
        inner: open + 1..close,
        end: close + 1,
    })
}

/// Parse a brace group starting at `pos`, after optional spaces.
pub(crate) fn braced(bytes: &[u8], pos: usize) -> Option<Group> {
    delimited(bytes, pos, b'{', b'}')
}

/// Parse an optional `[...]` argument starting at `pos`, after optional
/// spaces. Braces inside the brackets are balanced, so `[{]}]` works.
pub(crate) fn bracketed(bytes: &[u8], pos: usize) -> Option<Group> {
    delimited(bytes, pos, b'[', b']')
}

fn delimited(bytes: &[u8], pos: usize, open: u8, close: u8) -> Option<Group> {
    let start = skip_inline_whitespace(bytes, pos);
    if bytes.get(start) != Some(&open) {
        return None;
    }
    let mut depth = 0usize;
    let mut braces = 0usize;
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b if b == open && (open == b'{' || braces == 0) => depth += 1,
            b if b == close && (close == b'}' || braces == 0) => {
                depth -= 1;
                if depth == 0 {
                    return Some(Group {
                        inner: start + 1..i,
                        end: i + 1,
                    });
                }
            }
            b'{' => braces += 1,
            b'}' => braces = braces.saturating_sub(1),
            _ => {}
        }
        i += 1;
    }
    None
}
