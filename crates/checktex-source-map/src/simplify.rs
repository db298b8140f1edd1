//! Collapsing scattered positions into a single-line range

use crate::types::TextPosition;

/// Collapse inclusive positions of one file into a simple range.
///
/// The result lies on a single line and may be shorter than the input. The
/// last line touched by `positions` is used, unless it holds only a single
/// position while the line before it holds several; a lone trailing
/// character is usually the line break that ended the interesting part.
///
/// Returns `(begin, end)` with an exclusive `end`, or `None` if `positions`
/// is empty.
///
/// # Example
///
/// ```
/// use checktex_source_map::{simplify_text_range, TextPosition};
///
/// let positions = [
///     TextPosition::new(4, 1, 0),
///     TextPosition::new(5, 1, 1),
///     TextPosition::new(6, 1, 2),
/// ];
/// let (begin, end) = simplify_text_range(positions).unwrap();
/// assert_eq!((begin.offset, end.offset), (4, 7));
/// ```
pub fn simplify_text_range(
    positions: impl IntoIterator<Item = TextPosition>,
) -> Option<(TextPosition, TextPosition)> {
    let positions: Vec<TextPosition> = positions.into_iter().collect();
    let max_line = positions.iter().map(|p| p.line).max()?;

    let on_line = |line: usize| -> Vec<TextPosition> {
        positions.iter().copied().filter(|p| p.line == line).collect()
    };

    let mut chosen = on_line(max_line);
    if chosen.len() == 1 {
        let previous = max_line.checked_sub(1).map(on_line).unwrap_or_default();
        if previous.len() <= 1 {
            let only = chosen[0];
            return Some((only, only.virtual_next()));
        }
        chosen = previous;
    }

    let begin = chosen.iter().copied().min()?;
    let end = chosen.iter().copied().max()?.virtual_next();
    Some((begin, end))
}
