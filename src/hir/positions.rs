//! Position resolution for tokens inside (possibly multi-line) field values.
//!
//! A field value starts at some `(line, column)` in its file. A token found on the
//! first physical line of the value is offset from that column; a token on any later
//! line is offset from column 1.

use crate::base::LineCol;
use crate::core::text_utils::find_word_matches;

/// Absolute position of the char at `char_offset` inside `text`.
pub fn offset_position(start: LineCol, text: &str, char_offset: usize) -> LineCol {
    let mut line_offset = 0u32;
    let mut column_offset = 0u32;

    for c in text.chars().take(char_offset) {
        if c == '\n' {
            line_offset += 1;
            column_offset = 0;
        } else {
            column_offset += 1;
        }
    }

    start.advance(line_offset, column_offset)
}

/// Positions of every word-boundary occurrence of `token` in `text`, in order.
///
/// Repeated occurrences resolve independently, one position each.
pub fn token_positions(start: LineCol, text: &str, token: &str) -> Vec<LineCol> {
    text.split('\n')
        .enumerate()
        .flat_map(|(line_index, line)| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            find_word_matches(line, token)
                .into_iter()
                .map(move |offset| start.advance(line_index as u32, offset as u32))
        })
        .collect()
}

/// Position of the `occurrence`-th (0-based) match of `token` in `text`.
pub fn resolve_token_position(
    start: LineCol,
    text: &str,
    token: &str,
    occurrence: usize,
) -> Option<LineCol> {
    token_positions(start, text, token).into_iter().nth(occurrence)
}
