//! Text manipulation utilities for working with annotation text.

/// Check if a character is considered part of a word (identifier).
///
/// Uses Unicode Standard Annex #31 rules for identifier characters, so codes like
/// `ação` or `café_shop` are single words.
#[inline]
pub fn is_word_character(c: char) -> bool {
    unicode_ident::is_xid_continue(c)
}

/// Find the boundaries of a word at the given position.
///
/// Returns `Some((start, end))` where `start` is the character index of the word start
/// and `end` is the character index after the last word character.
/// Returns `None` if there is no word at the position.
pub fn find_word_boundaries(chars: &[char], position: usize) -> Option<(usize, usize)> {
    if position >= chars.len() || !is_word_character(chars[position]) {
        return None;
    }

    let mut start = position;
    while start > 0 && is_word_character(chars[start - 1]) {
        start -= 1;
    }

    let mut end = position;
    while end < chars.len() && is_word_character(chars[end]) {
        end += 1;
    }

    Some((start, end))
}

/// Extract the word (identifier) at the cursor position in a line of text.
///
/// # Example
/// ```
/// use synesis::core::text_utils::extract_word_at_cursor;
///
/// let line = "codigo: proposito, vocacao";
/// assert_eq!(extract_word_at_cursor(line, 9), Some("proposito".to_string()));
/// assert_eq!(extract_word_at_cursor(line, 6), None); // ':'
/// ```
pub fn extract_word_at_cursor(line: &str, position: usize) -> Option<String> {
    let chars: Vec<char> = line.chars().collect();
    let (start, end) = find_word_boundaries(&chars, position)?;
    Some(chars[start..end].iter().collect())
}

/// Extract the symbol at the cursor, keeping a leading reference `prefix` (`@`).
///
/// Returns the symbol text and its `[start, end)` char range in the line. The cursor
/// may sit on the prefix itself.
///
/// # Example
/// ```
/// use synesis::core::text_utils::extract_symbol_at_cursor;
///
/// let line = "SOURCE @entrevista01";
/// assert_eq!(
///     extract_symbol_at_cursor(line, 9, '@'),
///     Some(("@entrevista01".to_string(), 7, 20))
/// );
/// ```
pub fn extract_symbol_at_cursor(
    line: &str,
    position: usize,
    prefix: char,
) -> Option<(String, usize, usize)> {
    let chars: Vec<char> = line.chars().collect();
    let position = if chars.get(position) == Some(&prefix) {
        position + 1
    } else {
        position
    };
    let (mut start, end) = find_word_boundaries(&chars, position)?;
    if start > 0 && chars[start - 1] == prefix {
        start -= 1;
    }
    Some((chars[start..end].iter().collect(), start, end))
}

/// Char offsets of every occurrence of `token` in `text` that sits on word boundaries.
///
/// Matching is case-sensitive. A boundary is only required on a side where the
/// token itself starts/ends with a word character, so `@r1` still matches in `(@r1)`.
/// `r1` does not match inside `r1x` or `xr1`.
///
/// # Example
/// ```
/// use synesis::core::text_utils::find_word_matches;
///
/// assert_eq!(find_word_matches("alpha, alphabet, alpha", "alpha"), vec![0, 17]);
/// ```
pub fn find_word_matches(text: &str, token: &str) -> Vec<usize> {
    let (Some(first), Some(last)) = (token.chars().next(), token.chars().next_back()) else {
        return Vec::new();
    };
    let check_left = is_word_character(first);
    let check_right = is_word_character(last);

    let mut offsets = Vec::new();
    let mut char_offset = 0;
    let mut counted_to = 0;

    for (byte, _) in text.match_indices(token) {
        char_offset += text[counted_to..byte].chars().count();
        counted_to = byte;

        let before = text[..byte].chars().next_back();
        let after = text[byte + token.len()..].chars().next();
        let left_ok = !check_left || !before.is_some_and(is_word_character);
        let right_ok = !check_right || !after.is_some_and(is_word_character);

        if left_ok && right_ok {
            offsets.push(char_offset);
        }
    }

    offsets
}

/// Collapse every run of whitespace into a single space and trim the ends.
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a bibliographic reference for lookup: strip leading `prefix`
/// characters and surrounding whitespace, lowercase.
///
/// ```
/// use synesis::core::text_utils::normalize_reference;
///
/// assert_eq!(normalize_reference(" @Smith2019 ", '@'), "smith2019");
/// assert_eq!(normalize_reference("smith2019", '@'), "smith2019");
/// ```
pub fn normalize_reference(value: &str, prefix: char) -> String {
    value
        .trim()
        .trim_start_matches(prefix)
        .trim()
        .to_lowercase()
}

/// Normalize a code for case-insensitive lookup.
pub fn normalize_code(value: &str) -> String {
    collapse_whitespace(value).to_lowercase()
}

/// Replace every char outside `[A-Za-z0-9_]` with `_`.
///
/// Used for graph node identifiers that are embedded in diagram source.
pub fn sanitize_id(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
