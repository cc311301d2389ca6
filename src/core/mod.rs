pub mod text_utils;

pub use text_utils::{
    collapse_whitespace, extract_symbol_at_cursor, extract_word_at_cursor, find_word_matches,
    is_word_character, normalize_code, normalize_reference, sanitize_id,
};
