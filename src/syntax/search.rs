//! Find and caret-line helpers for the host's decoration layer
//!
//! Results are character ranges, like classifier spans, so the host paints
//! them through the same offset conversion. The classifier never produces
//! these ranges; the host tags them `search` and `active_line`.

use regex::Regex;

use super::rules::compile;
use super::text_index::TextIndex;

fn needle_regex(needle: &str) -> Option<Regex> {
    if needle.is_empty() {
        return None;
    }
    compile(&regex::escape(needle), "i").ok()
}

/// Next case-insensitive occurrence of `needle` after the caret at `from`
///
/// Wraps to the start of the buffer when nothing follows the caret.
pub fn find_next(text: &str, needle: &str, from: usize) -> Option<(usize, usize)> {
    let re = needle_regex(needle)?;
    let index = TextIndex::new(text);
    let start = (from + 1).min(index.char_len());

    let m = re
        .find_at(text, index.byte_offset(start))
        .or_else(|| re.find(text))?;
    Some((index.char_offset(m.start()), index.char_offset(m.end())))
}

/// Last case-insensitive occurrence of `needle` starting before `from`
///
/// Does not wrap.
pub fn find_prev(text: &str, needle: &str, from: usize) -> Option<(usize, usize)> {
    let re = needle_regex(needle)?;
    let index = TextIndex::new(text);
    let limit = index.byte_offset(from);

    let mut found = None;
    let mut pos = 0;
    while let Some(m) = re.find_at(text, pos) {
        if m.start() >= limit {
            break;
        }
        found = Some(m);
        pos = text[m.start()..]
            .chars()
            .next()
            .map_or(text.len(), |c| m.start() + c.len_utf8());
        if pos >= text.len() {
            break;
        }
    }
    found.map(|m| (index.char_offset(m.start()), index.char_offset(m.end())))
}

/// Character range of the line holding the caret, newline included
pub fn active_line(text: &str, offset: usize) -> (usize, usize) {
    let index = TextIndex::new(text);
    let (line, _) = index.line_col(offset);
    index
        .line_range(line)
        .unwrap_or((index.char_len(), index.char_len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_next_is_case_insensitive() {
        let text = "Alpha beta ALPHA";
        assert_eq!(find_next(text, "alpha", 0), Some((11, 16)));
    }

    #[test]
    fn test_find_next_wraps() {
        let text = "one two one";
        assert_eq!(find_next(text, "one", 8), Some((0, 3)));
        assert_eq!(find_next(text, "two", 4), Some((4, 7)));
        assert_eq!(find_next(text, "three", 0), None);
        assert_eq!(find_next(text, "", 0), None);
    }

    #[test]
    fn test_find_next_escapes_needle() {
        assert_eq!(find_next("a.b axb", "x", 0), Some((5, 6)));
        assert_eq!(find_next("(x) [y]", "[y]", 0), Some((4, 7)));
    }

    #[test]
    fn test_find_prev() {
        let text = "ab ab ab";
        assert_eq!(find_prev(text, "ab", 6), Some((3, 5)));
        assert_eq!(find_prev(text, "AB", 7), Some((6, 8)));
        assert_eq!(find_prev(text, "ab", 0), None);
    }

    #[test]
    fn test_offsets_are_characters() {
        assert_eq!(find_next("été café", "CAFÉ", 0), Some((4, 8)));
        assert_eq!(find_prev("été café", "é", 8), Some((7, 8)));
    }

    #[test]
    fn test_active_line() {
        let text = "first\nsecond\nthird";
        assert_eq!(active_line(text, 0), (0, 6));
        assert_eq!(active_line(text, 8), (6, 13));
        assert_eq!(active_line(text, 15), (13, 18));
        assert_eq!(active_line(text, 99), (13, 18));
        assert_eq!(active_line("", 0), (0, 0));
    }
}
