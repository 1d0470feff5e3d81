//! UTF-8 Safe String Utilities
//!
//! Editor positions coming out of egui are character indices, while search
//! results and `str` slicing work in byte offsets. These helpers convert
//! between the two and answer line/column questions about a buffer without
//! ever slicing inside a multi-byte character.

// ─────────────────────────────────────────────────────────────────────────────
// Character Boundary Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Returns the largest index that is less than or equal to `index`
/// and is on a UTF-8 character boundary.
///
/// If `index` is greater than the string length, returns the string length.
#[inline]
pub fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Returns the smallest index that is greater than or equal to `index`
/// and is on a UTF-8 character boundary.
#[inline]
pub fn ceil_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// Safely slice a string from `start` to `end`, adjusting indices to
/// valid UTF-8 character boundaries.
///
/// If `start >= end` after adjustment, returns an empty string.
#[inline]
pub fn safe_slice(s: &str, start: usize, end: usize) -> &str {
    let start = floor_char_boundary(s, start);
    let end = ceil_char_boundary(s, end);

    if start >= end {
        return "";
    }

    &s[start..end]
}

// ─────────────────────────────────────────────────────────────────────────────
// Index Conversion Utilities
// ─────────────────────────────────────────────────────────────────────────────

/// Convert a character index to a byte index.
///
/// Returns the string length if `char_index` is beyond the string.
pub fn char_index_to_byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Convert a byte index to a character index.
///
/// A byte index in the middle of a character counts up to (but not
/// including) that character.
pub fn byte_index_to_char_index(s: &str, byte_index: usize) -> usize {
    let byte_index = floor_char_boundary(s, byte_index);
    s[..byte_index].chars().count()
}

// ─────────────────────────────────────────────────────────────────────────────
// Line Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// 1-based (line, column) of a character index. Lines split on `'\n'`.
pub fn line_col_at(s: &str, char_index: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for (i, ch) in s.chars().enumerate() {
        if i >= char_index {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

/// Number of lines in the buffer. An empty buffer has one (empty) line.
pub fn line_count(s: &str) -> usize {
    s.split('\n').count()
}

/// Character range `[start, end)` of the 0-based line `line`, excluding the
/// trailing newline. Returns `None` if the line does not exist.
pub fn line_char_range(s: &str, line: usize) -> Option<(usize, usize)> {
    let mut start = 0;
    for (idx, text) in s.split('\n').enumerate() {
        let len = text.chars().count();
        if idx == line {
            return Some((start, start + len));
        }
        start += len + 1;
    }
    None
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_and_ceil_norwegian() {
        let s = "Hei på deg"; // 'å' at byte 5-6 (2 bytes)
        assert_eq!(floor_char_boundary(s, 6), 5);
        assert_eq!(ceil_char_boundary(s, 6), 7);
        assert_eq!(floor_char_boundary(s, 100), s.len());
    }

    #[test]
    fn test_safe_slice_emoji() {
        let s = "Hi🎉Bye";
        assert_eq!(safe_slice(s, 2, 6), "🎉");
        assert_eq!(safe_slice(s, 3, 5), "🎉");
        assert_eq!(safe_slice(s, 5, 3), "");
    }

    #[test]
    fn test_index_conversions() {
        let s = "Hei på";
        assert_eq!(char_index_to_byte_index(s, 5), 5);
        assert_eq!(char_index_to_byte_index(s, 6), 7);
        assert_eq!(char_index_to_byte_index(s, 100), 7);
        assert_eq!(byte_index_to_char_index(s, 6), 5);
        assert_eq!(byte_index_to_char_index(s, 7), 6);
    }

    #[test]
    fn test_line_col_at() {
        let s = "ab\ncd\n\nx";
        assert_eq!(line_col_at(s, 0), (1, 1));
        assert_eq!(line_col_at(s, 2), (1, 3));
        assert_eq!(line_col_at(s, 3), (2, 1));
        assert_eq!(line_col_at(s, 6), (3, 1));
        assert_eq!(line_col_at(s, 7), (4, 1));
        assert_eq!(line_col_at(s, 99), (4, 2));
    }

    #[test]
    fn test_line_char_range() {
        let s = "one\ntwø\n";
        assert_eq!(line_char_range(s, 0), Some((0, 3)));
        assert_eq!(line_char_range(s, 1), Some((4, 7)));
        assert_eq!(line_char_range(s, 2), Some((8, 8)));
        assert_eq!(line_char_range(s, 3), None);
        assert_eq!(line_count(s), 3);
        assert_eq!(line_count(""), 1);
    }
}
