//! Literal substring matching with case folding and the whole-word rule.
//!
//! All offsets are byte offsets into the haystack as given. Case-insensitive
//! comparison folds one character at a time, so offsets always point into the
//! original text even when lower-casing would change its byte length.

/// Literal matcher for one needle and one set of options.
#[derive(Debug, Clone)]
pub struct Matcher<'n> {
    needle: &'n str,
    case_sensitive: bool,
    whole_word: bool,
}

impl<'n> Matcher<'n> {
    pub fn new(needle: &'n str, case_sensitive: bool, whole_word: bool) -> Self {
        Self {
            needle,
            case_sensitive,
            whole_word,
        }
    }

    /// If the needle matches at byte offset `pos` (ignoring the whole-word
    /// rule), return the byte offset where the match ends.
    pub fn match_len_at(&self, haystack: &str, pos: usize) -> Option<usize> {
        if self.needle.is_empty() || pos > haystack.len() || !haystack.is_char_boundary(pos) {
            return None;
        }
        let rest = &haystack[pos..];
        if self.case_sensitive {
            return rest.starts_with(self.needle).then_some(self.needle.len());
        }

        let mut consumed = 0;
        let mut hay = rest.chars();
        for n in self.needle.chars() {
            let h = hay.next()?;
            if !h.to_lowercase().eq(n.to_lowercase()) {
                return None;
            }
            consumed += h.len_utf8();
        }
        Some(consumed)
    }

    /// Like [`match_len_at`](Self::match_len_at) but also enforcing the
    /// whole-word rule when enabled. Returns the end offset.
    pub fn match_at(&self, haystack: &str, pos: usize) -> Option<usize> {
        let len = self.match_len_at(haystack, pos)?;
        let end = pos + len;
        if self.whole_word && !is_whole_word(haystack, pos, end) {
            return None;
        }
        Some(end)
    }

    /// Every match in `line`, scanning left to right and resuming one
    /// character after each candidate, so overlapping matches are reported.
    pub fn find_in_line(&self, line: &str) -> Vec<(usize, usize)> {
        self.scan(line, true)
    }

    /// Non-overlapping matches over arbitrary text: after a match the scan
    /// resumes at its end.
    pub fn find_non_overlapping(&self, text: &str) -> Vec<(usize, usize)> {
        self.scan(text, false)
    }

    fn scan(&self, text: &str, overlapping: bool) -> Vec<(usize, usize)> {
        let mut found = Vec::new();
        if self.needle.is_empty() {
            return found;
        }
        let mut pos = 0;
        while pos < text.len() {
            let Some(candidate) = self.next_candidate(text, pos) else {
                break;
            };
            let advance = next_char_boundary(text, candidate);
            match self.match_at(text, candidate) {
                Some(end) => {
                    found.push((candidate, end));
                    pos = if overlapping { advance } else { end.max(advance) };
                }
                None => pos = advance,
            }
        }
        found
    }

    /// Next offset at or after `from` where the needle matches, ignoring
    /// the whole-word rule.
    fn next_candidate(&self, text: &str, from: usize) -> Option<usize> {
        if self.case_sensitive {
            return text[from..].find(self.needle).map(|p| from + p);
        }
        text[from..]
            .char_indices()
            .map(|(i, _)| from + i)
            .find(|&p| self.match_len_at(text, p).is_some())
    }
}

fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map(|c| pos + c.len_utf8())
        .unwrap_or(text.len())
}

/// A match `[start, end)` is whole-word when the characters on both sides
/// are absent or not alphanumeric. Underscore is not alphanumeric here.
pub fn is_whole_word(line: &str, start: usize, end: usize) -> bool {
    let before_ok = line[..start]
        .chars()
        .next_back()
        .map_or(true, |c| !c.is_alphanumeric());
    let after_ok = line[end..]
        .chars()
        .next()
        .map_or(true, |c| !c.is_alphanumeric());
    before_ok && after_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_sensitive_vs_insensitive() {
        let line = "Hello hello HELLO";
        assert_eq!(Matcher::new("hello", true, false).find_in_line(line), vec![(6, 11)]);
        assert_eq!(
            Matcher::new("hello", false, false).find_in_line(line),
            vec![(0, 5), (6, 11), (12, 17)]
        );
    }

    #[test]
    fn test_overlapping_matches() {
        assert_eq!(
            Matcher::new("aa", true, false).find_in_line("aaaa"),
            vec![(0, 2), (1, 3), (2, 4)]
        );
        assert_eq!(
            Matcher::new("aa", true, false).find_non_overlapping("aaaa"),
            vec![(0, 2), (2, 4)]
        );
    }

    #[test]
    fn test_whole_word_rule() {
        let m = Matcher::new("test", true, true);
        assert_eq!(m.find_in_line("test testing tested"), vec![(0, 4)]);
        assert_eq!(m.find_in_line("a_test_b"), vec![(2, 6)]);
        assert!(m.find_in_line("attest").is_empty());
        assert!(m.find_in_line("test1").is_empty());
    }

    #[test]
    fn test_is_whole_word_inside_word() {
        // "est" inside "test"
        assert!(!is_whole_word("test", 1, 4));
        assert!(is_whole_word("(test)", 1, 5));
        assert!(is_whole_word("test", 0, 4));
    }

    #[test]
    fn test_unicode_letters_are_word_chars() {
        let m = Matcher::new("på", true, true);
        assert!(m.find_in_line("påø").is_empty());
        assert_eq!(m.find_in_line("si på!"), vec![(3, 6)]);
    }

    #[test]
    fn test_case_folding_keeps_original_offsets() {
        // 'İ' lower-cases to two chars; offsets must still index the line.
        let line = "İx ÅSE åse";
        let found = Matcher::new("åse", false, false).find_in_line(line);
        assert_eq!(found.len(), 2);
        for (s, e) in found {
            assert!(line[s..e].to_lowercase() == "åse");
        }
    }

    #[test]
    fn test_match_at() {
        let m = Matcher::new("hello", false, false);
        assert_eq!(m.match_at("say HELLO", 4), Some(9));
        assert_eq!(m.match_at("say HELLO", 3), None);
        assert_eq!(m.match_at("say HELLO", 99), None);
    }

    #[test]
    fn test_empty_needle_finds_nothing() {
        assert!(Matcher::new("", false, false).find_in_line("abc").is_empty());
    }
}
