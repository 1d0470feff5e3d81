//! Find and replace across many documents.
//!
//! A search pass turns a set of `(key, text)` sources into line-level
//! [`SearchResult`]s. A replace pass takes a subset of those results and
//! rewrites the matching occurrences, either inside a live editor (through a
//! [`DocumentHost`]) or directly on disk.

use crate::editor::document::{read_text, write_text};
use crate::editor::EditorId;
use crate::error::{Error, Result};
use crate::search::matcher::Matcher;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Keys, sources and results
// ─────────────────────────────────────────────────────────────────────────────

/// Identity of a searched document: a file path, or an untitled editor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceKey {
    Path(PathBuf),
    Untitled(EditorId),
}

impl SourceKey {
    pub fn path(&self) -> Option<&Path> {
        match self {
            SourceKey::Path(path) => Some(path),
            SourceKey::Untitled(_) => None,
        }
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKey::Path(path) => write!(f, "{}", path.display()),
            SourceKey::Untitled(id) => write!(f, "Untitled-{}", id.raw()),
        }
    }
}

/// One document handed to a search pass.
#[derive(Debug, Clone)]
pub struct SearchSource {
    pub key: SourceKey,
    pub text: String,
}

/// One literal match on one line.
///
/// `match_start`/`match_end` are byte offsets into the untrimmed line;
/// `line_text` is trimmed for display. Stale once the text is edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub key: SourceKey,
    /// 1-based
    pub line_number: usize,
    pub line_text: String,
    pub match_start: usize,
    pub match_end: usize,
    /// Bytes of leading whitespace trimmed off `line_text`.
    pub trim_offset: usize,
}

impl SearchResult {
    /// The match as a byte range into `line_text`.
    pub fn display_range(&self) -> (usize, usize) {
        let len = self.line_text.len();
        let start = self.match_start.saturating_sub(self.trim_offset).min(len);
        let end = self.match_end.saturating_sub(self.trim_offset).min(len);
        (start, end.max(start))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub case_sensitive: bool,
    pub whole_word: bool,
}

/// Results for one document, in line then column order.
#[derive(Debug, Clone)]
pub struct FileMatches {
    pub key: SourceKey,
    pub results: Vec<SearchResult>,
}

/// Outcome of a search pass over a file set.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    /// Documents with at least one match, in source order.
    pub files: Vec<FileMatches>,
    pub files_searched: usize,
}

impl SearchOutcome {
    pub fn total_matches(&self) -> usize {
        self.files.iter().map(|f| f.results.len()).sum()
    }

    pub fn all_results(&self) -> impl Iterator<Item = &SearchResult> {
        self.files.iter().flat_map(|f| f.results.iter())
    }

    /// Status line for the results window.
    pub fn summary(&self) -> String {
        let total = self.total_matches();
        if total == 0 {
            "No matches found".to_string()
        } else {
            format!(
                "Found {} match(es) in {} file(s)",
                total,
                self.files.len()
            )
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Search
// ─────────────────────────────────────────────────────────────────────────────

/// Scan one document line by line. Lines split on `'\n'` only.
pub fn search_text(key: &SourceKey, text: &str, matcher: &Matcher<'_>) -> Vec<SearchResult> {
    let mut results = Vec::new();
    for (idx, line) in text.split('\n').enumerate() {
        let trim_offset = line.len() - line.trim_start().len();
        for (start, end) in matcher.find_in_line(line) {
            results.push(SearchResult {
                key: key.clone(),
                line_number: idx + 1,
                line_text: line.trim().to_string(),
                match_start: start,
                match_end: end,
                trim_offset,
            });
        }
    }
    results
}

/// Search every source for `needle`.
///
/// Fails with `EmptySearch` for an empty needle and `NoFilesToSearch` for an
/// empty file set, before looking at any text.
pub fn search_sources(
    sources: &[SearchSource],
    needle: &str,
    options: SearchOptions,
) -> Result<SearchOutcome> {
    if needle.is_empty() {
        return Err(Error::EmptySearch);
    }
    if sources.is_empty() {
        return Err(Error::NoFilesToSearch);
    }

    let matcher = Matcher::new(needle, options.case_sensitive, options.whole_word);
    let mut outcome = SearchOutcome {
        files: Vec::new(),
        files_searched: sources.len(),
    };
    for source in sources {
        let results = search_text(&source.key, &source.text, &matcher);
        if !results.is_empty() {
            outcome.files.push(FileMatches {
                key: source.key.clone(),
                results,
            });
        }
    }

    info!(
        "Searched {} document(s) for {:?}: {} match(es)",
        outcome.files_searched,
        needle,
        outcome.total_matches()
    );
    Ok(outcome)
}

// ─────────────────────────────────────────────────────────────────────────────
// Replace
// ─────────────────────────────────────────────────────────────────────────────

/// Access to documents that are open in editors.
pub trait DocumentHost {
    /// Every open document, one entry per key.
    fn list_open_documents(&self) -> Vec<SearchSource>;

    /// Live text of the editor showing `key`, if one is open.
    fn document_text(&self, key: &SourceKey) -> Option<String>;

    /// Replace the text of the editor showing `key` as a user edit (marks it
    /// modified and reaches its sync peers). Returns false if none is open.
    fn replace_document_text(&mut self, key: &SourceKey, text: &str) -> bool;
}

/// What a replace pass did.
#[derive(Debug, Default)]
pub struct ReplaceReport {
    /// Occurrences actually rewritten.
    pub replaced: usize,
    /// Documents whose text changed.
    pub files_changed: usize,
    /// Per-document failures; the pass continued past each of them.
    pub errors: Vec<(SourceKey, Error)>,
}

impl ReplaceReport {
    pub fn summary(&self) -> String {
        if self.replaced == 0 && self.errors.is_empty() {
            "No results to replace".to_string()
        } else {
            format!("Replaced {} occurrence(s)", self.replaced)
        }
    }
}

/// Apply `results` (all belonging to one document) to `text`.
///
/// Results are ordered by line, and within a line applied right to left so
/// earlier offsets stay valid. A result is applied only if the needle still
/// matches at exactly its `match_start`; otherwise it is skipped.
/// Returns the new text and the number of replacements made.
pub fn replace_in_text(
    text: &str,
    results: &[&SearchResult],
    needle: &str,
    replacement: &str,
    case_sensitive: bool,
) -> (String, usize) {
    let matcher = Matcher::new(needle, case_sensitive, false);
    let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();

    let mut ordered: Vec<&SearchResult> = results.to_vec();
    ordered.sort_by_key(|r| (r.line_number, r.match_start));
    ordered.dedup_by_key(|r| (r.line_number, r.match_start));

    let mut count = 0;
    for result in ordered.iter().rev() {
        let Some(line) = result
            .line_number
            .checked_sub(1)
            .and_then(|idx| lines.get_mut(idx))
        else {
            debug!("Skipping result past end of text: line {}", result.line_number);
            continue;
        };
        match matcher.match_len_at(line, result.match_start) {
            Some(len) => {
                line.replace_range(result.match_start..result.match_start + len, replacement);
                count += 1;
            }
            None => debug!(
                "Skipping stale result at {}:{}",
                result.line_number, result.match_start
            ),
        }
    }

    (lines.join("\n"), count)
}

/// Rewrite the selected results. Open documents are edited in their editor;
/// everything else is read from and written back to disk.
pub fn replace_in_files(
    host: &mut dyn DocumentHost,
    selected: &[SearchResult],
    needle: &str,
    replacement: &str,
    case_sensitive: bool,
) -> ReplaceReport {
    let mut report = ReplaceReport::default();
    if needle.is_empty() {
        return report;
    }

    let mut order: Vec<&SourceKey> = Vec::new();
    let mut by_key: HashMap<&SourceKey, Vec<&SearchResult>> = HashMap::new();
    for result in selected {
        by_key
            .entry(&result.key)
            .or_insert_with(|| {
                order.push(&result.key);
                Vec::new()
            })
            .push(result);
    }

    for key in order {
        let results = &by_key[key];
        match replace_in_document(host, key, results, needle, replacement, case_sensitive) {
            Ok(0) => {}
            Ok(n) => {
                report.replaced += n;
                report.files_changed += 1;
            }
            Err(err) => {
                warn!("Replace failed for {}: {}", key, err);
                report.errors.push((key.clone(), err));
            }
        }
    }

    info!(
        "Replaced {} occurrence(s) in {} document(s), {} error(s)",
        report.replaced,
        report.files_changed,
        report.errors.len()
    );
    report
}

fn replace_in_document(
    host: &mut dyn DocumentHost,
    key: &SourceKey,
    results: &[&SearchResult],
    needle: &str,
    replacement: &str,
    case_sensitive: bool,
) -> Result<usize> {
    if let Some(text) = host.document_text(key) {
        let (new_text, count) = replace_in_text(&text, results, needle, replacement, case_sensitive);
        if count > 0 {
            host.replace_document_text(key, &new_text);
        }
        return Ok(count);
    }

    let path = key.path().ok_or_else(|| {
        Error::Application(format!("{} is no longer open", key))
    })?;
    let text = read_text(path)?;
    let (new_text, count) = replace_in_text(&text, results, needle, replacement, case_sensitive);
    if count > 0 {
        write_text(path, &new_text)?;
    }
    Ok(count)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn source(name: &str, text: &str) -> SearchSource {
        SearchSource {
            key: SourceKey::Path(PathBuf::from(name)),
            text: text.to_string(),
        }
    }

    fn opts(case_sensitive: bool, whole_word: bool) -> SearchOptions {
        SearchOptions {
            case_sensitive,
            whole_word,
        }
    }

    /// In-memory host standing in for the split container.
    #[derive(Default)]
    struct MemoryHost {
        docs: Vec<SearchSource>,
    }

    impl DocumentHost for MemoryHost {
        fn list_open_documents(&self) -> Vec<SearchSource> {
            self.docs.clone()
        }

        fn document_text(&self, key: &SourceKey) -> Option<String> {
            self.docs
                .iter()
                .find(|d| &d.key == key)
                .map(|d| d.text.clone())
        }

        fn replace_document_text(&mut self, key: &SourceKey, text: &str) -> bool {
            match self.docs.iter_mut().find(|d| &d.key == key) {
                Some(doc) => {
                    doc.text = text.to_string();
                    true
                }
                None => false,
            }
        }
    }

    #[test]
    fn test_whole_word_counts() {
        let sources = [source("a.txt", "test testing tested\ntest\ntestable")];
        let loose = search_sources(&sources, "test", opts(false, false)).unwrap();
        assert_eq!(loose.total_matches(), 5);

        let strict = search_sources(&sources, "test", opts(false, true)).unwrap();
        assert_eq!(strict.total_matches(), 2);
        let lines: Vec<usize> = strict.all_results().map(|r| r.line_number).collect();
        assert_eq!(lines, vec![1, 2]);
    }

    #[test]
    fn test_case_sensitivity_counts() {
        let sources = [source("a.txt", "Hello hello HELLO")];
        let sensitive = search_sources(&sources, "hello", opts(true, false)).unwrap();
        assert_eq!(sensitive.total_matches(), 1);
        assert_eq!(sensitive.files[0].results[0].match_start, 6);

        let insensitive = search_sources(&sources, "hello", opts(false, false)).unwrap();
        assert_eq!(insensitive.total_matches(), 3);
    }

    #[test]
    fn test_results_are_ordered_and_trimmed() {
        let sources = [source("a.txt", "  foo bar foo  \nfoo")];
        let outcome = search_sources(&sources, "foo", opts(true, false)).unwrap();
        let results: Vec<_> = outcome.all_results().collect();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].line_text, "foo bar foo");
        assert_eq!((results[0].match_start, results[0].match_end), (2, 5));
        assert_eq!(results[1].match_start, 10);
        assert_eq!(results[1].display_range(), (8, 11));
        assert_eq!(results[2].line_number, 2);
    }

    #[test]
    fn test_empty_needle_is_an_error() {
        let sources = [source("a.txt", "abc")];
        assert!(matches!(
            search_sources(&sources, "", opts(false, false)),
            Err(Error::EmptySearch)
        ));
    }

    #[test]
    fn test_no_sources_is_an_error() {
        assert!(matches!(
            search_sources(&[], "abc", opts(false, false)),
            Err(Error::NoFilesToSearch)
        ));
    }

    #[test]
    fn test_summary_text() {
        let sources = [source("a.txt", "x y x"), source("b.txt", "none")];
        let outcome = search_sources(&sources, "x", opts(false, false)).unwrap();
        assert_eq!(outcome.summary(), "Found 2 match(es) in 1 file(s)");
        let outcome = search_sources(&sources, "zzz", opts(false, false)).unwrap();
        assert_eq!(outcome.summary(), "No matches found");
    }

    #[test]
    fn test_untitled_key_display() {
        let key = SourceKey::Untitled(EditorId::from_raw(7));
        assert_eq!(key.to_string(), "Untitled-7");
        assert!(key.path().is_none());
    }

    #[test]
    fn test_replace_three_on_one_line() {
        let text = "Hello World Hello Hello";
        let key = SourceKey::Path(PathBuf::from("a.txt"));
        let results = search_text(&key, text, &Matcher::new("Hello", true, false));
        let refs: Vec<&SearchResult> = results.iter().collect();
        let (new_text, count) = replace_in_text(text, &refs, "Hello", "Hi", true);
        assert_eq!(new_text, "Hi World Hi Hi");
        assert_eq!(count, 3);
    }

    #[test]
    fn test_replace_multiple_per_line_case_insensitive() {
        let text = "test Test tEST";
        let key = SourceKey::Path(PathBuf::from("a.txt"));
        let results = search_text(&key, text, &Matcher::new("test", false, false));
        let refs: Vec<&SearchResult> = results.iter().collect();
        let (new_text, count) = replace_in_text(text, &refs, "test", "TEST", false);
        assert_eq!(new_text, "TEST TEST TEST");
        assert_eq!(count, 3);
    }

    #[test]
    fn test_replace_with_needle_is_identity() {
        let texts = [
            "alpha beta alpha\n\nalphaalpha  alpha",
            "aaaa\naa a",
            "Ünïcode ünïcode ÜNÏCODE",
        ];
        for (text, needle) in texts.iter().zip(["alpha", "aa", "ünïcode"]) {
            let key = SourceKey::Path(PathBuf::from("t.txt"));
            for case_sensitive in [true, false] {
                let matcher = Matcher::new(needle, case_sensitive, false);
                let results = search_text(&key, text, &matcher);
                let refs: Vec<&SearchResult> = results.iter().collect();
                let (new_text, _) = replace_in_text(text, &refs, needle, needle, case_sensitive);
                if case_sensitive {
                    assert_eq!(&new_text, text);
                } else {
                    assert_eq!(new_text.to_lowercase(), text.to_lowercase());
                }
            }
        }
    }

    #[test]
    fn test_stale_result_is_skipped() {
        let key = SourceKey::Path(PathBuf::from("a.txt"));
        let stale = SearchResult {
            key,
            line_number: 1,
            line_text: "foo".to_string(),
            match_start: 4,
            match_end: 7,
            trim_offset: 0,
        };
        let (new_text, count) = replace_in_text("foo bar", &[&stale], "foo", "x", true);
        assert_eq!(new_text, "foo bar");
        assert_eq!(count, 0);

        let past_end = SearchResult {
            line_number: 9,
            ..stale
        };
        let (_, count) = replace_in_text("foo", &[&past_end], "foo", "x", true);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_replace_routes_open_documents_to_host() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("open.txt");
        fs::write(&path, "on disk foo").unwrap();

        let mut host = MemoryHost::default();
        host.docs.push(SearchSource {
            key: SourceKey::Path(path.clone()),
            text: "in editor foo".to_string(),
        });

        let outcome =
            search_sources(&host.list_open_documents(), "foo", opts(true, false)).unwrap();
        let selected: Vec<SearchResult> = outcome.all_results().cloned().collect();
        let report = replace_in_files(&mut host, &selected, "foo", "bar", true);

        assert_eq!(report.replaced, 1);
        assert_eq!(host.docs[0].text, "in editor bar");
        assert_eq!(fs::read_to_string(&path).unwrap(), "on disk foo");
    }

    #[test]
    fn test_replace_on_disk_and_continue_past_errors() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.txt");
        let gone = dir.path().join("gone.txt");
        fs::write(&good, "one two one").unwrap();
        fs::write(&gone, "one").unwrap();

        let sources = [
            SearchSource {
                key: SourceKey::Path(gone.clone()),
                text: "one".to_string(),
            },
            SearchSource {
                key: SourceKey::Path(good.clone()),
                text: "one two one".to_string(),
            },
        ];
        let outcome = search_sources(&sources, "one", opts(true, false)).unwrap();
        let selected: Vec<SearchResult> = outcome.all_results().cloned().collect();
        fs::remove_file(&gone).unwrap();

        let mut host = MemoryHost::default();
        let report = replace_in_files(&mut host, &selected, "one", "1", true);

        assert_eq!(report.replaced, 2);
        assert_eq!(report.files_changed, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].0, SourceKey::Path(gone));
        assert_eq!(fs::read_to_string(&good).unwrap(), "1 two 1");
        assert_eq!(report.summary(), "Replaced 2 occurrence(s)");
    }

    #[test]
    fn test_replace_subset_only() {
        let mut host = MemoryHost::default();
        host.docs.push(source("a.txt", "x x x"));
        let outcome =
            search_sources(&host.list_open_documents(), "x", opts(true, false)).unwrap();
        let middle = vec![outcome.files[0].results[1].clone()];

        let report = replace_in_files(&mut host, &middle, "x", "y", true);

        assert_eq!(report.replaced, 1);
        assert_eq!(host.docs[0].text, "x y x");
    }

    #[test]
    fn test_empty_selection_summary() {
        let mut host = MemoryHost::default();
        let report = replace_in_files(&mut host, &[], "x", "y", true);
        assert_eq!(report.summary(), "No results to replace");
    }
}
