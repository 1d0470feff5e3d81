//! Editor surface: one editable document plus its caret, selection and
//! undo history.
//!
//! Positions are character indices, which is what the egui text widget
//! reports. Every text change goes through one of three doors:
//!
//! - user edits (`replace_range`, `set_text`, line operations, undo/redo,
//!   `commit_widget_edit`) mark the document modified and publish
//!   `TextChanged`;
//! - `replace_text_silently` is the sync replay path and never publishes
//!   `TextChanged`;
//! - `load_file` / `load_content` replace the whole document.
//!
//! Fan-out to other panes is not done here; the split container listens for
//! the return value of user edits and pushes the text to peers.

use crate::editor::document::{absolute_path, read_text, write_text, Document};
use crate::error::{Error, Result};
use crate::events::{EditorEvent, EventBus};
use crate::string_utils::{char_index_to_byte_index, line_char_range, line_col_at, line_count};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Maximum undo history size per editor.
const MAX_UNDO: usize = 100;

static NEXT_EDITOR_ID: AtomicUsize = AtomicUsize::new(1);

// ─────────────────────────────────────────────────────────────────────────────
// EditorId
// ─────────────────────────────────────────────────────────────────────────────

/// Process-unique editor identity. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EditorId(usize);

impl EditorId {
    fn next() -> Self {
        EditorId(NEXT_EDITOR_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[cfg(test)]
    pub(crate) fn from_raw(raw: usize) -> Self {
        EditorId(raw)
    }

    pub fn raw(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Snapshot {
    text: String,
    caret: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// EditorSurface
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct EditorSurface {
    id: EditorId,
    doc: Document,
    /// Selection anchor (char index). Equal to `head` when nothing is selected.
    anchor: usize,
    /// Caret position (char index).
    head: usize,
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    /// Bumped whenever the text changes behind the widget's back.
    content_version: u64,
    /// Selection the widget must adopt on its next frame.
    selection_request: Option<(usize, usize)>,
    needs_focus: bool,
    last_cursor: (usize, usize),
    /// Counts user edits; the split container compares it to decide
    /// whether sync peers need the new text.
    edit_generation: u64,
    bus: EventBus,
}

impl EditorSurface {
    /// A fresh untitled, empty editor.
    pub fn new(bus: EventBus) -> Self {
        Self::with_document(bus, Document::new())
    }

    pub fn with_document(bus: EventBus, doc: Document) -> Self {
        Self {
            id: EditorId::next(),
            doc,
            anchor: 0,
            head: 0,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            content_version: 0,
            selection_request: None,
            needs_focus: true,
            last_cursor: (1, 1),
            edit_generation: 0,
            bus,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> EditorId {
        self.id
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn text(&self) -> &str {
        &self.doc.text
    }

    pub fn path(&self) -> Option<&Path> {
        self.doc.path.as_deref()
    }

    pub fn is_modified(&self) -> bool {
        self.doc.modified
    }

    pub fn display_name(&self) -> String {
        self.doc.display_name()
    }

    pub fn content_version(&self) -> u64 {
        self.content_version
    }

    pub fn edit_generation(&self) -> u64 {
        self.edit_generation
    }

    fn char_len(&self) -> usize {
        self.doc.text.chars().count()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Modified flag
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_modified(&mut self, modified: bool) {
        if self.doc.modified != modified {
            self.doc.modified = modified;
            self.bus.publish(EditorEvent::ModificationChanged {
                editor: self.id,
                modified,
            });
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Cursor & selection
    // ─────────────────────────────────────────────────────────────────────────

    /// Caret position as a char index.
    pub fn cursor(&self) -> usize {
        self.head
    }

    /// Ordered selection `(start, end)`; empty when `start == end`.
    pub fn selection(&self) -> (usize, usize) {
        (self.anchor.min(self.head), self.anchor.max(self.head))
    }

    pub fn has_selection(&self) -> bool {
        self.anchor != self.head
    }

    pub fn selected_text(&self) -> &str {
        let (start, end) = self.selection();
        let bs = char_index_to_byte_index(&self.doc.text, start);
        let be = char_index_to_byte_index(&self.doc.text, end);
        &self.doc.text[bs..be]
    }

    /// 1-based (line, column) of the caret.
    pub fn cursor_line_col(&self) -> (usize, usize) {
        line_col_at(&self.doc.text, self.head)
    }

    /// Programmatic selection change; the widget adopts it next frame.
    pub fn set_selection(&mut self, anchor: usize, head: usize) {
        self.update_selection(anchor, head);
        self.selection_request = Some((self.anchor, self.head));
    }

    /// Selection reported back by the widget after the user moved the caret.
    pub fn set_selection_from_widget(&mut self, anchor: usize, head: usize) {
        self.update_selection(anchor, head);
    }

    pub fn set_cursor(&mut self, pos: usize) {
        self.set_selection(pos, pos);
    }

    fn update_selection(&mut self, anchor: usize, head: usize) {
        let len = self.char_len();
        self.anchor = anchor.min(len);
        self.head = head.min(len);
        let cursor = self.cursor_line_col();
        if cursor != self.last_cursor {
            self.last_cursor = cursor;
            self.bus.publish(EditorEvent::CursorMoved {
                editor: self.id,
                line: cursor.0,
                column: cursor.1,
            });
        }
    }

    /// Consume the pending programmatic selection, if any.
    pub fn take_selection_request(&mut self) -> Option<(usize, usize)> {
        self.selection_request.take()
    }

    pub fn request_focus(&mut self) {
        self.needs_focus = true;
    }

    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.needs_focus)
    }

    pub fn select_all(&mut self) {
        let len = self.char_len();
        self.set_selection(0, len);
    }

    /// Select the word under the caret (letters, digits and `_`).
    /// Returns false when the caret is not touching a word.
    pub fn select_word(&mut self) -> bool {
        let chars: Vec<char> = self.doc.text.chars().collect();
        let is_word = |c: char| c.is_alphanumeric() || c == '_';
        let pos = self.head.min(chars.len());

        let mut start = pos;
        while start > 0 && is_word(chars[start - 1]) {
            start -= 1;
        }
        let mut end = pos;
        while end < chars.len() && is_word(chars[end]) {
            end += 1;
        }
        if start == end {
            return false;
        }
        self.set_selection(start, end);
        true
    }

    /// Select the caret's line, without its newline.
    pub fn select_line(&mut self) {
        let line = self.cursor_line_col().0 - 1;
        if let Some((start, end)) = line_char_range(&self.doc.text, line) {
            self.set_selection(start, end);
        }
    }

    /// Move the caret to the start of a 1-based line. Out-of-range lines are
    /// ignored and return false.
    pub fn go_to_line(&mut self, line: usize) -> bool {
        if line == 0 || line > line_count(&self.doc.text) {
            debug!("go_to_line({}) out of range", line);
            return false;
        }
        match line_char_range(&self.doc.text, line - 1) {
            Some((start, _)) => {
                self.set_cursor(start);
                true
            }
            None => false,
        }
    }

    /// Caret position relative to the text length, for preview scrolling.
    pub fn scroll_ratio(&self) -> f32 {
        let len = self.char_len();
        if len == 0 {
            0.0
        } else {
            self.head as f32 / len as f32
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // User edits
    // ─────────────────────────────────────────────────────────────────────────

    fn push_undo(&mut self, previous: String, caret: usize) {
        self.undo_stack.push(Snapshot {
            text: previous,
            caret,
        });
        if self.undo_stack.len() > MAX_UNDO {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    fn after_user_edit(&mut self) {
        self.edit_generation = self.edit_generation.wrapping_add(1);
        self.bus.publish(EditorEvent::TextChanged { editor: self.id });
        self.set_modified(true);
    }

    /// Replace the whole text as a user edit, placing the selection afterwards.
    fn apply_user_text(&mut self, new_text: String, anchor: usize, head: usize) -> bool {
        if new_text == self.doc.text {
            return false;
        }
        let previous = std::mem::replace(&mut self.doc.text, new_text);
        self.push_undo(previous, self.head);
        self.content_version = self.content_version.wrapping_add(1);
        self.set_selection(anchor, head);
        self.after_user_edit();
        true
    }

    /// Replace the char range `[start, end)` with `replacement`. The caret
    /// lands after the inserted text. Returns whether the text changed.
    pub fn replace_range(&mut self, start: usize, end: usize, replacement: &str) -> bool {
        let len = self.char_len();
        let (start, end) = (start.min(end).min(len), start.max(end).min(len));
        let bs = char_index_to_byte_index(&self.doc.text, start);
        let be = char_index_to_byte_index(&self.doc.text, end);
        if &self.doc.text[bs..be] == replacement {
            return false;
        }
        let mut new_text = String::with_capacity(self.doc.text.len() + replacement.len());
        new_text.push_str(&self.doc.text[..bs]);
        new_text.push_str(replacement);
        new_text.push_str(&self.doc.text[be..]);
        let caret = start + replacement.chars().count();
        self.apply_user_text(new_text, caret, caret)
    }

    /// Insert at the caret, replacing the selection if there is one.
    pub fn insert_text(&mut self, text: &str) -> bool {
        let (start, end) = self.selection();
        self.replace_range(start, end, text)
    }

    /// Replace the whole text as a user edit. The caret goes to the start.
    pub fn set_text(&mut self, text: &str) -> bool {
        self.apply_user_text(text.to_string(), 0, 0)
    }

    /// Replace the whole text as a user edit, keeping the caret where it was
    /// (clamped). Used for bulk rewrites such as replace-all.
    pub fn replace_all_text(&mut self, text: &str) -> bool {
        let (anchor, head) = (self.anchor, self.head);
        self.apply_user_text(text.to_string(), anchor, head)
    }

    /// Buffer handed to the text widget for in-place editing. Call
    /// [`commit_widget_edit`](Self::commit_widget_edit) afterwards.
    pub fn widget_buffer(&mut self) -> &mut String {
        &mut self.doc.text
    }

    /// Record an edit the widget made directly in [`widget_buffer`](Self::widget_buffer).
    /// `previous` is the text before the widget ran.
    pub fn commit_widget_edit(&mut self, previous: String) -> bool {
        if previous == self.doc.text {
            return false;
        }
        let caret = self.head;
        self.push_undo(previous, caret);
        self.after_user_edit();
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.undo_stack.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.doc.text, snapshot.text);
        self.redo_stack.push(Snapshot {
            text: current,
            caret: self.head,
        });
        self.content_version = self.content_version.wrapping_add(1);
        self.set_cursor(snapshot.caret);
        self.after_user_edit();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.redo_stack.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.doc.text, snapshot.text);
        self.undo_stack.push(Snapshot {
            text: current,
            caret: self.head,
        });
        self.content_version = self.content_version.wrapping_add(1);
        self.set_cursor(snapshot.caret);
        self.after_user_edit();
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Line operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Duplicate the selection right after itself, or the caret's line below
    /// itself when nothing is selected.
    pub fn duplicate_line(&mut self) -> bool {
        if self.has_selection() {
            let (_, end) = self.selection();
            let selected = self.selected_text().to_string();
            let be = char_index_to_byte_index(&self.doc.text, end);
            let mut new_text = self.doc.text.clone();
            new_text.insert_str(be, &selected);
            let copy_len = selected.chars().count();
            return self.apply_user_text(new_text, end, end + copy_len);
        }

        let (line, col) = self.cursor_line_col();
        let Some((start, end)) = line_char_range(&self.doc.text, line - 1) else {
            return false;
        };
        let bs = char_index_to_byte_index(&self.doc.text, start);
        let be = char_index_to_byte_index(&self.doc.text, end);
        let copy = format!("\n{}", &self.doc.text[bs..be]);
        let mut new_text = self.doc.text.clone();
        new_text.insert_str(be, &copy);
        let caret = end + 1 + (col - 1);
        self.apply_user_text(new_text, caret, caret)
    }

    /// Delete the caret's line including its line break.
    pub fn delete_line(&mut self) -> bool {
        let line = self.cursor_line_col().0 - 1;
        let mut lines: Vec<&str> = self.doc.text.split('\n').collect();
        if lines.len() == 1 {
            if self.doc.text.is_empty() {
                return false;
            }
            return self.apply_user_text(String::new(), 0, 0);
        }
        lines.remove(line);
        let new_text = lines.join("\n");
        let target = line.min(lines.len() - 1);
        let caret = line_char_range(&new_text, target)
            .map(|(s, _)| s)
            .unwrap_or(0);
        self.apply_user_text(new_text, caret, caret)
    }

    /// Swap the caret's line with the one above. No-op on the first line.
    pub fn move_line_up(&mut self) -> bool {
        let (line, col) = self.cursor_line_col();
        if line <= 1 {
            return false;
        }
        self.swap_lines(line - 1, line - 2, col)
    }

    /// Swap the caret's line with the one below. No-op on the last line.
    pub fn move_line_down(&mut self) -> bool {
        let (line, col) = self.cursor_line_col();
        if line >= line_count(&self.doc.text) {
            return false;
        }
        self.swap_lines(line - 1, line, col)
    }

    /// Swap 0-based lines `from` and `to`, keeping the caret on the moved line.
    fn swap_lines(&mut self, from: usize, to: usize, col: usize) -> bool {
        let mut lines: Vec<&str> = self.doc.text.split('\n').collect();
        lines.swap(from, to);
        let new_text = lines.join("\n");
        let caret = line_char_range(&new_text, to)
            .map(|(s, e)| (s + col - 1).min(e))
            .unwrap_or(0);
        self.apply_user_text(new_text, caret, caret)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sync replay
    // ─────────────────────────────────────────────────────────────────────────

    /// Adopt text pushed from a peer editor of the same file. Publishes no
    /// `TextChanged`; the selection is clamped to the new text.
    pub fn replace_text_silently(&mut self, text: &str, modified: bool) {
        if self.doc.text != text {
            let previous = std::mem::replace(&mut self.doc.text, text.to_string());
            self.push_undo(previous, self.head);
            self.content_version = self.content_version.wrapping_add(1);
            let (anchor, head) = (self.anchor, self.head);
            self.set_selection(anchor, head);
        }
        self.set_modified(modified);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // File I/O
    // ─────────────────────────────────────────────────────────────────────────

    /// Read a file into this editor. On failure nothing changes.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let path = absolute_path(path);
        let text = read_text(&path)?;
        self.load_content(path.clone(), text, false);
        info!("Loaded {}", path.display());
        self.bus.publish(EditorEvent::FileLoaded {
            editor: self.id,
            path,
        });
        Ok(())
    }

    /// Take over a path and text without touching the disk.
    pub fn load_content(&mut self, path: PathBuf, text: String, modified: bool) {
        self.doc.text = text;
        self.doc.path = Some(absolute_path(&path));
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.content_version = self.content_version.wrapping_add(1);
        self.set_cursor(0);
        self.set_modified(modified);
    }

    /// Write to the current path. Untitled documents fail with `NoFilePath`.
    pub fn save(&mut self) -> Result<()> {
        let path = self.doc.path.clone().ok_or(Error::NoFilePath)?;
        self.write_to(&path)
    }

    /// Write to `path` and adopt it as the document's path.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        let path = absolute_path(path);
        self.write_to(&path)?;
        self.doc.path = Some(path);
        Ok(())
    }

    fn write_to(&mut self, path: &Path) -> Result<()> {
        write_text(path, &self.doc.text)?;
        info!("Saved {}", path.display());
        self.set_modified(false);
        self.bus.publish(EditorEvent::FileSaved {
            editor: self.id,
            path: path.to_path_buf(),
        });
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::record;
    use std::fs;
    use tempfile::TempDir;

    fn editor_with(text: &str) -> EditorSurface {
        let mut editor = EditorSurface::new(EventBus::new());
        editor.set_text(text);
        editor.set_modified(false);
        editor
    }

    #[test]
    fn test_ids_are_unique() {
        let bus = EventBus::new();
        let a = EditorSurface::new(bus.clone());
        let b = EditorSurface::new(bus);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_display_name() {
        let editor = EditorSurface::new(EventBus::new());
        assert_eq!(editor.display_name(), "Untitled");
    }

    #[test]
    fn test_save_without_path_fails() {
        let mut editor = editor_with("hello");
        assert!(matches!(editor.save(), Err(Error::NoFilePath)));
    }

    #[test]
    fn test_load_nonexistent_file_leaves_editor_unchanged() {
        let mut editor = editor_with("keep");
        let result = editor.load_file(Path::new("/definitely/not/here.txt"));
        assert!(result.is_err());
        assert_eq!(editor.text(), "keep");
        assert!(editor.path().is_none());
    }

    #[test]
    fn test_load_and_save_roundtrip_clears_modified() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "line one\n").unwrap();

        let mut editor = EditorSurface::new(EventBus::new());
        editor.load_file(&path).unwrap();
        assert_eq!(editor.display_name(), "a.txt");
        assert!(!editor.is_modified());

        editor.set_cursor(8);
        editor.insert_text("!");
        assert!(editor.is_modified());
        editor.save().unwrap();
        assert!(!editor.is_modified());
        assert_eq!(fs::read_to_string(&path).unwrap(), "line one!\n");
    }

    #[test]
    fn test_save_as_adopts_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("new.md");
        let mut editor = editor_with("# title");
        editor.set_modified(true);
        editor.save_as(&path).unwrap();
        assert_eq!(editor.path(), Some(path.as_path()));
        assert!(!editor.is_modified());
    }

    #[test]
    fn test_user_edit_publishes_text_changed_and_modified() {
        let bus = EventBus::new();
        let mut editor = EditorSurface::new(bus.clone());
        let log = record(&bus);

        editor.insert_text("abc");

        let events = log.borrow();
        assert!(events.contains(&EditorEvent::TextChanged { editor: editor.id() }));
        assert!(events.contains(&EditorEvent::ModificationChanged {
            editor: editor.id(),
            modified: true
        }));
    }

    #[test]
    fn test_silent_replace_publishes_no_text_changed() {
        let bus = EventBus::new();
        let mut editor = EditorSurface::new(bus.clone());
        let log = record(&bus);

        editor.replace_text_silently("synced", true);

        assert_eq!(editor.text(), "synced");
        assert!(editor.is_modified());
        assert!(!log
            .borrow()
            .iter()
            .any(|e| matches!(e, EditorEvent::TextChanged { .. })));
    }

    #[test]
    fn test_silent_replace_clamps_selection() {
        let mut editor = editor_with("a long line of text");
        editor.set_selection(2, 19);
        editor.replace_text_silently("short", false);
        assert_eq!(editor.selection(), (2, 5));
    }

    #[test]
    fn test_cursor_line_col_is_one_based() {
        let mut editor = editor_with("ab\ncd");
        editor.set_cursor(4);
        assert_eq!(editor.cursor_line_col(), (2, 2));
    }

    #[test]
    fn test_cursor_moved_event() {
        let bus = EventBus::new();
        let mut editor = EditorSurface::new(bus.clone());
        editor.set_text("ab\ncd");
        let log = record(&bus);
        editor.set_cursor(3);
        assert_eq!(
            log.borrow().last(),
            Some(&EditorEvent::CursorMoved {
                editor: editor.id(),
                line: 2,
                column: 1
            })
        );
    }

    #[test]
    fn test_duplicate_line_without_selection() {
        let mut editor = editor_with("first\nsecond\nthird");
        editor.set_cursor(8);
        assert!(editor.duplicate_line());
        assert_eq!(editor.text(), "first\nsecond\nsecond\nthird");
        assert_eq!(editor.cursor_line_col(), (3, 3));
    }

    #[test]
    fn test_duplicate_selection() {
        let mut editor = editor_with("hello world");
        editor.set_selection(0, 5);
        assert!(editor.duplicate_line());
        assert_eq!(editor.text(), "hellohello world");
        assert_eq!(editor.selected_text(), "hello");
    }

    #[test]
    fn test_delete_line() {
        let mut editor = editor_with("one\ntwo\nthree");
        editor.set_cursor(5);
        assert!(editor.delete_line());
        assert_eq!(editor.text(), "one\nthree");
        assert_eq!(editor.cursor_line_col(), (2, 1));

        editor.set_cursor(6);
        assert!(editor.delete_line());
        assert_eq!(editor.text(), "one");

        assert!(editor.delete_line());
        assert_eq!(editor.text(), "");
        assert!(!editor.delete_line());
    }

    #[test]
    fn test_move_line_up_and_down() {
        let mut editor = editor_with("a\nb\nc");
        editor.set_cursor(2);
        assert!(editor.move_line_up());
        assert_eq!(editor.text(), "b\na\nc");
        assert_eq!(editor.cursor_line_col(), (1, 1));

        assert!(editor.move_line_down());
        assert!(editor.move_line_down());
        assert_eq!(editor.text(), "a\nc\nb");
        assert_eq!(editor.cursor_line_col(), (3, 1));
    }

    #[test]
    fn test_move_first_line_up_is_noop() {
        let mut editor = editor_with("a\nb");
        editor.set_cursor(0);
        assert!(!editor.move_line_up());
        assert_eq!(editor.text(), "a\nb");
    }

    #[test]
    fn test_move_last_line_down_is_noop() {
        let mut editor = editor_with("a\nb");
        editor.set_cursor(3);
        assert!(!editor.move_line_down());
        assert_eq!(editor.text(), "a\nb");
    }

    #[test]
    fn test_select_word() {
        let mut editor = editor_with("foo bar_baz qux");
        editor.set_cursor(6);
        assert!(editor.select_word());
        assert_eq!(editor.selected_text(), "bar_baz");

        editor.set_cursor(3);
        assert!(editor.select_word());
        assert_eq!(editor.selected_text(), "foo");
    }

    #[test]
    fn test_select_word_on_whitespace() {
        let mut editor = editor_with("a  b");
        editor.set_cursor(2);
        assert!(!editor.select_word());
    }

    #[test]
    fn test_select_line_and_all() {
        let mut editor = editor_with("one\ntwo\nthree");
        editor.set_cursor(5);
        editor.select_line();
        assert_eq!(editor.selected_text(), "two");
        editor.select_all();
        assert_eq!(editor.selected_text(), "one\ntwo\nthree");
    }

    #[test]
    fn test_go_to_line() {
        let mut editor = editor_with("one\ntwo\nthree");
        assert!(editor.go_to_line(3));
        assert_eq!(editor.cursor(), 8);
        assert!(!editor.go_to_line(0));
        assert!(!editor.go_to_line(99));
        assert_eq!(editor.cursor(), 8);
    }

    #[test]
    fn test_undo_redo() {
        let mut editor = editor_with("");
        editor.insert_text("a");
        editor.insert_text("b");
        assert_eq!(editor.text(), "ab");

        assert!(editor.undo());
        assert_eq!(editor.text(), "a");
        assert!(editor.redo());
        assert_eq!(editor.text(), "ab");

        assert!(editor.undo());
        assert!(editor.undo());
        assert_eq!(editor.text(), "");
        assert!(!editor.undo());
    }

    #[test]
    fn test_undo_history_is_bounded() {
        let mut editor = editor_with("");
        for _ in 0..(MAX_UNDO + 20) {
            editor.insert_text("x");
        }
        let mut undone = 0;
        while editor.undo() {
            undone += 1;
        }
        assert_eq!(undone, MAX_UNDO);
    }

    #[test]
    fn test_commit_widget_edit() {
        let mut editor = editor_with("abc");
        let previous = editor.text().to_string();
        editor.widget_buffer().push('d');
        assert!(editor.commit_widget_edit(previous));
        assert!(editor.is_modified());
        assert!(editor.undo());
        assert_eq!(editor.text(), "abc");

        let previous = editor.text().to_string();
        assert!(!editor.commit_widget_edit(previous));
    }

    #[test]
    fn test_multibyte_replace_range() {
        let mut editor = editor_with("på deg");
        assert!(editor.replace_range(1, 2, "aa"));
        assert_eq!(editor.text(), "paa deg");
        assert_eq!(editor.cursor(), 3);
    }

    #[test]
    fn test_scroll_ratio() {
        let mut editor = editor_with("abcd");
        assert_eq!(editor.scroll_ratio(), 0.0);
        editor.set_cursor(2);
        assert_eq!(editor.scroll_ratio(), 0.5);
    }
}
