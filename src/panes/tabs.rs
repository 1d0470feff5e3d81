//! Tab container: an ordered list of editors with one current tab.
//!
//! A pane always shows at least one tab while the app runs. Closing the last
//! tab puts a fresh untitled one in its place; only a teardown
//! (`close_all` without `keep_one`) leaves the container empty.

use crate::editor::document::absolute_path;
use crate::editor::{Document, EditorId, EditorSurface};
use crate::error::{Error, Result};
use crate::events::{EditorEvent, EventBus};
use crate::files::{CloseChoice, Prompter};
use log::{debug, info};
use std::fmt;
use std::path::{Path, PathBuf};

/// Prefix shown in front of a modified tab's title.
pub const MODIFIED_MARKER: &str = "● ";

/// Identity of a pane (leaf of the split tree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaneId(pub(crate) usize);

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pane {}", self.0)
    }
}

/// A document written to disk while its tab was being closed. Sync peers of
/// the same path need to adopt the saved text.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedOnClose {
    pub path: PathBuf,
    pub text: String,
}

/// What a close operation removed.
#[derive(Debug, Default)]
pub struct Closed {
    pub editors: Vec<EditorId>,
    pub saved: Vec<SavedOnClose>,
}

// ─────────────────────────────────────────────────────────────────────────────
// TabContainer
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct TabContainer {
    id: PaneId,
    tabs: Vec<EditorSurface>,
    current: usize,
    bus: EventBus,
}

impl TabContainer {
    /// A pane holding one untitled tab.
    pub fn new(id: PaneId, bus: EventBus) -> Self {
        let mut pane = Self::detached(id, bus);
        pane.new_tab();
        pane
    }

    /// A pane with no tabs. Only used transiently while the split tree is
    /// being restructured.
    pub(crate) fn detached(id: PaneId, bus: EventBus) -> Self {
        Self {
            id,
            tabs: Vec::new(),
            current: 0,
            bus,
        }
    }

    pub fn id(&self) -> PaneId {
        self.id
    }

    pub fn count(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn tabs(&self) -> &[EditorSurface] {
        &self.tabs
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&EditorSurface> {
        self.tabs.get(self.current)
    }

    pub fn current_mut(&mut self) -> Option<&mut EditorSurface> {
        self.tabs.get_mut(self.current)
    }

    pub fn index_of(&self, editor: EditorId) -> Option<usize> {
        self.tabs.iter().position(|e| e.id() == editor)
    }

    pub fn editor(&self, editor: EditorId) -> Option<&EditorSurface> {
        self.tabs.iter().find(|e| e.id() == editor)
    }

    pub fn editor_mut(&mut self, editor: EditorId) -> Option<&mut EditorSurface> {
        self.tabs.iter_mut().find(|e| e.id() == editor)
    }

    /// Index of the tab showing `path`.
    pub fn find_by_path(&self, path: &Path) -> Option<usize> {
        let path = absolute_path(path);
        self.tabs.iter().position(|e| e.path() == Some(path.as_path()))
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.tabs.iter().any(EditorSurface::is_modified)
    }

    /// Tab label: the document name, prefixed with a marker when modified.
    pub fn tab_title(&self, index: usize) -> Option<String> {
        self.tabs.get(index).map(|e| {
            if e.is_modified() {
                format!("{}{}", MODIFIED_MARKER, e.display_name())
            } else {
                e.display_name()
            }
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────

    /// Make tab `index` current. Out-of-range indices are ignored.
    pub fn set_current(&mut self, index: usize) {
        if index >= self.tabs.len() {
            return;
        }
        self.current = index;
        self.tabs[index].request_focus();
        self.publish_current();
    }

    pub fn next_tab(&mut self) {
        if !self.tabs.is_empty() {
            self.set_current((self.current + 1) % self.tabs.len());
        }
    }

    pub fn previous_tab(&mut self) {
        if !self.tabs.is_empty() {
            let len = self.tabs.len();
            self.set_current((self.current + len - 1) % len);
        }
    }

    fn publish_current(&self) {
        self.bus.publish(EditorEvent::CurrentEditorChanged {
            pane: self.id,
            editor: self.current().map(EditorSurface::id),
        });
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Opening
    // ─────────────────────────────────────────────────────────────────────────

    /// Append an untitled tab and make it current.
    pub fn new_tab(&mut self) -> EditorId {
        self.push_tab(EditorSurface::new(self.bus.clone()))
    }

    fn push_tab(&mut self, editor: EditorSurface) -> EditorId {
        let id = editor.id();
        self.tabs.push(editor);
        self.set_current(self.tabs.len() - 1);
        id
    }

    /// The current tab, if it is an untouched untitled document that a
    /// newly opened file may take over.
    fn reusable_current(&mut self) -> Option<&mut EditorSurface> {
        self.current_mut().filter(|e| e.document().is_pristine())
    }

    /// Open `path` in this pane. A tab already showing it is focused instead.
    /// A read failure leaves the pane untouched.
    pub fn open_file(&mut self, path: &Path) -> Result<EditorId> {
        if let Some(index) = self.find_by_path(path) {
            self.set_current(index);
            return Ok(self.tabs[index].id());
        }

        if let Some(editor) = self.reusable_current() {
            editor.load_file(path)?;
            let id = editor.id();
            editor.request_focus();
            self.publish_current();
            return Ok(id);
        }

        let mut editor = EditorSurface::new(self.bus.clone());
        editor.load_file(path)?;
        Ok(self.push_tab(editor))
    }

    /// Open `path` with text taken from another pane instead of the disk.
    pub fn open_file_with_content(&mut self, path: &Path, text: &str, modified: bool) -> EditorId {
        if let Some(index) = self.find_by_path(path) {
            self.set_current(index);
            return self.tabs[index].id();
        }

        if let Some(editor) = self.reusable_current() {
            editor.load_content(path.to_path_buf(), text.to_string(), modified);
            let id = editor.id();
            self.publish_current();
            return id;
        }

        let doc = Document {
            text: text.to_string(),
            path: Some(absolute_path(path)),
            modified,
        };
        self.push_tab(EditorSurface::with_document(self.bus.clone(), doc))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Saving
    // ─────────────────────────────────────────────────────────────────────────

    /// Save the current tab, asking for a path if it is untitled.
    pub fn save_current(&mut self, prompter: &mut dyn Prompter) -> Result<EditorId> {
        if self.tabs.is_empty() {
            return Err(Error::NoActiveEditor);
        }
        self.save_at(self.current, prompter)?;
        Ok(self.tabs[self.current].id())
    }

    /// Save the current tab under a newly chosen path.
    pub fn save_current_as(&mut self, prompter: &mut dyn Prompter) -> Result<EditorId> {
        if self.tabs.is_empty() {
            return Err(Error::NoActiveEditor);
        }
        self.save_as_at(self.current, prompter)?;
        Ok(self.tabs[self.current].id())
    }

    fn save_at(&mut self, index: usize, prompter: &mut dyn Prompter) -> Result<()> {
        if self.tabs[index].path().is_some() {
            self.tabs[index].save()
        } else {
            self.save_as_at(index, prompter)
        }
    }

    fn save_as_at(&mut self, index: usize, prompter: &mut dyn Prompter) -> Result<()> {
        let name = self.tabs[index].display_name();
        let path = prompter
            .choose_save_path(&name)
            .ok_or(Error::Cancelled)?;
        self.tabs[index].save_as(&path)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Closing
    // ─────────────────────────────────────────────────────────────────────────

    /// Settle unsaved changes in tab `index` before it closes.
    fn resolve_unsaved(
        &mut self,
        index: usize,
        prompter: &mut dyn Prompter,
        saved: &mut Vec<SavedOnClose>,
    ) -> Result<()> {
        if !self.tabs[index].is_modified() {
            return Ok(());
        }
        let name = self.tabs[index].display_name();
        match prompter.confirm_close(&name) {
            CloseChoice::Save => {
                self.save_at(index, prompter)?;
                let editor = &self.tabs[index];
                if let Some(path) = editor.path() {
                    saved.push(SavedOnClose {
                        path: path.to_path_buf(),
                        text: editor.text().to_string(),
                    });
                }
                Ok(())
            }
            CloseChoice::Discard => Ok(()),
            CloseChoice::Cancel => Err(Error::Cancelled),
        }
    }

    fn remove_at(&mut self, index: usize) -> EditorId {
        let editor = self.tabs.remove(index);
        let id = editor.id();
        debug!("Closed tab {} ({:?}) in {}", editor.display_name(), id, self.id);
        self.bus.publish(EditorEvent::EditorClosed { editor: id });
        id
    }

    /// Close tab `index`, prompting for unsaved changes. A cancelled prompt,
    /// a cancelled save dialog or a failed write leaves the tab open and
    /// returns the error. Closing the last tab opens a fresh one.
    pub fn close_tab(&mut self, index: usize, prompter: &mut dyn Prompter) -> Result<Closed> {
        if index >= self.tabs.len() {
            return Ok(Closed::default());
        }
        let mut closed = Closed::default();
        self.resolve_unsaved(index, prompter, &mut closed.saved)?;
        closed.editors.push(self.remove_at(index));

        if self.tabs.is_empty() {
            self.new_tab();
        } else {
            if self.current > index || self.current >= self.tabs.len() {
                self.current = self.current.saturating_sub(1);
            }
            self.set_current(self.current);
        }
        Ok(closed)
    }

    pub fn close_current_tab(&mut self, prompter: &mut dyn Prompter) -> Result<Closed> {
        self.close_tab(self.current, prompter)
    }

    /// Close every tab into `closed`. All unsaved documents are settled
    /// first; a cancel at any point closes nothing, though files already
    /// saved by earlier answers stay recorded in `closed.saved`. With
    /// `keep_one` a fresh tab remains, otherwise the pane ends up empty.
    pub fn close_all(
        &mut self,
        prompter: &mut dyn Prompter,
        keep_one: bool,
        closed: &mut Closed,
    ) -> Result<()> {
        self.settle_all(prompter, &mut closed.saved)?;
        closed.editors.extend(self.remove_all());
        if keep_one {
            self.new_tab();
        }
        Ok(())
    }

    /// Prompt for every modified tab without closing any. Stops at the first
    /// cancel or failed save.
    pub(crate) fn settle_all(
        &mut self,
        prompter: &mut dyn Prompter,
        saved: &mut Vec<SavedOnClose>,
    ) -> Result<()> {
        for index in 0..self.tabs.len() {
            self.resolve_unsaved(index, prompter, saved)?;
        }
        Ok(())
    }

    /// Drop every tab without prompting.
    pub(crate) fn remove_all(&mut self) -> Vec<EditorId> {
        let mut removed = Vec::with_capacity(self.tabs.len());
        while !self.tabs.is_empty() {
            let last = self.tabs.len() - 1;
            removed.push(self.remove_at(last));
        }
        self.current = 0;
        info!("Closed {} tab(s) in {}", removed.len(), self.id);
        self.bus.publish(EditorEvent::AllTabsClosed { pane: self.id });
        self.publish_current();
        removed
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::record;
    use crate::files::prompt::testing::ScriptedPrompter;
    use std::fs;
    use tempfile::TempDir;

    fn pane() -> TabContainer {
        TabContainer::new(PaneId(1), EventBus::new())
    }

    fn write(dir: &TempDir, name: &str, text: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_new_pane_has_one_untitled_tab() {
        let pane = pane();
        assert_eq!(pane.count(), 1);
        assert_eq!(pane.tab_title(0).as_deref(), Some("Untitled"));
    }

    #[test]
    fn test_open_file_reuses_pristine_tab() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.txt", "alpha");
        let mut pane = pane();
        pane.open_file(&path).unwrap();
        assert_eq!(pane.count(), 1);
        assert_eq!(pane.current().unwrap().text(), "alpha");
    }

    #[test]
    fn test_open_same_file_twice_focuses_existing_tab() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.txt", "alpha");
        let b = write(&dir, "b.txt", "beta");
        let mut pane = pane();
        let first = pane.open_file(&a).unwrap();
        pane.open_file(&b).unwrap();
        assert_eq!(pane.current_index(), 1);

        let again = pane.open_file(&a).unwrap();
        assert_eq!(first, again);
        assert_eq!(pane.count(), 2);
        assert_eq!(pane.current_index(), 0);
    }

    #[test]
    fn test_open_missing_file_adds_no_tab() {
        let mut pane = pane();
        pane.current_mut().unwrap().insert_text("draft");
        let result = pane.open_file(Path::new("/no/such/file.txt"));
        assert!(result.is_err());
        assert_eq!(pane.count(), 1);
        assert_eq!(pane.current().unwrap().text(), "draft");
    }

    #[test]
    fn test_modified_tab_title_has_marker() {
        let mut pane = pane();
        pane.current_mut().unwrap().insert_text("x");
        assert_eq!(pane.tab_title(0).as_deref(), Some("● Untitled"));
    }

    #[test]
    fn test_tab_navigation_wraps() {
        let mut pane = pane();
        pane.new_tab();
        pane.new_tab();
        assert_eq!(pane.current_index(), 2);
        pane.next_tab();
        assert_eq!(pane.current_index(), 0);
        pane.previous_tab();
        assert_eq!(pane.current_index(), 2);
    }

    #[test]
    fn test_close_unmodified_tab_never_prompts() {
        let mut pane = pane();
        pane.new_tab();
        let mut prompter = ScriptedPrompter::new();
        let closed = pane.close_tab(1, &mut prompter).unwrap();
        assert_eq!(closed.editors.len(), 1);
        assert_eq!(pane.count(), 1);
        assert!(prompter.close_prompts.is_empty());
    }

    #[test]
    fn test_close_last_tab_leaves_fresh_one() {
        let mut pane = pane();
        let old = pane.current().unwrap().id();
        pane.close_current_tab(&mut ScriptedPrompter::new()).unwrap();
        assert_eq!(pane.count(), 1);
        assert_ne!(pane.current().unwrap().id(), old);
    }

    #[test]
    fn test_close_modified_cancel_keeps_tab() {
        let mut pane = pane();
        pane.current_mut().unwrap().insert_text("unsaved");
        let mut prompter = ScriptedPrompter::answering(&[CloseChoice::Cancel]);
        let result = pane.close_current_tab(&mut prompter);
        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(pane.count(), 1);
        assert_eq!(pane.current().unwrap().text(), "unsaved");
        assert_eq!(prompter.close_prompts, vec!["Untitled".to_string()]);
    }

    #[test]
    fn test_close_modified_discard() {
        let mut pane = pane();
        pane.new_tab();
        pane.current_mut().unwrap().insert_text("throwaway");
        let mut prompter = ScriptedPrompter::answering(&[CloseChoice::Discard]);
        pane.close_current_tab(&mut prompter).unwrap();
        assert_eq!(pane.count(), 1);
    }

    #[test]
    fn test_close_untitled_save_with_cancelled_dialog_fails() {
        let mut pane = pane();
        pane.current_mut().unwrap().insert_text("keep me");
        let mut prompter =
            ScriptedPrompter::answering(&[CloseChoice::Save]).with_save_path(None);
        let result = pane.close_current_tab(&mut prompter);
        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(prompter.save_prompts, 1);
        assert_eq!(pane.current().unwrap().text(), "keep me");
    }

    #[test]
    fn test_close_untitled_save_writes_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("saved.txt");
        let mut pane = pane();
        pane.current_mut().unwrap().insert_text("content");
        let mut prompter = ScriptedPrompter::answering(&[CloseChoice::Save])
            .with_save_path(Some(target.clone()));
        let closed = pane.close_current_tab(&mut prompter).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "content");
        assert_eq!(
            closed.saved,
            vec![SavedOnClose {
                path: target,
                text: "content".to_string()
            }]
        );
    }

    #[test]
    fn test_close_with_failed_write_keeps_tab() {
        let dir = TempDir::new().unwrap();
        let bad = dir.path().join("missing-dir").join("x.txt");
        let mut pane = pane();
        pane.current_mut().unwrap().insert_text("content");
        let mut prompter =
            ScriptedPrompter::answering(&[CloseChoice::Save]).with_save_path(Some(bad));
        assert!(pane.close_current_tab(&mut prompter).is_err());
        assert_eq!(pane.count(), 1);
        assert!(pane.current().unwrap().is_modified());
    }

    #[test]
    fn test_close_all_cancel_closes_nothing() {
        let mut pane = pane();
        pane.new_tab();
        pane.current_mut().unwrap().insert_text("dirty");
        let mut prompter = ScriptedPrompter::answering(&[CloseChoice::Cancel]);
        let mut closed = Closed::default();
        assert!(pane.close_all(&mut prompter, false, &mut closed).is_err());
        assert_eq!(pane.count(), 2);
        assert!(closed.editors.is_empty());
    }

    #[test]
    fn test_close_all_cancel_keeps_earlier_saves() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kept.txt");
        fs::write(&path, "old").unwrap();
        let mut pane = pane();
        pane.open_file(&path).unwrap();
        pane.current_mut().unwrap().insert_text("new ");
        pane.new_tab();
        pane.current_mut().unwrap().insert_text("draft");

        let mut prompter =
            ScriptedPrompter::answering(&[CloseChoice::Save, CloseChoice::Cancel]);
        let mut closed = Closed::default();
        assert!(pane.close_all(&mut prompter, false, &mut closed).is_err());

        assert_eq!(fs::read_to_string(&path).unwrap(), "new old");
        assert_eq!(closed.saved.len(), 1);
        assert_eq!(closed.saved[0].text, "new old");
        assert!(closed.editors.is_empty());
        assert_eq!(pane.count(), 2);
    }

    #[test]
    fn test_close_all_teardown_empties_pane() {
        let bus = EventBus::new();
        let mut pane = TabContainer::new(PaneId(7), bus.clone());
        pane.new_tab();
        let log = record(&bus);

        let mut closed = Closed::default();
        pane.close_all(&mut ScriptedPrompter::new(), false, &mut closed)
            .unwrap();

        assert_eq!(closed.editors.len(), 2);
        assert!(pane.is_empty());
        assert!(log
            .borrow()
            .contains(&EditorEvent::AllTabsClosed { pane: PaneId(7) }));
    }

    #[test]
    fn test_save_current_untitled_asks_for_path() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out.txt");
        let mut pane = pane();
        pane.current_mut().unwrap().insert_text("body");
        let mut prompter = ScriptedPrompter::new().with_save_path(Some(target.clone()));
        pane.save_current(&mut prompter).unwrap();
        assert_eq!(pane.current().unwrap().path(), Some(target.as_path()));
        assert_eq!(pane.tab_title(0).as_deref(), Some("out.txt"));

        let mut prompter = ScriptedPrompter::new();
        pane.current_mut().unwrap().insert_text("!");
        pane.save_current(&mut prompter).unwrap();
        assert_eq!(prompter.save_prompts, 0);
    }

    #[test]
    fn test_open_with_content_keeps_modified_flag() {
        let mut pane = pane();
        pane.new_tab();
        pane.current_mut().unwrap().insert_text("occupied");
        let id = pane.open_file_with_content(Path::new("/virtual/a.txt"), "shared", true);
        let editor = pane.editor(id).unwrap();
        assert_eq!(editor.text(), "shared");
        assert!(editor.is_modified());
        assert_eq!(pane.count(), 3);
    }
}
