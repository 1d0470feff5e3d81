//! Split container: a binary tree of tab containers with one active pane.
//!
//! Every operation the menus trigger is routed to the active pane from here.
//! The container also owns the same-file [`SyncRegistry`]: user edits made
//! through [`SplitContainer::edit_editor`] (or reported through
//! [`SplitContainer::propagate`]) are pushed to every other editor showing
//! the same path.

use crate::editor::document::absolute_path;
use crate::editor::{EditorId, EditorSurface};
use crate::error::{Error, Result};
use crate::events::{EditorEvent, EventBus};
use crate::files::Prompter;
use crate::panes::sync::SyncRegistry;
use crate::panes::tabs::{Closed, PaneId, TabContainer};
use crate::search::{DocumentHost, SearchSource, SourceKey};
use log::{debug, info};
use std::collections::HashSet;
use std::path::Path;

/// Minimum and maximum share of a split given to its first child.
pub const MIN_SPLIT_RATIO: f32 = 0.1;
pub const MAX_SPLIT_RATIO: f32 = 0.9;

/// How an internal node arranges its two children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Children side by side, separated by a vertical divider.
    Horizontal,
    /// Children stacked top to bottom.
    Vertical,
}

// ─────────────────────────────────────────────────────────────────────────────
// SplitNode
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum SplitNode {
    Leaf(TabContainer),
    Split {
        orientation: Orientation,
        /// Share of the space given to `first` (0.0 - 1.0).
        ratio: f32,
        first: Box<SplitNode>,
        second: Box<SplitNode>,
    },
}

impl SplitNode {
    /// Leaves in depth-first, left-to-right order.
    pub fn panes(&self) -> Vec<&TabContainer> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a TabContainer>) {
        match self {
            SplitNode::Leaf(pane) => out.push(pane),
            SplitNode::Split { first, second, .. } => {
                first.collect(out);
                second.collect(out);
            }
        }
    }

    pub fn panes_mut(&mut self) -> Vec<&mut TabContainer> {
        let mut out = Vec::new();
        self.collect_mut(&mut out);
        out
    }

    fn collect_mut<'a>(&'a mut self, out: &mut Vec<&'a mut TabContainer>) {
        match self {
            SplitNode::Leaf(pane) => out.push(pane),
            SplitNode::Split { first, second, .. } => {
                first.collect_mut(out);
                second.collect_mut(out);
            }
        }
    }

    pub fn pane_count(&self) -> usize {
        match self {
            SplitNode::Leaf(_) => 1,
            SplitNode::Split { first, second, .. } => first.pane_count() + second.pane_count(),
        }
    }

    fn is_pane(&self, id: PaneId) -> bool {
        matches!(self, SplitNode::Leaf(pane) if pane.id() == id)
    }

    fn contains(&self, id: PaneId) -> bool {
        match self {
            SplitNode::Leaf(pane) => pane.id() == id,
            SplitNode::Split { first, second, .. } => first.contains(id) || second.contains(id),
        }
    }

    fn first_pane_id(&self) -> PaneId {
        match self {
            SplitNode::Leaf(pane) => pane.id(),
            SplitNode::Split { first, .. } => first.first_pane_id(),
        }
    }

    fn find_node_mut(&mut self, id: PaneId) -> Option<&mut SplitNode> {
        if self.is_pane(id) {
            return Some(self);
        }
        match self {
            SplitNode::Leaf(_) => None,
            SplitNode::Split { first, second, .. } => {
                if first.contains(id) {
                    first.find_node_mut(id)
                } else {
                    second.find_node_mut(id)
                }
            }
        }
    }

    /// Move this node out, leaving an empty placeholder pane behind.
    fn take(&mut self, bus: &EventBus) -> SplitNode {
        let placeholder = SplitNode::Leaf(TabContainer::detached(PaneId(0), bus.clone()));
        std::mem::replace(self, placeholder)
    }

    /// Replace the split holding leaf `id` with that leaf's sibling.
    /// Returns the first pane of the surviving sibling.
    fn remove_pane(&mut self, id: PaneId, bus: &EventBus) -> Option<PaneId> {
        let SplitNode::Split { first, second, .. } = self else {
            return None;
        };
        let survivor = if first.is_pane(id) {
            second.take(bus)
        } else if second.is_pane(id) {
            first.take(bus)
        } else {
            return first
                .remove_pane(id, bus)
                .or_else(|| second.remove_pane(id, bus));
        };
        let next = survivor.first_pane_id();
        *self = survivor;
        Some(next)
    }

    /// Adjust the ratio of the innermost split directly holding leaf `id`.
    fn resize(&mut self, id: PaneId, delta: f32) -> bool {
        match self {
            SplitNode::Leaf(_) => false,
            SplitNode::Split {
                ratio,
                first,
                second,
                ..
            } => {
                if first.resize(id, delta) || second.resize(id, delta) {
                    return true;
                }
                // `ratio` is the first child's share.
                let change = if first.is_pane(id) {
                    delta
                } else if second.is_pane(id) {
                    -delta
                } else {
                    return false;
                };
                *ratio = (*ratio + change).clamp(MIN_SPLIT_RATIO, MAX_SPLIT_RATIO);
                true
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SplitContainer
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct SplitContainer {
    root: SplitNode,
    active: PaneId,
    next_pane_id: usize,
    sync: SyncRegistry,
    bus: EventBus,
}

impl SplitContainer {
    /// One pane with one untitled tab.
    pub fn new(bus: EventBus) -> Self {
        let first = PaneId(1);
        Self {
            root: SplitNode::Leaf(TabContainer::new(first, bus.clone())),
            active: first,
            next_pane_id: 2,
            sync: SyncRegistry::new(),
            bus,
        }
    }

    pub fn root(&self) -> &SplitNode {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut SplitNode {
        &mut self.root
    }

    pub fn sync_registry(&self) -> &SyncRegistry {
        &self.sync
    }

    pub fn pane_count(&self) -> usize {
        self.root.pane_count()
    }

    pub fn panes(&self) -> Vec<&TabContainer> {
        self.root.panes()
    }

    fn allocate_pane_id(&mut self) -> PaneId {
        let id = PaneId(self.next_pane_id);
        self.next_pane_id += 1;
        id
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lookup
    // ─────────────────────────────────────────────────────────────────────────

    pub fn active_pane_id(&self) -> PaneId {
        self.active
    }

    pub fn pane(&self, id: PaneId) -> Option<&TabContainer> {
        self.root.panes().into_iter().find(|p| p.id() == id)
    }

    pub fn pane_mut(&mut self, id: PaneId) -> Option<&mut TabContainer> {
        self.root.panes_mut().into_iter().find(|p| p.id() == id)
    }

    pub fn active_pane(&self) -> Option<&TabContainer> {
        self.pane(self.active)
    }

    pub fn active_pane_mut(&mut self) -> Option<&mut TabContainer> {
        let active = self.active;
        self.pane_mut(active)
    }

    pub fn active_editor(&self) -> Option<&EditorSurface> {
        self.active_pane().and_then(TabContainer::current)
    }

    pub fn active_editor_id(&self) -> Option<EditorId> {
        self.active_editor().map(EditorSurface::id)
    }

    /// Direct access to the active editor. Text changes made through this
    /// reference are not synced; use [`edit_active`](Self::edit_active).
    pub fn active_editor_mut(&mut self) -> Option<&mut EditorSurface> {
        self.active_pane_mut().and_then(TabContainer::current_mut)
    }

    pub fn editors(&self) -> impl Iterator<Item = &EditorSurface> {
        self.root
            .panes()
            .into_iter()
            .flat_map(|pane| pane.tabs().iter())
    }

    pub fn editor(&self, id: EditorId) -> Option<&EditorSurface> {
        self.editors().find(|e| e.id() == id)
    }

    pub fn editor_mut(&mut self, id: EditorId) -> Option<&mut EditorSurface> {
        self.root
            .panes_mut()
            .into_iter()
            .find_map(|pane| pane.editor_mut(id))
    }

    /// Pane holding editor `id`.
    pub fn pane_of(&self, id: EditorId) -> Option<PaneId> {
        self.root
            .panes()
            .into_iter()
            .find(|p| p.index_of(id).is_some())
            .map(TabContainer::id)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.root
            .panes()
            .into_iter()
            .any(TabContainer::has_unsaved_changes)
    }

    /// Window title: the active document's name.
    pub fn window_title(&self, app_name: &str) -> String {
        match self.active_editor() {
            Some(editor) => format!("{} - {}", editor.display_name(), app_name),
            None => app_name.to_string(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Focus & navigation
    // ─────────────────────────────────────────────────────────────────────────

    /// Make pane `id` active. Returns false for unknown panes.
    pub fn set_active_pane(&mut self, id: PaneId) -> bool {
        let Some(pane) = self.pane_mut(id) else {
            return false;
        };
        if let Some(editor) = pane.current_mut() {
            editor.request_focus();
        }
        if self.active != id {
            self.active = id;
            debug!("Active pane is now {}", id);
            self.bus.publish(EditorEvent::ActivePaneChanged { pane: id });
        }
        true
    }

    /// Activate the pane and tab holding editor `id`.
    pub fn focus_editor(&mut self, id: EditorId) -> bool {
        let Some(pane_id) = self.pane_of(id) else {
            return false;
        };
        self.set_active_pane(pane_id);
        if let Some(pane) = self.pane_mut(pane_id) {
            if let Some(index) = pane.index_of(id) {
                pane.set_current(index);
            }
        }
        true
    }

    pub fn focus_next(&mut self) {
        self.cycle_focus(1);
    }

    pub fn focus_previous(&mut self) {
        self.cycle_focus(-1);
    }

    fn cycle_focus(&mut self, step: isize) {
        let ids: Vec<PaneId> = self.root.panes().iter().map(|p| p.id()).collect();
        if ids.len() < 2 {
            return;
        }
        let current = ids.iter().position(|id| *id == self.active).unwrap_or(0) as isize;
        let len = ids.len() as isize;
        let next = (current + step).rem_euclid(len) as usize;
        self.set_active_pane(ids[next]);
    }

    pub fn next_tab(&mut self) {
        if let Some(pane) = self.active_pane_mut() {
            pane.next_tab();
        }
    }

    pub fn previous_tab(&mut self) {
        if let Some(pane) = self.active_pane_mut() {
            pane.previous_tab();
        }
    }

    /// Grow (positive) or shrink the active pane's share of its split.
    pub fn resize_active(&mut self, delta: f32) -> bool {
        let active = self.active;
        self.root.resize(active, delta)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Splitting
    // ─────────────────────────────────────────────────────────────────────────

    /// Split the active pane. The new pane gets one empty tab and becomes
    /// active.
    pub fn split(&mut self, orientation: Orientation) -> PaneId {
        let new_id = self.allocate_pane_id();
        let bus = self.bus.clone();
        let active = if self.root.contains(self.active) {
            self.active
        } else {
            self.root.first_pane_id()
        };
        if let Some(node) = self.root.find_node_mut(active) {
            let existing = node.take(&bus);
            *node = SplitNode::Split {
                orientation,
                ratio: 0.5,
                first: Box::new(existing),
                second: Box::new(SplitNode::Leaf(TabContainer::new(new_id, bus))),
            };
        }
        info!("Split {} {:?} into {}", active, orientation, new_id);
        self.set_active_pane(new_id);
        new_id
    }

    /// Close the active pane and all of its tabs. Unsaved tabs prompt; a
    /// cancel keeps the pane and its tabs and returns the error, but files
    /// saved before the cancel still reach their peers. With a single pane
    /// its tabs are closed and one fresh tab remains.
    pub fn close_split(&mut self, prompter: &mut dyn Prompter) -> Result<()> {
        let active = self.active;
        let single = self.pane_count() == 1;
        let mut closed = Closed::default();
        let result = self
            .active_pane_mut()
            .ok_or(Error::NoActiveEditor)?
            .close_all(prompter, single, &mut closed);
        self.settle_closed(closed);
        result?;

        if single {
            return Ok(());
        }

        let bus = self.bus.clone();
        let next = self
            .root
            .remove_pane(active, &bus)
            .unwrap_or_else(|| self.root.first_pane_id());
        info!("Closed split {}", active);
        self.set_active_pane(next);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tabs
    // ─────────────────────────────────────────────────────────────────────────

    pub fn new_tab(&mut self) -> Option<EditorId> {
        self.active_pane_mut().map(TabContainer::new_tab)
    }

    /// Open `path` in the active pane. If another pane already shows it, the
    /// new editor starts from that editor's live text and modified flag.
    pub fn open_file(&mut self, path: &Path) -> Result<EditorId> {
        let path = absolute_path(path);
        let path = path.as_path();
        let live = self
            .editors()
            .find(|e| e.path() == Some(path))
            .map(|e| (e.text().to_string(), e.is_modified()));
        let pane = self.active_pane_mut().ok_or(Error::NoActiveEditor)?;

        let id = match (pane.find_by_path(path), live) {
            (Some(_), _) | (None, None) => pane.open_file(path)?,
            (None, Some((text, modified))) => pane.open_file_with_content(path, &text, modified),
        };
        self.sync.register(path, id);
        Ok(id)
    }

    /// Close tab `index` of pane `pane`.
    pub fn close_tab(
        &mut self,
        pane: PaneId,
        index: usize,
        prompter: &mut dyn Prompter,
    ) -> Result<()> {
        let closed = self
            .pane_mut(pane)
            .ok_or(Error::NoActiveEditor)?
            .close_tab(index, prompter)?;
        self.settle_closed(closed);
        Ok(())
    }

    pub fn close_current_tab(&mut self, prompter: &mut dyn Prompter) -> Result<()> {
        let active = self.active;
        let index = self
            .active_pane()
            .map(TabContainer::current_index)
            .ok_or(Error::NoActiveEditor)?;
        self.close_tab(active, index, prompter)
    }

    /// Close every tab in every pane. Unsaved documents are settled first and
    /// a cancel closes nothing. Afterwards a single pane with one fresh tab
    /// remains.
    pub fn close_all_tabs(&mut self, prompter: &mut dyn Prompter) -> Result<()> {
        let mut closed = Closed::default();
        let mut settled = Ok(());
        for pane in self.root.panes_mut() {
            if let Err(err) = pane.settle_all(prompter, &mut closed.saved) {
                settled = Err(err);
                break;
            }
        }
        if let Err(err) = settled {
            self.settle_closed(closed);
            return Err(err);
        }

        for pane in self.root.panes_mut() {
            closed.editors.extend(pane.remove_all());
        }
        self.settle_closed(closed);

        let id = self.allocate_pane_id();
        self.root = SplitNode::Leaf(TabContainer::new(id, self.bus.clone()));
        self.active = id;
        self.bus.publish(EditorEvent::ActivePaneChanged { pane: id });
        info!("Closed all tabs");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Saving
    // ─────────────────────────────────────────────────────────────────────────

    /// Save the active tab (prompting for a path if it is untitled).
    pub fn save_active(&mut self, prompter: &mut dyn Prompter) -> Result<()> {
        let id = self
            .active_pane_mut()
            .ok_or(Error::NoActiveEditor)?
            .save_current(prompter)?;
        self.after_save(id);
        Ok(())
    }

    /// Save the active tab under a new path.
    pub fn save_active_as(&mut self, prompter: &mut dyn Prompter) -> Result<()> {
        let id = self
            .active_pane_mut()
            .ok_or(Error::NoActiveEditor)?
            .save_current_as(prompter)?;
        self.after_save(id);
        Ok(())
    }

    /// Bind the saved editor to its (possibly new) path and bring every peer
    /// to the saved, unmodified state.
    fn after_save(&mut self, id: EditorId) {
        let Some((path, text)) = self
            .editor(id)
            .and_then(|e| e.path().map(|p| (p.to_path_buf(), e.text().to_string())))
        else {
            return;
        };
        self.sync.register(&path, id);
        for peer in self.sync.peers(id) {
            if let Some(editor) = self.editor_mut(peer) {
                editor.replace_text_silently(&text, false);
            }
        }
    }

    fn settle_closed(&mut self, closed: Closed) {
        for id in &closed.editors {
            self.sync.unregister(*id);
        }
        for saved in &closed.saved {
            let members = self.sync.group(&saved.path).to_vec();
            for member in members {
                if let Some(editor) = self.editor_mut(member) {
                    editor.replace_text_silently(&saved.text, false);
                }
            }
        }
        let live: HashSet<EditorId> = self.editors().map(EditorSurface::id).collect();
        self.sync.prune(|id| live.contains(&id));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Edits & sync
    // ─────────────────────────────────────────────────────────────────────────

    /// Run `f` against editor `id`; if it made a user edit, push the result
    /// to the editor's sync peers.
    pub fn edit_editor<R>(
        &mut self,
        id: EditorId,
        f: impl FnOnce(&mut EditorSurface) -> R,
    ) -> Option<R> {
        let editor = self.editor_mut(id)?;
        let before = editor.edit_generation();
        let result = f(editor);
        let changed = editor.edit_generation() != before;
        if changed {
            self.propagate(id);
        }
        Some(result)
    }

    /// [`edit_editor`](Self::edit_editor) on the active editor.
    pub fn edit_active<R>(&mut self, f: impl FnOnce(&mut EditorSurface) -> R) -> Option<R> {
        let id = self.active_editor_id()?;
        self.edit_editor(id, f)
    }

    /// Push editor `source`'s text and modified flag to its peers.
    pub fn propagate(&mut self, source: EditorId) {
        let peers = self.sync.peers(source);
        if peers.is_empty() {
            return;
        }
        let Some((text, modified)) = self
            .editor(source)
            .map(|e| (e.text().to_string(), e.is_modified()))
        else {
            return;
        };
        debug!("Syncing {:?} to {} peer(s)", source, peers.len());
        for peer in peers {
            if let Some(editor) = self.editor_mut(peer) {
                editor.replace_text_silently(&text, modified);
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DocumentHost
// ─────────────────────────────────────────────────────────────────────────────

fn source_key(editor: &EditorSurface) -> SourceKey {
    match editor.path() {
        Some(path) => SourceKey::Path(path.to_path_buf()),
        None => SourceKey::Untitled(editor.id()),
    }
}

impl SplitContainer {
    fn editor_for_key(&self, key: &SourceKey) -> Option<&EditorSurface> {
        match key {
            SourceKey::Path(path) => {
                let path = absolute_path(path);
                self.editors().find(|e| e.path() == Some(path.as_path()))
            }
            SourceKey::Untitled(id) => self.editor(*id),
        }
    }
}

impl DocumentHost for SplitContainer {
    /// Open documents in pane order; a path shown in several panes appears
    /// once.
    fn list_open_documents(&self) -> Vec<SearchSource> {
        let mut seen = HashSet::new();
        self.editors()
            .filter_map(|editor| {
                let key = source_key(editor);
                seen.insert(key.clone()).then(|| SearchSource {
                    key,
                    text: editor.text().to_string(),
                })
            })
            .collect()
    }

    fn document_text(&self, key: &SourceKey) -> Option<String> {
        self.editor_for_key(key).map(|e| e.text().to_string())
    }

    fn replace_document_text(&mut self, key: &SourceKey, text: &str) -> bool {
        let Some(id) = self.editor_for_key(key).map(EditorSurface::id) else {
            return false;
        };
        self.edit_editor(id, |editor| editor.replace_all_text(text))
            .unwrap_or(false)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
