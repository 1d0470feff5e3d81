//! Editor event dispatch
//!
//! A small typed publish/subscribe bus shared by the editor surfaces, tab
//! containers and the split container. Everything runs on the UI thread, so
//! the bus is an `Rc<RefCell<..>>` handle that every component clones.
//!
//! Publishing from inside a subscriber is allowed: the nested event is queued
//! and delivered after the current one finishes, in order.

use crate::editor::EditorId;
use crate::panes::PaneId;
use log::trace;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

/// Something that happened to an editor, a tab container or the split tree.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// A user edit changed the text. Sync replays never publish this.
    TextChanged { editor: EditorId },
    /// The modified flag flipped.
    ModificationChanged { editor: EditorId, modified: bool },
    /// Caret moved; 1-based line and column.
    CursorMoved {
        editor: EditorId,
        line: usize,
        column: usize,
    },
    /// A file was read into the editor.
    FileLoaded { editor: EditorId, path: PathBuf },
    /// The editor's text was written to disk.
    FileSaved { editor: EditorId, path: PathBuf },
    /// The editor's tab was closed.
    EditorClosed { editor: EditorId },
    /// The current tab of a pane changed.
    CurrentEditorChanged {
        pane: PaneId,
        editor: Option<EditorId>,
    },
    /// Another pane became the active one.
    ActivePaneChanged { pane: PaneId },
    /// A pane has no tabs left.
    AllTabsClosed { pane: PaneId },
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&EditorEvent)>;

#[derive(Default)]
struct BusInner {
    handlers: Vec<(SubscriptionId, Handler)>,
    /// Handlers registered while a dispatch was running.
    pending_handlers: Vec<(SubscriptionId, Handler)>,
    /// Ids removed while a dispatch was running.
    removed: Vec<SubscriptionId>,
    queue: VecDeque<EditorEvent>,
    dispatching: bool,
    next_id: u64,
}

// ─────────────────────────────────────────────────────────────────────────────
// EventBus
// ─────────────────────────────────────────────────────────────────────────────

/// Shared, clonable handle to one event bus.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<RefCell<BusInner>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("EventBus")
            .field("subscribers", &inner.handlers.len())
            .field("queued", &inner.queue.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler called synchronously for every published event.
    pub fn subscribe(&self, handler: impl FnMut(&EditorEvent) + 'static) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        if inner.dispatching {
            inner.pending_handlers.push((id, Box::new(handler)));
        } else {
            inner.handlers.push((id, Box::new(handler)));
        }
        id
    }

    /// Remove a handler. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut inner = self.inner.borrow_mut();
        if inner.dispatching {
            inner.removed.push(id);
            inner.pending_handlers.retain(|(sid, _)| *sid != id);
        } else {
            inner.handlers.retain(|(sid, _)| *sid != id);
        }
    }

    /// Deliver an event to every subscriber before returning.
    pub fn publish(&self, event: EditorEvent) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.queue.push_back(event);
            if inner.dispatching {
                return;
            }
            inner.dispatching = true;
        }

        loop {
            let (event, mut handlers) = {
                let mut inner = self.inner.borrow_mut();
                match inner.queue.pop_front() {
                    Some(event) => (event, std::mem::take(&mut inner.handlers)),
                    None => {
                        inner.dispatching = false;
                        break;
                    }
                }
            };

            trace!("dispatch {:?} to {} handler(s)", event, handlers.len());
            for (_, handler) in handlers.iter_mut() {
                handler(&event);
            }

            let mut inner = self.inner.borrow_mut();
            let removed = std::mem::take(&mut inner.removed);
            handlers.retain(|(id, _)| !removed.contains(id));
            let pending = std::mem::take(&mut inner.pending_handlers);
            handlers.extend(pending);
            inner.handlers = handlers;
        }
    }

    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().handlers.len()
    }
}

/// Test helper: subscribe a recorder that collects every event.
#[cfg(test)]
pub fn record(bus: &EventBus) -> Rc<RefCell<Vec<EditorEvent>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    bus.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    log
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
