//! Same-file sync registry.
//!
//! Maps a file path to the editors currently showing it. An editor belongs
//! to at most one group. Groups with fewer than two members are inert; they
//! stay allocated until [`SyncRegistry::prune`] runs.

use crate::editor::EditorId;
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct SyncRegistry {
    groups: HashMap<PathBuf, Vec<EditorId>>,
}

impl SyncRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `editor` to `path`. Idempotent; an editor registered under a
    /// different path is moved.
    pub fn register(&mut self, path: &Path, editor: EditorId) {
        if self.path_of(editor) == Some(path) {
            return;
        }
        self.unregister(editor);
        debug!("sync: {:?} joins {}", editor, path.display());
        self.groups.entry(path.to_path_buf()).or_default().push(editor);
    }

    /// Remove `editor` from whatever group holds it.
    pub fn unregister(&mut self, editor: EditorId) {
        for members in self.groups.values_mut() {
            members.retain(|id| *id != editor);
        }
    }

    /// The path `editor` is registered under.
    pub fn path_of(&self, editor: EditorId) -> Option<&Path> {
        self.groups
            .iter()
            .find(|(_, members)| members.contains(&editor))
            .map(|(path, _)| path.as_path())
    }

    /// Members of the group for `path`, in registration order.
    pub fn group(&self, path: &Path) -> &[EditorId] {
        self.groups.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every other member of `editor`'s group.
    pub fn peers(&self, editor: EditorId) -> Vec<EditorId> {
        self.path_of(editor)
            .map(|path| {
                self.group(path)
                    .iter()
                    .copied()
                    .filter(|id| *id != editor)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Drop editors that no longer exist and groups left empty.
    pub fn prune(&mut self, is_live: impl Fn(EditorId) -> bool) {
        for members in self.groups.values_mut() {
            members.retain(|id| is_live(*id));
        }
        self.groups.retain(|_, members| !members.is_empty());
    }

    #[cfg(test)]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: usize) -> EditorId {
        EditorId::from_raw(n)
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut sync = SyncRegistry::new();
        let path = Path::new("/tmp/a.txt");
        sync.register(path, id(1));
        sync.register(path, id(1));
        sync.register(path, id(2));
        assert_eq!(sync.group(path), &[id(1), id(2)]);
    }

    #[test]
    fn test_peers_exclude_self() {
        let mut sync = SyncRegistry::new();
        let path = Path::new("/tmp/a.txt");
        sync.register(path, id(1));
        sync.register(path, id(2));
        sync.register(path, id(3));
        assert_eq!(sync.peers(id(2)), vec![id(1), id(3)]);
        assert!(sync.peers(id(9)).is_empty());
    }

    #[test]
    fn test_editor_in_at_most_one_group() {
        let mut sync = SyncRegistry::new();
        sync.register(Path::new("/a"), id(1));
        sync.register(Path::new("/b"), id(1));
        assert!(sync.group(Path::new("/a")).is_empty());
        assert_eq!(sync.path_of(id(1)), Some(Path::new("/b")));
    }

    #[test]
    fn test_unregister_and_prune() {
        let mut sync = SyncRegistry::new();
        let path = Path::new("/tmp/a.txt");
        sync.register(path, id(1));
        sync.register(path, id(2));
        sync.unregister(id(1));
        assert_eq!(sync.group(path), &[id(2)]);
        assert!(sync.peers(id(2)).is_empty());

        sync.prune(|_| false);
        assert_eq!(sync.group_count(), 0);
    }
}
