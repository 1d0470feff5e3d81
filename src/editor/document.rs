//! Plain document record: text, optional path, modified flag.
//!
//! Owned by exactly one editor surface. Two surfaces showing the same file
//! each hold their own `Document`.

use crate::error::{Error, Result};
use log::debug;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Title shown for documents without a path.
pub const UNTITLED: &str = "Untitled";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub text: String,
    /// `None` for an untitled document.
    pub path: Option<PathBuf>,
    pub modified: bool,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Untitled, unmodified and empty: a tab holding this can be reused
    /// for the next opened file.
    pub fn is_pristine(&self) -> bool {
        self.path.is_none() && !self.modified && self.text.is_empty()
    }

    /// File name, or "Untitled".
    pub fn display_name(&self) -> String {
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| UNTITLED.to_string())
    }
}

/// The form every document path is stored and compared in: absolute, with
/// `.` and `..` folded away lexically. Symlinks are left alone. If the
/// working directory cannot be read the path is kept as given.
pub fn absolute_path(path: &Path) -> PathBuf {
    let Ok(absolute) = std::path::absolute(path) else {
        return path.to_path_buf();
    };
    let mut folded = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(folded.components().next_back(), Some(Component::Normal(_))) {
                    folded.pop();
                }
            }
            other => folded.push(other),
        }
    }
    folded
}

/// Read a file as UTF-8. Invalid UTF-8 maps to `Error::InvalidUtf8`.
pub fn read_text(path: &Path) -> Result<String> {
    debug!("Reading {}", path.display());
    fs::read_to_string(path).map_err(|e| Error::from_read(path, e))
}

/// Write text to a file, replacing its contents.
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    debug!("Writing {} bytes to {}", text.len(), path.display());
    fs::write(path, text).map_err(|e| Error::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}
