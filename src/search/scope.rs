//! Which documents a find-in-files pass looks at.

use crate::editor::document::read_text;
use crate::error::{Error, Result};
use crate::search::multi_file::{DocumentHost, SearchSource, SourceKey};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Where to search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchScope {
    /// Every document open in any pane, each file once.
    OpenTabs,
    /// Every allow-listed file under a directory, recursively.
    Directory(PathBuf),
}

/// Documents collected for a pass, plus files that could not be read.
#[derive(Debug, Default)]
pub struct CollectedSources {
    pub sources: Vec<SearchSource>,
    pub skipped: Vec<(PathBuf, Error)>,
}

fn has_allowed_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Read every allow-listed file under `dir`, hidden directories included.
/// Unreadable or non-UTF-8 files are skipped and reported. A missing
/// directory yields nothing.
pub fn collect_directory(dir: &Path, extensions: &[String]) -> CollectedSources {
    let mut collected = CollectedSources::default();
    if !dir.is_dir() {
        debug!("Search directory {} does not exist", dir.display());
        return collected;
    }

    for entry in WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() || !has_allowed_extension(path, extensions) {
            continue;
        }
        match read_text(path) {
            Ok(text) => collected.sources.push(SearchSource {
                key: SourceKey::Path(path.to_path_buf()),
                text,
            }),
            Err(err) => {
                warn!("Skipping {}: {}", path.display(), err);
                collected.skipped.push((path.to_path_buf(), err));
            }
        }
    }

    debug!(
        "Collected {} file(s) under {} ({} skipped)",
        collected.sources.len(),
        dir.display(),
        collected.skipped.len()
    );
    collected
}

/// Collect the sources for `scope`. An empty result is `NoFilesToSearch`.
pub fn collect_sources(
    scope: &SearchScope,
    host: &dyn DocumentHost,
    extensions: &[String],
) -> Result<CollectedSources> {
    let collected = match scope {
        SearchScope::OpenTabs => CollectedSources {
            sources: host.list_open_documents(),
            skipped: Vec::new(),
        },
        SearchScope::Directory(dir) => collect_directory(dir, extensions),
    };
    if collected.sources.is_empty() {
        return Err(Error::NoFilesToSearch);
    }
    Ok(collected)
}
