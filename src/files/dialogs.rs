//! Native file dialog integration using the rfd crate
//!
//! Open/save pickers for documents and the folder picker used by a
//! directory-scoped find-in-files.

use rfd::FileDialog;
use std::path::{Path, PathBuf};

const TEXT_EXTENSIONS: &[&str] = &["txt", "text", "log"];
const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "rst"];
const SOURCE_EXTENSIONS: &[&str] = &[
    "py", "js", "java", "cpp", "c", "h", "hpp", "css", "html", "xml", "json", "yaml", "yml",
];

fn with_filters(dialog: FileDialog) -> FileDialog {
    dialog
        .add_filter("All Files", &["*"])
        .add_filter("Text Files", TEXT_EXTENSIONS)
        .add_filter("Markdown Files", MARKDOWN_EXTENSIONS)
        .add_filter("Source Files", SOURCE_EXTENSIONS)
}

/// Pick one or more files to open. Empty if the dialog was cancelled.
pub fn open_files_dialog(initial_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut dialog = with_filters(FileDialog::new().set_title("Open"));
    if let Some(dir) = initial_dir {
        dialog = dialog.set_directory(dir);
    }
    dialog.pick_files().unwrap_or_default()
}

/// Pick a save location. `None` if cancelled.
pub fn save_file_dialog(initial_dir: Option<&Path>, default_name: Option<&str>) -> Option<PathBuf> {
    let mut dialog = with_filters(FileDialog::new().set_title("Save As"));
    if let Some(dir) = initial_dir {
        dialog = dialog.set_directory(dir);
    }
    if let Some(name) = default_name {
        dialog = dialog.set_file_name(name);
    }
    dialog.save_file()
}

/// Pick the root directory for a find-in-files pass. `None` if cancelled.
pub fn pick_search_directory(initial_dir: Option<&Path>) -> Option<PathBuf> {
    let mut dialog = FileDialog::new().set_title("Select Directory");
    if let Some(dir) = initial_dir {
        dialog = dialog.set_directory(dir);
    }
    dialog.pick_folder()
}
