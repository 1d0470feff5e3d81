//! UI components for Panes
//!
//! The pane area, the floating windows and the dialogs drawn around the
//! testable core.

mod about;
mod dialogs;
mod find_in_files;
mod pane_view;

pub use about::AboutPanel;
pub use dialogs::{GoToLineDialog, GoToLineResult};
pub use find_in_files::FindInFilesDialog;
pub use pane_view::{show_panes, PaneViewOptions};
