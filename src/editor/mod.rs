//! Editor module for Panes
//!
//! The document record, the editor surface that owns one document, the text
//! widget that draws it, and the in-document find/replace bar.

pub mod document;
mod find_replace;
mod surface;
mod widget;

pub use document::Document;
pub use find_replace::{FindReplacePanel, FindState};
pub use surface::{EditorId, EditorSurface};
pub use widget::{EditorWidget, SearchHighlights};
