//! Markdown preview module for Panes
//!
//! `html` renders a standalone HTML document (used for "Open Preview in
//! Browser"), `ast` turns comrak's tree into owned blocks and `view` draws
//! those blocks in the side panel.

pub mod ast;
pub mod html;
mod view;

pub use html::{open_in_browser, render_preview_html};
pub use view::PreviewPanel;
