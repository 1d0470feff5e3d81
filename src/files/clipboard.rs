//! System clipboard access for the Edit menu and the preview.
//!
//! The text widget handles Ctrl+C/V on its own; these helpers back the menu
//! entries and "Copy Preview as HTML".

use crate::error::{Error, Result};
use crate::preview::render_preview_html;
use arboard::Clipboard;
use log::debug;

impl From<arboard::Error> for Error {
    fn from(err: arboard::Error) -> Self {
        Error::Clipboard(err.to_string())
    }
}

pub fn copy_text(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new()?;
    clipboard.set_text(text)?;
    debug!("Copied {} bytes to clipboard", text.len());
    Ok(())
}

/// Current clipboard text. An empty clipboard reads as an empty string.
pub fn paste_text() -> Result<String> {
    let mut clipboard = Clipboard::new()?;
    match clipboard.get_text() {
        Ok(text) => Ok(text),
        Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
        Err(err) => Err(err.into()),
    }
}

/// Put the rendered preview on the clipboard as HTML, with the markdown
/// source as the plain-text alternative.
pub fn copy_preview_html(markdown: &str, dark: bool) -> Result<()> {
    let html = render_preview_html(markdown, dark);
    let mut clipboard = Clipboard::new()?;
    clipboard.set_html(html.as_str(), Some(markdown))?;
    Ok(())
}
