//! Markdown preview as a standalone HTML document.
//!
//! The same comrak options drive both this renderer and the in-app preview
//! panel, so a document looks alike in the side panel and in a browser.

use crate::error::{Error, Result};
use comrak::{markdown_to_html, Options};
use log::{info, warn};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

/// Shown instead of an empty preview.
pub const PLACEHOLDER_TEXT: &str = "Start typing markdown to see preview...";

/// File name used for "Open Preview in Browser".
const BROWSER_PREVIEW_FILE: &str = "panes-preview.html";

/// comrak options shared by every preview renderer.
pub fn comrak_options() -> Options {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;
    options.extension.header_ids = Some(String::new());
    options
}

// ─────────────────────────────────────────────────────────────────────────────
// Stylesheet
// ─────────────────────────────────────────────────────────────────────────────

/// Colours for one preview theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewPalette {
    pub background: &'static str,
    pub text: &'static str,
    pub code_bg: &'static str,
    pub border: &'static str,
    pub heading: &'static str,
    pub link: &'static str,
    pub quote: &'static str,
    pub quote_border: &'static str,
    pub placeholder: &'static str,
}

impl PreviewPalette {
    pub const LIGHT: Self = Self {
        background: "#ffffff",
        text: "#333333",
        code_bg: "#f6f8fa",
        border: "#eaecef",
        heading: "#1a1a1a",
        link: "#0366d6",
        quote: "#6a737d",
        quote_border: "#dfe2e5",
        placeholder: "#999999",
    };

    pub const DARK: Self = Self {
        background: "#1e1e1e",
        text: "#d4d4d4",
        code_bg: "#2d2d2d",
        border: "#404040",
        heading: "#e0e0e0",
        link: "#4a9eff",
        quote: "#808080",
        quote_border: "#505050",
        placeholder: "#666666",
    };

    pub fn for_theme(dark: bool) -> Self {
        if dark {
            Self::DARK
        } else {
            Self::LIGHT
        }
    }
}

fn stylesheet(p: &PreviewPalette) -> String {
    format!(
        r#"
body {{
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, sans-serif;
    line-height: 1.6;
    padding: 20px;
    color: {text};
    background-color: {bg};
}}
h1, h2, h3, h4, h5, h6 {{
    margin-top: 24px;
    margin-bottom: 16px;
    font-weight: 600;
    line-height: 1.25;
    color: {heading};
}}
h1 {{ font-size: 2em; border-bottom: 1px solid {border}; padding-bottom: 0.3em; }}
h2 {{ font-size: 1.5em; border-bottom: 1px solid {border}; padding-bottom: 0.3em; }}
h3 {{ font-size: 1.25em; }}
code {{
    background-color: {code_bg};
    padding: 2px 4px;
    border-radius: 3px;
    font-family: 'Menlo', 'Monaco', 'Courier New', monospace;
    font-size: 0.9em;
}}
pre {{
    background-color: {code_bg};
    padding: 16px;
    border-radius: 6px;
    overflow: auto;
}}
pre code {{
    background-color: transparent;
    padding: 0;
}}
blockquote {{
    border-left: 4px solid {quote_border};
    padding-left: 16px;
    color: {quote};
    margin: 0;
}}
a {{ color: {link}; text-decoration: none; }}
a:hover {{ text-decoration: underline; }}
table {{ border-collapse: collapse; width: 100%; }}
table td, table th {{ border: 1px solid {border}; padding: 6px 13px; }}
table th {{ background-color: {code_bg}; font-weight: 600; }}
ul, ol {{ padding-left: 2em; }}
li {{ margin-top: 0.25em; }}
"#,
        text = p.text,
        bg = p.background,
        heading = p.heading,
        border = p.border,
        code_bg = p.code_bg,
        quote_border = p.quote_border,
        quote = p.quote,
        link = p.link,
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Rendering
// ─────────────────────────────────────────────────────────────────────────────

/// Render `markdown` to a complete HTML document.
///
/// Blank input renders a placeholder. A panic inside the converter is caught
/// and rendered as an inline error block.
pub fn render_preview_html(markdown: &str, dark: bool) -> String {
    let options = comrak_options();
    render_page(markdown, dark, |text| markdown_to_html(text, &options))
}

fn render_page(markdown: &str, dark: bool, convert: impl FnOnce(&str) -> String) -> String {
    let palette = PreviewPalette::for_theme(dark);

    if markdown.trim().is_empty() {
        return format!(
            "<div style='padding: 20px; color: {};'>{}</div>",
            palette.placeholder, PLACEHOLDER_TEXT
        );
    }

    let body = match catch_conversion(|| convert(markdown)) {
        Ok(body) => body,
        Err(message) => return error_block(&message),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <style>
{style}
    </style>
</head>
<body>
{body}
</body>
</html>"#,
        style = stylesheet(&palette),
        body = body,
    )
}

/// Run a markdown conversion, turning a panic into its message.
pub(crate) fn catch_conversion<T>(convert: impl FnOnce() -> T) -> std::result::Result<T, String> {
    panic::catch_unwind(AssertUnwindSafe(convert)).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown error".to_string());
        warn!("Markdown conversion panicked: {}", message);
        message
    })
}

pub fn error_block(message: &str) -> String {
    format!(
        "<div style='padding: 20px; color: red;'>Error rendering markdown: {}</div>",
        html_escape(message)
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Write the rendered document to a temp file and open it in the default
/// browser. Returns the file written.
pub fn open_in_browser(markdown: &str, dark: bool) -> Result<PathBuf> {
    let path = std::env::temp_dir().join(BROWSER_PREVIEW_FILE);
    std::fs::write(&path, render_preview_html(markdown, dark)).map_err(|e| Error::FileWrite {
        path: path.clone(),
        source: e,
    })?;
    open::that(&path)?;
    info!("Opened preview in browser: {}", path.display());
    Ok(path)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_renders_placeholder() {
        let html = render_preview_html("   \n\t", false);
        assert!(html.contains(PLACEHOLDER_TEXT));
        assert!(html.contains("#999999"));
        assert!(render_preview_html("", true).contains("#666666"));
    }

    #[test]
    fn test_heading_and_theme_colours() {
        let light = render_preview_html("# Title", false);
        assert!(light.contains("<h1"));
        assert!(light.contains("Title</h1>"));
        assert!(light.contains("#ffffff"));

        let dark = render_preview_html("# Title", true);
        assert!(dark.contains("#1e1e1e"));
    }

    #[test]
    fn test_extensions_enabled() {
        let html = render_preview_html(
            "| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~\n\n- [x] done\n\nhttps://example.com",
            false,
        );
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains("checkbox"));
        assert!(html.contains("<a href=\"https://example.com\">"));
    }

    #[test]
    fn test_raw_html_is_not_passed_through() {
        let html = render_preview_html("<script>alert(1)</script>", false);
        assert!(!html.contains("<script>alert(1)</script>"));
    }

    #[test]
    fn test_error_block_escapes_message() {
        let block = error_block("bad <tag>");
        assert!(block.starts_with("<div"));
        assert!(block.contains("Error rendering markdown: bad &lt;tag&gt;"));
    }

    #[test]
    fn test_converter_panic_renders_error_block() {
        let html = render_page("# Title", false, |_| panic!("converter gave up on <h1>"));
        assert_eq!(html, error_block("converter gave up on <h1>"));
        assert!(html.contains("Error rendering markdown: converter gave up on &lt;h1&gt;"));
    }

    #[test]
    fn test_catch_conversion_formatted_panic_message() {
        let result: std::result::Result<(), String> =
            catch_conversion(|| panic!("line {} unparsable", 3));
        assert_eq!(result.unwrap_err(), "line 3 unparsable");
        assert_eq!(catch_conversion(|| 7).unwrap(), 7);
    }
}
