//! Persisted preferences for Panes
//!
//! `Settings` round-trips through JSON. Unknown keys are ignored and missing
//! keys take their defaults, so settings files from older builds still load.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Color scheme for the panes and the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    /// Whatever the desktop reports
    System,
}

impl Theme {
    pub fn is_dark(&self, system_prefers_dark: bool) -> bool {
        match self {
            Theme::Light => false,
            Theme::Dark => true,
            Theme::System => system_prefers_dark,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
            Theme::System => "System",
        }
    }
}

/// Last known outer geometry of the main window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: f32,
    pub height: f32,
    /// Position is only restored when both coordinates were recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default)]
    pub maximized: bool,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            x: None,
            y: None,
            maximized: false,
        }
    }
}

/// Extensions a directory search reads when the user has no list of their own.
pub const DEFAULT_SEARCH_EXTENSIONS: &[&str] = &[
    "txt", "py", "js", "java", "cpp", "c", "h", "hpp", "css", "html", "xml", "json", "md", "rst",
    "yaml", "yml",
];

fn default_search_extensions() -> Vec<String> {
    DEFAULT_SEARCH_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,
    pub show_line_numbers: bool,
    /// Editor font size in points
    pub font_size: f32,
    pub word_wrap: bool,

    pub show_preview: bool,
    /// Fraction of the window width kept by the panes; the preview gets the rest.
    pub preview_ratio: f32,

    /// Most recent first, at most `max_recent_files` long
    pub recent_files: Vec<PathBuf>,
    pub max_recent_files: usize,
    pub window_size: WindowSize,

    /// Lower-case, without the leading dot
    pub search_extensions: Vec<String>,
    pub last_search_directory: Option<PathBuf>,
    pub search_case_sensitive: bool,
    pub search_whole_word: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            show_line_numbers: true,
            font_size: 14.0,
            word_wrap: true,
            show_preview: true,
            preview_ratio: 0.6,
            recent_files: Vec::new(),
            max_recent_files: Self::DEFAULT_RECENT_FILES,
            window_size: WindowSize::default(),
            search_extensions: default_search_extensions(),
            last_search_directory: None,
            search_case_sensitive: false,
            search_whole_word: false,
        }
    }
}

impl Settings {
    pub const MIN_FONT_SIZE: f32 = 8.0;
    pub const MAX_FONT_SIZE: f32 = 72.0;
    pub const MIN_WINDOW_SIZE: f32 = 200.0;
    pub const MAX_WINDOW_SIZE: f32 = 10000.0;
    pub const MIN_PREVIEW_RATIO: f32 = 0.2;
    pub const MAX_PREVIEW_RATIO: f32 = 0.9;
    const DEFAULT_RECENT_FILES: usize = 10;
    const MAX_RECENT_FILES: usize = 100;

    /// Move `path` to the front of the recent list, dropping the oldest
    /// entry once the list is full.
    pub fn add_recent_file(&mut self, path: PathBuf) {
        self.recent_files.retain(|p| p != &path);
        self.recent_files.insert(0, path);
        self.recent_files.truncate(self.max_recent_files);
    }

    /// Pull every value back into its valid range. Run after loading and
    /// before saving.
    pub fn sanitize(&mut self) {
        self.font_size = self.font_size.clamp(Self::MIN_FONT_SIZE, Self::MAX_FONT_SIZE);
        self.preview_ratio = self
            .preview_ratio
            .clamp(Self::MIN_PREVIEW_RATIO, Self::MAX_PREVIEW_RATIO);

        let window = &mut self.window_size;
        for side in [&mut window.width, &mut window.height] {
            *side = side.clamp(Self::MIN_WINDOW_SIZE, Self::MAX_WINDOW_SIZE);
        }

        self.max_recent_files = match self.max_recent_files {
            0 => Self::DEFAULT_RECENT_FILES,
            n => n.min(Self::MAX_RECENT_FILES),
        };
        self.recent_files.truncate(self.max_recent_files);

        let mut extensions: Vec<String> = self
            .search_extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        // A wiped list would make every directory search come up empty.
        if extensions.is_empty() {
            extensions = default_search_extensions();
        }
        self.search_extensions = extensions;
    }

    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
