//! Find in Files window.
//!
//! Searches every open tab or every allow-listed file under a directory,
//! lists the matches grouped by file, and replaces a checked subset (or all
//! of them). Opened with Ctrl+Shift+F.

use crate::config::Settings;
use crate::editor::EditorId;
use crate::error::{Error, Result};
use crate::files::Prompter;
use crate::panes::SplitContainer;
use crate::search::{
    collect_sources, replace_in_files, search_sources, DocumentHost, SearchOptions,
    SearchOutcome, SearchResult, SearchScope, SourceKey,
};
use crate::string_utils::{byte_index_to_char_index, floor_char_boundary, safe_slice};
use eframe::egui::{self, Color32, Key, RichText, ScrollArea, Sense, TextFormat};
use log::{debug, info};
use std::path::PathBuf;

/// Longest line preview shown for one result, in bytes.
const MAX_LINE_PREVIEW: usize = 80;

/// What the user asked for this frame. The app performs the actions, since
/// they need the pane tree and the prompter.
#[derive(Debug, Default)]
pub struct FindInFilesOutput {
    pub find: bool,
    pub replace_selected: bool,
    pub replace_all: bool,
    pub browse: bool,
    /// Result the user clicked.
    pub navigate_to: Option<SearchResult>,
    pub closed: bool,
}

/// State for the Find in Files window.
pub struct FindInFilesDialog {
    is_open: bool,
    pub needle: String,
    pub replacement: String,
    pub case_sensitive: bool,
    pub whole_word: bool,
    /// Search a directory instead of the open tabs.
    pub use_directory: bool,
    pub directory: String,
    outcome: Option<SearchOutcome>,
    /// Check state per result, parallel to `outcome.files[i].results`.
    selected: Vec<Vec<bool>>,
    expanded: Vec<bool>,
    status: String,
    /// Needle and options of the last successful search. Replacements use
    /// these so editing the inputs afterwards cannot desync the results.
    searched: Option<(String, SearchOptions)>,
    focus_input: bool,
}

impl Default for FindInFilesDialog {
    fn default() -> Self {
        Self {
            is_open: false,
            needle: String::new(),
            replacement: String::new(),
            case_sensitive: false,
            whole_word: false,
            use_directory: false,
            directory: String::new(),
            outcome: None,
            selected: Vec::new(),
            expanded: Vec::new(),
            status: "Ready".to_string(),
            searched: None,
            focus_input: false,
        }
    }
}

impl FindInFilesDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore the remembered options.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            case_sensitive: settings.search_case_sensitive,
            whole_word: settings.search_whole_word,
            directory: settings
                .last_search_directory
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            ..Self::default()
        }
    }

    /// Write the options back for the next session.
    pub fn store_into(&self, settings: &mut Settings) {
        settings.search_case_sensitive = self.case_sensitive;
        settings.search_whole_word = self.whole_word;
        let dir = self.directory.trim();
        if !dir.is_empty() {
            settings.last_search_directory = Some(PathBuf::from(dir));
        }
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Open the window, seeding the needle from `seed` when it is one line.
    pub fn open(&mut self, seed: Option<&str>) {
        if let Some(seed) = seed.filter(|s| !s.is_empty() && !s.contains('\n')) {
            self.needle = seed.to_string();
        }
        self.is_open = true;
        self.focus_input = true;
    }

    pub fn close(&mut self) {
        self.is_open = false;
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn outcome(&self) -> Option<&SearchOutcome> {
        self.outcome.as_ref()
    }

    pub fn scope(&self) -> SearchScope {
        if self.use_directory {
            SearchScope::Directory(PathBuf::from(self.directory.trim()))
        } else {
            SearchScope::OpenTabs
        }
    }

    pub fn set_directory(&mut self, dir: PathBuf) {
        self.directory = dir.display().to_string();
        self.use_directory = true;
    }

    fn options(&self) -> SearchOptions {
        SearchOptions {
            case_sensitive: self.case_sensitive,
            whole_word: self.whole_word,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Search & replace
    // ─────────────────────────────────────────────────────────────────────────

    /// Run a search with the current inputs. Failures end up in the status
    /// line and leave no results behind.
    pub fn find_all(&mut self, host: &dyn DocumentHost, extensions: &[String]) -> bool {
        let needle = self.needle.clone();
        let options = self.options();
        match self.run_search(host, extensions, &needle, options) {
            Ok(status) => {
                self.status = status;
                self.searched = Some((needle, options));
                true
            }
            Err(err) => {
                debug!("Find in files failed: {}", err);
                self.clear_results();
                self.status = err.to_string();
                false
            }
        }
    }

    fn run_search(
        &mut self,
        host: &dyn DocumentHost,
        extensions: &[String],
        needle: &str,
        options: SearchOptions,
    ) -> Result<String> {
        if needle.is_empty() {
            return Err(Error::EmptySearch);
        }
        let collected = collect_sources(&self.scope(), host, extensions)?;
        let outcome = search_sources(&collected.sources, needle, options)?;

        let mut status = outcome.summary();
        if !collected.skipped.is_empty() {
            status.push_str(&format!(" ({} file(s) skipped)", collected.skipped.len()));
        }
        self.selected = outcome
            .files
            .iter()
            .map(|f| vec![true; f.results.len()])
            .collect();
        self.expanded = vec![true; outcome.files.len()];
        self.outcome = Some(outcome);
        Ok(status)
    }

    fn clear_results(&mut self) {
        self.outcome = None;
        self.selected.clear();
        self.expanded.clear();
        self.searched = None;
    }

    /// Results whose checkbox is ticked, in display order.
    pub fn selected_results(&self) -> Vec<SearchResult> {
        let Some(outcome) = &self.outcome else {
            return Vec::new();
        };
        outcome
            .files
            .iter()
            .zip(&self.selected)
            .flat_map(|(file, checks)| {
                file.results
                    .iter()
                    .zip(checks)
                    .filter(|(_, checked)| **checked)
                    .map(|(result, _)| result.clone())
            })
            .collect()
    }

    pub fn set_all_selected(&mut self, checked: bool) {
        for checks in &mut self.selected {
            checks.iter_mut().for_each(|c| *c = checked);
        }
    }

    /// Replace the ticked results. Returns the number of occurrences
    /// rewritten.
    pub fn replace_selected(&mut self, host: &mut dyn DocumentHost, extensions: &[String]) -> usize {
        let selected = self.selected_results();
        if selected.is_empty() {
            self.status = "No results selected".to_string();
            return 0;
        }
        self.apply_replacement(host, extensions, &selected)
    }

    /// Replace every current result after a yes/no confirmation.
    pub fn replace_all(
        &mut self,
        host: &mut dyn DocumentHost,
        prompter: &mut dyn Prompter,
        extensions: &[String],
    ) -> usize {
        let all: Vec<SearchResult> = self
            .outcome
            .as_ref()
            .map(|o| o.all_results().cloned().collect())
            .unwrap_or_default();
        if all.is_empty() {
            self.status = "No results to replace".to_string();
            return 0;
        }
        let message = format!("Replace all {} occurrences?", all.len());
        if !prompter.confirm("Replace All", &message) {
            debug!("Replace all cancelled");
            return 0;
        }
        self.apply_replacement(host, extensions, &all)
    }

    fn apply_replacement(
        &mut self,
        host: &mut dyn DocumentHost,
        extensions: &[String],
        results: &[SearchResult],
    ) -> usize {
        let Some((needle, options)) = self.searched.clone() else {
            self.status = Error::EmptySearch.to_string();
            return 0;
        };
        let report = replace_in_files(
            host,
            results,
            &needle,
            &self.replacement,
            options.case_sensitive,
        );

        let mut status = report.summary();
        if !report.errors.is_empty() {
            status.push_str(&format!(", {} error(s)", report.errors.len()));
        }

        // The old offsets are stale now; show what is left.
        if let Err(err) = self.run_search(host, extensions, &needle, options) {
            debug!("Re-search after replace found nothing: {}", err);
            self.outcome = None;
            self.selected.clear();
            self.expanded.clear();
        }
        self.status = status;
        info!("Find in files: {}", self.status);
        report.replaced
    }

    /// Bring the document of `result` to the front and select the match.
    /// Files not open anywhere are opened in the active pane.
    pub fn activate_result(split: &mut SplitContainer, result: &SearchResult) -> Result<EditorId> {
        let open = match &result.key {
            SourceKey::Path(path) => split
                .editors()
                .find(|e| e.path() == Some(path.as_path()))
                .map(|e| e.id()),
            SourceKey::Untitled(id) => split.editor(*id).map(|e| e.id()),
        };
        let id = match (open, &result.key) {
            (Some(id), _) => {
                split.focus_editor(id);
                id
            }
            (None, SourceKey::Path(path)) => split.open_file(path)?,
            (None, SourceKey::Untitled(_)) => {
                return Err(Error::Application(format!("{} is no longer open", result.key)))
            }
        };

        if let Some(editor) = split.editor_mut(id) {
            if editor.go_to_line(result.line_number) {
                let line_start = editor.cursor();
                let line = editor
                    .text()
                    .split('\n')
                    .nth(result.line_number - 1)
                    .unwrap_or("");
                if result.match_end <= line.len()
                    && line.is_char_boundary(result.match_start)
                    && line.is_char_boundary(result.match_end)
                {
                    let start = line_start + byte_index_to_char_index(line, result.match_start);
                    let end = line_start + byte_index_to_char_index(line, result.match_end);
                    editor.set_selection(start, end);
                }
            }
            editor.request_focus();
        }
        Ok(id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // UI
    // ─────────────────────────────────────────────────────────────────────────

    /// Show the window.
    pub fn show(&mut self, ctx: &egui::Context, is_dark: bool) -> FindInFilesOutput {
        let mut output = FindInFilesOutput::default();

        if !self.is_open {
            return output;
        }

        if ctx.input(|i| i.key_pressed(Key::Escape)) {
            output.closed = true;
            self.close();
            return output;
        }

        let colors = ResultColors::for_theme(is_dark);

        egui::Window::new("Find in Files")
            .id(egui::Id::new("find_in_files_window"))
            .collapsible(false)
            .resizable(true)
            .default_width(560.0)
            .default_height(420.0)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .frame(
                egui::Frame::window(&ctx.style())
                    .fill(colors.background)
                    .stroke(egui::Stroke::new(1.0, colors.border))
                    .rounding(8.0)
                    .inner_margin(12.0),
            )
            .show(ctx, |ui| {
                egui::Grid::new("find_in_files_inputs")
                    .num_columns(2)
                    .spacing([8.0, 6.0])
                    .show(ui, |ui| {
                        ui.label("Find:");
                        let response = ui.add(
                            egui::TextEdit::singleline(&mut self.needle)
                                .hint_text("Enter search text...")
                                .desired_width(400.0),
                        );
                        if self.focus_input {
                            response.request_focus();
                            self.focus_input = false;
                        }
                        if response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
                            output.find = true;
                        }
                        ui.end_row();

                        ui.label("Replace:");
                        ui.add(
                            egui::TextEdit::singleline(&mut self.replacement)
                                .hint_text("Replacement text")
                                .desired_width(400.0),
                        );
                        ui.end_row();
                    });

                ui.horizontal(|ui| {
                    ui.checkbox(&mut self.case_sensitive, "Case Sensitive");
                    ui.checkbox(&mut self.whole_word, "Whole Word");
                });

                ui.horizontal(|ui| {
                    ui.radio_value(&mut self.use_directory, false, "Open Tabs");
                    ui.radio_value(&mut self.use_directory, true, "Directory:");
                    ui.add_enabled(
                        self.use_directory,
                        egui::TextEdit::singleline(&mut self.directory).desired_width(260.0),
                    );
                    if ui.button("Browse...").clicked() {
                        output.browse = true;
                    }
                });

                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    if ui.button("Find All").clicked() {
                        output.find = true;
                    }
                    let has_results = self.outcome.as_ref().map_or(false, |o| o.total_matches() > 0);
                    if ui
                        .add_enabled(has_results, egui::Button::new("Replace Selected"))
                        .clicked()
                    {
                        output.replace_selected = true;
                    }
                    if ui
                        .add_enabled(has_results, egui::Button::new("Replace All"))
                        .clicked()
                    {
                        output.replace_all = true;
                    }
                    if has_results {
                        if ui.small_button("Select All").clicked() {
                            self.set_all_selected(true);
                        }
                        if ui.small_button("Select None").clicked() {
                            self.set_all_selected(false);
                        }
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Close").clicked() {
                            output.closed = true;
                        }
                    });
                });

                ui.separator();

                if let Some(outcome) = &self.outcome {
                    let clicked = show_results(
                        ui,
                        outcome,
                        &mut self.selected,
                        &mut self.expanded,
                        &colors,
                    );
                    if clicked.is_some() {
                        output.navigate_to = clicked;
                    }
                }

                ui.separator();
                ui.label(RichText::new(&self.status).color(colors.secondary).small());
            });

        if output.closed {
            self.close();
        }

        output
    }
}

/// Row colours of the results list.
struct ResultColors {
    background: Color32,
    border: Color32,
    text: Color32,
    secondary: Color32,
    highlight: Color32,
    hover_bg: Color32,
    result_bg: Color32,
}

impl ResultColors {
    fn for_theme(is_dark: bool) -> Self {
        if is_dark {
            Self {
                background: Color32::from_rgb(35, 35, 40),
                border: Color32::from_rgb(70, 70, 80),
                text: Color32::from_rgb(220, 220, 220),
                secondary: Color32::from_rgb(140, 140, 150),
                highlight: Color32::from_rgb(255, 220, 100),
                hover_bg: Color32::from_rgb(55, 60, 70),
                result_bg: Color32::from_rgb(45, 48, 55),
            }
        } else {
            Self {
                background: Color32::from_rgb(250, 250, 250),
                border: Color32::from_rgb(180, 180, 190),
                text: Color32::from_rgb(40, 40, 40),
                secondary: Color32::from_rgb(100, 100, 110),
                highlight: Color32::from_rgb(200, 150, 30),
                hover_bg: Color32::from_rgb(230, 235, 245),
                result_bg: Color32::from_rgb(245, 247, 250),
            }
        }
    }
}

/// Draw the grouped results; returns the result the user clicked.
fn show_results(
    ui: &mut egui::Ui,
    outcome: &SearchOutcome,
    selected: &mut [Vec<bool>],
    expanded: &mut [bool],
    colors: &ResultColors,
) -> Option<SearchResult> {
    let mut clicked = None;

    ScrollArea::vertical()
        .id_source("find_in_files_results")
        .auto_shrink([false, false])
        .max_height((ui.available_height() - 28.0).max(80.0))
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());

            for (file_idx, file) in outcome.files.iter().enumerate() {
                let file_id = egui::Id::new("find_in_files_file").with(file_idx);
                let is_expanded = expanded.get(file_idx).copied().unwrap_or(true);

                let header = ui.horizontal(|ui| {
                    let arrow = if is_expanded { "▼" } else { "▶" };
                    ui.label(RichText::new(arrow).size(10.0).color(colors.secondary));
                    ui.label(RichText::new(file.key.to_string()).color(colors.text).strong());
                    ui.label(
                        RichText::new(format!("({})", file.results.len()))
                            .color(colors.secondary)
                            .small(),
                    );
                });
                let header = ui.interact(header.response.rect, file_id, Sense::click());
                if header.hovered() {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                }
                if header.clicked() {
                    if let Some(flag) = expanded.get_mut(file_idx) {
                        *flag = !*flag;
                    }
                }

                if !is_expanded {
                    continue;
                }

                for (result_idx, result) in file.results.iter().enumerate() {
                    ui.horizontal(|ui| {
                        ui.add_space(12.0);
                        if let Some(checked) = selected
                            .get_mut(file_idx)
                            .and_then(|f| f.get_mut(result_idx))
                        {
                            ui.checkbox(checked, "");
                        }

                        let job = result_layout(result, colors);
                        let size = egui::vec2(ui.available_width(), 20.0);
                        let (rect, response) = ui.allocate_exact_size(size, Sense::click());
                        let bg = if response.hovered() {
                            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                            colors.hover_bg
                        } else {
                            colors.result_bg
                        };
                        ui.painter().rect_filled(rect, 3.0, bg);
                        let galley = ui.fonts(|f| f.layout_job(job));
                        ui.painter()
                            .galley(rect.left_top() + egui::vec2(8.0, 2.0), galley, colors.text);

                        if response.clicked() {
                            clicked = Some(result.clone());
                        }
                    });
                }
                ui.add_space(6.0);
            }
        });

    clicked
}

/// `Line N: text` with the match highlighted.
fn result_layout(result: &SearchResult, colors: &ResultColors) -> egui::text::LayoutJob {
    let font = egui::FontId::monospace(12.0);
    let plain = TextFormat {
        color: colors.text,
        font_id: font.clone(),
        ..Default::default()
    };
    let mut job = egui::text::LayoutJob::default();
    job.append(
        &format!("Line {}: ", result.line_number),
        0.0,
        TextFormat {
            color: colors.secondary,
            font_id: font.clone(),
            ..Default::default()
        },
    );

    let (line, truncated) = if result.line_text.len() > MAX_LINE_PREVIEW {
        let end = floor_char_boundary(&result.line_text, MAX_LINE_PREVIEW);
        (&result.line_text[..end], true)
    } else {
        (result.line_text.as_str(), false)
    };

    let (start, end) = result.display_range();
    let start = floor_char_boundary(line, start);
    let end = floor_char_boundary(line, end);

    if start > 0 {
        job.append(&line[..start], 0.0, plain.clone());
    }
    let matched = safe_slice(line, start, end);
    if !matched.is_empty() {
        job.append(
            matched,
            0.0,
            TextFormat {
                color: Color32::BLACK,
                background: colors.highlight,
                font_id: font,
                ..Default::default()
            },
        );
    }
    if end < line.len() {
        job.append(&line[end..], 0.0, plain.clone());
    }
    if truncated {
        job.append("...", 0.0, plain);
    }
    job
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_SEARCH_EXTENSIONS;
    use crate::events::EventBus;
    use crate::files::prompt::testing::ScriptedPrompter;
    use std::fs;
    use tempfile::TempDir;

    fn extensions() -> Vec<String> {
        DEFAULT_SEARCH_EXTENSIONS.iter().map(|s| s.to_string()).collect()
    }

    fn write(dir: &TempDir, name: &str, text: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, text).unwrap();
        path
    }

    fn dialog(needle: &str) -> FindInFilesDialog {
        let mut dialog = FindInFilesDialog::new();
        dialog.needle = needle.to_string();
        dialog
    }

    #[test]
    fn test_initial_status_is_ready() {
        let dialog = FindInFilesDialog::new();
        assert_eq!(dialog.status(), "Ready");
        assert!(!dialog.is_open());
        assert_eq!(dialog.scope(), SearchScope::OpenTabs);
    }

    #[test]
    fn test_open_seeds_single_line_needle() {
        let mut dialog = FindInFilesDialog::new();
        dialog.open(Some("alpha"));
        assert!(dialog.is_open());
        assert_eq!(dialog.needle, "alpha");

        dialog.open(Some("two\nlines"));
        assert_eq!(dialog.needle, "alpha");
    }

    #[test]
    fn test_empty_needle_reports_status() {
        let split = SplitContainer::new(EventBus::new());
        let mut dialog = dialog("");
        assert!(!dialog.find_all(&split, &extensions()));
        assert_eq!(dialog.status(), "Please enter search text");
        assert!(dialog.outcome().is_none());
    }

    #[test]
    fn test_missing_directory_reports_no_files() {
        let split = SplitContainer::new(EventBus::new());
        let mut dialog = dialog("x");
        dialog.set_directory(PathBuf::from("/definitely/not/here/panes-test"));
        assert!(!dialog.find_all(&split, &extensions()));
        assert_eq!(dialog.status(), "No files to search");
    }

    #[test]
    fn test_find_in_open_tabs() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.txt", "Hello world\nhello again");
        let b = write(&dir, "b.txt", "nothing here");
        let mut split = SplitContainer::new(EventBus::new());
        split.open_file(&a).unwrap();
        split.open_file(&b).unwrap();

        let mut dialog = dialog("hello");
        assert!(dialog.find_all(&split, &extensions()));
        assert_eq!(dialog.status(), "Found 2 match(es) in 1 file(s)");
        assert_eq!(dialog.selected_results().len(), 2);

        dialog.case_sensitive = true;
        dialog.find_all(&split, &extensions());
        assert_eq!(dialog.status(), "Found 1 match(es) in 1 file(s)");
    }

    #[test]
    fn test_replace_selected_subset_in_directory() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "notes.md", "cat cat\ncat");
        let mut split = SplitContainer::new(EventBus::new());

        let mut dialog = dialog("cat");
        dialog.replacement = "dog".to_string();
        dialog.set_directory(dir.path().to_path_buf());
        dialog.find_all(&split, &extensions());
        assert_eq!(dialog.outcome().unwrap().total_matches(), 3);

        dialog.set_all_selected(false);
        dialog.selected[0][1] = true;
        let replaced = dialog.replace_selected(&mut split, &extensions());
        assert_eq!(replaced, 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "cat dog\ncat");
        assert_eq!(dialog.status(), "Replaced 1 occurrence(s)");
        // The list was refreshed against the new text.
        assert_eq!(dialog.outcome().unwrap().total_matches(), 2);
    }

    #[test]
    fn test_replace_selected_with_nothing_checked() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.txt", "one one");
        let mut split = SplitContainer::new(EventBus::new());
        split.open_file(&a).unwrap();

        let mut dialog = dialog("one");
        dialog.find_all(&split, &extensions());
        dialog.set_all_selected(false);
        assert_eq!(dialog.replace_selected(&mut split, &extensions()), 0);
        assert_eq!(dialog.status(), "No results selected");
    }

    #[test]
    fn test_replace_all_requires_confirmation() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.txt", "Hello World Hello Hello");
        let mut split = SplitContainer::new(EventBus::new());
        let id = split.open_file(&a).unwrap();

        let mut dialog = dialog("Hello");
        dialog.replacement = "Hi".to_string();
        dialog.find_all(&split, &extensions());

        let mut declining = ScriptedPrompter::new();
        assert_eq!(dialog.replace_all(&mut split, &mut declining, &extensions()), 0);
        assert_eq!(split.editor(id).unwrap().text(), "Hello World Hello Hello");

        let mut accepting = ScriptedPrompter::new();
        accepting.confirm_answers.push_back(true);
        assert_eq!(dialog.replace_all(&mut split, &mut accepting, &extensions()), 3);
        let editor = split.editor(id).unwrap();
        assert_eq!(editor.text(), "Hi World Hi Hi");
        assert!(editor.is_modified());
        // Open documents are edited in place, not on disk.
        assert_eq!(fs::read_to_string(&a).unwrap(), "Hello World Hello Hello");
        assert_eq!(dialog.outcome().unwrap().total_matches(), 0);
    }

    #[test]
    fn test_replace_uses_searched_needle() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.txt", "red green");
        let mut split = SplitContainer::new(EventBus::new());
        let id = split.open_file(&a).unwrap();

        let mut dialog = dialog("red");
        dialog.replacement = "blue".to_string();
        dialog.find_all(&split, &extensions());
        dialog.needle = "green".to_string();
        dialog.replace_selected(&mut split, &extensions());
        assert_eq!(split.editor(id).unwrap().text(), "blue green");
    }

    #[test]
    fn test_activate_result_opens_and_selects_match() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "b.txt", "first\n  ünïcode target here");
        let mut split = SplitContainer::new(EventBus::new());

        let mut dialog = dialog("target");
        dialog.set_directory(dir.path().to_path_buf());
        dialog.find_all(&split, &extensions());
        let result = dialog.selected_results().remove(0);

        let id = FindInFilesDialog::activate_result(&mut split, &result).unwrap();
        let editor = split.active_editor().unwrap();
        assert_eq!(editor.id(), id);
        assert_eq!(editor.path(), Some(path.as_path()));
        assert_eq!(editor.selected_text(), "target");
        assert_eq!(editor.cursor_line_col().0, 2);
    }

    #[test]
    fn test_activate_result_focuses_existing_tab() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.txt", "needle");
        let b = write(&dir, "b.txt", "other");
        let mut split = SplitContainer::new(EventBus::new());
        let first = split.open_file(&a).unwrap();
        split.open_file(&b).unwrap();

        let mut dialog = dialog("needle");
        dialog.find_all(&split, &extensions());
        let result = dialog.selected_results().remove(0);
        let id = FindInFilesDialog::activate_result(&mut split, &result).unwrap();
        assert_eq!(id, first);
        assert_eq!(split.active_pane().unwrap().count(), 2);
        assert_eq!(split.active_editor_id(), Some(first));
    }

    #[test]
    fn test_settings_round_trip() {
        let mut settings = Settings::default();
        let mut dialog = FindInFilesDialog::from_settings(&settings);
        dialog.case_sensitive = true;
        dialog.directory = "/tmp/project".to_string();
        dialog.store_into(&mut settings);
        assert!(settings.search_case_sensitive);
        assert_eq!(
            settings.last_search_directory,
            Some(PathBuf::from("/tmp/project"))
        );
    }
}
