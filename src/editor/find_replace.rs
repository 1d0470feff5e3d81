//! In-document find and replace
//!
//! - Incremental search while typing, starting from the current selection
//! - Case-sensitive, whole word, and regex matching modes
//! - F3/Shift+F3 navigation between matches with wraparound
//! - Replace and Replace All through the editor's undo history
//!
//! Every operation takes the editor as an `Option`; with no editor attached
//! they do nothing and report failure.

use crate::editor::EditorSurface;
use crate::search::Matcher;
use eframe::egui::{self, Color32, Key, RichText, Ui, Vec2};
use log::debug;
use regex::Regex;

// ─────────────────────────────────────────────────────────────────────────────
// Find State
// ─────────────────────────────────────────────────────────────────────────────

/// Search term, options and the current match list for the find bar.
#[derive(Debug, Clone, Default)]
pub struct FindState {
    /// Current search term
    pub search_term: String,
    /// Current replacement text
    pub replace_term: String,
    /// Whether search is case-sensitive
    pub case_sensitive: bool,
    /// Whether to match whole words only
    pub whole_word: bool,
    /// Whether to use regex matching
    pub use_regex: bool,
    /// Whether replace mode is active (vs. find-only)
    pub is_replace_mode: bool,
    /// All matches as (start, end) char positions
    matches: Vec<(usize, usize)>,
}

impl FindState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matches(&self) -> &[(usize, usize)] {
        &self.matches
    }

    /// Recompute all matches in `text`. Returns the number found.
    pub fn find_matches(&mut self, text: &str) -> usize {
        self.matches.clear();
        if self.search_term.is_empty() {
            return 0;
        }

        let byte_ranges = if self.use_regex {
            self.regex_ranges(text)
        } else {
            Matcher::new(&self.search_term, self.case_sensitive, self.whole_word)
                .find_non_overlapping(text)
        };
        self.matches = to_char_ranges(text, &byte_ranges);
        self.matches.len()
    }

    fn regex_ranges(&self, text: &str) -> Vec<(usize, usize)> {
        let pattern = if self.case_sensitive {
            self.search_term.clone()
        } else {
            format!("(?i){}", self.search_term)
        };
        let pattern = if self.whole_word {
            format!(r"\b(?:{})\b", pattern)
        } else {
            pattern
        };

        match Regex::new(&pattern) {
            Ok(re) => re
                .find_iter(text)
                .filter(|m| m.start() != m.end())
                .map(|m| (m.start(), m.end()))
                .collect(),
            Err(e) => {
                debug!("Invalid regex pattern '{}': {}", self.search_term, e);
                Vec::new()
            }
        }
    }

    /// Index of the match the editor's selection covers exactly.
    pub fn current_match_index(&self, editor: &EditorSurface) -> Option<usize> {
        let selection = editor.selection();
        self.matches.iter().position(|&m| m == selection)
    }

    fn select(editor: &mut EditorSurface, (start, end): (usize, usize)) {
        editor.set_selection(start, end);
    }

    /// Re-run the search after the term or options changed, selecting the
    /// first match at or after the start of the current selection.
    pub fn incremental_find(&mut self, editor: Option<&mut EditorSurface>) -> bool {
        let Some(editor) = editor else {
            return false;
        };
        if self.find_matches(editor.text()) == 0 {
            return false;
        }
        let from = editor.selection().0;
        let target = self
            .matches
            .iter()
            .copied()
            .find(|&(start, _)| start >= from)
            .or_else(|| self.matches.first().copied());
        match target {
            Some(range) => {
                Self::select(editor, range);
                true
            }
            None => false,
        }
    }

    /// Select the first match starting at or after the selection end,
    /// wrapping to the first match.
    pub fn find_next(&mut self, editor: Option<&mut EditorSurface>) -> bool {
        let Some(editor) = editor else {
            return false;
        };
        if self.find_matches(editor.text()) == 0 {
            return false;
        }
        let from = editor.selection().1;
        let target = self
            .matches
            .iter()
            .copied()
            .find(|&(start, _)| start >= from)
            .or_else(|| self.matches.first().copied());
        match target {
            Some(range) => {
                Self::select(editor, range);
                true
            }
            None => false,
        }
    }

    /// Select the last match starting before the selection start, wrapping
    /// to the last match.
    pub fn find_previous(&mut self, editor: Option<&mut EditorSurface>) -> bool {
        let Some(editor) = editor else {
            return false;
        };
        if self.find_matches(editor.text()) == 0 {
            return false;
        }
        let before = editor.selection().0;
        let target = self
            .matches
            .iter()
            .rev()
            .copied()
            .find(|&(start, _)| start < before)
            .or_else(|| self.matches.last().copied());
        match target {
            Some(range) => {
                Self::select(editor, range);
                true
            }
            None => false,
        }
    }

    /// Replace the selection if it is a match, then move to the next match.
    pub fn replace(&mut self, editor: Option<&mut EditorSurface>) -> bool {
        let Some(editor) = editor else {
            return false;
        };
        self.find_matches(editor.text());
        let Some(index) = self.current_match_index(editor) else {
            return false;
        };
        let (start, end) = self.matches[index];
        if start == end {
            return false;
        }
        let replacement = self.replace_term.clone();
        editor.replace_range(start, end, &replacement);
        self.find_next(Some(editor));
        true
    }

    /// Replace every match in one undoable edit. Returns the count.
    pub fn replace_all(&mut self, editor: Option<&mut EditorSurface>) -> usize {
        let Some(editor) = editor else {
            return 0;
        };
        let count = self.find_matches(editor.text());
        if count == 0 {
            return 0;
        }

        let text = editor.text();
        let mut new_text = String::with_capacity(text.len());
        let byte_at: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();

        let mut last_end = 0;
        for &(start, end) in &self.matches {
            new_text.push_str(&text[byte_at[last_end]..byte_at[start]]);
            new_text.push_str(&self.replace_term);
            last_end = end;
        }
        new_text.push_str(&text[byte_at[last_end]..]);

        editor.replace_all_text(&new_text);
        self.find_matches(editor.text());
        count
    }

    /// Text for the counter next to the search box.
    pub fn match_label(&self, editor: Option<&EditorSurface>) -> String {
        if self.search_term.is_empty() {
            return String::new();
        }
        if self.matches.is_empty() {
            return "No results".to_string();
        }
        match editor.and_then(|e| self.current_match_index(e)) {
            Some(index) => format!("{} of {}", index + 1, self.matches.len()),
            None => format!("{} matches", self.matches.len()),
        }
    }

    /// Use a single-line selection as the search term.
    pub fn seed_from_selection(&mut self, editor: &EditorSurface) {
        let selected = editor.selected_text();
        if !selected.is_empty() && !selected.contains('\n') {
            self.search_term = selected.to_string();
        }
    }

    pub fn clear(&mut self) {
        self.matches.clear();
    }
}

/// Convert sorted byte ranges into char ranges with one pass over `text`.
fn to_char_ranges(text: &str, byte_ranges: &[(usize, usize)]) -> Vec<(usize, usize)> {
    let mut out = Vec::with_capacity(byte_ranges.len());
    let mut char_pos = 0;
    let mut byte_pos = 0;
    let mut chars = text.chars();
    let mut advance_to = |target: usize, char_pos: &mut usize, byte_pos: &mut usize| {
        while *byte_pos < target {
            match chars.next() {
                Some(c) => {
                    *byte_pos += c.len_utf8();
                    *char_pos += 1;
                }
                None => break,
            }
        }
    };
    for &(start, end) in byte_ranges {
        advance_to(start, &mut char_pos, &mut byte_pos);
        let char_start = char_pos;
        advance_to(end, &mut char_pos, &mut byte_pos);
        out.push((char_start, char_pos));
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Find/Replace Panel
// ─────────────────────────────────────────────────────────────────────────────

/// Output from the FindReplacePanel.
#[derive(Debug, Clone, Default)]
pub struct FindReplacePanelOutput {
    /// Whether the search term or options changed (need to re-search)
    pub search_changed: bool,
    pub next_requested: bool,
    pub prev_requested: bool,
    pub replace_requested: bool,
    pub replace_all_requested: bool,
    pub close_requested: bool,
}

/// Floating find/replace bar anchored at the top of the window.
pub struct FindReplacePanel {
    /// Whether the search input should be focused
    focus_search: bool,
}

impl Default for FindReplacePanel {
    fn default() -> Self {
        Self::new()
    }
}

impl FindReplacePanel {
    pub fn new() -> Self {
        Self { focus_search: true }
    }

    /// Request focus on the search input.
    pub fn request_focus(&mut self) {
        self.focus_search = true;
    }

    /// Show the panel. `match_label` is the counter text computed by the
    /// caller against the active editor.
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        find_state: &mut FindState,
        match_label: &str,
        is_dark: bool,
    ) -> FindReplacePanelOutput {
        let mut output = FindReplacePanelOutput::default();

        let panel_bg = if is_dark {
            Color32::from_rgb(45, 45, 45)
        } else {
            Color32::from_rgb(250, 250, 250)
        };
        let border_color = if is_dark {
            Color32::from_rgb(70, 70, 70)
        } else {
            Color32::from_rgb(200, 200, 200)
        };
        let text_color = if is_dark {
            Color32::from_rgb(220, 220, 220)
        } else {
            Color32::from_rgb(30, 30, 30)
        };
        let muted_color = if is_dark {
            Color32::from_rgb(140, 140, 140)
        } else {
            Color32::from_rgb(120, 120, 120)
        };
        let accent_color = if is_dark {
            Color32::from_rgb(100, 180, 255)
        } else {
            Color32::from_rgb(0, 120, 212)
        };

        let frame = egui::Frame::none()
            .fill(panel_bg)
            .stroke(egui::Stroke::new(1.0, border_color))
            .inner_margin(egui::Margin::symmetric(12.0, 8.0))
            .rounding(egui::Rounding::same(6.0));

        egui::Window::new("Find and Replace")
            .id(egui::Id::new("find_replace_panel"))
            .title_bar(false)
            .resizable(false)
            .collapsible(false)
            .anchor(egui::Align2::RIGHT_TOP, [-16.0, 40.0])
            .frame(frame)
            .show(ctx, |ui| {
                ui.set_min_width(420.0);

                // F3 and Shift+F3 are app shortcuts and work with the bar closed.
                if ui.input(|i| i.key_pressed(Key::Escape)) {
                    output.close_requested = true;
                }

                ui.horizontal(|ui| {
                    let title = if find_state.is_replace_mode {
                        "Find and Replace"
                    } else {
                        "Find"
                    };
                    ui.label(RichText::new(title).size(14.0).color(text_color).strong());

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui
                            .add(
                                egui::Button::new(RichText::new("×").size(16.0).color(muted_color))
                                    .frame(false),
                            )
                            .on_hover_text("Close (Escape)")
                            .clicked()
                        {
                            output.close_requested = true;
                        }

                        let mode_icon = if find_state.is_replace_mode {
                            "⇅"
                        } else {
                            "⇄"
                        };
                        if ui
                            .add(
                                egui::Button::new(
                                    RichText::new(mode_icon).size(14.0).color(muted_color),
                                )
                                .frame(false),
                            )
                            .on_hover_text("Toggle Replace (Ctrl+H)")
                            .clicked()
                        {
                            find_state.is_replace_mode = !find_state.is_replace_mode;
                        }
                    });
                });

                ui.add_space(6.0);

                ui.horizontal(|ui| {
                    let search_response = ui.add_sized(
                        Vec2::new(260.0, 24.0),
                        egui::TextEdit::singleline(&mut find_state.search_term)
                            .id(egui::Id::new("find_replace_search_input"))
                            .hint_text("Find...")
                            .font(egui::FontId::proportional(13.0)),
                    );
                    if self.focus_search {
                        search_response.request_focus();
                        self.focus_search = false;
                    }
                    if search_response.changed() {
                        output.search_changed = true;
                    }
                    if search_response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
                        output.next_requested = true;
                        self.focus_search = true;
                    }

                    ui.label(RichText::new(match_label).size(12.0).color(muted_color));
                });

                if find_state.is_replace_mode {
                    ui.add_space(4.0);
                    ui.add_sized(
                        Vec2::new(260.0, 24.0),
                        egui::TextEdit::singleline(&mut find_state.replace_term)
                            .hint_text("Replace with...")
                            .font(egui::FontId::proportional(13.0)),
                    );
                }

                ui.add_space(8.0);

                ui.horizontal(|ui| {
                    let toggles = [
                        ("Aa", "Case Sensitive", &mut find_state.case_sensitive),
                        ("W", "Whole Word", &mut find_state.whole_word),
                        (".*", "Use Regex", &mut find_state.use_regex),
                    ];
                    for (label, tooltip, flag) in toggles {
                        if ui
                            .add(toggle_button(label, tooltip, *flag, is_dark, accent_color))
                            .clicked()
                        {
                            *flag = !*flag;
                            output.search_changed = true;
                        }
                        ui.add_space(4.0);
                    }

                    ui.add_space(12.0);

                    if ui
                        .add(egui::Button::new("◀").min_size(Vec2::new(28.0, 24.0)))
                        .on_hover_text("Previous (Shift+F3)")
                        .clicked()
                    {
                        output.prev_requested = true;
                    }
                    if ui
                        .add(egui::Button::new("▶").min_size(Vec2::new(28.0, 24.0)))
                        .on_hover_text("Next (F3 or Enter)")
                        .clicked()
                    {
                        output.next_requested = true;
                    }

                    if find_state.is_replace_mode {
                        ui.add_space(8.0);
                        if ui.button("Replace").clicked() {
                            output.replace_requested = true;
                        }
                        if ui.button("Replace All").clicked() {
                            output.replace_all_requested = true;
                        }
                    }
                });
            });

        output
    }
}

/// Create a toggle button widget.
fn toggle_button<'a>(
    label: &'a str,
    tooltip: &'a str,
    active: bool,
    is_dark: bool,
    accent_color: Color32,
) -> impl egui::Widget + 'a {
    move |ui: &mut Ui| -> egui::Response {
        let text_color = if active {
            accent_color
        } else if is_dark {
            Color32::from_rgb(160, 160, 160)
        } else {
            Color32::from_rgb(100, 100, 100)
        };

        let bg_color = match (active, is_dark) {
            (true, true) => Color32::from_rgb(50, 70, 90),
            (true, false) => Color32::from_rgb(220, 235, 250),
            (false, _) => Color32::TRANSPARENT,
        };

        ui.add(
            egui::Button::new(RichText::new(label).size(12.0).color(text_color).strong())
                .fill(bg_color)
                .min_size(Vec2::new(28.0, 24.0)),
        )
        .on_hover_text(tooltip)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;

    fn editor_with(text: &str) -> EditorSurface {
        let mut editor = EditorSurface::new(EventBus::new());
        editor.set_text(text);
        editor.set_cursor(0);
        editor
    }

    fn state(term: &str) -> FindState {
        FindState {
            search_term: term.to_string(),
            ..FindState::default()
        }
    }

    #[test]
    fn test_incremental_find_selects_first_match() {
        let mut editor = editor_with("say hello, hello");
        let mut find = state("hello");
        assert!(find.incremental_find(Some(&mut editor)));
        assert_eq!(editor.selection(), (4, 9));

        // Typing one more character keeps the search anchored at the selection.
        find.search_term.push(',');
        assert!(find.incremental_find(Some(&mut editor)));
        assert_eq!(editor.selection(), (4, 10));
    }

    #[test]
    fn test_find_next_wraps() {
        let mut editor = editor_with("ab ab ab");
        let mut find = state("ab");
        assert!(find.find_next(Some(&mut editor)));
        assert_eq!(editor.selection(), (0, 2));
        assert!(find.find_next(Some(&mut editor)));
        assert!(find.find_next(Some(&mut editor)));
        assert_eq!(editor.selection(), (6, 8));
        assert!(find.find_next(Some(&mut editor)));
        assert_eq!(editor.selection(), (0, 2));
    }

    #[test]
    fn test_find_previous_wraps() {
        let mut editor = editor_with("ab ab ab");
        let mut find = state("ab");
        assert!(find.find_previous(Some(&mut editor)));
        assert_eq!(editor.selection(), (6, 8));
        assert!(find.find_previous(Some(&mut editor)));
        assert_eq!(editor.selection(), (3, 5));
    }

    #[test]
    fn test_case_sensitive_find() {
        let mut editor = editor_with("Hello hello HELLO");
        let mut find = state("hello");
        find.case_sensitive = true;
        assert!(find.find_next(Some(&mut editor)));
        assert_eq!(editor.cursor(), 11);
    }

    #[test]
    fn test_whole_word_find() {
        let mut editor = editor_with("Hello HelloWorld Hello");
        let mut find = state("Hello");
        find.whole_word = true;
        assert!(find.find_next(Some(&mut editor)));
        assert_eq!(editor.cursor(), 5);
        assert!(find.find_next(Some(&mut editor)));
        assert_eq!(editor.cursor(), 22);
    }

    #[test]
    fn test_whole_word_treats_underscore_as_boundary() {
        let mut editor = editor_with("snake_case case");
        let mut find = state("case");
        find.whole_word = true;
        assert_eq!(find.find_matches(editor.text()), 2);
        assert!(find.find_next(Some(&mut editor)));
        assert_eq!(editor.selection(), (6, 10));
    }

    #[test]
    fn test_no_match_returns_false() {
        let mut editor = editor_with("abc");
        let mut find = state("xyz");
        assert!(!find.find_next(Some(&mut editor)));
        assert_eq!(find.match_label(Some(&editor)), "No results");
    }

    #[test]
    fn test_replace_requires_selected_match() {
        let mut editor = editor_with("cat dog cat");
        let mut find = state("cat");
        find.replace_term = "cow".to_string();

        editor.set_selection(4, 7);
        assert!(!find.replace(Some(&mut editor)));
        assert_eq!(editor.text(), "cat dog cat");

        assert!(find.find_next(Some(&mut editor)));
        assert!(find.replace(Some(&mut editor)));
        assert_eq!(editor.text(), "cat dog cow");
        // Moved on (wrapping) to the remaining match.
        assert_eq!(editor.selection(), (0, 3));
    }

    #[test]
    fn test_replace_all() {
        let mut editor = editor_with("Hello World Hello Hello");
        let mut find = state("Hello");
        find.replace_term = "Hi".to_string();
        assert_eq!(find.replace_all(Some(&mut editor)), 3);
        assert_eq!(editor.text(), "Hi World Hi Hi");
        assert!(editor.is_modified());
    }

    #[test]
    fn test_replace_all_case_sensitive() {
        let mut editor = editor_with("Hello hello HELLO");
        let mut find = state("hello");
        find.case_sensitive = true;
        find.replace_term = "hi".to_string();
        assert_eq!(find.replace_all(Some(&mut editor)), 1);
        assert_eq!(editor.text(), "Hello hi HELLO");
    }

    #[test]
    fn test_replace_all_with_empty_replacement_deletes() {
        let mut editor = editor_with("a-b-c");
        let mut find = state("-");
        assert_eq!(find.replace_all(Some(&mut editor)), 2);
        assert_eq!(editor.text(), "abc");
    }

    #[test]
    fn test_replace_all_multibyte() {
        let mut editor = editor_with("Æ på æ");
        let mut find = state("æ");
        find.replace_term = "ae".to_string();
        assert_eq!(find.replace_all(Some(&mut editor)), 2);
        assert_eq!(editor.text(), "ae på ae");
    }

    #[test]
    fn test_replace_all_is_one_undo_step() {
        let mut editor = editor_with("x x x");
        editor.set_modified(false);
        let mut find = state("x");
        find.replace_term = "y".to_string();
        find.replace_all(Some(&mut editor));
        assert!(editor.undo());
        assert_eq!(editor.text(), "x x x");
    }

    #[test]
    fn test_regex_mode() {
        let mut editor = editor_with("v1 v22 v333");
        let mut find = state(r"v\d{2,}");
        find.use_regex = true;
        assert_eq!(find.find_matches(editor.text()), 2);
        find.replace_term = "v".to_string();
        assert_eq!(find.replace_all(Some(&mut editor)), 2);
        assert_eq!(editor.text(), "v1 v v");
    }

    #[test]
    fn test_invalid_regex_finds_nothing() {
        let mut find = state("(unclosed");
        find.use_regex = true;
        assert_eq!(find.find_matches("(unclosed"), 0);
    }

    #[test]
    fn test_without_editor() {
        let mut find = state("x");
        assert!(!find.find_next(None));
        assert!(!find.find_previous(None));
        assert!(!find.incremental_find(None));
        assert!(!find.replace(None));
        assert_eq!(find.replace_all(None), 0);
    }

    #[test]
    fn test_match_label() {
        let mut editor = editor_with("a b a");
        let mut find = state("");
        assert_eq!(find.match_label(Some(&editor)), "");

        find.search_term = "a".to_string();
        find.find_matches(editor.text());
        assert_eq!(find.match_label(Some(&editor)), "2 matches");
        find.find_next(Some(&mut editor));
        assert_eq!(find.match_label(Some(&editor)), "1 of 2");
    }

    #[test]
    fn test_seed_from_selection() {
        let mut editor = editor_with("one two\nthree");
        let mut find = FindState::new();
        editor.set_selection(4, 7);
        find.seed_from_selection(&editor);
        assert_eq!(find.search_term, "two");

        editor.set_selection(4, 10);
        find.seed_from_selection(&editor);
        assert_eq!(find.search_term, "two");
    }
}
