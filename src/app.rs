//! Main application module for Panes
//!
//! This module implements the eframe App trait: the menu bar, keyboard
//! shortcuts, the status bar, the preview side panel and the floating
//! windows drawn around the pane tree.

use crate::config::{save_config_silent, Settings, Theme};
use crate::editor::{EditorId, EditorSurface, FindReplacePanel, FindState, SearchHighlights};
use crate::error::Result;
use crate::events::{EditorEvent, EventBus};
use crate::files::clipboard;
use crate::files::dialogs::{open_files_dialog, pick_search_directory};
use crate::files::NativePrompter;
use crate::panes::{Orientation, SplitContainer};
use crate::preview::{open_in_browser, PreviewPanel};
use crate::string_utils::line_count;
use crate::ui::{
    show_panes, AboutPanel, FindInFilesDialog, GoToLineDialog, GoToLineResult, PaneViewOptions,
};
use eframe::egui::{self, Key, KeyboardShortcut, Modifiers};
use log::{debug, info, warn};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Application name, used in the window title.
pub const APP_NAME: &str = "Panes";

/// Ratio change applied by Grow Pane / Shrink Pane.
const PANE_RESIZE_STEP: f32 = 0.05;

/// Something the user asked for through a shortcut or a menu entry.
///
/// Shortcuts are consumed before the panes are drawn so the text widget
/// never sees them, then run through the same path as the menus.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    New,
    Open,
    OpenRecent(PathBuf),
    Save,
    SaveAs,
    CloseTab,
    CloseAllTabs,
    Exit,
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    SelectAll,
    SelectWord,
    SelectLine,
    DuplicateLine,
    DeleteLine,
    MoveLineUp,
    MoveLineDown,
    OpenFind,
    OpenFindReplace,
    FindNext,
    FindPrev,
    GoToLine,
    FindInFiles,
    TogglePreview,
    OpenPreviewInBrowser,
    CopyPreviewHtml,
    SplitSideBySide,
    SplitTopBottom,
    CloseSplit,
    FocusNextPane,
    FocusPrevPane,
    GrowPane,
    ShrinkPane,
    NextTab,
    PrevTab,
    OpenAbout,
}

/// Shortcut bindings. egui matches Shift and Alt loosely, so for any key
/// the entries with more modifiers come first.
fn shortcut_table() -> Vec<(KeyboardShortcut, Action)> {
    let ctrl = Modifiers::COMMAND;
    let ctrl_shift = Modifiers::COMMAND | Modifiers::SHIFT;
    let ctrl_alt = Modifiers::COMMAND | Modifiers::ALT;
    let bind = |modifiers, key, action| (KeyboardShortcut::new(modifiers, key), action);

    vec![
        bind(ctrl_alt, Key::ArrowRight, Action::FocusNextPane),
        bind(ctrl_alt, Key::ArrowLeft, Action::FocusPrevPane),
        bind(ctrl_shift, Key::S, Action::SaveAs),
        bind(ctrl_shift, Key::W, Action::CloseAllTabs),
        bind(ctrl_shift, Key::Z, Action::Redo),
        bind(ctrl_shift, Key::D, Action::DuplicateLine),
        bind(ctrl_shift, Key::K, Action::DeleteLine),
        bind(ctrl_shift, Key::F, Action::FindInFiles),
        bind(ctrl_shift, Key::Backslash, Action::SplitTopBottom),
        bind(ctrl_alt, Key::W, Action::CloseSplit),
        bind(ctrl_shift, Key::Tab, Action::PrevTab),
        bind(ctrl, Key::N, Action::New),
        bind(ctrl, Key::O, Action::Open),
        bind(ctrl, Key::S, Action::Save),
        bind(ctrl, Key::W, Action::CloseTab),
        bind(ctrl, Key::Z, Action::Undo),
        bind(ctrl, Key::Y, Action::Redo),
        bind(ctrl, Key::A, Action::SelectAll),
        bind(ctrl, Key::D, Action::SelectWord),
        bind(ctrl, Key::L, Action::SelectLine),
        bind(ctrl, Key::F, Action::OpenFind),
        bind(ctrl, Key::H, Action::OpenFindReplace),
        bind(ctrl, Key::G, Action::GoToLine),
        bind(ctrl, Key::M, Action::TogglePreview),
        bind(ctrl, Key::Backslash, Action::SplitSideBySide),
        bind(ctrl, Key::Tab, Action::NextTab),
        bind(Modifiers::ALT, Key::ArrowUp, Action::MoveLineUp),
        bind(Modifiers::ALT, Key::ArrowDown, Action::MoveLineDown),
        bind(Modifiers::SHIFT, Key::F3, Action::FindPrev),
        bind(Modifiers::NONE, Key::F3, Action::FindNext),
        bind(Modifiers::NONE, Key::F1, Action::OpenAbout),
    ]
}

/// Last notable event, shown on the right of the status bar.
type StatusLine = Rc<RefCell<String>>;

fn subscribe_status(bus: &EventBus) -> StatusLine {
    let status = StatusLine::default();
    let sink = Rc::clone(&status);
    bus.subscribe(move |event| {
        let message = match event {
            EditorEvent::FileLoaded { path, .. } => format!("Opened {}", path.display()),
            EditorEvent::FileSaved { path, .. } => format!("Saved {}", path.display()),
            EditorEvent::AllTabsClosed { pane } => format!("Closed all tabs in {}", pane),
            _ => return,
        };
        *sink.borrow_mut() = message;
    });
    status
}

/// The main application struct that holds all state and implements eframe::App.
pub struct PanesApp {
    settings: Settings,
    split: SplitContainer,
    prompter: NativePrompter,
    find_state: FindState,
    find_panel: FindReplacePanel,
    show_find: bool,
    /// Editor and text versions the find matches were computed for.
    find_matches_for: Option<(EditorId, u64, u64)>,
    preview: PreviewPanel,
    find_in_files: FindInFilesDialog,
    about_panel: AboutPanel,
    show_about: bool,
    go_to_line: Option<GoToLineDialog>,
    /// Message for the modal error window.
    error_message: Option<String>,
    status: StatusLine,
    /// OS theme as last reported through eframe's visuals.
    system_dark: bool,
    /// Dark mode we applied on the previous frame.
    applied_dark: Option<bool>,
}

impl PanesApp {
    /// Create the application, opening `files` into the first pane.
    pub fn new(cc: &eframe::CreationContext<'_>, settings: Settings, files: Vec<PathBuf>) -> Self {
        info!("Initializing {}", APP_NAME);

        let bus = EventBus::new();
        let status = subscribe_status(&bus);
        let prompter = NativePrompter {
            initial_dir: settings
                .recent_files
                .first()
                .and_then(|p| p.parent())
                .map(Path::to_path_buf),
        };

        let mut app = Self {
            find_in_files: FindInFilesDialog::from_settings(&settings),
            settings,
            split: SplitContainer::new(bus),
            prompter,
            find_state: FindState::new(),
            find_panel: FindReplacePanel::new(),
            show_find: false,
            find_matches_for: None,
            preview: PreviewPanel::new(),
            about_panel: AboutPanel::new(),
            show_about: false,
            go_to_line: None,
            error_message: None,
            status,
            system_dark: cc.egui_ctx.style().visuals.dark_mode,
            applied_dark: None,
        };

        for path in files {
            app.open_path(&path);
        }
        app
    }

    /// Keep egui's visuals in line with the configured theme. Returns
    /// whether the UI is dark.
    fn apply_theme(&mut self, ctx: &egui::Context) -> bool {
        let current = ctx.style().visuals.dark_mode;
        if self.applied_dark != Some(current) {
            // Visuals we did not set came from eframe following the OS.
            self.system_dark = current;
        }
        let dark = self.settings.theme.is_dark(self.system_dark);
        if current != dark {
            ctx.set_visuals(if dark {
                egui::Visuals::dark()
            } else {
                egui::Visuals::light()
            });
        }
        self.applied_dark = Some(dark);
        dark
    }

    /// Track the window geometry so the next launch restores it.
    fn update_window_state(&mut self, ctx: &egui::Context) {
        ctx.input(|i| {
            let viewport = i.viewport();
            let window = &mut self.settings.window_size;
            window.maximized = viewport.maximized.unwrap_or(false);
            if window.maximized {
                return;
            }
            if let Some(rect) = viewport.inner_rect {
                window.width = rect.width();
                window.height = rect.height();
            }
            if let Some(rect) = viewport.outer_rect {
                window.x = Some(rect.min.x);
                window.y = Some(rect.min.y);
            }
        });
    }

    fn set_status(&self, message: impl Into<String>) {
        *self.status.borrow_mut() = message.into();
    }

    fn show_error(&mut self, message: String) {
        warn!("{}", message);
        self.error_message = Some(message);
    }

    /// Surface the outcome of an operation that may have been cancelled
    /// through a prompt.
    fn report(&mut self, result: Result<()>, what: &str) {
        match result {
            Ok(()) => {}
            Err(err) if err.is_cancelled() => debug!("{} cancelled", what),
            Err(err) => self.show_error(format!("{} failed:\n{}", what, err)),
        }
    }

    fn focus_active(&mut self) {
        if let Some(editor) = self.split.active_editor_mut() {
            editor.request_focus();
        }
    }

    /// Run `f` on the active editor, syncing peers if it edited the text.
    fn edit_active(&mut self, f: impl FnOnce(&mut EditorSurface) -> bool) {
        let changed = self.split.edit_active(|editor| {
            let changed = f(editor);
            editor.request_focus();
            changed
        });
        if changed == Some(false) {
            debug!("Edit had no effect");
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // File operations
    // ─────────────────────────────────────────────────────────────────────────

    fn open_path(&mut self, path: &Path) {
        info!("Opening file: {}", path.display());
        match self.split.open_file(path) {
            Ok(_) => {
                self.settings.add_recent_file(path.to_path_buf());
                self.prompter.initial_dir = path.parent().map(Path::to_path_buf);
                self.focus_active();
            }
            Err(err) => self.show_error(format!("Failed to open {}:\n{}", path.display(), err)),
        }
    }

    /// Handle the "File > Open" action.
    fn handle_open_file(&mut self) {
        let paths = open_files_dialog(self.prompter.initial_dir.as_deref());
        if paths.is_empty() {
            debug!("File dialog cancelled");
            return;
        }
        for path in paths {
            self.open_path(&path);
        }
    }

    fn handle_save(&mut self, save_as: bool) {
        let result = if save_as {
            self.split.save_active_as(&mut self.prompter)
        } else {
            self.split.save_active(&mut self.prompter)
        };
        match result {
            Ok(()) => {
                let saved = self
                    .split
                    .active_editor()
                    .and_then(EditorSurface::path)
                    .map(Path::to_path_buf);
                if let Some(path) = saved {
                    self.prompter.initial_dir = path.parent().map(Path::to_path_buf);
                    self.settings.add_recent_file(path);
                }
            }
            Err(err) if err.is_cancelled() => debug!("Save cancelled"),
            Err(err) => self.show_error(format!("Failed to save file:\n{}", err)),
        }
    }

    /// Handle a close request from the window. Every tab is closed first so
    /// unsaved documents get their prompt; a cancel keeps the app running.
    fn handle_close_request(&mut self) -> bool {
        if !self.split.has_unsaved_changes() {
            return true;
        }
        match self.split.close_all_tabs(&mut self.prompter) {
            Ok(()) => true,
            Err(err) if err.is_cancelled() => {
                info!("Exit cancelled");
                false
            }
            Err(err) => {
                self.show_error(format!("Could not close all tabs:\n{}", err));
                false
            }
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .filter(|path| path.is_file())
                .collect()
        });
        for path in dropped {
            self.open_path(&path);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Clipboard
    // ─────────────────────────────────────────────────────────────────────────

    fn handle_copy(&mut self, cut: bool) {
        let Some(text) = self
            .split
            .active_editor()
            .map(|e| e.selected_text().to_string())
            .filter(|t| !t.is_empty())
        else {
            return;
        };
        if let Err(err) = clipboard::copy_text(&text) {
            warn!("Copy failed: {}", err);
            self.set_status(err.to_string());
            return;
        }
        if cut {
            self.edit_active(|e| e.insert_text(""));
        }
    }

    fn handle_paste(&mut self) {
        match clipboard::paste_text() {
            Ok(text) if !text.is_empty() => self.edit_active(|e| e.insert_text(&text)),
            Ok(_) => {}
            Err(err) => {
                warn!("Paste failed: {}", err);
                self.set_status(err.to_string());
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Find bar
    // ─────────────────────────────────────────────────────────────────────────

    /// Handle opening the find panel, optionally in replace mode.
    fn handle_open_find(&mut self, replace_mode: bool) {
        if let Some(editor) = self.split.active_editor() {
            self.find_state.seed_from_selection(editor);
        }
        self.find_state.is_replace_mode = replace_mode;
        self.show_find = true;
        self.find_panel.request_focus();
        self.find_state
            .incremental_find(self.split.active_editor_mut());
        debug!("Find panel opened, replace_mode: {}", replace_mode);
    }

    fn handle_find_step(&mut self, forward: bool) {
        if self.find_state.search_term.is_empty() {
            self.handle_open_find(false);
            return;
        }
        let editor = self.split.active_editor_mut();
        let found = if forward {
            self.find_state.find_next(editor)
        } else {
            self.find_state.find_previous(editor)
        };
        if !found {
            self.set_status(format!("\"{}\" not found", self.find_state.search_term));
        }
    }

    fn close_find_bar(&mut self) {
        self.show_find = false;
        self.find_state.clear();
        self.find_matches_for = None;
        self.focus_active();
    }

    /// Recompute the find matches when the active editor or its text changed.
    fn refresh_find_matches(&mut self) {
        let Some(editor) = self.split.active_editor() else {
            self.find_state.clear();
            self.find_matches_for = None;
            return;
        };
        let key = (editor.id(), editor.content_version(), editor.edit_generation());
        if self.find_matches_for != Some(key) {
            self.find_state.find_matches(editor.text());
            self.find_matches_for = Some(key);
        }
    }

    fn show_find_bar(&mut self, ctx: &egui::Context, is_dark: bool) {
        self.refresh_find_matches();
        let label = self.find_state.match_label(self.split.active_editor());
        let output = self
            .find_panel
            .show(ctx, &mut self.find_state, &label, is_dark);

        if output.search_changed {
            self.find_state
                .incremental_find(self.split.active_editor_mut());
        }
        if output.next_requested {
            self.handle_find_step(true);
        }
        if output.prev_requested {
            self.handle_find_step(false);
        }
        if output.replace_requested {
            let find = &mut self.find_state;
            self.split.edit_active(|editor| find.replace(Some(editor)));
        }
        if output.replace_all_requested {
            let find = &mut self.find_state;
            let count = self
                .split
                .edit_active(|editor| find.replace_all(Some(editor)))
                .unwrap_or(0);
            self.set_status(format!(
                "Replaced {} occurrence{}",
                count,
                if count == 1 { "" } else { "s" }
            ));
        }
        if output.close_requested {
            self.close_find_bar();
        }
    }

    fn find_highlights(&mut self) -> Option<(EditorId, SearchHighlights)> {
        if !self.show_find {
            return None;
        }
        self.refresh_find_matches();
        let editor = self.split.active_editor()?;
        Some((
            editor.id(),
            SearchHighlights {
                matches: self.find_state.matches().to_vec(),
                current_match: self.find_state.current_match_index(editor),
            },
        ))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Find in files
    // ─────────────────────────────────────────────────────────────────────────

    fn handle_open_find_in_files(&mut self) {
        let seed = self
            .split
            .active_editor()
            .map(|e| e.selected_text().to_string());
        self.find_in_files.open(seed.as_deref());
    }

    fn show_find_in_files(&mut self, ctx: &egui::Context, is_dark: bool) {
        if !self.find_in_files.is_open() {
            return;
        }
        let output = self.find_in_files.show(ctx, is_dark);
        let extensions = self.settings.search_extensions.clone();

        if output.browse {
            let initial = self.settings.last_search_directory.clone();
            if let Some(dir) = pick_search_directory(initial.as_deref()) {
                self.settings.last_search_directory = Some(dir.clone());
                self.find_in_files.set_directory(dir);
            }
        }
        if output.find {
            self.find_in_files.find_all(&self.split, &extensions);
        }
        if output.replace_selected {
            self.find_in_files
                .replace_selected(&mut self.split, &extensions);
        }
        if output.replace_all {
            self.find_in_files
                .replace_all(&mut self.split, &mut self.prompter, &extensions);
        }
        if let Some(result) = output.navigate_to {
            if let Err(err) = FindInFilesDialog::activate_result(&mut self.split, &result) {
                self.show_error(format!("Failed to open {}:\n{}", result.key, err));
            }
        }
        if output.closed {
            self.find_in_files.store_into(&mut self.settings);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Preview
    // ─────────────────────────────────────────────────────────────────────────

    fn active_text(&self) -> String {
        self.split
            .active_editor()
            .map(|e| e.text().to_string())
            .unwrap_or_default()
    }

    fn handle_open_preview_in_browser(&mut self, dark: bool) {
        match open_in_browser(&self.active_text(), dark) {
            Ok(path) => info!("Preview opened from {}", path.display()),
            Err(err) => self.show_error(format!("Failed to open preview in browser:\n{}", err)),
        }
    }

    fn handle_copy_preview_html(&mut self, dark: bool) {
        match clipboard::copy_preview_html(&self.active_text(), dark) {
            Ok(()) => self.set_status("Preview copied as HTML"),
            Err(err) => {
                warn!("Copy as HTML failed: {}", err);
                self.set_status(err.to_string());
            }
        }
    }

    fn show_preview_panel(&mut self, ctx: &egui::Context, is_dark: bool) {
        if !self.settings.show_preview {
            return;
        }
        let total = ctx.screen_rect().width();
        let response = egui::SidePanel::right("preview_panel")
            .resizable(true)
            .default_width(total * (1.0 - self.settings.preview_ratio))
            .min_width(160.0)
            .show(ctx, |ui| {
                let (text, ratio) = self
                    .split
                    .active_editor()
                    .map(|e| (e.text(), e.scroll_ratio()))
                    .unwrap_or(("", 0.0));
                self.preview
                    .show(ui, text, ratio, is_dark, self.settings.font_size)
            });

        if response.inner.open_in_browser {
            self.handle_open_preview_in_browser(is_dark);
        }
        if total > 0.0 {
            self.settings.preview_ratio = (1.0 - response.response.rect.width() / total)
                .clamp(Settings::MIN_PREVIEW_RATIO, Settings::MAX_PREVIEW_RATIO);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Actions
    // ─────────────────────────────────────────────────────────────────────────

    /// Handle keyboard shortcuts, consuming the keys of the one that fired.
    fn handle_keyboard_shortcuts(&mut self, ctx: &egui::Context) {
        let action = ctx.input_mut(|i| {
            shortcut_table()
                .into_iter()
                .find(|(shortcut, _)| i.consume_shortcut(shortcut))
                .map(|(_, action)| action)
        });
        if let Some(action) = action {
            debug!("Keyboard shortcut: {:?}", action);
            self.run_action(ctx, action);
        }
    }

    fn run_action(&mut self, ctx: &egui::Context, action: Action) {
        let is_dark = self.applied_dark.unwrap_or(false);
        match action {
            Action::New => {
                self.split.new_tab();
                self.focus_active();
            }
            Action::Open => self.handle_open_file(),
            Action::OpenRecent(path) => self.open_path(&path),
            Action::Save => self.handle_save(false),
            Action::SaveAs => self.handle_save(true),
            Action::CloseTab => {
                let result = self.split.close_current_tab(&mut self.prompter);
                self.report(result, "Close tab");
            }
            Action::CloseAllTabs => {
                let result = self.split.close_all_tabs(&mut self.prompter);
                self.report(result, "Close all tabs");
            }
            Action::Exit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
            Action::Undo => self.edit_active(EditorSurface::undo),
            Action::Redo => self.edit_active(EditorSurface::redo),
            Action::Cut => self.handle_copy(true),
            Action::Copy => self.handle_copy(false),
            Action::Paste => self.handle_paste(),
            Action::SelectAll => self.edit_active(|e| {
                e.select_all();
                false
            }),
            Action::SelectWord => self.edit_active(|e| {
                e.select_word();
                false
            }),
            Action::SelectLine => self.edit_active(|e| {
                e.select_line();
                false
            }),
            Action::DuplicateLine => self.edit_active(EditorSurface::duplicate_line),
            Action::DeleteLine => self.edit_active(EditorSurface::delete_line),
            Action::MoveLineUp => self.edit_active(EditorSurface::move_line_up),
            Action::MoveLineDown => self.edit_active(EditorSurface::move_line_down),
            Action::OpenFind => self.handle_open_find(false),
            Action::OpenFindReplace => self.handle_open_find(true),
            Action::FindNext => self.handle_find_step(true),
            Action::FindPrev => self.handle_find_step(false),
            Action::GoToLine => {
                if let Some(editor) = self.split.active_editor() {
                    self.go_to_line = Some(GoToLineDialog::new(
                        editor.cursor_line_col().0,
                        line_count(editor.text()),
                    ));
                }
            }
            Action::FindInFiles => self.handle_open_find_in_files(),
            Action::TogglePreview => self.settings.show_preview = !self.settings.show_preview,
            Action::OpenPreviewInBrowser => self.handle_open_preview_in_browser(is_dark),
            Action::CopyPreviewHtml => self.handle_copy_preview_html(is_dark),
            Action::SplitSideBySide => {
                self.split.split(Orientation::Horizontal);
                self.focus_active();
            }
            Action::SplitTopBottom => {
                self.split.split(Orientation::Vertical);
                self.focus_active();
            }
            Action::CloseSplit => {
                let result = self.split.close_split(&mut self.prompter);
                self.report(result, "Close split");
                self.focus_active();
            }
            Action::FocusNextPane => {
                self.split.focus_next();
                self.focus_active();
            }
            Action::FocusPrevPane => {
                self.split.focus_previous();
                self.focus_active();
            }
            Action::GrowPane => {
                self.split.resize_active(PANE_RESIZE_STEP);
            }
            Action::ShrinkPane => {
                self.split.resize_active(-PANE_RESIZE_STEP);
            }
            Action::NextTab => self.split.next_tab(),
            Action::PrevTab => self.split.previous_tab(),
            Action::OpenAbout => self.show_about = !self.show_about,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────────

    fn show_menu_bar(&mut self, ctx: &egui::Context) -> Option<Action> {
        let mut chosen = None;
        let (can_undo, can_redo) = self
            .split
            .active_editor()
            .map_or((false, false), |editor| (editor.can_undo(), editor.can_redo()));

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    menu_item(ui, "New Tab", "Ctrl+N", Action::New, &mut chosen);
                    menu_item(ui, "Open...", "Ctrl+O", Action::Open, &mut chosen);
                    ui.menu_button("Open Recent", |ui| {
                        if self.settings.recent_files.is_empty() {
                            ui.add_enabled(false, egui::Button::new("No recent files"));
                        }
                        for path in &self.settings.recent_files {
                            if ui.button(path.display().to_string()).clicked() {
                                chosen = Some(Action::OpenRecent(path.clone()));
                                ui.close_menu();
                            }
                        }
                    });
                    ui.separator();
                    menu_item(ui, "Save", "Ctrl+S", Action::Save, &mut chosen);
                    menu_item(ui, "Save As...", "Ctrl+Shift+S", Action::SaveAs, &mut chosen);
                    ui.separator();
                    menu_item(ui, "Close Tab", "Ctrl+W", Action::CloseTab, &mut chosen);
                    menu_item(
                        ui,
                        "Close All Tabs",
                        "Ctrl+Shift+W",
                        Action::CloseAllTabs,
                        &mut chosen,
                    );
                    ui.separator();
                    menu_item(ui, "Exit", "", Action::Exit, &mut chosen);
                });

                ui.menu_button("Edit", |ui| {
                    ui.add_enabled_ui(can_undo, |ui| {
                        menu_item(ui, "Undo", "Ctrl+Z", Action::Undo, &mut chosen);
                    });
                    ui.add_enabled_ui(can_redo, |ui| {
                        menu_item(ui, "Redo", "Ctrl+Y", Action::Redo, &mut chosen);
                    });
                    ui.separator();
                    menu_item(ui, "Cut", "", Action::Cut, &mut chosen);
                    menu_item(ui, "Copy", "", Action::Copy, &mut chosen);
                    menu_item(ui, "Paste", "", Action::Paste, &mut chosen);
                    ui.separator();
                    menu_item(ui, "Select All", "Ctrl+A", Action::SelectAll, &mut chosen);
                    menu_item(ui, "Select Word", "Ctrl+D", Action::SelectWord, &mut chosen);
                    menu_item(ui, "Select Line", "Ctrl+L", Action::SelectLine, &mut chosen);
                    ui.separator();
                    menu_item(
                        ui,
                        "Duplicate Line",
                        "Ctrl+Shift+D",
                        Action::DuplicateLine,
                        &mut chosen,
                    );
                    menu_item(ui, "Delete Line", "Ctrl+Shift+K", Action::DeleteLine, &mut chosen);
                    menu_item(ui, "Move Line Up", "Alt+Up", Action::MoveLineUp, &mut chosen);
                    menu_item(ui, "Move Line Down", "Alt+Down", Action::MoveLineDown, &mut chosen);
                });

                ui.menu_button("Search", |ui| {
                    menu_item(ui, "Find...", "Ctrl+F", Action::OpenFind, &mut chosen);
                    menu_item(ui, "Replace...", "Ctrl+H", Action::OpenFindReplace, &mut chosen);
                    menu_item(ui, "Find Next", "F3", Action::FindNext, &mut chosen);
                    menu_item(ui, "Find Previous", "Shift+F3", Action::FindPrev, &mut chosen);
                    menu_item(ui, "Go to Line...", "Ctrl+G", Action::GoToLine, &mut chosen);
                    ui.separator();
                    menu_item(
                        ui,
                        "Find in Files...",
                        "Ctrl+Shift+F",
                        Action::FindInFiles,
                        &mut chosen,
                    );
                });

                ui.menu_button("View", |ui| {
                    if ui
                        .checkbox(&mut self.settings.show_preview, "Markdown Preview")
                        .clicked()
                    {
                        ui.close_menu();
                    }
                    ui.checkbox(&mut self.settings.show_line_numbers, "Line Numbers");
                    ui.checkbox(&mut self.settings.word_wrap, "Word Wrap");
                    ui.menu_button("Theme", |ui| {
                        for theme in [Theme::Light, Theme::Dark, Theme::System] {
                            if ui
                                .radio_value(&mut self.settings.theme, theme, theme.label())
                                .clicked()
                            {
                                info!("Theme changed to {:?}", theme);
                                ui.close_menu();
                            }
                        }
                    });
                    ui.separator();
                    menu_item(
                        ui,
                        "Split Side by Side",
                        "Ctrl+\\",
                        Action::SplitSideBySide,
                        &mut chosen,
                    );
                    menu_item(
                        ui,
                        "Split Top and Bottom",
                        "Ctrl+Shift+\\",
                        Action::SplitTopBottom,
                        &mut chosen,
                    );
                    menu_item(ui, "Close Split", "Ctrl+Alt+W", Action::CloseSplit, &mut chosen);
                    menu_item(
                        ui,
                        "Focus Next Pane",
                        "Ctrl+Alt+Right",
                        Action::FocusNextPane,
                        &mut chosen,
                    );
                    menu_item(
                        ui,
                        "Focus Previous Pane",
                        "Ctrl+Alt+Left",
                        Action::FocusPrevPane,
                        &mut chosen,
                    );
                    ui.add_enabled_ui(self.split.pane_count() > 1, |ui| {
                        menu_item(ui, "Grow Pane", "", Action::GrowPane, &mut chosen);
                        menu_item(ui, "Shrink Pane", "", Action::ShrinkPane, &mut chosen);
                    });
                    ui.separator();
                    menu_item(
                        ui,
                        "Open Preview in Browser",
                        "",
                        Action::OpenPreviewInBrowser,
                        &mut chosen,
                    );
                    menu_item(
                        ui,
                        "Copy Preview as HTML",
                        "",
                        Action::CopyPreviewHtml,
                        &mut chosen,
                    );
                });

                ui.menu_button("Help", |ui| {
                    menu_item(ui, "About / Shortcuts", "F1", Action::OpenAbout, &mut chosen);
                });
            });
        });

        chosen
    }

    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(editor) = self.split.active_editor() {
                    let (line, column) = editor.cursor_line_col();
                    ui.label(format!("Line {}, Column {}", line, column));
                    ui.separator();
                    ui.label(format!("{} lines", line_count(editor.text())));
                    if editor.is_modified() {
                        ui.separator();
                        ui.label("Modified");
                    }
                    let peers = self.split.sync_registry().peers(editor.id()).len();
                    if peers > 0 {
                        ui.separator();
                        ui.label(format!("Synced with {} other pane(s)", peers));
                    }
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let panes = self.split.pane_count();
                    if panes > 1 {
                        ui.label(format!("{} panes", panes));
                        ui.separator();
                    }
                    let status = self.status.borrow().clone();
                    ui.label(egui::RichText::new(status).weak());
                });
            });
        });
    }

    fn show_pane_area(&mut self, ctx: &egui::Context, is_dark: bool) {
        let options = PaneViewOptions {
            font_size: self.settings.font_size,
            word_wrap: self.settings.word_wrap,
            show_line_numbers: self.settings.show_line_numbers,
            is_dark,
            highlights: self.find_highlights(),
        };
        let output = egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(ctx.style().visuals.extreme_bg_color))
            .show(ctx, |ui| show_panes(ui, &mut self.split, &options))
            .inner;

        if let Some((pane, index)) = output.close_tab {
            let result = self.split.close_tab(pane, index, &mut self.prompter);
            self.report(result, "Close tab");
        }
    }

    fn show_dialogs(&mut self, ctx: &egui::Context, is_dark: bool) {
        if self.show_find {
            self.show_find_bar(ctx, is_dark);
        }
        self.show_find_in_files(ctx, is_dark);

        if let Some(dialog) = &mut self.go_to_line {
            match dialog.show(ctx, is_dark) {
                GoToLineResult::None => {}
                GoToLineResult::Cancelled => {
                    self.go_to_line = None;
                    self.focus_active();
                }
                GoToLineResult::GoTo(line) => {
                    self.go_to_line = None;
                    self.edit_active(|e| {
                        e.go_to_line(line);
                        false
                    });
                }
            }
        }

        if self.show_about && self.about_panel.show(ctx, is_dark).close_requested {
            self.show_about = false;
        }

        if let Some(message) = &self.error_message {
            let mut dismissed = false;
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .order(egui::Order::Foreground)
                .show(ctx, |ui| {
                    ui.label(message.as_str());
                    ui.add_space(8.0);
                    if ui.button("OK").clicked() {
                        dismissed = true;
                    }
                });
            if dismissed {
                self.error_message = None;
            }
        }
    }

    /// Persist settings, including the find-in-files options.
    fn save_settings(&mut self) {
        self.find_in_files.store_into(&mut self.settings);
        self.settings.sanitize();
        if !save_config_silent(&self.settings) {
            warn!("Settings were not saved");
        }
    }
}

fn menu_item(
    ui: &mut egui::Ui,
    label: &str,
    shortcut: &str,
    action: Action,
    chosen: &mut Option<Action>,
) {
    let mut button = egui::Button::new(label);
    if !shortcut.is_empty() {
        button = button.shortcut_text(shortcut);
    }
    if ui.add(button).clicked() {
        *chosen = Some(action);
        ui.close_menu();
    }
}

impl eframe::App for PanesApp {
    /// Called each time the UI needs repainting.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let is_dark = self.apply_theme(ctx);

        ctx.send_viewport_cmd(egui::ViewportCommand::Title(
            self.split.window_title(APP_NAME),
        ));
        self.update_window_state(ctx);
        self.handle_dropped_files(ctx);

        if ctx.input(|i| i.viewport().close_requested()) && !self.handle_close_request() {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
        }

        // Before the panes, so the text widget never sees the keys.
        self.handle_keyboard_shortcuts(ctx);

        if let Some(action) = self.show_menu_bar(ctx) {
            self.run_action(ctx, action);
        }
        self.show_status_bar(ctx);
        self.show_preview_panel(ctx, is_dark);
        self.show_pane_area(ctx, is_dark);
        self.show_dialogs(ctx, is_dark);
    }

    /// Called when the application is about to close.
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Application exiting");
        self.save_settings();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn modifier_count(modifiers: Modifiers) -> usize {
        [
            modifiers.alt,
            modifiers.shift,
            modifiers.command || modifiers.ctrl,
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }

    #[test]
    fn test_shortcuts_are_unique() {
        let table = shortcut_table();
        for (i, (a, _)) in table.iter().enumerate() {
            for (b, _) in &table[i + 1..] {
                assert!(
                    !(a.logical_key == b.logical_key && a.modifiers == b.modifiers),
                    "duplicate binding for {:?}",
                    a.logical_key
                );
            }
        }
    }

    #[test]
    fn test_more_specific_shortcuts_come_first() {
        let table = shortcut_table();
        for (i, (earlier, _)) in table.iter().enumerate() {
            for (later, action) in &table[i + 1..] {
                if earlier.logical_key == later.logical_key {
                    assert!(
                        modifier_count(earlier.modifiers) > modifier_count(later.modifiers),
                        "{:?} is shadowed",
                        action
                    );
                }
            }
        }
    }

    #[test]
    fn test_status_line_follows_file_events() {
        let bus = EventBus::new();
        let status = subscribe_status(&bus);
        let mut editor = EditorSurface::new(bus.clone());
        bus.publish(EditorEvent::FileSaved {
            editor: editor.id(),
            path: PathBuf::from("notes.txt"),
        });
        assert_eq!(status.borrow().as_str(), "Saved notes.txt");

        editor.set_text("typing is not a status event");
        assert_eq!(status.borrow().as_str(), "Saved notes.txt");
    }
}
