//! About / keyboard shortcuts window.

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

/// Shortcut groups, matching the menu bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutCategory {
    File,
    Edit,
    Search,
    View,
}

impl ShortcutCategory {
    pub fn all() -> &'static [ShortcutCategory] {
        &[
            ShortcutCategory::File,
            ShortcutCategory::Edit,
            ShortcutCategory::Search,
            ShortcutCategory::View,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ShortcutCategory::File => "File",
            ShortcutCategory::Edit => "Edit",
            ShortcutCategory::Search => "Search",
            ShortcutCategory::View => "View & Panes",
        }
    }
}

struct Shortcut {
    keys: &'static str,
    action: &'static str,
}

impl Shortcut {
    const fn new(keys: &'static str, action: &'static str) -> Self {
        Self { keys, action }
    }
}

fn shortcuts(category: ShortcutCategory) -> &'static [Shortcut] {
    const FILE: &[Shortcut] = &[
        Shortcut::new("Ctrl+N", "New Tab"),
        Shortcut::new("Ctrl+O", "Open File"),
        Shortcut::new("Ctrl+S", "Save"),
        Shortcut::new("Ctrl+Shift+S", "Save As"),
        Shortcut::new("Ctrl+W", "Close Tab"),
        Shortcut::new("Ctrl+Shift+W", "Close All Tabs"),
    ];
    const EDIT: &[Shortcut] = &[
        Shortcut::new("Ctrl+Z", "Undo"),
        Shortcut::new("Ctrl+Y", "Redo"),
        Shortcut::new("Ctrl+A", "Select All"),
        Shortcut::new("Ctrl+D", "Select Word"),
        Shortcut::new("Ctrl+L", "Select Line"),
        Shortcut::new("Ctrl+Shift+D", "Duplicate Line"),
        Shortcut::new("Ctrl+Shift+K", "Delete Line"),
        Shortcut::new("Alt+Up", "Move Line Up"),
        Shortcut::new("Alt+Down", "Move Line Down"),
    ];
    const SEARCH: &[Shortcut] = &[
        Shortcut::new("Ctrl+F", "Find"),
        Shortcut::new("Ctrl+H", "Find and Replace"),
        Shortcut::new("F3", "Find Next"),
        Shortcut::new("Shift+F3", "Find Previous"),
        Shortcut::new("Ctrl+G", "Go to Line"),
        Shortcut::new("Ctrl+Shift+F", "Find in Files"),
    ];
    const VIEW: &[Shortcut] = &[
        Shortcut::new("Ctrl+M", "Toggle Markdown Preview"),
        Shortcut::new("Ctrl+\\", "Split Side by Side"),
        Shortcut::new("Ctrl+Shift+\\", "Split Top and Bottom"),
        Shortcut::new("Ctrl+Alt+W", "Close Split"),
        Shortcut::new("Ctrl+Alt+Right", "Focus Next Pane"),
        Shortcut::new("Ctrl+Alt+Left", "Focus Previous Pane"),
        Shortcut::new("Ctrl+Tab", "Next Tab"),
        Shortcut::new("Ctrl+Shift+Tab", "Previous Tab"),
        Shortcut::new("F1", "About / Shortcuts"),
    ];
    match category {
        ShortcutCategory::File => FILE,
        ShortcutCategory::Edit => EDIT,
        ShortcutCategory::Search => SEARCH,
        ShortcutCategory::View => VIEW,
    }
}

#[derive(Debug, Clone, Default)]
pub struct AboutPanelOutput {
    pub close_requested: bool,
}

#[derive(Debug, Clone, Default)]
pub struct AboutPanel {
    /// Which shortcut categories are collapsed.
    collapsed: Vec<ShortcutCategory>,
}

impl AboutPanel {
    pub fn new() -> Self {
        Self::default()
    }

    fn toggle_category(&mut self, category: ShortcutCategory) {
        if self.collapsed.contains(&category) {
            self.collapsed.retain(|c| *c != category);
        } else {
            self.collapsed.push(category);
        }
    }

    /// Show the window. Escape or the Close button asks to close it.
    pub fn show(&mut self, ctx: &egui::Context, is_dark: bool) -> AboutPanelOutput {
        let mut output = AboutPanelOutput::default();

        egui::Window::new("About Panes")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .min_width(420.0)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                    output.close_requested = true;
                }

                ui.vertical_centered(|ui| {
                    ui.heading(RichText::new("Panes").size(22.0).strong());
                    ui.label(
                        RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION"))).weak(),
                    );
                    ui.add_space(4.0);
                    ui.label("A tabbed, split-pane plain-text editor");
                });

                ui.add_space(8.0);
                ui.separator();
                ScrollArea::vertical().max_height(360.0).show(ui, |ui| {
                    self.show_shortcuts(ui, is_dark);
                });
                ui.separator();

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Close").clicked() {
                        output.close_requested = true;
                    }
                });
            });

        output
    }

    fn show_shortcuts(&mut self, ui: &mut Ui, is_dark: bool) {
        let key_bg = if is_dark {
            Color32::from_rgb(60, 60, 70)
        } else {
            Color32::from_rgb(230, 230, 235)
        };
        let key_color = if is_dark {
            Color32::from_rgb(255, 200, 100)
        } else {
            Color32::from_rgb(150, 80, 0)
        };

        for category in ShortcutCategory::all() {
            let collapsed = self.collapsed.contains(category);
            let header = format!("{} {}", if collapsed { "▶" } else { "▼" }, category.label());
            if ui
                .add(egui::Button::new(RichText::new(header).strong()).frame(false))
                .clicked()
            {
                self.toggle_category(*category);
            }
            if collapsed {
                continue;
            }

            egui::Grid::new(("shortcuts", category.label()))
                .num_columns(2)
                .spacing([16.0, 4.0])
                .min_col_width(120.0)
                .show(ui, |ui| {
                    for shortcut in shortcuts(*category) {
                        egui::Frame::none()
                            .fill(key_bg)
                            .rounding(3.0)
                            .inner_margin(egui::Margin::symmetric(6.0, 2.0))
                            .show(ui, |ui| {
                                ui.label(
                                    RichText::new(shortcut.keys)
                                        .color(key_color)
                                        .family(egui::FontFamily::Monospace)
                                        .size(12.0),
                                );
                            });
                        ui.label(shortcut.action);
                        ui.end_row();
                    }
                });
            ui.add_space(4.0);
        }
    }
}
