//! Text editor widget for Panes
//!
//! Wraps egui's `TextEdit` around an [`EditorSurface`]: the widget edits the
//! surface's buffer in place, and the result is committed back as a user edit
//! so undo history, the modified flag and events stay in one place.

use crate::editor::EditorSurface;
use crate::string_utils::line_count;
use eframe::egui::{self, Color32, FontId, ScrollArea, TextEdit, Ui};
use egui::text::{CCursor, CCursorRange};
use egui::text_edit::TextEditState;
use log::debug;
use std::sync::Arc;

/// Result of showing the editor widget.
pub struct EditorOutput {
    /// Whether the widget changed the text this frame.
    pub changed: bool,
    /// Whether the text area took keyboard focus this frame.
    pub gained_focus: bool,
    /// Whether the user clicked into the text area.
    pub clicked: bool,
}

/// Find-bar matches to paint behind the text.
#[derive(Debug, Clone, Default)]
pub struct SearchHighlights {
    /// All matches as (start, end) char positions
    pub matches: Vec<(usize, usize)>,
    /// Index of the match the selection covers
    pub current_match: Option<usize>,
}

/// A text editor widget bound to one editor surface.
///
/// ```ignore
/// EditorWidget::new(&mut editor)
///     .font_size(settings.font_size)
///     .show_line_numbers(true)
///     .search_highlights(highlights)
///     .show(ui);
/// ```
pub struct EditorWidget<'a> {
    editor: &'a mut EditorSurface,
    font_size: f32,
    word_wrap: bool,
    /// ID for the editor (for state persistence).
    id: Option<egui::Id>,
    show_line_numbers: bool,
    is_dark: bool,
    search_highlights: Option<SearchHighlights>,
}

impl<'a> EditorWidget<'a> {
    pub fn new(editor: &'a mut EditorSurface) -> Self {
        Self {
            editor,
            font_size: 14.0,
            word_wrap: true,
            id: None,
            show_line_numbers: true,
            is_dark: false,
            search_highlights: None,
        }
    }

    #[must_use]
    pub fn font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    #[must_use]
    pub fn word_wrap(mut self, wrap: bool) -> Self {
        self.word_wrap = wrap;
        self
    }

    #[must_use]
    pub fn id(mut self, id: egui::Id) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn show_line_numbers(mut self, show: bool) -> Self {
        self.show_line_numbers = show;
        self
    }

    #[must_use]
    pub fn dark(mut self, is_dark: bool) -> Self {
        self.is_dark = is_dark;
        self
    }

    #[must_use]
    pub fn search_highlights(mut self, highlights: SearchHighlights) -> Self {
        self.search_highlights = Some(highlights);
        self
    }

    /// Show the editor widget and return the output.
    pub fn show(self, ui: &mut Ui) -> EditorOutput {
        // The content version is part of the id so egui drops its cached
        // galley and cursor whenever the text changed behind its back.
        let base_id = self
            .id
            .unwrap_or_else(|| ui.id().with("editor"))
            .with(self.editor.id().raw());
        let id = base_id.with(self.editor.content_version());

        let needs_focus = self.editor.take_focus_request();
        if let Some((anchor, head)) = self.editor.take_selection_request() {
            let mut state = TextEditState::load(ui.ctx(), id).unwrap_or_default();
            state.cursor.set_char_range(Some(CCursorRange::two(
                CCursor::new(anchor),
                CCursor::new(head),
            )));
            state.store(ui.ctx(), id);
        }

        let original_content = self.editor.text().to_string();
        let font_size = self.font_size;
        let word_wrap = self.word_wrap;
        let show_line_numbers = self.show_line_numbers;
        let is_dark = self.is_dark;
        let search_highlights = self.search_highlights.clone();

        let gutter_width = if show_line_numbers {
            let digits = line_count(&original_content).to_string().len();
            (font_size * 0.6 * digits as f32 + 20.0).max(30.0)
        } else {
            0.0
        };

        let mut layouter = move |ui: &Ui, text: &str, wrap_width: f32| -> Arc<egui::Galley> {
            let font_id = FontId::monospace(font_size);
            let layout_job = if word_wrap {
                egui::text::LayoutJob::simple(
                    text.to_owned(),
                    font_id,
                    ui.visuals().text_color(),
                    wrap_width,
                )
            } else {
                egui::text::LayoutJob::simple_singleline(
                    text.to_owned(),
                    font_id,
                    ui.visuals().text_color(),
                )
            };
            ui.fonts(|f| f.layout_job(layout_job))
        };

        let content = self.editor.widget_buffer();

        let scroll_output = ScrollArea::vertical()
            .id_source(base_id.with("scroll"))
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.horizontal_top(|ui| {
                    let gutter_rect = if show_line_numbers {
                        let line_height = ui.fonts(|f| f.row_height(&FontId::monospace(font_size)));
                        let total_height = line_count(content) as f32 * line_height;
                        let (rect, _) = ui.allocate_exact_size(
                            egui::vec2(gutter_width, total_height.max(ui.available_height())),
                            egui::Sense::hover(),
                        );
                        Some(rect)
                    } else {
                        None
                    };

                    let text_output = TextEdit::multiline(content)
                        .id(id)
                        .frame(false)
                        .font(FontId::monospace(font_size))
                        .desired_width(f32::INFINITY)
                        .layouter(&mut layouter)
                        .show(ui);

                    if needs_focus {
                        text_output.response.request_focus();
                    }

                    if let Some(highlights) = &search_highlights {
                        paint_highlights(ui, &text_output, highlights, is_dark);
                    }
                    if let Some(gutter_rect) = gutter_rect {
                        paint_line_numbers(ui, &text_output, gutter_rect, font_size, is_dark);
                    }

                    text_output
                })
                .inner
            });

        let text_output = scroll_output.inner;
        let changed = self.editor.commit_widget_edit(original_content);
        if changed {
            debug!("Widget edit in {:?}", self.editor.id());
        }

        if let Some(range) = text_output.cursor_range {
            self.editor.set_selection_from_widget(
                range.secondary.ccursor.index,
                range.primary.ccursor.index,
            );
        }

        EditorOutput {
            changed,
            gained_focus: text_output.response.gained_focus(),
            clicked: text_output.response.clicked(),
        }
    }
}

fn paint_highlights(
    ui: &Ui,
    text_output: &egui::text_edit::TextEditOutput,
    highlights: &SearchHighlights,
    is_dark: bool,
) {
    let galley = &text_output.galley;
    let galley_pos = text_output.galley_pos;
    let painter = ui.painter();

    let current_color = if is_dark {
        Color32::from_rgba_unmultiplied(255, 200, 0, 150)
    } else {
        Color32::from_rgba_unmultiplied(255, 220, 0, 180)
    };
    let other_color = if is_dark {
        Color32::from_rgba_unmultiplied(180, 150, 50, 80)
    } else {
        Color32::from_rgba_unmultiplied(255, 255, 100, 120)
    };

    for (idx, &(start, end)) in highlights.matches.iter().enumerate() {
        let color = if highlights.current_match == Some(idx) {
            current_color
        } else {
            other_color
        };
        let start = galley.from_ccursor(CCursor::new(start)).rcursor;
        let end = galley.from_ccursor(CCursor::new(end)).rcursor;

        for row_idx in start.row..=end.row {
            let Some(row) = galley.rows.get(row_idx) else {
                continue;
            };
            let x_start = if row_idx == start.row {
                row.x_offset(start.column)
            } else {
                0.0
            };
            let x_end = if row_idx == end.row {
                row.x_offset(end.column)
            } else {
                row.rect.width()
            };
            let rect = egui::Rect::from_min_max(
                egui::pos2(galley_pos.x + x_start, galley_pos.y + row.rect.min.y),
                egui::pos2(galley_pos.x + x_end, galley_pos.y + row.rect.max.y),
            );
            painter.rect_filled(rect, 2.0, color);
        }
    }
}

/// Draw one number per logical line, aligned with the first wrapped row.
fn paint_line_numbers(
    ui: &Ui,
    text_output: &egui::text_edit::TextEditOutput,
    gutter_rect: egui::Rect,
    font_size: f32,
    is_dark: bool,
) {
    let (line_color, bg_color, border_color) = if is_dark {
        (
            Color32::from_rgb(110, 110, 110),
            Color32::from_rgb(30, 30, 30),
            Color32::from_rgb(60, 60, 60),
        )
    } else {
        (
            Color32::from_rgb(120, 120, 120),
            Color32::from_rgb(245, 245, 245),
            Color32::from_rgb(200, 200, 200),
        )
    };

    let painter = ui.painter();
    painter.rect_filled(gutter_rect, 0.0, bg_color);
    painter.line_segment(
        [
            gutter_rect.right_top() + egui::vec2(-1.0, 0.0),
            gutter_rect.right_bottom() + egui::vec2(-1.0, 0.0),
        ],
        egui::Stroke::new(1.0, border_color),
    );

    let font_id = FontId::monospace(font_size);
    let galley = &text_output.galley;
    let galley_pos = text_output.galley_pos;

    if galley.rows.is_empty() {
        painter.text(
            egui::pos2(gutter_rect.right() - 12.0, galley_pos.y),
            egui::Align2::RIGHT_TOP,
            "1",
            font_id,
            line_color,
        );
        return;
    }

    let mut logical_line = 0usize;
    let mut drawn = false;
    for row in galley.rows.iter() {
        if !drawn {
            painter.text(
                egui::pos2(gutter_rect.right() - 12.0, galley_pos.y + row.min_y()),
                egui::Align2::RIGHT_TOP,
                (logical_line + 1).to_string(),
                font_id.clone(),
                line_color,
            );
            drawn = true;
        }
        if row.ends_with_newline {
            logical_line += 1;
            drawn = false;
        }
    }
}
