//! Read-only markdown preview panel.
//!
//! Renders [`Block`]s with native egui widgets. The parsed blocks are cached
//! and only rebuilt when the previewed text changes.

use crate::preview::ast::{parse_blocks, spans_text, Block, Span};
use crate::preview::html::{catch_conversion, PLACEHOLDER_TEXT};
use eframe::egui::{self, Color32, FontId, RichText, ScrollArea, Ui, Vec2};

/// Preview colours, matching the browser stylesheet.
#[derive(Debug, Clone, Copy)]
pub struct PreviewColors {
    pub background: Color32,
    pub text: Color32,
    pub heading: Color32,
    pub code_bg: Color32,
    pub border: Color32,
    pub link: Color32,
    pub quote: Color32,
    pub quote_border: Color32,
    pub placeholder: Color32,
}

impl PreviewColors {
    pub fn dark() -> Self {
        Self {
            background: Color32::from_rgb(0x1e, 0x1e, 0x1e),
            text: Color32::from_rgb(0xd4, 0xd4, 0xd4),
            heading: Color32::from_rgb(0xe0, 0xe0, 0xe0),
            code_bg: Color32::from_rgb(0x2d, 0x2d, 0x2d),
            border: Color32::from_rgb(0x40, 0x40, 0x40),
            link: Color32::from_rgb(0x4a, 0x9e, 0xff),
            quote: Color32::from_rgb(0x80, 0x80, 0x80),
            quote_border: Color32::from_rgb(0x50, 0x50, 0x50),
            placeholder: Color32::from_rgb(0x66, 0x66, 0x66),
        }
    }

    pub fn light() -> Self {
        Self {
            background: Color32::from_rgb(0xff, 0xff, 0xff),
            text: Color32::from_rgb(0x33, 0x33, 0x33),
            heading: Color32::from_rgb(0x1a, 0x1a, 0x1a),
            code_bg: Color32::from_rgb(0xf6, 0xf8, 0xfa),
            border: Color32::from_rgb(0xea, 0xec, 0xef),
            link: Color32::from_rgb(0x03, 0x66, 0xd6),
            quote: Color32::from_rgb(0x6a, 0x73, 0x7d),
            quote_border: Color32::from_rgb(0xdf, 0xe2, 0xe5),
            placeholder: Color32::from_rgb(0x99, 0x99, 0x99),
        }
    }

    pub fn for_theme(dark: bool) -> Self {
        if dark {
            Self::dark()
        } else {
            Self::light()
        }
    }
}

/// What the user asked for from the preview header.
#[derive(Debug, Default)]
pub struct PreviewOutput {
    pub open_in_browser: bool,
}

#[derive(Debug, Default)]
pub struct PreviewPanel {
    source: String,
    blocks: Vec<Block>,
    error: Option<String>,
    /// Cursor ratio the scroll position was last synced to.
    last_ratio: Option<f32>,
    /// Scrollable height measured on the previous frame.
    max_scroll: f32,
}

impl PreviewPanel {
    pub fn new() -> Self {
        Self::default()
    }

    fn refresh(&mut self, text: &str) {
        self.refresh_with(text, parse_blocks);
    }

    fn refresh_with(&mut self, text: &str, parse: impl FnOnce(&str) -> Vec<Block>) {
        if self.source == text && (!self.blocks.is_empty() || self.error.is_some()) {
            return;
        }
        self.source = text.to_string();
        match catch_conversion(|| parse(text)) {
            Ok(blocks) => {
                self.blocks = blocks;
                self.error = None;
            }
            Err(message) => {
                self.blocks.clear();
                self.error = Some(message);
            }
        }
    }

    /// Draw the preview of `text`. `scroll_ratio` is the editor's cursor
    /// position relative to its length.
    pub fn show(
        &mut self,
        ui: &mut Ui,
        text: &str,
        scroll_ratio: f32,
        dark: bool,
        font_size: f32,
    ) -> PreviewOutput {
        let mut output = PreviewOutput::default();
        let colors = PreviewColors::for_theme(dark);

        ui.horizontal(|ui| {
            ui.strong("Preview");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .small_button("Open in Browser")
                    .on_hover_text("Open Preview in Browser")
                    .clicked()
                {
                    output.open_in_browser = true;
                }
            });
        });
        ui.separator();

        if text.trim().is_empty() {
            ui.add_space(20.0);
            ui.label(RichText::new(PLACEHOLDER_TEXT).color(colors.placeholder));
            return output;
        }

        self.refresh(text);

        let mut scroll = ScrollArea::vertical()
            .id_source("markdown_preview")
            .auto_shrink([false, false]);
        if self.last_ratio != Some(scroll_ratio) {
            scroll = scroll.vertical_scroll_offset(self.max_scroll * scroll_ratio.clamp(0.0, 1.0));
            self.last_ratio = Some(scroll_ratio);
        }

        let scroll_output = egui::Frame::none()
            .fill(colors.background)
            .inner_margin(egui::Margin::same(12.0))
            .show(ui, |ui| {
                scroll.show(ui, |ui| {
                    if let Some(error) = &self.error {
                        ui.label(
                            RichText::new(format!("Error rendering markdown: {}", error))
                                .color(Color32::RED),
                        );
                        return;
                    }
                    render_blocks(ui, &self.blocks, &colors, font_size, 0);
                })
            })
            .inner;

        self.max_scroll =
            (scroll_output.content_size.y - scroll_output.inner_rect.height()).max(0.0);
        output
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Block rendering
// ─────────────────────────────────────────────────────────────────────────────

fn render_blocks(ui: &mut Ui, blocks: &[Block], colors: &PreviewColors, size: f32, depth: usize) {
    for block in blocks {
        render_block(ui, block, colors, size, depth);
    }
}

fn heading_scale(level: u8) -> f32 {
    match level {
        1 => 2.0,
        2 => 1.5,
        3 => 1.25,
        4 => 1.1,
        5 => 1.0,
        _ => 0.9,
    }
}

fn render_block(ui: &mut Ui, block: &Block, colors: &PreviewColors, size: f32, depth: usize) {
    match block {
        Block::Heading { level, spans } => {
            ui.add_space(size * 0.75);
            let heading_size = size * heading_scale(*level);
            ui.horizontal_wrapped(|ui| {
                for span in spans {
                    render_span(ui, span, colors, heading_size, Some(colors.heading));
                }
            });
            if *level <= 2 {
                render_rule(ui, colors.border);
            }
            ui.add_space(size * 0.5);
        }
        Block::Paragraph(spans) => {
            ui.horizontal_wrapped(|ui| {
                ui.spacing_mut().item_spacing.x = 0.0;
                for span in spans {
                    render_span(ui, span, colors, size, None);
                }
            });
            ui.add_space(size * 0.5);
        }
        Block::CodeBlock { literal, .. } => {
            egui::Frame::none()
                .fill(colors.code_bg)
                .rounding(6.0)
                .inner_margin(egui::Margin::same(12.0))
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.label(
                        RichText::new(literal.trim_end_matches('\n'))
                            .font(FontId::monospace(size * 0.9))
                            .color(colors.text),
                    );
                });
            ui.add_space(size * 0.5);
        }
        Block::Quote(inner) => {
            ui.horizontal(|ui| {
                let (rect, _) = ui.allocate_exact_size(
                    Vec2::new(4.0, ui.available_height().min(size * 1.6)),
                    egui::Sense::hover(),
                );
                ui.painter().rect_filled(rect, 0.0, colors.quote_border);
                ui.add_space(12.0);
                let quoted = PreviewColors {
                    text: colors.quote,
                    ..*colors
                };
                ui.vertical(|ui| render_blocks(ui, inner, &quoted, size, depth));
            });
        }
        Block::List { start, items } => {
            for (i, item) in items.iter().enumerate() {
                ui.horizontal(|ui| {
                    ui.add_space(16.0 + depth as f32 * 16.0);
                    match (item.task, start) {
                        (Some(checked), _) => {
                            let mut checked = checked;
                            ui.add_enabled(false, egui::Checkbox::without_text(&mut checked));
                        }
                        (None, Some(first)) => {
                            ui.label(
                                RichText::new(format!("{}.", first + i))
                                    .size(size)
                                    .color(colors.text),
                            );
                        }
                        (None, None) => {
                            ui.label(RichText::new("•").size(size).color(colors.text));
                        }
                    }
                    ui.vertical(|ui| render_blocks(ui, &item.blocks, colors, size, depth + 1));
                });
            }
            if depth == 0 {
                ui.add_space(size * 0.25);
            }
        }
        Block::Table { rows, .. } => {
            egui::Grid::new(ui.next_auto_id())
                .striped(true)
                .spacing(Vec2::new(13.0, 6.0))
                .show(ui, |ui| {
                    for (row_index, row) in rows.iter().enumerate() {
                        for cell in row {
                            let mut text = RichText::new(spans_text(cell))
                                .size(size)
                                .color(colors.text);
                            if row_index == 0 {
                                text = text.strong();
                            }
                            ui.label(text);
                        }
                        ui.end_row();
                    }
                });
            ui.add_space(size * 0.5);
        }
        Block::Rule => {
            ui.add_space(4.0);
            render_rule(ui, colors.border);
            ui.add_space(4.0);
        }
        Block::Html(html) => {
            ui.label(
                RichText::new(html.trim_end())
                    .font(FontId::monospace(size * 0.9))
                    .color(colors.quote),
            );
        }
        Block::Footnote { name, blocks } => {
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new(format!("[{}]", name))
                        .size(size * 0.85)
                        .color(colors.quote),
                );
                ui.vertical(|ui| render_blocks(ui, blocks, colors, size * 0.85, depth));
            });
        }
    }
}

fn render_rule(ui: &mut Ui, color: Color32) {
    let (rect, _) =
        ui.allocate_exact_size(Vec2::new(ui.available_width(), 1.0), egui::Sense::hover());
    ui.painter().rect_filled(rect, 0.0, color);
}

fn render_span(
    ui: &mut Ui,
    span: &Span,
    colors: &PreviewColors,
    size: f32,
    color: Option<Color32>,
) {
    let mut text = RichText::new(&span.text).size(size);
    if span.style.code {
        text = text
            .font(FontId::monospace(size * 0.9))
            .background_color(colors.code_bg);
    }
    if span.style.strong || color.is_some() {
        text = text.strong();
    }
    if span.style.emphasis {
        text = text.italics();
    }
    if span.style.strikethrough {
        text = text.strikethrough();
    }

    match &span.link {
        Some(url) => {
            ui.hyperlink_to(text.color(colors.link), url);
        }
        None => {
            ui.label(text.color(color.unwrap_or(colors.text)));
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_parses_blocks() {
        let mut panel = PreviewPanel::new();
        panel.refresh("# Title\n\nbody");
        assert!(!panel.blocks.is_empty());
        assert!(panel.error.is_none());
    }

    #[test]
    fn test_parse_panic_becomes_error_then_recovers() {
        let mut panel = PreviewPanel::new();
        panel.refresh("# Title");
        panel.refresh_with("# Broken", |_| panic!("parser gave up"));
        assert_eq!(panel.error.as_deref(), Some("parser gave up"));
        assert!(panel.blocks.is_empty());

        panel.refresh("# Fixed");
        assert!(panel.error.is_none());
        assert!(!panel.blocks.is_empty());
    }
}
