//! Renders the split tree: one tab bar plus editor per pane, with draggable
//! dividers between split children.
//!
//! Rendering only records what the user did. [`show_panes`] applies
//! focus, tab switches and sync propagation once the tree is no longer
//! borrowed; closing a tab needs a prompter and is left to the caller.

use crate::editor::{EditorId, EditorWidget, SearchHighlights};
use crate::panes::{
    Orientation, PaneId, SplitContainer, SplitNode, TabContainer, MAX_SPLIT_RATIO,
    MIN_SPLIT_RATIO,
};
use eframe::egui::{self, Color32, Rect, RichText, Sense, Stroke, Ui};

/// Thickness of the divider between split children.
const DIVIDER: f32 = 4.0;

/// Height reserved for a pane's tab bar.
const TAB_BAR_HEIGHT: f32 = 28.0;

/// Display options shared by every pane.
#[derive(Debug, Clone, Default)]
pub struct PaneViewOptions {
    pub font_size: f32,
    pub word_wrap: bool,
    pub show_line_numbers: bool,
    pub is_dark: bool,
    /// Find-bar matches for the active editor.
    pub highlights: Option<(EditorId, SearchHighlights)>,
}

/// What happened in the pane area this frame.
#[derive(Debug, Default)]
pub struct PaneViewOutput {
    /// Pane the user clicked into.
    pub activated: Option<PaneId>,
    /// Editors whose text the user changed.
    pub edited: Vec<EditorId>,
    pub select_tab: Option<(PaneId, usize)>,
    /// Close button of a tab; the caller closes it with a prompter.
    pub close_tab: Option<(PaneId, usize)>,
    pub new_tab_in: Option<PaneId>,
}

/// Split `rect` into (first, divider, second) at `ratio`.
pub fn split_rect(rect: Rect, orientation: Orientation, ratio: f32) -> (Rect, Rect, Rect) {
    let ratio = ratio.clamp(MIN_SPLIT_RATIO, MAX_SPLIT_RATIO);
    match orientation {
        Orientation::Horizontal => {
            let usable = (rect.width() - DIVIDER).max(0.0);
            let x = rect.left() + usable * ratio;
            (
                Rect::from_min_max(rect.min, egui::pos2(x, rect.bottom())),
                Rect::from_min_max(
                    egui::pos2(x, rect.top()),
                    egui::pos2(x + DIVIDER, rect.bottom()),
                ),
                Rect::from_min_max(egui::pos2(x + DIVIDER, rect.top()), rect.max),
            )
        }
        Orientation::Vertical => {
            let usable = (rect.height() - DIVIDER).max(0.0);
            let y = rect.top() + usable * ratio;
            (
                Rect::from_min_max(rect.min, egui::pos2(rect.right(), y)),
                Rect::from_min_max(
                    egui::pos2(rect.left(), y),
                    egui::pos2(rect.right(), y + DIVIDER),
                ),
                Rect::from_min_max(egui::pos2(rect.left(), y + DIVIDER), rect.max),
            )
        }
    }
}

/// Draw every pane into the remaining space of `ui` and apply what the
/// user did, except closing tabs.
pub fn show_panes(
    ui: &mut Ui,
    split: &mut SplitContainer,
    options: &PaneViewOptions,
) -> PaneViewOutput {
    let mut output = PaneViewOutput::default();
    let rect = ui.available_rect_before_wrap();
    let ctx = RenderContext {
        active: split.active_pane_id(),
        multi: split.pane_count() > 1,
        options,
    };

    show_node(ui, split.root_mut(), rect, egui::Id::new("pane_tree"), &ctx, &mut output);

    if let Some(id) = output.activated {
        split.set_active_pane(id);
    }
    if let Some((pane_id, index)) = output.select_tab {
        split.set_active_pane(pane_id);
        if let Some(pane) = split.pane_mut(pane_id) {
            pane.set_current(index);
        }
    }
    if let Some(pane_id) = output.new_tab_in {
        split.set_active_pane(pane_id);
        split.new_tab();
    }
    for id in &output.edited {
        split.propagate(*id);
    }
    output
}

/// Per-frame values every node needs.
struct RenderContext<'a> {
    active: PaneId,
    multi: bool,
    options: &'a PaneViewOptions,
}

fn show_node(
    ui: &mut Ui,
    node: &mut SplitNode,
    rect: Rect,
    path: egui::Id,
    render: &RenderContext<'_>,
    output: &mut PaneViewOutput,
) {
    match node {
        SplitNode::Leaf(pane) => {
            ui.allocate_ui_at_rect(rect, |ui| {
                ui.set_clip_rect(rect);
                show_pane(ui, pane, rect, render, output);
            });
        }
        SplitNode::Split {
            orientation,
            ratio,
            first,
            second,
        } => {
            let (first_rect, divider, second_rect) = split_rect(rect, *orientation, *ratio);
            show_node(ui, first, first_rect, path.with(0), render, output);
            show_node(ui, second, second_rect, path.with(1), render, output);

            let response = ui.interact(divider, path.with("divider"), Sense::drag());
            if response.hovered() || response.dragged() {
                ui.ctx().set_cursor_icon(match orientation {
                    Orientation::Horizontal => egui::CursorIcon::ResizeHorizontal,
                    Orientation::Vertical => egui::CursorIcon::ResizeVertical,
                });
            }
            if response.dragged() {
                let delta = response.drag_delta();
                let change = match orientation {
                    Orientation::Horizontal if rect.width() > 0.0 => delta.x / rect.width(),
                    Orientation::Vertical if rect.height() > 0.0 => delta.y / rect.height(),
                    _ => 0.0,
                };
                *ratio = (*ratio + change).clamp(MIN_SPLIT_RATIO, MAX_SPLIT_RATIO);
            }

            let color = if render.options.is_dark {
                Color32::from_rgb(60, 60, 60)
            } else {
                Color32::from_rgb(210, 210, 210)
            };
            ui.painter().rect_filled(divider, 0.0, color);
        }
    }
}

fn show_pane(
    ui: &mut Ui,
    pane: &mut TabContainer,
    rect: Rect,
    render: &RenderContext<'_>,
    output: &mut PaneViewOutput,
) {
    let pane_id = pane.id();
    let is_active = pane_id == render.active;
    let options = render.options;

    show_tab_bar(ui, pane, is_active, options.is_dark, output);
    ui.separator();

    if let Some(editor) = pane.current_mut() {
        let editor_id = editor.id();
        let mut widget = EditorWidget::new(editor)
            .id(egui::Id::new("pane_editor"))
            .font_size(options.font_size)
            .word_wrap(options.word_wrap)
            .show_line_numbers(options.show_line_numbers)
            .dark(options.is_dark);
        if let Some((target, highlights)) = &options.highlights {
            if *target == editor_id && is_active {
                widget = widget.search_highlights(highlights.clone());
            }
        }
        let result = widget.show(ui);

        if result.changed {
            output.edited.push(editor_id);
        }
        if !is_active && (result.clicked || result.gained_focus) {
            output.activated = Some(pane_id);
        }
    }

    if render.multi && is_active {
        let accent = if options.is_dark {
            Color32::from_rgb(100, 180, 255)
        } else {
            Color32::from_rgb(0, 120, 212)
        };
        ui.painter()
            .rect_stroke(rect.shrink(1.0), 0.0, Stroke::new(1.5, accent));
    }
}

fn show_tab_bar(
    ui: &mut Ui,
    pane: &TabContainer,
    is_active: bool,
    is_dark: bool,
    output: &mut PaneViewOutput,
) {
    let pane_id = pane.id();
    let muted = if is_dark {
        Color32::from_rgb(140, 140, 140)
    } else {
        Color32::from_rgb(120, 120, 120)
    };

    ui.allocate_ui(egui::vec2(ui.available_width(), TAB_BAR_HEIGHT), |ui| {
        egui::ScrollArea::horizontal()
            .id_source(("tab_bar", pane_id.0))
            .auto_shrink([false, true])
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    for index in 0..pane.count() {
                        let Some(title) = pane.tab_title(index) else {
                            continue;
                        };
                        let selected = index == pane.current_index();
                        let mut text = RichText::new(title);
                        if selected && is_active {
                            text = text.strong();
                        }
                        let tab = ui.selectable_label(selected, text);
                        if let Some(path) = pane.tabs().get(index).and_then(|e| e.path()) {
                            tab.clone().on_hover_text(path.display().to_string());
                        }
                        if tab.clicked() {
                            output.select_tab = Some((pane_id, index));
                        }
                        if ui
                            .add(
                                egui::Button::new(RichText::new("×").color(muted))
                                    .frame(false)
                                    .small(),
                            )
                            .on_hover_text("Close Tab")
                            .clicked()
                        {
                            output.close_tab = Some((pane_id, index));
                        }
                        ui.add_space(4.0);
                    }
                    if ui
                        .add(egui::Button::new("+").frame(false))
                        .on_hover_text("New Tab")
                        .clicked()
                    {
                        output.new_tab_in = Some(pane_id);
                    }
                });
            });
    });
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    fn rect() -> Rect {
        Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(404.0, 204.0))
    }

    #[test]
    fn test_horizontal_split_is_side_by_side() {
        let (first, divider, second) = split_rect(rect(), Orientation::Horizontal, 0.5);
        assert!(close(first.width(), 200.0));
        assert!(close(divider.width(), DIVIDER));
        assert!(close(second.width(), 200.0));
        assert!(close(first.height(), 204.0));
        assert!(close(second.left(), 204.0));
    }

    #[test]
    fn test_vertical_split_is_stacked() {
        let (first, _, second) = split_rect(rect(), Orientation::Vertical, 0.5);
        assert!(close(first.height(), 100.0));
        assert!(close(second.height(), 100.0));
        assert!(close(first.width(), 404.0));
        assert!(close(second.top(), 104.0));
    }

    #[test]
    fn test_ratio_is_clamped() {
        let (first, _, _) = split_rect(rect(), Orientation::Horizontal, 0.0);
        assert!(close(first.width(), 40.0));
        let (_, _, second) = split_rect(rect(), Orientation::Horizontal, 5.0);
        assert!(close(second.width(), 40.0));
    }
}
