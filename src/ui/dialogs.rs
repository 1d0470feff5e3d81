//! Modal dialogs: go to line.

use eframe::egui::{self, Color32, Key, RichText};

/// Result from showing the go-to-line dialog.
#[derive(Debug, PartialEq, Eq)]
pub enum GoToLineResult {
    /// Dialog still open
    None,
    Cancelled,
    /// Jump to this 1-based line
    GoTo(usize),
}

/// State for an open "Go to Line" dialog.
#[derive(Debug, Clone)]
pub struct GoToLineDialog {
    input: String,
    /// Number of lines in the target document.
    max_line: usize,
    error_message: Option<String>,
}

impl GoToLineDialog {
    /// Open for a document of `max_line` lines, pre-filled with `current`.
    pub fn new(current: usize, max_line: usize) -> Self {
        Self {
            input: current.to_string(),
            max_line: max_line.max(1),
            error_message: None,
        }
    }

    /// Parse the input as a line number in `1..=max_line`.
    pub fn parse(&self) -> Result<usize, String> {
        let range_error = || format!("Enter a line number between 1 and {}", self.max_line);
        let line: usize = self.input.trim().parse().map_err(|_| range_error())?;
        if line == 0 || line > self.max_line {
            return Err(range_error());
        }
        Ok(line)
    }

    pub fn show(&mut self, ctx: &egui::Context, is_dark: bool) -> GoToLineResult {
        if ctx.input(|i| i.key_pressed(Key::Escape)) {
            return GoToLineResult::Cancelled;
        }

        let bg_color = if is_dark {
            Color32::from_rgb(40, 40, 45)
        } else {
            Color32::from_rgb(250, 250, 250)
        };
        let border_color = if is_dark {
            Color32::from_rgb(70, 70, 80)
        } else {
            Color32::from_rgb(180, 180, 190)
        };

        let mut result = GoToLineResult::None;

        egui::Window::new("Go to Line")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .frame(
                egui::Frame::window(&ctx.style())
                    .fill(bg_color)
                    .stroke(egui::Stroke::new(1.0, border_color))
                    .rounding(8.0),
            )
            .show(ctx, |ui| {
                ui.set_min_width(260.0);

                ui.add_space(8.0);
                ui.label(format!("Line number (1 - {}):", self.max_line));
                ui.add_space(4.0);

                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.input)
                        .desired_width(240.0)
                        .id(egui::Id::new("go_to_line_input")),
                );
                if !response.has_focus() && !response.lost_focus() {
                    response.request_focus();
                }

                if let Some(error) = &self.error_message {
                    ui.add_space(4.0);
                    ui.colored_label(Color32::from_rgb(220, 80, 80), error.as_str());
                }

                ui.add_space(12.0);

                ui.horizontal(|ui| {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let submitted = response.lost_focus() && ctx.input(|i| i.key_pressed(Key::Enter));
                        if ui.button("Go").clicked() || submitted {
                            match self.parse() {
                                Ok(line) => result = GoToLineResult::GoTo(line),
                                Err(message) => self.error_message = Some(message),
                            }
                        }
                        ui.add_space(8.0);
                        if ui.button("Cancel").clicked() {
                            result = GoToLineResult::Cancelled;
                        }
                    });
                });

                ui.add_space(4.0);
                ui.label(
                    RichText::new("Enter to jump, Escape to cancel")
                        .small()
                        .weak(),
                );
            });

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialog(input: &str, max: usize) -> GoToLineDialog {
        let mut dialog = GoToLineDialog::new(1, max);
        dialog.input = input.to_string();
        dialog
    }

    #[test]
    fn test_prefilled_with_current_line() {
        let dialog = GoToLineDialog::new(7, 20);
        assert_eq!(dialog.parse(), Ok(7));
    }

    #[test]
    fn test_parse_in_range() {
        assert_eq!(dialog(" 12 ", 40).parse(), Ok(12));
        assert_eq!(dialog("40", 40).parse(), Ok(40));
    }

    #[test]
    fn test_parse_rejects_out_of_range_and_garbage() {
        let expected = Err("Enter a line number between 1 and 5".to_string());
        assert_eq!(dialog("0", 5).parse(), expected);
        assert_eq!(dialog("6", 5).parse(), expected);
        assert_eq!(dialog("abc", 5).parse(), expected);
        assert_eq!(dialog("-1", 5).parse(), expected);
    }

    #[test]
    fn test_empty_document_still_has_line_one() {
        assert_eq!(dialog("1", 0).parse(), Ok(1));
    }
}
