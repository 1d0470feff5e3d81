//! User confirmation prompts.
//!
//! Tab and split operations ask questions (save changes? where to save?)
//! through the [`Prompter`] trait so they can run without a GUI. The app uses
//! [`NativePrompter`], built on rfd's blocking dialogs.

use crate::files::dialogs::save_file_dialog;
use log::debug;
use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use std::path::PathBuf;

/// Answer to "save changes before closing?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseChoice {
    Save,
    Discard,
    Cancel,
}

pub trait Prompter {
    /// Ask what to do with unsaved changes in the document named `name`.
    fn confirm_close(&mut self, name: &str) -> CloseChoice;

    /// Ask for a save location. `None` means the user cancelled.
    fn choose_save_path(&mut self, suggested_name: &str) -> Option<PathBuf>;

    /// Yes/no question.
    fn confirm(&mut self, title: &str, message: &str) -> bool;
}

// ─────────────────────────────────────────────────────────────────────────────
// Native dialogs
// ─────────────────────────────────────────────────────────────────────────────

/// Prompts backed by native message boxes and file pickers.
#[derive(Debug, Default)]
pub struct NativePrompter {
    /// Directory the save dialog starts in.
    pub initial_dir: Option<PathBuf>,
}

impl Prompter for NativePrompter {
    fn confirm_close(&mut self, name: &str) -> CloseChoice {
        let result = MessageDialog::new()
            .set_level(MessageLevel::Warning)
            .set_title("Unsaved Changes")
            .set_description(format!(
                "'{}' has been modified.\nDo you want to save your changes?",
                name
            ))
            .set_buttons(MessageButtons::YesNoCancel)
            .show();
        debug!("Close prompt for {}: {:?}", name, result);
        match result {
            MessageDialogResult::Yes => CloseChoice::Save,
            MessageDialogResult::No => CloseChoice::Discard,
            _ => CloseChoice::Cancel,
        }
    }

    fn choose_save_path(&mut self, suggested_name: &str) -> Option<PathBuf> {
        save_file_dialog(self.initial_dir.as_deref(), Some(suggested_name))
    }

    fn confirm(&mut self, title: &str, message: &str) -> bool {
        let result = MessageDialog::new()
            .set_level(MessageLevel::Info)
            .set_title(title)
            .set_description(message)
            .set_buttons(MessageButtons::YesNo)
            .show();
        matches!(result, MessageDialogResult::Yes)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scripted prompts for tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::VecDeque;

    /// Answers prompts from queues and records which prompts were shown.
    /// An empty queue answers Cancel / `None` / `false`.
    #[derive(Debug, Default)]
    pub struct ScriptedPrompter {
        pub close_answers: VecDeque<CloseChoice>,
        pub save_paths: VecDeque<Option<PathBuf>>,
        pub confirm_answers: VecDeque<bool>,
        pub close_prompts: Vec<String>,
        pub save_prompts: usize,
    }

    impl ScriptedPrompter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn answering(choices: &[CloseChoice]) -> Self {
            Self {
                close_answers: choices.iter().copied().collect(),
                ..Self::default()
            }
        }

        pub fn with_save_path(mut self, path: Option<PathBuf>) -> Self {
            self.save_paths.push_back(path);
            self
        }
    }

    impl Prompter for ScriptedPrompter {
        fn confirm_close(&mut self, name: &str) -> CloseChoice {
            self.close_prompts.push(name.to_string());
            self.close_answers.pop_front().unwrap_or(CloseChoice::Cancel)
        }

        fn choose_save_path(&mut self, _suggested_name: &str) -> Option<PathBuf> {
            self.save_prompts += 1;
            self.save_paths.pop_front().flatten()
        }

        fn confirm(&mut self, _title: &str, _message: &str) -> bool {
            self.confirm_answers.pop_front().unwrap_or(false)
        }
    }
}
