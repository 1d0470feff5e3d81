//! File operations module for Panes
//!
//! Native file dialogs, the system clipboard, and the confirmation prompts
//! used when closing modified documents or running a bulk replace.

pub mod clipboard;
pub mod dialogs;
pub mod prompt;

pub use prompt::{CloseChoice, NativePrompter, Prompter};
