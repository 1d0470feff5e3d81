//! Configuration module for Panes
//!
//! User preferences, their JSON form, and where they are stored on disk.

mod persistence;
mod settings;

pub use persistence::*;
pub use settings::*;
