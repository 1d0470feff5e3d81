//! Pane management for Panes
//!
//! Tab containers, the split tree that arranges them and the registry that
//! keeps editors of the same file in sync.

mod split;
mod sync;
mod tabs;

pub use split::{Orientation, SplitContainer, SplitNode, MAX_SPLIT_RATIO, MIN_SPLIT_RATIO};
pub use tabs::{PaneId, TabContainer};
