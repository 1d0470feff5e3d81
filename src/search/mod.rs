//! Multi-file find and replace.
//!
//! `matcher` holds the literal matching rules shared with the in-document
//! find bar, `multi_file` runs search and replace passes, and `scope` decides
//! which documents a pass reads.

pub mod matcher;
pub mod multi_file;
pub mod scope;

pub use matcher::Matcher;
pub use multi_file::{
    replace_in_files, search_sources, DocumentHost, SearchOptions, SearchOutcome, SearchResult,
    SearchSource, SourceKey,
};
pub use scope::{collect_sources, SearchScope};
