//! Chapter module for turning free-text chapter titles into numbers
//!
//! This module is pure: no I/O, no shared mutable state. Every function is
//! safe to call concurrently.
//!
//! # Components
//!
//! - `TitleMatcher`: One pattern in the ordered list; the first match wins
//! - `Resolution`: A resolved number with its origin, or `Unresolved`
//! - `ChapterEntry`: A chapter whose resolution is computed once and cached
//! - `find_chapter_by_number`: Exact lookup in source list order

mod entry;
mod lookup;
mod patterns;

pub use entry::ChapterEntry;
pub use lookup::{
    find_chapter_by_number, order_by_number, unresolved_titles, ChapterNotFound, UnresolvedTitle,
};
pub use patterns::{
    default_matchers, parse_chapter_number, parse_with, resolve_chapter, NumberSource, Resolution,
    TitleMatcher,
};
