//! Lookup and ordering over chapter lists

use super::entry::ChapterEntry;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// No chapter in the list resolved to the requested number
///
/// This can happen even when every title resolved; `unresolved` tells the
/// caller how many entries could not take part in the comparison at all.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("chapter {requested} not found among {scanned} chapters ({unresolved} unresolved)")]
pub struct ChapterNotFound {
    pub requested: f64,
    pub scanned: usize,
    pub unresolved: usize,
}

impl ChapterNotFound {
    /// True when the list was non-empty and no title in it could be resolved
    pub fn all_unresolved(&self) -> bool {
        self.scanned > 0 && self.unresolved == self.scanned
    }
}

/// A data-quality diagnostic for a title no pattern could read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedTitle {
    pub id: String,
    pub title: String,
}

impl fmt::Display for UnresolvedTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "could not determine chapter number for title '{}' (id {})",
            self.title, self.id
        )
    }
}

/// Returns the first chapter, in list order, whose number equals `requested`
///
/// Comparison is exact; there is no nearest match and no tolerance.
///
/// # Examples
///
/// ```
/// use chapter_sieve::chapters::{find_chapter_by_number, ChapterEntry};
///
/// let chapters = vec![
///     ChapterEntry::new("a", "Ch.1"),
///     ChapterEntry::new("b", "Ch.2"),
///     ChapterEntry::new("c", "Ch.3"),
/// ];
///
/// assert_eq!(find_chapter_by_number(&chapters, 2.0).unwrap().id, "b");
/// assert!(find_chapter_by_number(&chapters, 5.0).is_err());
/// ```
pub fn find_chapter_by_number(
    chapters: &[ChapterEntry],
    requested: f64,
) -> Result<&ChapterEntry, ChapterNotFound> {
    let mut unresolved = 0;

    for chapter in chapters {
        match chapter.resolved_number() {
            Some(number) if number == requested => return Ok(chapter),
            Some(_) => {}
            None => unresolved += 1,
        }
    }

    Err(ChapterNotFound {
        requested,
        scanned: chapters.len(),
        unresolved,
    })
}

/// Collects a diagnostic for every chapter whose number could not be resolved
pub fn unresolved_titles(chapters: &[ChapterEntry]) -> Vec<UnresolvedTitle> {
    chapters
        .iter()
        .filter(|chapter| !chapter.resolution().is_resolved())
        .map(|chapter| UnresolvedTitle {
            id: chapter.id.clone(),
            title: chapter.raw_title.clone(),
        })
        .collect()
}

/// Orders chapters by resolved number, unresolved entries last
///
/// The sort is stable, so equal numbers keep their source order.
pub fn order_by_number(chapters: &[ChapterEntry]) -> Vec<&ChapterEntry> {
    let mut ordered: Vec<&ChapterEntry> = chapters.iter().collect();
    ordered.sort_by(|a, b| match (a.resolved_number(), b.resolved_number()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    ordered
}
