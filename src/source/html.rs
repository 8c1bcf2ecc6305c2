//! HTML chapter listing parser
//!
//! Some sources render their chapter list as a WordPress manga-theme
//! fragment instead of JSON:
//!
//! ```html
//! <ul>
//!   <li class="wp-manga-chapter"><a href="https://example.com/ch-2/">Chapter 2</a></li>
//!   <li class="wp-manga-chapter"><a href="https://example.com/ch-1/">Chapter 1</a></li>
//! </ul>
//! ```

use crate::chapters::ChapterEntry;
use scraper::{Html, Selector};

/// Parses `li.wp-manga-chapter > a` anchors into chapters
///
/// The anchor `href` becomes the chapter id; anchors without one fall back
/// to their text. Titles are the anchor text with whitespace collapsed.
///
/// # Example
///
/// ```
/// use chapter_sieve::source::parse_chapter_list;
///
/// let html = r#"<li class="wp-manga-chapter"><a href="/ch-1/">Chapter 1</a></li>"#;
/// let chapters = parse_chapter_list(html);
/// assert_eq!(chapters[0].raw_title, "Chapter 1");
/// ```
pub fn parse_chapter_list(html: &str) -> Vec<ChapterEntry> {
    let document = Html::parse_fragment(html);
    let mut chapters = Vec::new();

    if let Ok(selector) = Selector::parse("li.wp-manga-chapter > a") {
        for anchor in document.select(&selector) {
            let title = anchor
                .text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ");

            let id = match anchor.value().attr("href").map(str::trim) {
                Some(href) if !href.is_empty() => href.to_string(),
                _ if !title.is_empty() => title.clone(),
                _ => continue,
            };

            chapters.push(ChapterEntry::new(id, title));
        }
    }

    chapters
}
