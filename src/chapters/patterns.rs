//! Ordered title patterns
//!
//! Patterns are tried in order and the first one that matches decides the
//! chapter number. Nothing is merged across patterns.
//!
//! | Order | Form | Example | Number |
//! |-------|------|---------|--------|
//! | 1 | Keyword (`Chapter`, `Ch.`, `Episode`, `Ep.`) | `Vol.01 Ch.001 - Romance Dawn` | 1 |
//! | 2 | Leading number followed by `-` or `:` | `1.5: Side Story` | 1.5 |
//! | 3 | Bare number | `828` | 828 |

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Where a resolved chapter number came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberSource {
    /// A numeric field supplied by the source, separate from the title
    Structured,

    /// A `Chapter` / `Ch.` / `Episode` / `Ep.` keyword in the title
    Keyword,

    /// A number at the start of the title followed by `-` or `:`
    LeadingNumber,

    /// A title that is only a number
    BareNumber,
}

/// Outcome of resolving a chapter number
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    Resolved { number: f64, source: NumberSource },

    /// No structured field and no pattern matched the title
    Unresolved,
}

impl Resolution {
    pub fn number(&self) -> Option<f64> {
        match self {
            Self::Resolved { number, .. } => Some(*number),
            Self::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}

/// A single title pattern whose first capture group is the chapter number
#[derive(Debug, Clone)]
pub struct TitleMatcher {
    source: NumberSource,
    regex: Regex,
}

impl TitleMatcher {
    /// Compiles a matcher; the pattern must have one capture group holding the number
    pub fn new(source: NumberSource, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            source,
            regex: Regex::new(pattern)?,
        })
    }

    pub fn source(&self) -> NumberSource {
        self.source
    }

    /// Extracts the chapter number if this pattern matches the trimmed title
    pub fn capture(&self, title: &str) -> Option<f64> {
        self.regex
            .captures(title.trim())
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .filter(|n| n.is_finite())
    }
}

/// The keyword must not be glued to a preceding letter ("Bleach 5", "OnePieceCh.5")
const KEYWORD_PATTERN: &str = concat!(
    r"(?i)(?:^|[^A-Za-z])",
    r"(?:chapter|ch\.?|episode|ep\.?)\s*(\d+(?:\.\d+)?)"
);
const LEADING_NUMBER_PATTERN: &str = r"^(\d+(?:\.\d+)?)\s*[-:]";
const BARE_NUMBER_PATTERN: &str = r"^(\d+(?:\.\d+)?)$";

static DEFAULT_MATCHERS: Lazy<Vec<TitleMatcher>> = Lazy::new(|| {
    [
        (NumberSource::Keyword, KEYWORD_PATTERN),
        (NumberSource::LeadingNumber, LEADING_NUMBER_PATTERN),
        (NumberSource::BareNumber, BARE_NUMBER_PATTERN),
    ]
    .into_iter()
    .map(|(source, pattern)| {
        TitleMatcher::new(source, pattern).expect("built-in title pattern must compile")
    })
    .collect()
});

/// The built-in matchers in precedence order
pub fn default_matchers() -> &'static [TitleMatcher] {
    &DEFAULT_MATCHERS
}

/// Resolves a title against an explicit, ordered matcher list
pub fn parse_with(matchers: &[TitleMatcher], title: &str) -> Resolution {
    matchers
        .iter()
        .find_map(|matcher| {
            matcher.capture(title).map(|number| Resolution::Resolved {
                number,
                source: matcher.source(),
            })
        })
        .unwrap_or(Resolution::Unresolved)
}

/// Parses a chapter number out of a free-text title
///
/// # Examples
///
/// ```
/// use chapter_sieve::chapters::{parse_chapter_number, Resolution};
///
/// assert_eq!(parse_chapter_number("Vol.98 Ch.1165").number(), Some(1165.0));
/// assert_eq!(parse_chapter_number("10.5: Extra").number(), Some(10.5));
/// assert_eq!(
///     parse_chapter_number("Random Title With No Number"),
///     Resolution::Unresolved
/// );
/// ```
pub fn parse_chapter_number(title: &str) -> Resolution {
    parse_with(default_matchers(), title)
}

/// Resolves a chapter, preferring a structured number over the title
///
/// The structured field only counts when present and finite.
pub fn resolve_chapter(title: &str, structured: Option<f64>) -> Resolution {
    match structured.filter(|n| n.is_finite()) {
        Some(number) => Resolution::Resolved {
            number,
            source: NumberSource::Structured,
        },
        None => parse_chapter_number(title),
    }
}
