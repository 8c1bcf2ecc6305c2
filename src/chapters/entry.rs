use super::patterns::{resolve_chapter, Resolution};
use once_cell::sync::OnceCell;

/// A chapter as listed by a source
///
/// The resolved number is derived from `number_field` when present,
/// otherwise from `raw_title`. It is computed on first use and cached, so
/// repeated lookups over the same list never re-parse a title.
#[derive(Debug, Clone)]
pub struct ChapterEntry {
    /// Source-assigned chapter identifier
    pub id: String,

    /// Title exactly as the source returned it
    pub raw_title: String,

    /// Structured chapter number, when the source supplies one
    pub number_field: Option<f64>,

    resolution: OnceCell<Resolution>,
}

impl ChapterEntry {
    pub fn new(id: impl Into<String>, raw_title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            raw_title: raw_title.into(),
            number_field: None,
            resolution: OnceCell::new(),
        }
    }

    /// Attaches a structured chapter number
    pub fn with_number_field(mut self, number: Option<f64>) -> Self {
        self.number_field = number;
        self.resolution = OnceCell::new();
        self
    }

    /// Returns the cached resolution, computing it on first call
    pub fn resolution(&self) -> Resolution {
        *self
            .resolution
            .get_or_init(|| resolve_chapter(&self.raw_title, self.number_field))
    }

    pub fn resolved_number(&self) -> Option<f64> {
        self.resolution().number()
    }
}
