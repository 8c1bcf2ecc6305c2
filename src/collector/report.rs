//! Report types produced by the collector
//!
//! Reports are plain values built by the collection functions and handed to
//! [`crate::output`]; nothing here performs I/O.

use crate::chapters::{ChapterEntry, Resolution, UnresolvedTitle};
use crate::crawler::Entity;
use crate::FetchError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Why an entity or query produced no usable chapter data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    RateLimited,
    NotFound,
    ServerError,
    HttpError,
    Timeout,
    Connection,
    InvalidResponse,
    MalformedRequest,
    ZeroChapters,
}

impl FailureCategory {
    /// Categorizes a fetch failure by status code or transport error
    pub fn of(failure: &FetchError) -> Self {
        match failure {
            FetchError::Status { status: 429, .. } => Self::RateLimited,
            FetchError::Status { status: 404, .. } => Self::NotFound,
            FetchError::Status { status, .. } if *status >= 500 => Self::ServerError,
            FetchError::Status { .. } => Self::HttpError,
            FetchError::Timeout { .. } => Self::Timeout,
            FetchError::Connect { .. } => Self::Connection,
            FetchError::Decode { .. } => Self::InvalidResponse,
            FetchError::Request { .. } => Self::MalformedRequest,
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::RateLimited => "Rate limit exceeded (429)",
            Self::NotFound => "Not found (404)",
            Self::ServerError => "Server error (5xx)",
            Self::HttpError => "HTTP error",
            Self::Timeout => "Request timeout",
            Self::Connection => "Connection error",
            Self::InvalidResponse => "Invalid response body",
            Self::MalformedRequest => "Malformed request",
            Self::ZeroChapters => "Zero chapters returned",
        };
        f.write_str(label)
    }
}

/// One of the first chapters of an entity, kept as a sample
#[derive(Debug, Clone, Serialize)]
pub struct ChapterSample {
    pub id: String,
    pub title: String,
    pub resolution: Resolution,
}

impl From<&ChapterEntry> for ChapterSample {
    fn from(chapter: &ChapterEntry) -> Self {
        Self {
            id: chapter.id.clone(),
            title: chapter.raw_title.clone(),
            resolution: chapter.resolution(),
        }
    }
}

/// Result of looking up one requested chapter number
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterLookup {
    pub requested: f64,

    /// Id of the first chapter resolving to `requested`, if any
    pub chapter_id: Option<String>,

    pub title: Option<String>,
}

impl ChapterLookup {
    pub fn is_found(&self) -> bool {
        self.chapter_id.is_some()
    }
}

/// What happened to one query against one source
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum QueryOutcome {
    Collected {
        entity: Entity,
        chapter_count: usize,
        samples: Vec<ChapterSample>,
        lookups: Vec<ChapterLookup>,
        unresolved: Vec<UnresolvedTitle>,
    },
    NoResults,
    NoChapters {
        entity: Entity,
    },
    Failed {
        category: FailureCategory,
        attempts: u32,
        error: String,
    },
    Cancelled,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
    pub query: String,

    #[serde(flatten)]
    pub outcome: QueryOutcome,
}

impl QueryReport {
    pub fn is_collected(&self) -> bool {
        matches!(self.outcome, QueryOutcome::Collected { .. })
    }
}

/// All queries run against one source
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub source: String,
    pub queries: Vec<QueryReport>,
}

impl SourceReport {
    pub fn collected_count(&self) -> usize {
        self.queries.iter().filter(|q| q.is_collected()).count()
    }

    /// True if the run was cancelled before every query finished
    pub fn was_cancelled(&self) -> bool {
        self.queries
            .iter()
            .any(|q| matches!(q.outcome, QueryOutcome::Cancelled))
    }
}

/// Output of a `collect` run across every configured source
#[derive(Debug, Clone, Serialize)]
pub struct CollectionReport {
    pub generated_at: DateTime<Utc>,

    /// SHA-256 of the configuration file the run used
    pub config_hash: Option<String>,

    pub sources: Vec<SourceReport>,
}

impl CollectionReport {
    pub fn new(sources: Vec<SourceReport>) -> Self {
        Self {
            generated_at: Utc::now(),
            config_hash: None,
            sources,
        }
    }

    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    pub fn total_queries(&self) -> usize {
        self.sources.iter().map(|s| s.queries.len()).sum()
    }

    pub fn total_collected(&self) -> usize {
        self.sources.iter().map(SourceReport::collected_count).sum()
    }
}

/// Per-entity result of a catalog survey
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SurveyStatus {
    Success { chapter_count: usize },
    Failed { category: FailureCategory, error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct SurveyEntry {
    pub entity: Entity,

    #[serde(flatten)]
    pub status: SurveyStatus,
}

impl SurveyEntry {
    pub fn chapter_count(&self) -> Option<usize> {
        match self.status {
            SurveyStatus::Success { chapter_count } => Some(chapter_count),
            SurveyStatus::Failed { .. } => None,
        }
    }

    pub fn category(&self) -> Option<FailureCategory> {
        match self.status {
            SurveyStatus::Success { .. } => None,
            SurveyStatus::Failed { category, .. } => Some(category),
        }
    }
}

/// Output of a `survey` run against one source
#[derive(Debug, Clone, Serialize)]
pub struct SurveyReport {
    pub generated_at: DateTime<Utc>,
    pub config_hash: Option<String>,
    pub source: String,

    /// Whether the crawl saw the end of the catalog
    pub reached_end: bool,

    /// Why the crawl stopped early, when it did
    pub crawl_failure: Option<String>,

    /// True if the survey stopped before every collected entity was checked
    pub cancelled: bool,

    pub entries: Vec<SurveyEntry>,
}

impl SurveyReport {
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn success_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.chapter_count().is_some())
            .count()
    }

    /// Percentage of surveyed entities with at least one chapter
    pub fn success_rate(&self) -> f64 {
        if self.entries.is_empty() {
            0.0
        } else {
            self.success_count() as f64 / self.entries.len() as f64 * 100.0
        }
    }

    /// Groups failed entries by category, largest group first
    ///
    /// Groups of equal size are ordered by category to keep output stable.
    pub fn failure_breakdown(&self) -> Vec<(FailureCategory, Vec<&SurveyEntry>)> {
        let mut groups: HashMap<FailureCategory, Vec<&SurveyEntry>> = HashMap::new();
        for entry in &self.entries {
            if let Some(category) = entry.category() {
                groups.entry(category).or_default().push(entry);
            }
        }

        let mut breakdown: Vec<_> = groups.into_iter().collect();
        breakdown.sort_by(|(a, left), (b, right)| right.len().cmp(&left.len()).then(a.cmp(b)));
        breakdown
    }

    /// Successful entries with the most chapters, at most `limit`
    pub fn top_by_chapter_count(&self, limit: usize) -> Vec<(&Entity, usize)> {
        let mut successes: Vec<_> = self
            .entries
            .iter()
            .filter_map(|e| e.chapter_count().map(|count| (&e.entity, count)))
            .collect();
        successes.sort_by(|a, b| b.1.cmp(&a.1));
        successes.truncate(limit);
        successes
    }
}
