use super::pause;
use super::report::{
    ChapterLookup, ChapterSample, CollectionReport, FailureCategory, QueryOutcome, QueryReport,
    SourceReport,
};
use crate::chapters::{find_chapter_by_number, unresolved_titles, ChapterEntry};
use crate::config::Config;
use crate::retry::{execute, RetryError, RetryPolicy};
use crate::source::HttpSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Knobs shared by every query of a `collect` run
#[derive(Debug, Clone, PartialEq)]
pub struct CollectSettings {
    /// Results requested from the search endpoint
    pub search_limit: usize,

    /// Chapters kept as samples per entity
    pub chapters_per_entity: usize,

    /// Chapter numbers looked up in every chapter list
    pub requested_chapters: Vec<f64>,

    /// Delay between consecutive queries against one source
    pub entity_delay: Duration,
}

impl Default for CollectSettings {
    fn default() -> Self {
        Self {
            search_limit: 100,
            chapters_per_entity: 3,
            requested_chapters: vec![1.0, 2.0, 3.0],
            entity_delay: Duration::from_millis(500),
        }
    }
}

impl From<&Config> for CollectSettings {
    fn from(config: &Config) -> Self {
        Self {
            search_limit: config.crawler.page_size,
            chapters_per_entity: config.collect.chapters_per_entity,
            requested_chapters: config.collect.requested_chapters.clone(),
            entity_delay: Duration::from_millis(config.collect.entity_delay_ms),
        }
    }
}

/// Turns an executor error into the matching query outcome
pub(super) fn failed_outcome(err: &RetryError) -> QueryOutcome {
    match err.failure() {
        Some(failure) if !err.is_cancelled() => QueryOutcome::Failed {
            category: FailureCategory::of(failure),
            attempts: err.attempts(),
            error: err.to_string(),
        },
        _ => QueryOutcome::Cancelled,
    }
}

/// Samples, lookups and diagnostics for one fetched chapter list
fn summarize_chapters(
    chapters: &[ChapterEntry],
    settings: &CollectSettings,
) -> (Vec<ChapterSample>, Vec<ChapterLookup>) {
    let samples = chapters
        .iter()
        .take(settings.chapters_per_entity)
        .map(ChapterSample::from)
        .collect();

    let lookups = settings
        .requested_chapters
        .iter()
        .map(|&requested| match find_chapter_by_number(chapters, requested) {
            Ok(chapter) => ChapterLookup {
                requested,
                chapter_id: Some(chapter.id.clone()),
                title: Some(chapter.raw_title.clone()),
            },
            Err(not_found) => {
                tracing::debug!(%not_found, "Requested chapter missing");
                ChapterLookup {
                    requested,
                    chapter_id: None,
                    title: None,
                }
            }
        })
        .collect();

    (samples, lookups)
}

/// Searches `source` for `query` and inspects the first result's chapters
///
/// The first search result is taken as the intended work; there is no
/// title matching beyond what the source's search does.
///
/// # Arguments
///
/// * `source` - Source to query
/// * `query` - Free-text title query
/// * `settings` - Sampling and lookup settings
/// * `policy` - Backoff policy applied to each request
/// * `cancel` - Run-wide cancellation token
pub async fn collect_query(
    source: &HttpSource,
    query: &str,
    settings: &CollectSettings,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> QueryReport {
    let outcome = collect_outcome(source, query, settings, policy, cancel).await;
    QueryReport {
        query: query.to_string(),
        outcome,
    }
}

async fn collect_outcome(
    source: &HttpSource,
    query: &str,
    settings: &CollectSettings,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> QueryOutcome {
    let results = match execute(policy, cancel, || {
        source.search_page(query, 1, settings.search_limit)
    })
    .await
    {
        Ok(results) => results,
        Err(err) => {
            tracing::warn!(source = source.id(), query, error = %err, "Search failed");
            return failed_outcome(&err);
        }
    };

    let Some(entity) = results.into_iter().next() else {
        tracing::info!(source = source.id(), query, "No search results");
        return QueryOutcome::NoResults;
    };

    let chapters = match execute(policy, cancel, || source.fetch_chapters(&entity.id)).await {
        Ok(chapters) => chapters,
        Err(err) => {
            tracing::warn!(
                source = source.id(),
                entity = %entity.id,
                error = %err,
                "Chapter fetch failed"
            );
            return failed_outcome(&err);
        }
    };

    if chapters.is_empty() {
        tracing::info!(source = source.id(), entity = %entity.id, "Entity has no chapters");
        return QueryOutcome::NoChapters { entity };
    }

    let unresolved = unresolved_titles(&chapters);
    for diagnostic in &unresolved {
        tracing::debug!(source = source.id(), %diagnostic);
    }
    if !unresolved.is_empty() {
        tracing::warn!(
            source = source.id(),
            entity = %entity.id,
            unresolved = unresolved.len(),
            total = chapters.len(),
            "Some chapter titles could not be resolved"
        );
    }

    let (samples, lookups) = summarize_chapters(&chapters, settings);
    tracing::info!(
        source = source.id(),
        query,
        entity = %entity.id,
        chapters = chapters.len(),
        found = lookups.iter().filter(|l| l.is_found()).count(),
        "Collected"
    );

    QueryOutcome::Collected {
        entity,
        chapter_count: chapters.len(),
        samples,
        lookups,
        unresolved,
    }
}

/// Runs every query against one source, one at a time
///
/// `settings.entity_delay` separates consecutive queries. Once `cancel`
/// fires, the remaining queries are reported as cancelled.
pub async fn collect_source(
    source: &HttpSource,
    queries: &[String],
    settings: &CollectSettings,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> SourceReport {
    let mut reports = Vec::with_capacity(queries.len());

    for (idx, query) in queries.iter().enumerate() {
        let paced = idx == 0 || pause(settings.entity_delay, cancel).await;

        let report = if !paced || cancel.is_cancelled() {
            QueryReport {
                query: query.clone(),
                outcome: QueryOutcome::Cancelled,
            }
        } else {
            collect_query(source, query, settings, policy, cancel).await
        };
        reports.push(report);
    }

    let report = SourceReport {
        source: source.id().to_string(),
        queries: reports,
    };
    if report.was_cancelled() {
        tracing::info!(source = source.id(), "Collection cancelled");
    }
    report
}

/// Runs [`collect_source`] for every source concurrently
///
/// Reports come back in the order of `sources`. A source task that panics
/// is logged and left out of the report.
pub async fn collect_all(
    sources: Vec<HttpSource>,
    queries: Vec<String>,
    settings: CollectSettings,
    policy: RetryPolicy,
    cancel: CancellationToken,
) -> CollectionReport {
    let queries = Arc::new(queries);
    let settings = Arc::new(settings);
    let mut tasks = JoinSet::new();

    for (idx, source) in sources.into_iter().enumerate() {
        let queries = Arc::clone(&queries);
        let settings = Arc::clone(&settings);
        let cancel = cancel.clone();
        tasks.spawn(async move {
            let report = collect_source(&source, &queries, &settings, &policy, &cancel).await;
            (idx, report)
        });
    }

    let mut indexed = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(entry) => indexed.push(entry),
            Err(e) => tracing::error!(error = %e, "Source task failed"),
        }
    }
    indexed.sort_by_key(|(idx, _)| *idx);

    CollectionReport::new(indexed.into_iter().map(|(_, report)| report).collect())
}
