//! Paginated crawler
//!
//! Walks a paged search endpoint and accumulates a de-duplicated entity set.
//! The page-fetch function is supplied by the caller and is expected to be
//! wrapped in the backoff executor already.

use super::entity::Entity;
use crate::config::CrawlerConfig;
use crate::retry::RetryError;
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Bounds and pacing for a single crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Maximum number of entities to collect
    pub target_count: usize,

    /// Number of entities a full page holds
    pub page_size: usize,

    /// Unconditional delay between successful page fetches
    pub pacing_delay: Duration,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            target_count: 1000,
            page_size: 100,
            pacing_delay: Duration::from_millis(500),
        }
    }
}

impl From<&CrawlerConfig> for CrawlOptions {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            target_count: config.target_count,
            page_size: config.page_size,
            pacing_delay: Duration::from_millis(config.pacing_delay_ms),
        }
    }
}

/// Why a crawl stopped without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The target count was reached
    TargetReached,

    /// A page came back empty
    EmptyPage,

    /// A page came back with fewer entities than the page size
    ShortPage,
}

/// Result of a crawl that ran to one of its stop conditions
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlOutcome {
    /// Entities in first-seen order, never longer than the target count
    pub collected: Vec<Entity>,

    /// True when the last fetched page was empty or short
    pub reached_end: bool,

    /// Number of pages successfully fetched
    pub pages_fetched: u32,

    pub stop_reason: StopReason,
}

/// What interrupted a crawl
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CrawlInterruption {
    #[error(transparent)]
    Fetch(RetryError),

    #[error("crawl cancelled")]
    Cancelled,
}

/// A crawl that stopped early, with everything collected before the stop
#[derive(Debug, Clone, PartialEq, Error)]
#[error("crawl stopped at page {page} with {} entities collected: {cause}", .collected.len())]
pub struct PartialCrawlError {
    /// Entities accepted before the interruption
    pub collected: Vec<Entity>,

    /// The last page that was requested
    pub page: u32,

    #[source]
    pub cause: CrawlInterruption,
}

impl PartialCrawlError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self.cause, CrawlInterruption::Cancelled)
    }
}

/// State owned by exactly one crawl invocation
struct CrawlState {
    seen_ids: HashSet<String>,
    accumulated: Vec<Entity>,
    current_page: u32,
}

impl CrawlState {
    fn new() -> Self {
        Self {
            seen_ids: HashSet::new(),
            accumulated: Vec::new(),
            current_page: 0,
        }
    }

    /// Appends unseen entities until `target` is reached, returning how many were accepted
    fn accept(&mut self, page: Vec<Entity>, target: usize) -> usize {
        let mut accepted = 0;
        for entity in page {
            if self.accumulated.len() >= target {
                break;
            }
            if self.seen_ids.insert(entity.id.clone()) {
                self.accumulated.push(entity);
                accepted += 1;
            }
        }
        accepted
    }

    fn is_full(&self, target: usize) -> bool {
        self.accumulated.len() >= target
    }

    fn finish(self, reached_end: bool, stop_reason: StopReason) -> CrawlOutcome {
        tracing::info!(
            collected = self.accumulated.len(),
            pages = self.current_page,
            reached_end,
            ?stop_reason,
            "Crawl finished"
        );
        CrawlOutcome {
            collected: self.accumulated,
            reached_end,
            pages_fetched: self.current_page,
            stop_reason,
        }
    }

    fn interrupt(self, cause: CrawlInterruption) -> PartialCrawlError {
        tracing::info!(
            collected = self.accumulated.len(),
            page = self.current_page,
            cause = %cause,
            "Crawl interrupted"
        );
        PartialCrawlError {
            collected: self.accumulated,
            page: self.current_page,
            cause,
        }
    }
}

/// Crawls pages 1, 2, 3, ... until a stop condition is met
///
/// # Stop Conditions
///
/// | Condition | Result |
/// |-----------|--------|
/// | Target count reached (even mid-page) | `Ok`, `reached_end = false` |
/// | Page returned zero entities | `Ok`, `reached_end = true` |
/// | Page shorter than `page_size` (after accepting it) | `Ok`, `reached_end = true` |
/// | `fetch_page` failed | `Err(PartialCrawlError)` with everything collected |
/// | `cancel` triggered | `Err(PartialCrawlError)` with `CrawlInterruption::Cancelled` |
///
/// Page N+1 is never requested before page N has completed.
///
/// # Arguments
///
/// * `fetch_page` - Fetches one page by 1-based page number
/// * `options` - Target count, page size and pacing delay
/// * `cancel` - Checked before every fetch and every pacing delay
///
/// # Example
///
/// ```no_run
/// use chapter_sieve::crawler::{crawl, CrawlOptions, Entity};
/// use chapter_sieve::retry::RetryError;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() {
/// let options = CrawlOptions::default();
/// let outcome = crawl(
///     |page| async move { Ok::<_, RetryError>(vec![Entity::new(page.to_string(), "Title")]) },
///     &options,
///     &CancellationToken::new(),
/// )
/// .await;
/// # }
/// ```
pub async fn crawl<F, Fut>(
    mut fetch_page: F,
    options: &CrawlOptions,
    cancel: &CancellationToken,
) -> Result<CrawlOutcome, PartialCrawlError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<Entity>, RetryError>>,
{
    let mut state = CrawlState::new();

    loop {
        if state.is_full(options.target_count) {
            return Ok(state.finish(false, StopReason::TargetReached));
        }

        if cancel.is_cancelled() {
            return Err(state.interrupt(CrawlInterruption::Cancelled));
        }

        state.current_page += 1;
        let page = state.current_page;

        let entities = match fetch_page(page).await {
            Ok(entities) => entities,
            Err(err) if err.is_cancelled() => {
                return Err(state.interrupt(CrawlInterruption::Cancelled));
            }
            Err(err) => return Err(state.interrupt(CrawlInterruption::Fetch(err))),
        };

        let received = entities.len();
        if received == 0 {
            tracing::debug!(page, "Empty page, no more results");
            return Ok(state.finish(true, StopReason::EmptyPage));
        }

        let accepted = state.accept(entities, options.target_count);
        tracing::debug!(
            page,
            received,
            accepted,
            total = state.accumulated.len(),
            "Fetched page"
        );

        if received < options.page_size {
            return Ok(state.finish(true, StopReason::ShortPage));
        }

        if state.is_full(options.target_count) {
            return Ok(state.finish(false, StopReason::TargetReached));
        }

        if cancel.is_cancelled() {
            return Err(state.interrupt(CrawlInterruption::Cancelled));
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(state.interrupt(CrawlInterruption::Cancelled));
            }
            _ = tokio::time::sleep(options.pacing_delay) => {}
        }
    }
}
