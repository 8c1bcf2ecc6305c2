use super::pause;
use super::query::CollectSettings;
use super::report::{FailureCategory, SurveyEntry, SurveyReport, SurveyStatus};
use crate::crawler::{crawl, CrawlOptions};
use crate::retry::{execute, RetryPolicy};
use crate::source::HttpSource;
use chrono::Utc;
use tokio_util::sync::CancellationToken;

/// Crawls the whole catalog of `source` and checks every entity's chapter list
///
/// The catalog is listed with an empty search query through the paginated
/// crawler, up to `options.target_count` entities. If the crawl stops early
/// the entities it did collect are still surveyed and the reason is kept in
/// [`SurveyReport::crawl_failure`]. Entities are checked one at a time with
/// `settings.entity_delay` between them.
pub async fn survey_catalog(
    source: &HttpSource,
    options: &CrawlOptions,
    settings: &CollectSettings,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> SurveyReport {
    let page_size = options.page_size;
    let crawled = crawl(
        |page| execute(policy, cancel, move || source.search_page("", page, page_size)),
        options,
        cancel,
    )
    .await;

    let (entities, reached_end, crawl_failure, mut cancelled) = match crawled {
        Ok(outcome) => (outcome.collected, outcome.reached_end, None, false),
        Err(partial) => {
            tracing::warn!(source = source.id(), error = %partial, "Catalog crawl stopped early");
            let cancelled = partial.is_cancelled();
            let reason = partial.to_string();
            (partial.collected, false, Some(reason), cancelled)
        }
    };

    let total = entities.len();
    tracing::info!(source = source.id(), total, "Surveying entities");

    let mut entries = Vec::with_capacity(total);
    for (idx, entity) in entities.into_iter().enumerate() {
        if cancelled || (idx > 0 && !pause(settings.entity_delay, cancel).await) {
            cancelled = true;
            break;
        }

        let status = match execute(policy, cancel, || source.fetch_chapters(&entity.id)).await {
            Ok(chapters) if chapters.is_empty() => SurveyStatus::Failed {
                category: FailureCategory::ZeroChapters,
                error: FailureCategory::ZeroChapters.to_string(),
            },
            Ok(chapters) => SurveyStatus::Success {
                chapter_count: chapters.len(),
            },
            Err(err) if err.is_cancelled() => {
                cancelled = true;
                break;
            }
            Err(err) => SurveyStatus::Failed {
                category: err
                    .failure()
                    .map(FailureCategory::of)
                    .unwrap_or(FailureCategory::HttpError),
                error: err.to_string(),
            },
        };

        match &status {
            SurveyStatus::Success { chapter_count } => tracing::info!(
                index = idx + 1,
                total,
                entity = %entity.id,
                chapter_count,
                "Chapters found"
            ),
            SurveyStatus::Failed { category, .. } => tracing::info!(
                index = idx + 1,
                total,
                entity = %entity.id,
                %category,
                "Chapter check failed"
            ),
        }

        entries.push(SurveyEntry { entity, status });
    }

    if cancelled {
        tracing::info!(
            source = source.id(),
            surveyed = entries.len(),
            total,
            "Survey cancelled"
        );
    }

    SurveyReport {
        generated_at: Utc::now(),
        config_hash: None,
        source: source.id().to_string(),
        reached_end,
        crawl_failure,
        cancelled,
        entries,
    }
}
