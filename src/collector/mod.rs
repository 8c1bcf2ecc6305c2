//! Collection orchestration
//!
//! This module drives sources end to end:
//! - Searching for configured queries and sampling chapter lists (`collect`)
//! - Crawling a whole catalog and checking every entity's chapters (`survey`)
//! - Building the report values written by [`crate::output`]

mod query;
mod report;
mod survey;

pub use query::{collect_all, collect_query, collect_source, CollectSettings};
pub use report::{
    ChapterLookup, ChapterSample, CollectionReport, FailureCategory, QueryOutcome, QueryReport,
    SourceReport, SurveyEntry, SurveyReport, SurveyStatus,
};
pub use survey::survey_catalog;

use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Sleeps for `delay`, returning `false` if `cancel` fired first
async fn pause(delay: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}
