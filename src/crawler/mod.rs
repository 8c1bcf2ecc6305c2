//! Crawler module for walking paged search endpoints
//!
//! This module contains the pagination logic, including:
//! - Strictly sequential page requests starting at page 1
//! - De-duplication of entities by source-assigned id
//! - Stopping at a target count, an empty page or a short page
//! - Pacing between pages and partial results on failure

mod entity;
mod paginator;

pub use entity::Entity;
pub use paginator::{
    crawl, CrawlInterruption, CrawlOptions, CrawlOutcome, PartialCrawlError, StopReason,
};
