//! Output module for reports and console summaries
//!
//! This module handles:
//! - Writing collection and survey reports as JSON
//! - Formatting human-readable summaries for the terminal

mod json;
mod summary;

pub use json::write_json_report;
pub use summary::{
    format_collection_summary, format_survey_summary, print_collection_summary,
    print_survey_summary,
};

use thiserror::Error;

/// Errors that can occur while writing output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
