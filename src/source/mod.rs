//! Source module for talking to a content source over HTTP
//!
//! This module handles:
//! - Building HTTP clients from configuration
//! - Mapping `reqwest` failures onto `FetchError`
//! - Extracting entities and chapters from loosely-typed JSON records
//! - Parsing HTML chapter listings
//!
//! Nothing here retries; callers wrap these calls in the backoff executor.

mod client;
mod html;
mod http;
mod records;

pub use client::build_http_client;
pub use html::parse_chapter_list;
pub use http::HttpSource;
pub use records::{chapter_from_record, entity_from_record, extract_records};
