//! Gateway API adapter for one source
//!
//! Every method performs exactly one HTTP request; retrying is the
//! caller's business (see [`crate::retry::execute`]).

use super::client::{build_http_client, check_status, map_reqwest_error};
use super::html::parse_chapter_list;
use super::records::{chapter_from_record, convert_records, entity_from_record, extract_records};
use crate::chapters::ChapterEntry;
use crate::config::{ChapterListing, Config, SourceConfig};
use crate::crawler::Entity;
use crate::FetchError;
use reqwest::Client;
use serde_json::Value;
use url::Url;

/// A configured source reachable through the gateway API
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base_url: Url,
    source_id: String,
    chapter_listing: ChapterListing,
}

impl HttpSource {
    /// Creates an adapter for `config`, sharing `client`'s connection pool
    pub fn new(client: Client, config: &SourceConfig) -> crate::Result<Self> {
        Ok(Self {
            client,
            base_url: Url::parse(&config.base_url)?,
            source_id: config.id.clone(),
            chapter_listing: config.chapter_listing,
        })
    }

    /// Creates one adapter per `[[source]]`, all sharing a single client
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<HttpSource>)` - Adapters in configuration order
    /// * `Err(SieveError)` - The client could not be built or a base URL is invalid
    pub fn from_config(config: &Config) -> crate::Result<Vec<Self>> {
        let client = build_http_client(&config.http)?;
        config
            .sources
            .iter()
            .map(|source| Self::new(client.clone(), source))
            .collect()
    }

    pub fn id(&self) -> &str {
        &self.source_id
    }

    /// Builds `{base}/api/v1/sources/{segments...}`
    ///
    /// Each segment is percent-encoded, so entity ids containing `/` or
    /// spaces stay a single path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::Request {
                message: format!("base URL '{}' cannot carry a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(["api", "v1", "sources"])
            .extend(segments);
        Ok(url)
    }

    async fn get_json(&self, url: Url) -> Result<Value, FetchError> {
        let text = self.get_text(url.clone()).await?;
        serde_json::from_str(&text).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn get_text(&self, url: Url) -> Result<String, FetchError> {
        let url_str = url.to_string();
        tracing::debug!(url = %url_str, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| map_reqwest_error(&url_str, &e))?;
        let response = check_status(response)?;

        response
            .text()
            .await
            .map_err(|e| map_reqwest_error(&url_str, &e))
    }

    /// Lists the source ids the gateway knows about
    ///
    /// Records may be plain strings or objects carrying an `id`.
    pub async fn list_sources(&self) -> Result<Vec<String>, FetchError> {
        let body = self.get_json(self.endpoint(&[])?).await?;
        let ids = extract_records(body)
            .into_iter()
            .filter_map(|record| match record {
                Value::String(id) => Some(id),
                other => entity_from_record(&other).map(|entity| entity.id),
            })
            .collect();
        Ok(ids)
    }

    /// Fetches one page of search results
    ///
    /// # Arguments
    ///
    /// * `query` - Free-text query; an empty query lists the whole catalog
    /// * `page` - 1-based page number
    /// * `page_size` - Requested number of results per page
    pub async fn search_page(
        &self,
        query: &str,
        page: u32,
        page_size: usize,
    ) -> Result<Vec<Entity>, FetchError> {
        let mut url = self.endpoint(&[&self.source_id, "search"])?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("page", &page.to_string())
            .append_pair("limit", &page_size.to_string());

        let body = self.get_json(url).await?;
        Ok(convert_records(
            extract_records(body),
            "entity",
            entity_from_record,
        ))
    }

    /// Fetches the full chapter list of one entity, in source order
    pub async fn fetch_chapters(&self, entity_id: &str) -> Result<Vec<ChapterEntry>, FetchError> {
        let url = self.endpoint(&[&self.source_id, "manga", entity_id, "chapters"])?;

        match self.chapter_listing {
            ChapterListing::Json => {
                let body = self.get_json(url).await?;
                Ok(convert_records(
                    extract_records(body),
                    "chapter",
                    chapter_from_record,
                ))
            }
            ChapterListing::Html => {
                let html = self.get_text(url).await?;
                Ok(parse_chapter_list(&html))
            }
        }
    }
}
