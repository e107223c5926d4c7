//! Movie catalog client (TMDB list endpoints)
//!
//! A fetch never touches the shared store: the caller gets the list back
//! (or `None`) and decides what to show. Failures are not retried.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::state::Filter;

/// Default TMDB movie list endpoint; the filter's path segment is appended
pub const DEFAULT_ENDPOINT: &str = "https://api.themoviedb.org/3/movie";

/// Results are always requested in English
pub const LANGUAGE: &str = "en-US";

/// Where and how to query the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub endpoint: String,
    pub api_key: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: String::new(),
        }
    }
}

/// Catalog fetch failure
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("catalog request failed: {0}")]
    Transport(String),

    #[error("catalog returned HTTP {0}")]
    Status(u16),

    #[error("catalog response is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Transport(e.to_string())
    }
}

/// Raw HTTP response handed back by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Performs the GET request for a fully built catalog URL
pub trait CatalogTransport {
    fn get(&self, url: &str) -> impl Future<Output = Result<TransportResponse, FetchError>>;
}

/// `reqwest`-backed transport
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CatalogTransport for HttpTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(TransportResponse { status, body })
    }
}

/// One movie as listed by the catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    pub original_title: String,
    pub original_language: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub genre_ids: Vec<u32>,
    pub popularity: f64,
    pub vote_average: f64,
    pub vote_count: u64,
    pub adult: bool,
    pub video: bool,
}

/// One page of a catalog list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogPage {
    #[serde(default)]
    pub page: u32,
    pub results: Vec<Movie>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

/// Builds catalog queries and runs them through a transport
#[derive(Debug)]
pub struct CatalogFetcher<T> {
    config: CatalogConfig,
    transport: T,
}

impl CatalogFetcher<HttpTransport> {
    /// Fetcher over HTTP
    pub fn http(config: CatalogConfig) -> Self {
        Self::new(config, HttpTransport::new())
    }
}

impl<T: CatalogTransport> CatalogFetcher<T> {
    pub fn new(config: CatalogConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// URL for `filter` at 1-based `page`; page 0 is treated as 1
    pub fn query_url(&self, filter: Filter, page: u32) -> String {
        format!(
            "{}{}?include_adult=false&include_video=false&language={}&page={}&api_key={}",
            self.config.endpoint,
            filter.path_segment(),
            LANGUAGE,
            page.max(1),
            self.config.api_key
        )
    }

    /// Fetch one page, reporting why it failed
    pub async fn fetch_page(&self, filter: Filter, page: u32) -> Result<CatalogPage, FetchError> {
        let url = self.query_url(filter, page);
        tracing::debug!(%filter, page, "Fetching catalog page");

        let response = self.transport.get(&url).await?;
        if !(200..300).contains(&response.status) {
            return Err(FetchError::Status(response.status));
        }
        Ok(serde_json::from_str(&response.body)?)
    }

    /// Fetch one page of movies; `None` on any failure
    pub async fn fetch(&self, filter: Filter, page: u32) -> Option<Vec<Movie>> {
        match self.fetch_page(filter, page).await {
            Ok(page) => Some(page.results),
            Err(e) => {
                tracing::warn!(error = %e, %filter, "Catalog fetch failed");
                None
            }
        }
    }
}
