// src/sources/mod.rs
//! Upstream collaborators: the trade-publication feed fetcher and the
//! station page scraper.
//!
//! Both are consumed through object-safe traits so the serving layer and
//! the tests can inject stubs. Implementations catch their own failures,
//! log them, and degrade to an empty contribution — errors never cross
//! this boundary.

pub mod config;
pub mod content;
pub mod feeds;
pub mod stations;

use crate::model::Article;

/// Per-request timeout applied by the shared HTTP client.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Shared client for feed pulls and page scrapes. Several station sites
/// refuse requests without a browser-like User-Agent.
pub fn http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()
}

/// RSS feed collaborator.
#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch and normalize articles from every configured feed.
    /// Returns an empty list on total failure; never errors.
    async fn fetch_all(&self) -> Vec<Article>;
}

/// Station website collaborator.
#[async_trait::async_trait]
pub trait PageScraper: Send + Sync {
    /// Scrape and normalize articles from every configured station.
    /// With `station_specific_only`, keeps only content about the station
    /// itself (contests, events, podcasts, interviews, staff, promotions).
    /// Returns an empty list on total failure; never errors.
    async fn scrape_all(&self, station_specific_only: bool) -> Vec<Article>;
}
