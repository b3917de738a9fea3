// src/recency.rs
//! Recency gate for the article pipeline.
//!
//! Upstream normalization already defaults missing/unparseable publish dates
//! to the ingestion time, so this filter is a plain cutoff comparison and
//! such articles pass (fail-open favors recall; scraped dates are
//! unreliable).

use chrono::{DateTime, Duration, Utc};

use crate::model::Article;

/// Maximum age for feed items.
pub const FEED_MAX_AGE_HOURS: i64 = 48;
/// Maximum age for scraped station content.
pub const SCRAPE_MAX_AGE_DAYS: i64 = 7;

/// Keep only articles published within `max_age` of `now`.
pub fn filter_recent(articles: Vec<Article>, max_age: Duration, now: DateTime<Utc>) -> Vec<Article> {
    let cutoff = now - max_age;
    let before = articles.len();
    let kept: Vec<Article> = articles
        .into_iter()
        .filter(|a| a.published >= cutoff)
        .collect();
    tracing::info!(before, after = kept.len(), "recency filter");
    kept
}
