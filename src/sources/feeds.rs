// src/sources/feeds.rs
//! RSS aggregation over the national trade publications.
//!
//! One fetcher handles every configured feed; per-feed failures are logged
//! and contribute nothing. Items older than the feed recency window are
//! dropped at this boundary so stale wire stories never reach the merge
//! pipeline.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use futures::stream::{self, StreamExt};
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::model::{self, Article, ContentType, RawArticle};
use crate::recency::FEED_MAX_AGE_HOURS;
use crate::sources::config::{FeedConfig, FeedDirectory};
use crate::sources::FeedSource;

/// Concurrent feed pulls per refresh.
const FETCH_CONCURRENCY: usize = 4;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    #[serde(rename = "enclosure", default)]
    enclosures: Vec<Enclosure>,
    #[serde(rename = "content", default)]
    media_content: Vec<Media>,
    #[serde(rename = "thumbnail", default)]
    media_thumbnail: Vec<Media>,
}

#[derive(Debug, Deserialize)]
struct Enclosure {
    #[serde(rename = "@url")]
    url: Option<String>,
    #[serde(rename = "@type")]
    mime: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Media {
    #[serde(rename = "@url")]
    url: Option<String>,
}

/// Fetches and normalizes all configured trade-publication feeds.
pub struct TradeFeeds {
    client: reqwest::Client,
    directory: FeedDirectory,
}

impl TradeFeeds {
    pub fn new(client: reqwest::Client, directory: FeedDirectory) -> Self {
        Self { client, directory }
    }

    /// Parse one feed body into raw articles. Entries older than the feed
    /// recency window are dropped; entries with an unparseable date pass.
    pub fn parse_feed(source_name: &str, xml: &str, now: DateTime<Utc>) -> Result<Vec<RawArticle>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(xml);
        let rss: Rss = from_str(&xml_clean)
            .with_context(|| format!("parsing rss xml from {source_name}"))?;

        let cutoff = now - Duration::hours(FEED_MAX_AGE_HOURS);
        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            let published = it.pub_date.clone();
            if model::parse_published(published.as_deref(), now) < cutoff {
                continue;
            }

            let image = extract_image(&it);
            out.push(RawArticle {
                title: it.title.unwrap_or_default(),
                url: it.link.unwrap_or_default(),
                published,
                source: source_name.to_string(),
                description: it.description,
                image,
                content_type: Some(ContentType::News),
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("feed_parse_ms").record(ms);
        counter!("feed_items_total").increment(out.len() as u64);
        Ok(out)
    }

    async fn fetch_feed(&self, feed: &FeedConfig) -> Result<Vec<RawArticle>> {
        tracing::info!(source = %feed.name, url = %feed.rss_url, "fetching rss feed");
        let body = self
            .client
            .get(&feed.rss_url)
            .send()
            .await
            .with_context(|| format!("GET {}", feed.rss_url))?
            .error_for_status()
            .with_context(|| format!("status from {}", feed.rss_url))?
            .text()
            .await
            .context("reading feed body")?;
        Self::parse_feed(&feed.name, &body, Utc::now())
    }

    /// Fetch one feed, logging and counting failures; never errors.
    async fn fetch_one(&self, feed: &FeedConfig) -> Vec<RawArticle> {
        match self.fetch_feed(feed).await {
            Ok(items) => {
                tracing::info!(source = %feed.name, count = items.len(), "feed fetched");
                items
            }
            Err(e) => {
                tracing::warn!(error = ?e, source = %feed.name, "feed fetch failed");
                counter!("feed_fetch_errors_total").increment(1);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl FeedSource for TradeFeeds {
    async fn fetch_all(&self) -> Vec<Article> {
        let now = Utc::now();

        let raw: Vec<RawArticle> = stream::iter(self.directory.feeds.clone())
            .map(|feed| async move { self.fetch_one(&feed).await })
            .buffer_unordered(FETCH_CONCURRENCY)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .flatten()
            .collect();

        let mut articles: Vec<Article> = raw
            .into_iter()
            .filter_map(|r| Article::from_raw(r, now))
            .collect();
        articles.sort_by(|a, b| b.published.cmp(&a.published));

        tracing::info!(count = articles.len(), "national feed aggregation done");
        articles
    }
}

/// First usable image for an item: media elements, then an image-typed
/// enclosure, then an inline `<img>` in the description markup.
fn extract_image(item: &Item) -> Option<String> {
    if let Some(url) = item.media_content.iter().find_map(|m| m.url.clone()) {
        return Some(url);
    }
    if let Some(url) = item.media_thumbnail.iter().find_map(|m| m.url.clone()) {
        return Some(url);
    }
    if let Some(url) = item
        .enclosures
        .iter()
        .filter(|e| {
            e.mime
                .as_deref()
                .is_some_and(|m| m.starts_with("image/"))
        })
        .find_map(|e| e.url.clone())
    {
        return Some(url);
    }

    let content = item.description.as_deref().unwrap_or_default();
    static RE_IMG: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_img = RE_IMG.get_or_init(|| {
        regex::Regex::new(r#"(?i)<img[^>]+src=["'](https?://[^"']+)["']"#).unwrap()
    });
    re_img
        .captures(content)
        .map(|c| c[1].to_string())
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
