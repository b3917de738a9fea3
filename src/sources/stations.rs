// src/sources/stations.rs
//! Configurable scraper for local radio station websites.
//!
//! One component covers every station, parameterized by the station
//! directory: homepage plus a priority-tiered random sample of subpages per
//! refresh, a selector list for candidate article elements, and per-element
//! field extraction. Scraped items pass the political-content filter, get a
//! content-type classification, and are deduplicated by content hash within
//! the run before the recency gate and the configured diversity stage.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use metrics::counter;
use once_cell::sync::Lazy;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use scraper::{ElementRef, Html, Selector};
use sha2::{Digest, Sha256};
use url::Url;

use crate::model::{Article, RawArticle};
use crate::recency::{self, SCRAPE_MAX_AGE_DAYS};
use crate::sources::config::{DiversityPolicy, StationConfig, StationDirectory};
use crate::sources::{content, PageScraper};
use crate::weights::{self, StationWeights};
use crate::{diversity, model};

/// Candidate article elements examined per page.
pub const MAX_ELEMENTS_PER_PAGE: usize = 20;

/// Chance a missing image falls back to the station logo instead of a
/// stock graphic.
const STATION_LOGO_CHANCE: f64 = 0.3;

/// Stock graphics rotated in when a scraped item has no image of its own.
const FALLBACK_IMAGES: &[&str] = &[
    "https://images.unsplash.com/photo-1598488035139-bdbb2231ce04?w=800",
    "https://images.unsplash.com/photo-1511671782779-c97d3d27a1d4?w=800",
    "https://images.unsplash.com/photo-1514320291840-2e0a9bf2a9ae?w=800",
    "https://images.unsplash.com/photo-1505740420928-5e560c06d30e?w=800",
    "https://images.unsplash.com/photo-1487180144351-b8472da7d491?w=800",
];

static ARTICLE_SEL: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        "article, .post, .entry, .blog-post, .news-item, .event-item, \
         .contest-item, .podcast-item, .show-item",
    )
    .expect("article selector")
});
static TITLE_SELS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["h1", "h2", "h3", "[class*='title'], [class*='headline']", "a"]
        .iter()
        .map(|s| Selector::parse(s).expect("title selector"))
        .collect()
});
static DESC_SELS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        "[class*='excerpt'], [class*='summary'], [class*='description'], [class*='content']",
        "p",
    ]
    .iter()
    .map(|s| Selector::parse(s).expect("description selector"))
    .collect()
});
static LINK_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("link selector"));
static IMG_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("img[src]").expect("img selector"));
static TIME_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("time").expect("time selector"));
static DATE_CLASS_SEL: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("[class*='date'], [class*='published']").expect("date selector")
});

/// Scrapes and normalizes content from every configured station.
pub struct StationScraper {
    client: reqwest::Client,
    directory: StationDirectory,
    weights: StationWeights,
}

impl StationScraper {
    pub fn new(
        client: reqwest::Client,
        directory: StationDirectory,
        weights: StationWeights,
    ) -> Self {
        Self {
            client,
            directory,
            weights,
        }
    }

    /// Homepage plus a random sample of subpages, sized by priority tier.
    fn page_selection(&self, station: &StationConfig) -> Vec<String> {
        let n = station
            .priority
            .subpage_sample_count()
            .min(station.subpages.len());

        let mut rng = rand::rng();
        let mut urls = vec![station.homepage.clone()];
        urls.extend(
            station
                .subpages
                .choose_multiple(&mut rng, n)
                .map(|p| format!("{}{}", station.homepage, p)),
        );
        urls
    }

    async fn fetch_page(&self, url: &str) -> anyhow::Result<String> {
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}

#[async_trait]
impl PageScraper for StationScraper {
    async fn scrape_all(&self, station_specific_only: bool) -> Vec<Article> {
        let now = Utc::now();
        let mut seen_hashes: HashSet<String> = HashSet::new();
        let mut all: Vec<Article> = Vec::new();

        let mut order: Vec<&StationConfig> = self.directory.stations.iter().collect();
        {
            let mut rng = rand::rng();
            order.shuffle(&mut rng);
        }

        for station in order {
            let pages = self.page_selection(station);
            tracing::info!(station = %station.name, pages = pages.len(), "scraping station");

            for url in pages {
                let html = match self.fetch_page(&url).await {
                    Ok(html) => html,
                    Err(e) => {
                        tracing::warn!(error = ?e, %url, "page fetch failed");
                        counter!("scrape_errors_total").increment(1);
                        continue;
                    }
                };

                let mut raws = extract_articles(&html, &station.name, &url);
                raws.retain(|r| seen_hashes.insert(content_hash(r)));
                assign_fallback_images(&mut raws, &station.logo);
                counter!("scrape_articles_total").increment(raws.len() as u64);

                all.extend(raws.into_iter().filter_map(|r| Article::from_raw(r, now)));
            }
        }

        if station_specific_only {
            all.retain(|a| content::is_station_specific(a.content_type));
        }

        let mut recent =
            recency::filter_recent(all, Duration::days(SCRAPE_MAX_AGE_DAYS), now);
        recent.sort_by(|a, b| b.published.cmp(&a.published));

        let diverse = match self.directory.diversity {
            DiversityPolicy::Window {
                window_size,
                max_per_station,
            } => diversity::limit_diversity(recent, window_size, max_per_station),
            DiversityPolicy::Weighted { cap } => {
                weights::apply_weights(recent, &self.weights, cap)
            }
        };

        tracing::info!(count = diverse.len(), "local station scrape done");
        diverse
    }
}

/// Extract candidate articles from one page of station markup.
///
/// Pure with respect to the document: the caller owns cross-page hash
/// deduplication and fallback-image assignment. Political items and
/// too-short titles are dropped here.
pub fn extract_articles(html: &str, station_name: &str, page_url: &str) -> Vec<RawArticle> {
    let document = Html::parse_document(html);
    let base = Url::parse(page_url).ok();
    let mut out = Vec::new();

    for element in document.select(&ARTICLE_SEL).take(MAX_ELEMENTS_PER_PAGE) {
        let Some(title) = first_text(&element, &TITLE_SELS) else {
            continue;
        };
        let title = model::clean_text(&title);
        if title.chars().count() < model::MIN_TITLE_CHARS {
            continue;
        }

        let description = first_text(&element, &DESC_SELS)
            .map(|d| model::clean_text(&d))
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| title.clone());

        if content::is_political_content(&title, &description) {
            tracing::info!(%title, "filtered political content");
            continue;
        }

        let link = element
            .select(&LINK_SEL)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(|href| resolve_url(&base, href))
            .unwrap_or_else(|| page_url.to_string());

        let image = element
            .select(&IMG_SEL)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(|src| resolve_url(&base, src));

        let published = extract_date(&element);
        let content_type = content::classify(&title, &description);

        out.push(RawArticle {
            title,
            url: link,
            published,
            source: station_name.to_string(),
            description: Some(description),
            image,
            content_type: Some(content_type),
        });
    }

    out
}

/// Text of the first descendant matching any selector, tried in order.
fn first_text(element: &ElementRef, selectors: &[Selector]) -> Option<String> {
    for sel in selectors {
        if let Some(found) = element.select(sel).next() {
            let text = found.text().collect::<Vec<_>>().join(" ");
            if !text.trim().is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// `<time datetime=...>` wins, then a dated-looking class. Missing dates
/// stay `None` and fail open downstream.
fn extract_date(element: &ElementRef) -> Option<String> {
    if let Some(time_el) = element.select(&TIME_SEL).next() {
        if let Some(dt) = time_el.value().attr("datetime") {
            return Some(dt.to_string());
        }
        let text = time_el.text().collect::<String>();
        if !text.trim().is_empty() {
            return Some(text.trim().to_string());
        }
    }
    element
        .select(&DATE_CLASS_SEL)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn resolve_url(base: &Option<Url>, href: &str) -> String {
    if href.starts_with("http") {
        return href.to_string();
    }
    match base {
        Some(b) => b
            .join(href)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| href.to_string()),
        None => href.to_string(),
    }
}

/// Stable identity of a scraped item within one run.
pub fn content_hash(raw: &RawArticle) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.title.as_bytes());
    hasher.update(raw.url.as_bytes());
    hasher.update(raw.source.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn assign_fallback_images(raws: &mut [RawArticle], logo: &str) {
    let mut rng = rand::rng();
    for raw in raws {
        if raw.image.is_none() {
            let image = if rng.random_bool(STATION_LOGO_CHANCE) {
                logo.to_string()
            } else {
                FALLBACK_IMAGES
                    .choose(&mut rng)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| logo.to_string())
            };
            raw.image = Some(image);
        }
    }
}
