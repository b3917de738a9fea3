// tests/cache_refresh.rs
//
// Coordinator behavior: freshness window, atomic set, single-flight
// refresh, and failure leaving the cache untouched. Collaborators are
// stubbed; the slow stub parks on a Notify so the overlap between two
// refresh triggers is deterministic, not timing-dependent.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Notify;

use airwave_news_aggregator::cache::NewsCache;
use airwave_news_aggregator::model::{Article, ContentType, MergedResult};
use airwave_news_aggregator::scheduler::update_news_cache;
use airwave_news_aggregator::sources::{FeedSource, PageScraper};

fn article(title: &str, source: &str) -> Article {
    Article {
        title: title.to_string(),
        url: format!("https://example.com/{}", title.replace(' ', "-")),
        description: "No description available.".to_string(),
        image: None,
        source: source.to_string(),
        published: Utc::now(),
        content_type: ContentType::News,
    }
}

fn merged(articles: Vec<Article>) -> MergedResult {
    MergedResult {
        success: true,
        total_count: articles.len(),
        national_count: articles.len(),
        local_count: 0,
        articles,
        last_updated: Utc::now(),
    }
}

/// Feed stub that counts invocations and can park mid-fetch.
struct StubFeeds {
    articles: Vec<Article>,
    calls: AtomicUsize,
    started: Notify,
    release: Notify,
    parked: bool,
}

impl StubFeeds {
    fn immediate(articles: Vec<Article>) -> Self {
        Self {
            articles,
            calls: AtomicUsize::new(0),
            started: Notify::new(),
            release: Notify::new(),
            parked: false,
        }
    }

    fn parked(articles: Vec<Article>) -> Self {
        Self {
            parked: true,
            ..Self::immediate(articles)
        }
    }
}

#[async_trait]
impl FeedSource for StubFeeds {
    async fn fetch_all(&self) -> Vec<Article> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.parked {
            self.started.notify_one();
            self.release.notified().await;
        }
        self.articles.clone()
    }
}

struct EmptyScraper;

#[async_trait]
impl PageScraper for EmptyScraper {
    async fn scrape_all(&self, _station_specific_only: bool) -> Vec<Article> {
        Vec::new()
    }
}

fn national_sources() -> Arc<HashSet<String>> {
    Arc::new(["Radio Ink".to_string()].into_iter().collect())
}

#[tokio::test]
async fn get_right_after_set_returns_the_payload() {
    let cache = NewsCache::new();
    let arts = vec![article("a perfectly fine trade headline", "Radio Ink")];
    cache.set(arts.clone(), Vec::new(), merged(arts));

    let got = cache.get().expect("fresh payload");
    assert_eq!(got.total_count, 1);
    assert_eq!(got.articles[0].source, "Radio Ink");
}

#[tokio::test]
async fn get_after_window_elapses_returns_none() {
    let cache = NewsCache::with_interval(Duration::milliseconds(40));
    let arts = vec![article("soon to be stale headline here", "Radio Ink")];
    cache.set(arts.clone(), Vec::new(), merged(arts));
    assert!(cache.get().is_some());

    tokio::time::sleep(std::time::Duration::from_millis(120)).await;
    assert!(cache.get().is_none(), "expired cache must read as empty");
    assert!(cache.should_update());
}

#[tokio::test]
async fn refresh_populates_cache_through_the_pipeline() {
    let cache = Arc::new(NewsCache::new());
    let feeds = Arc::new(StubFeeds::immediate(vec![
        article("first trade wire headline today", "Radio Ink"),
        article("second trade wire headline today", "Radio Ink"),
    ]));
    let stations = Arc::new(EmptyScraper);

    update_news_cache(cache.clone(), feeds.clone(), stations, national_sources())
        .await
        .expect("refresh succeeds");

    let got = cache.get().expect("populated");
    assert_eq!(got.total_count, 2);
    assert_eq!(got.national_count, 2);
    assert_eq!(got.local_count, 0);
    assert_eq!(feeds.calls.load(Ordering::SeqCst), 1);
    assert!(!cache.is_updating(), "refresh slot released");
}

#[tokio::test]
async fn overlapping_triggers_run_the_pipeline_exactly_once() {
    let cache = Arc::new(NewsCache::new());
    let feeds = Arc::new(StubFeeds::parked(vec![article(
        "the only headline this refresh",
        "Radio Ink",
    )]));
    let stations = Arc::new(EmptyScraper);

    let first = tokio::spawn(update_news_cache(
        cache.clone(),
        feeds.clone(),
        stations.clone() as Arc<dyn PageScraper>,
        national_sources(),
    ));

    // wait until the first refresh is inside its fetch
    feeds.started.notified().await;
    assert!(cache.is_updating());

    // second trigger while in flight: returns immediately as a no-op
    update_news_cache(
        cache.clone(),
        feeds.clone(),
        stations as Arc<dyn PageScraper>,
        national_sources(),
    )
    .await
    .expect("no-op trigger is not an error");
    assert!(cache.get().is_none(), "no-op must not publish anything");

    feeds.release.notify_one();
    first.await.expect("join").expect("refresh succeeds");

    assert_eq!(
        feeds.calls.load(Ordering::SeqCst),
        1,
        "fetch pipeline must run exactly once"
    );
    assert!(cache.get().is_some());
}

#[tokio::test]
async fn failed_refresh_leaves_previous_cache_untouched() {
    let cache = Arc::new(NewsCache::new());
    let arts = vec![article("yesterday's perfectly good news", "Radio Ink")];
    cache.set(arts.clone(), Vec::new(), merged(arts));

    let empty_feeds = Arc::new(StubFeeds::immediate(Vec::new()));
    let result = update_news_cache(
        cache.clone(),
        empty_feeds,
        Arc::new(EmptyScraper),
        national_sources(),
    )
    .await;

    assert!(result.is_err(), "all-empty refresh reports failure");
    let still = cache.get().expect("previous payload survives");
    assert_eq!(still.total_count, 1);
    assert!(!cache.is_updating(), "slot released after failure");
}
