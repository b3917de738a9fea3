// src/scheduler.rs
//! Refresh orchestration and the periodic background task.
//!
//! A refresh is single-flight: the cache hands out one refresh slot, and a
//! trigger that finds the slot taken is a silent no-op. Fetching runs
//! without holding the cache lock; readers keep being served the previous
//! (possibly stale) payload until the final swap.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::Utc;
use metrics::{counter, gauge};
use tokio::task::JoinHandle;

use crate::cache::NewsCache;
use crate::merge;
use crate::sources::{FeedSource, PageScraper};

/// Delay before the first scheduled refresh after boot.
pub const STARTUP_DELAY_SECS: u64 = 5;
/// Interval between scheduled refresh checks.
pub const REFRESH_PERIOD_SECS: u64 = 3600;
/// Retry interval after a failed refresh tick.
pub const FAILURE_BACKOFF_SECS: u64 = 600;

/// Run one full refresh: fetch both upstreams, merge, swap into the cache.
///
/// A refresh already in flight turns this call into a no-op. A refresh in
/// which every upstream came back empty leaves the cache untouched and
/// reports the failure to the caller — the next scheduled or on-demand
/// attempt retries from scratch.
pub async fn update_news_cache(
    cache: Arc<NewsCache>,
    feeds: Arc<dyn FeedSource>,
    stations: Arc<dyn PageScraper>,
    national_sources: Arc<HashSet<String>>,
) -> Result<()> {
    let Some(_guard) = cache.try_begin_refresh() else {
        tracing::info!("update already in progress, skipping");
        return Ok(());
    };

    tracing::info!("starting news aggregation update");

    let national = feeds.fetch_all().await;
    tracing::info!(count = national.len(), "fetched national articles");

    let local = stations.scrape_all(false).await;
    tracing::info!(count = local.len(), "scraped local station articles");

    if national.is_empty() && local.is_empty() {
        return Err(anyhow!("every upstream source came back empty"));
    }

    let merged = merge::merge(
        national.clone(),
        local.clone(),
        merge::DEFAULT_MAX_RESULTS,
        &national_sources,
        Utc::now(),
    );

    counter!("refresh_runs_total").increment(1);
    gauge!("refresh_last_run_ts").set(Utc::now().timestamp() as f64);
    tracing::info!(total = merged.total_count, "news cache updated");

    cache.set(national, local, merged);
    Ok(())
}

/// Spawn the periodic refresh task. Completion of individual refreshes is
/// observed only through the cache timestamp; nothing joins this handle in
/// normal operation.
pub fn spawn_periodic_refresh(
    cache: Arc<NewsCache>,
    feeds: Arc<dyn FeedSource>,
    stations: Arc<dyn PageScraper>,
    national_sources: Arc<HashSet<String>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_secs(STARTUP_DELAY_SECS)).await;

        loop {
            let sleep_secs = if cache.should_update() {
                tracing::info!("starting scheduled news update");
                match update_news_cache(
                    cache.clone(),
                    feeds.clone(),
                    stations.clone(),
                    national_sources.clone(),
                )
                .await
                {
                    Ok(()) => REFRESH_PERIOD_SECS,
                    Err(e) => {
                        tracing::error!(error = ?e, "scheduled update failed");
                        counter!("refresh_failures_total").increment(1);
                        FAILURE_BACKOFF_SECS
                    }
                }
            } else {
                tracing::info!("cache is still fresh, skipping update");
                REFRESH_PERIOD_SECS
            };

            tokio::time::sleep(std::time::Duration::from_secs(sleep_secs)).await;
        }
    })
}
