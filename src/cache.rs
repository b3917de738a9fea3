// src/cache.rs
//! # Refresh Coordinator
//!
//! Time-windowed cache of the last merged payload, fronting the merge
//! pipeline for the polling API. One instance is constructed at startup and
//! shared by handle; there is no ambient global.
//!
//! Concurrency contract:
//! - any number of readers may call [`NewsCache::get`]/[`NewsCache::status`]
//!   concurrently;
//! - at most one refresh is in flight at a time, enforced by an atomic
//!   guard handed out by [`NewsCache::try_begin_refresh`];
//! - a refresh never holds the cache lock while fetching — only the final
//!   [`NewsCache::set`] swap takes it, so readers are never blocked by a
//!   slow upstream.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use crate::model::{Article, CacheStatus, MergedResult};

/// Cached payloads older than this are considered stale.
pub const UPDATE_INTERVAL_HOURS: i64 = 6;

#[derive(Debug, Default)]
struct CacheEntry {
    national: Vec<Article>,
    local: Vec<Article>,
    merged: Option<MergedResult>,
    last_updated: Option<DateTime<Utc>>,
}

/// Shared, process-wide news cache with single-flight refresh coordination.
#[derive(Debug)]
pub struct NewsCache {
    inner: Mutex<CacheEntry>,
    is_updating: AtomicBool,
    update_interval: Duration,
}

impl NewsCache {
    pub fn new() -> Self {
        Self::with_interval(Duration::hours(UPDATE_INTERVAL_HOURS))
    }

    /// Construct with a custom freshness window (tests use short ones).
    pub fn with_interval(update_interval: Duration) -> Self {
        Self {
            inner: Mutex::new(CacheEntry::default()),
            is_updating: AtomicBool::new(false),
            update_interval,
        }
    }

    /// Return the cached payload only while it is fresh. A stale or empty
    /// cache yields `None`; the caller decides whether to force a refresh.
    pub fn get(&self) -> Option<MergedResult> {
        let entry = self.inner.lock().expect("news cache mutex poisoned");
        let (merged, last_updated) = (entry.merged.as_ref()?, entry.last_updated?);

        let age = Utc::now() - last_updated;
        if age < self.update_interval {
            tracing::info!(age_secs = age.num_seconds(), "returning cached results");
            Some(merged.clone())
        } else {
            None
        }
    }

    /// Replace all cache fields and the timestamp as one atomic unit.
    /// Readers either see the previous state or the complete new one.
    pub fn set(&self, national: Vec<Article>, local: Vec<Article>, merged: MergedResult) {
        let mut entry = self.inner.lock().expect("news cache mutex poisoned");
        tracing::info!(
            national = national.len(),
            local = local.len(),
            total = merged.total_count,
            "cache updated"
        );
        entry.national = national;
        entry.local = local;
        entry.last_updated = Some(Utc::now());
        entry.merged = Some(merged);
    }

    /// True when the cache is empty or its age has reached the freshness
    /// window — i.e. a scheduled refresh is due.
    pub fn should_update(&self) -> bool {
        let entry = self.inner.lock().expect("news cache mutex poisoned");
        match entry.last_updated {
            Some(ts) => (Utc::now() - ts) >= self.update_interval,
            None => true,
        }
    }

    pub fn is_updating(&self) -> bool {
        self.is_updating.load(Ordering::SeqCst)
    }

    /// Claim the single refresh slot. Returns `None` when a refresh is
    /// already in flight — the caller treats that as a no-op, it neither
    /// queues nor errors. The returned guard releases the slot on drop,
    /// including on an unwinding refresh.
    pub fn try_begin_refresh(&self) -> Option<RefreshGuard<'_>> {
        self.is_updating
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| RefreshGuard { cache: self })
    }

    /// Snapshot for the status endpoint.
    pub fn status(&self) -> CacheStatus {
        let entry = self.inner.lock().expect("news cache mutex poisoned");
        CacheStatus {
            last_updated: entry.last_updated,
            national_count: entry.national.len(),
            local_count: entry.local.len(),
            is_updating: self.is_updating(),
        }
    }
}

impl Default for NewsCache {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII token for the single refresh slot.
#[derive(Debug)]
pub struct RefreshGuard<'a> {
    cache: &'a NewsCache,
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.cache.is_updating.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContentType;

    fn merged(total: usize) -> MergedResult {
        MergedResult {
            success: true,
            total_count: total,
            national_count: total,
            local_count: 0,
            articles: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    fn art(n: usize) -> Article {
        Article {
            title: format!("cached headline number {n}"),
            url: String::new(),
            description: String::new(),
            image: None,
            source: "Radio Ink".to_string(),
            published: Utc::now(),
            content_type: ContentType::News,
        }
    }

    #[test]
    fn empty_cache_reads_none_and_needs_update() {
        let cache = NewsCache::new();
        assert!(cache.get().is_none());
        assert!(cache.should_update());
    }

    #[test]
    fn get_after_set_returns_the_payload() {
        let cache = NewsCache::new();
        cache.set(vec![art(1)], vec![], merged(1));
        let got = cache.get().expect("fresh cache");
        assert_eq!(got.total_count, 1);
        assert!(!cache.should_update());
    }

    #[test]
    fn status_reflects_stored_lists_and_updating_flag() {
        let cache = NewsCache::new();
        cache.set(vec![art(1), art(2)], vec![art(3)], merged(3));

        let status = cache.status();
        assert_eq!(status.national_count, 2);
        assert_eq!(status.local_count, 1);
        assert!(!status.is_updating);
        assert!(status.last_updated.is_some());

        let _guard = cache.try_begin_refresh().expect("slot free");
        assert!(cache.status().is_updating);
    }

    #[test]
    fn refresh_slot_is_single_flight_and_released_on_drop() {
        let cache = NewsCache::new();
        let guard = cache.try_begin_refresh().expect("first claim wins");
        assert!(cache.try_begin_refresh().is_none());
        drop(guard);
        assert!(cache.try_begin_refresh().is_some());
    }

    #[test]
    fn stale_cache_reads_none_but_keeps_contents() {
        let cache = NewsCache::with_interval(Duration::zero());
        cache.set(vec![art(1)], vec![], merged(1));
        // age >= interval immediately
        assert!(cache.get().is_none());
        assert!(cache.should_update());
        // stale contents are still visible through status
        assert_eq!(cache.status().national_count, 1);
    }
}
