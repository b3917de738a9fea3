// src/api.rs
//! HTTP surface for the aggregator.
//!
//! Handlers are thin: the cache and the collaborators do the work, and
//! every failure on the read path degrades to a structured payload rather
//! than a transport error.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::cache::NewsCache;
use crate::model::{Article, CacheStatus, ErrorPayload, MergedResult};
use crate::scheduler;
use crate::sources::{FeedSource, PageScraper};

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<NewsCache>,
    pub feeds: Arc<dyn FeedSource>,
    pub stations: Arc<dyn PageScraper>,
    /// Source names counted as "national" in merged payloads.
    pub national_sources: Arc<HashSet<String>>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/news", get(get_news))
        .route("/api/news/national", get(get_national_news))
        .route("/api/news/local", get(get_local_news))
        .route("/api/news/refresh", post(refresh_news))
        .route("/api/cache/status", get(cache_status))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Serialize)]
struct Health {
    status: &'static str,
}

async fn healthz() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Serve the merged feed. A cold or expired cache triggers a synchronous
/// refresh; only when that also yields nothing does the caller get the
/// degraded `{success: false}` payload.
async fn get_news(
    State(state): State<AppState>,
) -> Result<Json<MergedResult>, Json<ErrorPayload>> {
    if let Some(cached) = state.cache.get() {
        return Ok(Json(cached));
    }

    tracing::info!("no cache available, fetching fresh data");
    if let Err(e) = scheduler::update_news_cache(
        state.cache.clone(),
        state.feeds.clone(),
        state.stations.clone(),
        state.national_sources.clone(),
    )
    .await
    {
        tracing::error!(error = ?e, "on-demand refresh failed");
    }

    match state.cache.get() {
        Some(fresh) => Ok(Json(fresh)),
        None => Err(Json(ErrorPayload::new("Failed to fetch news data"))),
    }
}

#[derive(serde::Serialize)]
struct SourceListResponse {
    success: bool,
    count: usize,
    articles: Vec<Article>,
}

async fn get_national_news(State(state): State<AppState>) -> Json<SourceListResponse> {
    let articles = state.feeds.fetch_all().await;
    Json(SourceListResponse {
        success: true,
        count: articles.len(),
        articles,
    })
}

async fn get_local_news(State(state): State<AppState>) -> Json<SourceListResponse> {
    let articles = state.stations.scrape_all(false).await;
    Json(SourceListResponse {
        success: true,
        count: articles.len(),
        articles,
    })
}

#[derive(serde::Serialize)]
struct RefreshResponse {
    success: bool,
    message: &'static str,
}

/// Kick off a background refresh. Fire-and-forget: the caller never waits,
/// and a refresh already in flight is reported, not queued.
async fn refresh_news(State(state): State<AppState>) -> Json<RefreshResponse> {
    if state.cache.is_updating() {
        return Json(RefreshResponse {
            success: false,
            message: "Update already in progress",
        });
    }

    let (cache, feeds, stations, national_sources) = (
        state.cache.clone(),
        state.feeds.clone(),
        state.stations.clone(),
        state.national_sources.clone(),
    );
    tokio::spawn(async move {
        if let Err(e) =
            scheduler::update_news_cache(cache, feeds, stations, national_sources).await
        {
            tracing::error!(error = ?e, "background refresh failed");
        }
    });

    Json(RefreshResponse {
        success: true,
        message: "News refresh initiated",
    })
}

async fn cache_status(State(state): State<AppState>) -> Json<CacheStatus> {
    Json(state.cache.status())
}
