//! Broadcast & Local-Radio News Aggregator — Binary Entrypoint
//! Boots the Axum HTTP server, the periodic refresh task, and telemetry.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use airwave_news_aggregator::api::{self, AppState};
use airwave_news_aggregator::cache::NewsCache;
use airwave_news_aggregator::scheduler;
use airwave_news_aggregator::sources::config::{FeedDirectory, StationDirectory};
use airwave_news_aggregator::sources::feeds::TradeFeeds;
use airwave_news_aggregator::sources::stations::StationScraper;
use airwave_news_aggregator::sources::{self, FeedSource, PageScraper};
use airwave_news_aggregator::telemetry::Metrics;
use airwave_news_aggregator::weights::StationWeights;

const DEFAULT_PORT: u16 = 8000;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("airwave_news_aggregator=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let feed_directory = FeedDirectory::load_default();
    let station_directory = StationDirectory::load_default();
    let metrics = Metrics::init(feed_directory.feeds.len(), station_directory.stations.len());
    let station_weights =
        StationWeights::load_from_file("config/station_weights.json", &station_directory);
    let national_sources: Arc<HashSet<String>> = Arc::new(feed_directory.national_names());

    let client = sources::http_client()?;
    let feeds: Arc<dyn FeedSource> = Arc::new(TradeFeeds::new(client.clone(), feed_directory));
    let stations: Arc<dyn PageScraper> = Arc::new(StationScraper::new(
        client,
        station_directory,
        station_weights,
    ));
    let cache = Arc::new(NewsCache::new());

    // Detached on purpose: completion is observed via the cache timestamp.
    let _refresh_task = scheduler::spawn_periodic_refresh(
        cache.clone(),
        feeds.clone(),
        stations.clone(),
        national_sources.clone(),
    );

    let state = AppState {
        cache,
        feeds,
        stations,
        national_sources,
    };
    let app = api::router(state).merge(metrics.router());

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "news aggregator listening");
    axum::serve(listener, app).await?;

    Ok(())
}
