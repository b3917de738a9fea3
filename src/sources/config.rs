// src/sources/config.rs
//! Static source directories: trade-publication feeds and local radio
//! stations. Loaded once at startup from TOML (explicit path → env var →
//! `config/` fallback) with built-in seeds when no file is present; never
//! mutated afterwards.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

const ENV_FEEDS_PATH: &str = "FEEDS_CONFIG_PATH";
const ENV_STATIONS_PATH: &str = "STATIONS_CONFIG_PATH";

/// One national trade publication RSS feed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedConfig {
    pub name: String,
    pub rss_url: String,
}

/// The set of national trade-publication feeds.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedDirectory {
    pub feeds: Vec<FeedConfig>,
}

impl FeedDirectory {
    /// Load using env var + fallback:
    /// 1) `$FEEDS_CONFIG_PATH`
    /// 2) `config/feeds.toml`
    /// 3) built-in seed
    pub fn load_default() -> Self {
        match load_path_from_env(ENV_FEEDS_PATH, "config/feeds.toml") {
            Some(path) => Self::load_from(&path).unwrap_or_else(|e| {
                tracing::warn!(error = ?e, "feed directory load failed, using seed");
                Self::default_seed()
            }),
            None => Self::default_seed(),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading feed directory from {}", path.display()))?;
        toml::from_str(&content).context("parsing feed directory toml")
    }

    /// The observed trade publications covering broadcast and radio.
    pub fn default_seed() -> Self {
        let feeds = [
            ("NewscastStudio", "https://www.newscaststudio.com/feed/"),
            ("TV Newscheck", "https://tvnewscheck.com/feed/"),
            ("Radio Ink", "https://radioink.com/feed/"),
            ("Radio World", "https://www.radioworld.com/rss"),
            ("Inside Radio", "https://www.insideradio.com/rss.xml"),
            ("TV Technology", "https://www.tvtechnology.com/rss"),
            ("Broadcasting & Cable", "https://www.nexttv.com/broadcasting-cable/feed"),
            ("RBR-TVBR", "https://rbr.com/feed/"),
            (
                "Inside Audio Marketing",
                "https://www.insideaudiomarketing.com/feed",
            ),
        ]
        .into_iter()
        .map(|(name, rss_url)| FeedConfig {
            name: name.to_string(),
            rss_url: rss_url.to_string(),
        })
        .collect();
        Self { feeds }
    }

    /// Source names counted as "national" in the merged payload.
    pub fn national_names(&self) -> HashSet<String> {
        self.feeds.iter().map(|f| f.name.clone()).collect()
    }
}

/// How many candidate subpages a station gets per refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn subpage_sample_count(self) -> usize {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

fn default_priority() -> Priority {
    Priority::Medium
}

/// One local radio station to scrape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StationConfig {
    pub name: String,
    pub homepage: String,
    #[serde(default)]
    pub subpages: Vec<String>,
    pub logo: String,
    /// Relative audience share; stations without one are excluded from
    /// weighted distribution.
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default = "default_priority")]
    pub priority: Priority,
}

/// Which diversity mechanism applies to a scraped batch. Exactly one is
/// active per configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum DiversityPolicy {
    Window {
        window_size: usize,
        max_per_station: usize,
    },
    Weighted {
        cap: usize,
    },
}

impl Default for DiversityPolicy {
    fn default() -> Self {
        DiversityPolicy::Window {
            window_size: crate::diversity::DEFAULT_WINDOW_SIZE,
            max_per_station: crate::diversity::DEFAULT_MAX_PER_SOURCE,
        }
    }
}

/// The set of stations to scrape plus the active diversity policy.
#[derive(Debug, Clone, Deserialize)]
pub struct StationDirectory {
    pub stations: Vec<StationConfig>,
    #[serde(default)]
    pub diversity: DiversityPolicy,
}

impl StationDirectory {
    /// Load using env var + fallback:
    /// 1) `$STATIONS_CONFIG_PATH`
    /// 2) `config/stations.toml`
    /// 3) built-in seed
    pub fn load_default() -> Self {
        match load_path_from_env(ENV_STATIONS_PATH, "config/stations.toml") {
            Some(path) => Self::load_from(&path).unwrap_or_else(|e| {
                tracing::warn!(error = ?e, "station directory load failed, using seed");
                Self::default_seed()
            }),
            None => Self::default_seed(),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading station directory from {}", path.display()))?;
        toml::from_str(&content).context("parsing station directory toml")
    }

    /// The observed market stations. Subpage lists are the sections that
    /// actually carry dated content on each site.
    pub fn default_seed() -> Self {
        let station = |name: &str,
                       homepage: &str,
                       subpages: &[&str],
                       logo: &str,
                       weight: f64,
                       priority: Priority| StationConfig {
            name: name.to_string(),
            homepage: homepage.to_string(),
            subpages: subpages.iter().map(|s| s.to_string()).collect(),
            logo: logo.to_string(),
            weight: Some(weight),
            priority,
        };

        let stations = vec![
            station(
                "101.9 The Bull",
                "https://boisebull.com",
                &["/contests/", "/shows-schedule/", "/category/music/", "/events/", "/category/local-news/"],
                "https://boisebull.com/wp-content/uploads/2021/01/bull-logo.png",
                6.0,
                Priority::High,
            ),
            station(
                "My 102.7",
                "https://my1027.com",
                &["/contests/", "/events/", "/shows/", "/category/music/", "/category/entertainment/"],
                "https://my1027.com/wp-content/uploads/2021/01/my1027-logo.png",
                4.5,
                Priority::Medium,
            ),
            station(
                "96.1 Bob FM",
                "https://961bobfm.com",
                &["/contests/", "/view-playlist/", "/bob/", "/events/", "/category/entertainment/"],
                "https://961bobfm.com/wp-content/uploads/2021/01/bobfm-logo.png",
                4.0,
                Priority::Medium,
            ),
            station(
                "96.9 The Eagle",
                "https://www.kkgl.com",
                &["/shows/", "/events/", "/blog/", "/contests/"],
                "https://www.kkgl.com/wp-content/uploads/2021/01/eagle-logo.png",
                5.5,
                Priority::Medium,
            ),
            station(
                "100.3 The X",
                "https://www.xrock.com",
                &["/category/contests/", "/events/", "/podcast/", "/category/blogs/", "/on-air/"],
                "https://www.xrock.com/wp-content/uploads/2021/01/xrock-logo.png",
                5.0,
                Priority::High,
            ),
            station(
                "Wow Country 104.3",
                "https://wowcountry1043.com",
                &["/contests/", "/events/", "/shows/", "/category/music/", "/category/local/"],
                "https://wowcountry1043.com/wp-content/uploads/2021/01/wow-logo.png",
                7.0,
                Priority::High,
            ),
            station(
                "KBOI 93.1FM & 670AM",
                "https://kboi.com",
                &["/blog/", "/events/", "/contests/", "/shows/", "/category/entertainment/"],
                "https://kboi.com/wp-content/uploads/2021/01/kboi-logo.png",
                9.0,
                Priority::High,
            ),
            station(
                "KIDO Talk Radio",
                "https://kidotalkradio.com",
                // reduced section list, less station-content focus
                &["/blog/", "/shows/"],
                "https://kidotalkradio.com/wp-content/uploads/2021/01/kido-logo.png",
                7.5,
                Priority::Low,
            ),
            station(
                "Wild 101",
                "https://wild101.com",
                &["/contests/", "/events/", "/shows/", "/category/music/", "/category/entertainment/"],
                "https://wild101.com/wp-content/uploads/2021/01/wild-logo.png",
                3.5,
                Priority::Medium,
            ),
            station(
                "103.5 Kiss FM",
                "https://1035kissfm.com",
                &["/contests/", "/events/", "/shows/", "/category/music/", "/category/entertainment/"],
                "https://1035kissfm.com/wp-content/uploads/2021/01/kiss-logo.png",
                6.5,
                Priority::High,
            ),
            station(
                "94.9 The River",
                "https://www.riverboise.com",
                &["/contests/", "/events/", "/podcast/", "/blogs/", "/on-air/"],
                "https://www.riverboise.com/wp-content/uploads/2021/01/river-logo.png",
                4.0,
                Priority::Medium,
            ),
            station(
                "Q92.7 KQFC",
                "https://q927.com",
                &["/blog/", "/events/", "/contests/", "/shows/"],
                "https://q927.com/logo.png",
                3.0,
                Priority::Medium,
            ),
            station(
                "Hank FM",
                "https://hankfm.com",
                &["/contests/", "/events/", "/category/music/", "/shows/"],
                "https://hankfm.com/logo.png",
                3.0,
                Priority::Medium,
            ),
            station(
                "93.1 KTIK",
                "https://931ktik.com",
                &["/blog/", "/sports/", "/shows/", "/events/"],
                "https://931ktik.com/logo.png",
                2.5,
                Priority::Low,
            ),
            station(
                "630 KFXD",
                "https://630kfxd.com",
                &["/blog/", "/shows/", "/events/"],
                "https://630kfxd.com/logo.png",
                2.0,
                Priority::Low,
            ),
        ];

        Self {
            stations,
            diversity: DiversityPolicy::default(),
        }
    }
}

fn load_path_from_env(env_name: &str, fallback: &str) -> Option<PathBuf> {
    if let Ok(p) = std::env::var(env_name) {
        return Some(PathBuf::from(p));
    }
    let fb = PathBuf::from(fallback);
    fb.exists().then_some(fb)
}
