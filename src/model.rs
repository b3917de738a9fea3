// src/model.rs
//! Common article representation and wire payload types.
//!
//! Every upstream record — RSS entry or scraped page element — is normalized
//! into an [`Article`] before it enters the pipeline. Raw records arrive as
//! [`RawArticle`] at the collaborator boundary and go through
//! [`Article::from_raw`], which cleans text, gates out extraction noise,
//! and parses publish dates with a fail-open fallback.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

/// Titles shorter than this (after cleaning) are extraction noise.
pub const MIN_TITLE_CHARS: usize = 10;
/// Descriptions are bounded so payloads stay small for the polling frontend.
pub const DESCRIPTION_MAX_CHARS: usize = 300;

/// Kind of content an article carries, as classified at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    News,
    Contest,
    Event,
    Podcast,
    Interview,
    Staff,
    Promotion,
    StationInfo,
    Entertainment,
}

/// Raw record shape produced by the upstream collaborators (feed fetcher,
/// page scraper) before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawArticle {
    pub title: String,
    #[serde(default)]
    pub url: String,
    /// Publish timestamp as the upstream emitted it; parsed leniently.
    #[serde(default)]
    pub published: Option<String>,
    pub source: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub content_type: Option<ContentType>,
}

/// Normalized article; immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub description: String,
    pub image: Option<String>,
    /// Station/publication display name; the grouping key for diversity
    /// and weighting.
    pub source: String,
    pub published: DateTime<Utc>,
    pub content_type: ContentType,
}

impl Article {
    /// Normalize a raw record. Returns `None` when the cleaned title is too
    /// short to be a real headline.
    ///
    /// Missing or unparseable publish dates fall back to `now` — ordering and
    /// recency treat such articles as current rather than dropping them.
    pub fn from_raw(raw: RawArticle, now: DateTime<Utc>) -> Option<Self> {
        let title = clean_text(&raw.title);
        if title.chars().count() < MIN_TITLE_CHARS {
            return None;
        }

        let description = {
            let d = clean_text(raw.description.as_deref().unwrap_or_default());
            if d.is_empty() {
                "No description available.".to_string()
            } else {
                truncate_chars(&d, DESCRIPTION_MAX_CHARS)
            }
        };

        Some(Article {
            title,
            url: raw.url,
            description,
            image: raw.image,
            source: raw.source,
            published: parse_published(raw.published.as_deref(), now),
            content_type: raw.content_type.unwrap_or(ContentType::News),
        })
    }
}

/// Merged payload served to the frontend. `success` is always true on this
/// path; a failed read is represented by [`ErrorPayload`] instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedResult {
    pub success: bool,
    pub total_count: usize,
    pub national_count: usize,
    pub local_count: usize,
    pub articles: Vec<Article>,
    pub last_updated: DateTime<Utc>,
}

/// Degraded read result: both the cache and a live refresh produced nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub success: bool,
    pub error: String,
    pub articles: Vec<Article>,
}

impl ErrorPayload {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            articles: Vec::new(),
        }
    }
}

/// Snapshot of the cache for the status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStatus {
    pub last_updated: Option<DateTime<Utc>>,
    pub national_count: usize,
    pub local_count: usize,
    pub is_updating: bool,
}

/// Clean scraped/feed text: decode HTML entities, strip tags, fold smart
/// quotes and dashes to ASCII, collapse whitespace.
pub fn clean_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\u{2013}', '\u{2014}'], "-");

    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

/// Truncate on a char boundary, appending an ellipsis when shortened.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    s.chars().take(max_chars).collect::<String>() + "..."
}

/// Lenient publish-date parse. Upstreams emit a mix of RFC 3339 (Atom,
/// WordPress APIs), RFC 2822 (classic RSS `pubDate`), and bare datetime
/// strings from page markup. Anything else falls back to `now`.
pub fn parse_published(raw: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return now;
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Utc);
    }

    if let Some(dt) = parse_rfc2822(raw) {
        return dt;
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return naive.and_utc();
        }
    }
    for fmt in ["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            if let Some(naive) = d.and_hms_opt(0, 0, 0) {
                return naive.and_utc();
            }
        }
    }

    now
}

fn parse_rfc2822(ts: &str) -> Option<DateTime<Utc>> {
    if let Some(unix) = OffsetDateTime::parse(ts, &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
    {
        return DateTime::<Utc>::from_timestamp(unix, 0);
    }
    // time's well-known parser rejects obsolete zone names ("GMT", "EST")
    // that classic RSS pubDates still carry
    DateTime::parse_from_rfc2822(ts)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
