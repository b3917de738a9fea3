// src/sources/content.rs
//! Keyword classification for scraped station content.
//!
//! Two concerns, both pure: filtering out political news (the station feed
//! is entertainment-oriented; contest posts that merely mention a political
//! name survive), and bucketing items into a [`ContentType`].

use crate::model::ContentType;

const POLITICAL_KEYWORDS: &[&str] = &[
    "trump",
    "biden",
    "election",
    "vote",
    "campaign",
    "congress",
    "senate",
    "republican",
    "democrat",
    "political",
    "politics",
    "governor",
    "mayor",
    "legislation",
    "bill signed",
    "white house",
    "president elect",
];

const CONTEST_KEYWORDS: &[&str] = &["win", "giveaway", "contest", "enter to", "prize", "tickets"];

/// True for political news that is not contest-related.
pub fn is_political_content(title: &str, description: &str) -> bool {
    let text = format!("{} {}", title, description).to_lowercase();

    let has_political = POLITICAL_KEYWORDS.iter().any(|k| text.contains(k));
    let has_contest = CONTEST_KEYWORDS.iter().any(|k| text.contains(k));

    has_political && !has_contest
}

/// Bucket an item by keyword. Falls through to `Entertainment` — the
/// catch-all for station content whose kind we cannot tell.
pub fn classify(title: &str, description: &str) -> ContentType {
    let text = format!("{} {}", title, description).to_lowercase();
    let any = |words: &[&str]| words.iter().any(|w| text.contains(w));

    if any(&["contest", "win", "giveaway", "enter to win", "grand prize", "tickets"]) {
        ContentType::Contest
    } else if any(&["event", "concert", "show", "festival", "live music", "performance"]) {
        ContentType::Event
    } else if any(&["podcast", "episode", "listen now", "new episode"]) {
        ContentType::Podcast
    } else if any(&["interview", "conversation", "talk with", "sits down with"]) {
        ContentType::Interview
    } else if any(&["staff", "team", "host", "dj", "on-air", "morning show"]) {
        ContentType::Staff
    } else if any(&["promotion", "promo", "special offer"]) {
        ContentType::Promotion
    } else {
        ContentType::Entertainment
    }
}

/// Content types that are about the station itself, as opposed to news it
/// happens to republish.
pub fn is_station_specific(content_type: ContentType) -> bool {
    matches!(
        content_type,
        ContentType::Contest
            | ContentType::Event
            | ContentType::Podcast
            | ContentType::Interview
            | ContentType::Staff
            | ContentType::Promotion
    )
}
