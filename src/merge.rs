// src/merge.rs
//! Merge pipeline: national + local batches → one served payload.
//!
//! Pure and testable, no I/O. Order of operations is fixed: concatenate,
//! sort by publish time descending, deduplicate, truncate. The national
//! versus local split in the output counts is a membership test of each
//! surviving article's source against the configured trade-publication
//! name set.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::dedup;
use crate::model::{Article, MergedResult};

/// Cap on the number of served articles.
pub const DEFAULT_MAX_RESULTS: usize = 50;

/// Merge two raw batches into the served payload.
///
/// Sorting happens on the parsed `published` timestamps, not on their
/// string form, so mixed upstream date formats cannot corrupt the order.
/// The sort is stable: same-instant articles keep national-before-local
/// input order.
pub fn merge(
    national: Vec<Article>,
    local: Vec<Article>,
    max_results: usize,
    national_sources: &HashSet<String>,
    now: DateTime<Utc>,
) -> MergedResult {
    let mut all = national;
    all.extend(local);

    all.sort_by(|a, b| b.published.cmp(&a.published));

    let mut unique = dedup::dedupe(all);
    unique.truncate(max_results);

    let national_count = unique
        .iter()
        .filter(|a| national_sources.contains(&a.source))
        .count();
    let local_count = unique.len() - national_count;

    MergedResult {
        success: true,
        total_count: unique.len(),
        national_count,
        local_count,
        articles: unique,
        last_updated: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContentType;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn art(title: &str, source: &str, minutes_old: i64) -> Article {
        Article {
            title: title.to_string(),
            url: format!("https://example.com/{}", title.replace(' ', "-")),
            description: String::new(),
            image: None,
            source: source.to_string(),
            published: now() - Duration::minutes(minutes_old),
            content_type: ContentType::News,
        }
    }

    fn national_set() -> HashSet<String> {
        ["Radio Ink", "Radio World"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn output_is_sorted_desc_and_truncated() {
        let national: Vec<Article> = (0..40)
            .map(|n| art(&format!("trade story number {n}"), "Radio Ink", n))
            .collect();
        let local: Vec<Article> = (0..40)
            .map(|n| art(&format!("station story number {n}"), "Wild 101", n))
            .collect();

        let merged = merge(national, local, 50, &national_set(), now());

        assert_eq!(merged.total_count, 50);
        assert_eq!(merged.articles.len(), 50);
        assert!(merged
            .articles
            .windows(2)
            .all(|w| w[0].published >= w[1].published));
        assert!(merged.success);
        assert_eq!(merged.last_updated, now());
    }

    #[test]
    fn counts_split_on_national_source_membership() {
        let national = vec![
            art("consolidation wave reaches mid markets", "Radio Ink", 1),
            art("translator rules draw fresh comments", "Radio World", 2),
        ];
        let local = vec![art("station street team hits the fair", "Wild 101", 3)];

        let merged = merge(national, local, 50, &national_set(), now());

        assert_eq!(merged.national_count, 2);
        assert_eq!(merged.local_count, 1);
        assert_eq!(merged.total_count, 3);
    }

    #[test]
    fn cross_batch_duplicates_collapse() {
        let national = vec![art("big acquisition closes this week", "Radio Ink", 5)];
        let local = vec![Article {
            url: String::new(),
            ..art("Big Acquisition Closes This Week!", "Wild 101", 1)
        }];

        let merged = merge(national, local, 50, &national_set(), now());

        // the local copy is newer so it sorts first and wins
        assert_eq!(merged.total_count, 1);
        assert_eq!(merged.articles[0].source, "Wild 101");
    }

    #[test]
    fn counts_are_post_truncation() {
        let national: Vec<Article> = (0..10)
            .map(|n| art(&format!("trade story number {n}"), "Radio Ink", n))
            .collect();
        let local: Vec<Article> = (0..10)
            .map(|n| art(&format!("station story number {n}"), "Wild 101", 100 + n))
            .collect();

        // all national items are newer than the local ones
        let merged = merge(national, local, 10, &national_set(), now());

        assert_eq!(merged.total_count, 10);
        assert_eq!(merged.national_count, 10);
        assert_eq!(merged.local_count, 0);
    }
}
