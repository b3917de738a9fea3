// tests/merge_pipeline.rs
//
// Property-style coverage of the pure pipeline stages working together:
// dedup, recency, diversity, weighted distribution, and the merge itself.

use std::collections::HashSet;

use chrono::{DateTime, Duration, TimeZone, Utc};

use airwave_news_aggregator::dedup::dedupe;
use airwave_news_aggregator::diversity::limit_diversity;
use airwave_news_aggregator::merge::{merge, DEFAULT_MAX_RESULTS};
use airwave_news_aggregator::model::{Article, ContentType};
use airwave_news_aggregator::recency::filter_recent;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn art(title: &str, url: &str, source: &str, minutes_old: i64) -> Article {
    Article {
        title: title.to_string(),
        url: url.to_string(),
        description: "No description available.".to_string(),
        image: None,
        source: source.to_string(),
        published: now() - Duration::minutes(minutes_old),
        content_type: ContentType::News,
    }
}

fn national_set() -> HashSet<String> {
    ["Radio Ink", "Inside Radio"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[test]
fn near_duplicate_titles_collapse_to_one() {
    let input = vec![
        art("Station Wins Big Prize!!", "a", "Wild 101", 0),
        art("station wins big prize", "b", "Hank FM", 1),
    ];
    // normalized titles are identical: Jaccard similarity 1.0
    let out = dedupe(input);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].url, "a");
}

#[test]
fn dedupe_never_grows_and_keeps_first_seen_order() {
    let input: Vec<Article> = (0..25)
        .map(|n| {
            art(
                &format!("headline variant number {}", n % 10),
                &format!("https://example.com/{}", n % 10),
                "Radio Ink",
                n,
            )
        })
        .collect();

    let out = dedupe(input.clone());
    assert!(out.len() <= input.len());

    // retained items appear in the same relative order as the input
    let mut input_iter = input.iter();
    for kept in &out {
        assert!(input_iter.any(|orig| orig == kept));
    }
}

#[test]
fn shared_url_keeps_at_most_one() {
    let input = vec![
        art("completely different first headline", "same", "Radio Ink", 0),
        art("unrelated second headline entirely", "same", "Wild 101", 1),
    ];
    assert_eq!(dedupe(input).len(), 1);
}

#[test]
fn diversity_example_from_window_of_three() {
    let input = vec![
        art("first story from the busy station", "1", "X", 0),
        art("second story from the busy station", "2", "X", 1),
        art("third story from the busy station", "3", "X", 2),
        art("a story from the quiet station", "4", "Y", 3),
    ];
    let out = limit_diversity(input, 3, 1);
    let sources: Vec<&str> = out.iter().map(|a| a.source.as_str()).collect();
    assert_eq!(sources, vec!["X", "Y"]);
}

#[test]
fn merge_respects_cap_and_descending_order() {
    let national: Vec<Article> = (0..60)
        .map(|n| {
            art(
                &format!("unique trade headline number {n}"),
                &format!("https://trade.example/{n}"),
                "Radio Ink",
                n,
            )
        })
        .collect();
    let local: Vec<Article> = (0..60)
        .map(|n| {
            art(
                &format!("unique local headline number {n}"),
                &format!("https://local.example/{n}"),
                "Wild 101",
                n,
            )
        })
        .collect();

    let merged = merge(national, local, DEFAULT_MAX_RESULTS, &national_set(), now());

    assert!(merged.articles.len() <= DEFAULT_MAX_RESULTS);
    assert_eq!(merged.total_count, merged.articles.len());
    assert!(merged
        .articles
        .windows(2)
        .all(|w| w[0].published >= w[1].published));
    assert_eq!(
        merged.national_count + merged.local_count,
        merged.total_count
    );
}

#[test]
fn recency_then_diversity_composes() {
    let mut input = Vec::new();
    for n in 0..20 {
        input.push(art(
            &format!("fresh story number {n} from the flood"),
            &format!("https://flood.example/{n}"),
            "Flood FM",
            n,
        ));
    }
    // stale batch that recency should remove before diversity sees it
    for n in 0..5 {
        input.push(art(
            &format!("ancient story number {n}"),
            &format!("https://old.example/{n}"),
            "Other FM",
            60 * 24 * 10 + n,
        ));
    }

    let recent = filter_recent(input, Duration::days(7), now());
    assert!(recent.iter().all(|a| a.source == "Flood FM"));

    // single-source input: greedy pass admits the first two, then the
    // trailing window is saturated forever
    let out = limit_diversity(recent, 10, 2);
    assert_eq!(out.len(), 2);
}
