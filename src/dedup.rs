// src/dedup.rs
//! Duplicate removal over heterogeneous sources.
//!
//! Two articles are duplicates when they share a non-empty URL, or when
//! their normalized titles are near-identical under word-set Jaccard
//! similarity. The pass is stable: the first occurrence wins and relative
//! order is preserved.

use std::collections::HashSet;

use crate::model::Article;

/// Minimum Jaccard similarity between normalized title word sets for two
/// articles to count as duplicates.
pub const SIMILARITY_THRESHOLD: f64 = 0.8;

/// Remove exact-URL and near-duplicate-title articles, keeping first
/// occurrences in input order.
///
/// Cost is O(n·k) with k the number of unique titles retained so far;
/// fine at the observed scale (a few hundred raw articles per refresh).
pub fn dedupe(articles: Vec<Article>) -> Vec<Article> {
    let input_len = articles.len();
    let mut unique = Vec::with_capacity(input_len);
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut seen_titles: Vec<String> = Vec::new();

    for article in articles {
        if !article.url.is_empty() && seen_urls.contains(&article.url) {
            continue;
        }

        let normalized = normalize_title(&article.title);
        let is_duplicate = seen_titles
            .iter()
            .any(|seen| titles_are_similar(&normalized, seen, SIMILARITY_THRESHOLD));
        if is_duplicate {
            continue;
        }

        if !article.url.is_empty() {
            seen_urls.insert(article.url.clone());
        }
        seen_titles.push(normalized);
        unique.push(article);
    }

    tracing::info!(
        before = input_len,
        after = unique.len(),
        "deduplication pass"
    );
    unique
}

/// Lowercase, strip everything that is not a word character or whitespace,
/// collapse runs of whitespace, trim.
pub fn normalize_title(title: &str) -> String {
    static RE_NON_WORD: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_non_word = RE_NON_WORD.get_or_init(|| regex::Regex::new(r"[^\w\s]").unwrap());

    let lowered = title.to_lowercase();
    let stripped = re_non_word.replace_all(&lowered, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Word-set Jaccard similarity test over two already-normalized titles.
///
/// Empty titles never match — not even each other. Two articles whose
/// titles normalize to nothing are both kept; that permissiveness is
/// deliberate (scraped titles are unreliable enough without collapsing
/// unrelated blanks together).
pub fn titles_are_similar(title1: &str, title2: &str, threshold: f64) -> bool {
    if title1.is_empty() || title2.is_empty() {
        return false;
    }

    let words1: HashSet<&str> = title1.split_whitespace().collect();
    let words2: HashSet<&str> = title2.split_whitespace().collect();
    if words1.is_empty() || words2.is_empty() {
        return false;
    }

    let intersection = words1.intersection(&words2).count();
    let union = words1.union(&words2).count();
    if union == 0 {
        return false;
    }

    (intersection as f64 / union as f64) >= threshold
}
