// src/diversity.rs
//! Source diversity limiting.
//!
//! Caps how often a single station can appear within any trailing window of
//! the output sequence, so one prolific site cannot dominate a stretch of
//! the feed. Greedy and single-pass: a dropped article is gone for good,
//! which can discard more than a lookahead selection would — accepted for
//! O(n·window) simplicity.

use crate::model::Article;

/// Trailing window length inspected for repeats.
pub const DEFAULT_WINDOW_SIZE: usize = 10;
/// Maximum appearances of one source within the window.
pub const DEFAULT_MAX_PER_SOURCE: usize = 2;

/// Return the longest prefix-greedy subsequence of `articles` in which no
/// source appears more than `max_per_source` times in any `window_size`
/// consecutive accepted items. Inputs no longer than the window are
/// returned unchanged.
pub fn limit_diversity(
    articles: Vec<Article>,
    window_size: usize,
    max_per_source: usize,
) -> Vec<Article> {
    if articles.len() <= window_size {
        return articles;
    }

    let before = articles.len();
    let mut diverse: Vec<Article> = Vec::with_capacity(articles.len());

    for article in articles {
        let window_start = diverse.len().saturating_sub(window_size);
        let in_window = diverse[window_start..]
            .iter()
            .filter(|a| a.source == article.source)
            .count();

        if in_window < max_per_source {
            diverse.push(article);
        }
    }

    tracing::info!(before, after = diverse.len(), "diversity filter");
    diverse
}
